/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing
/// staff accounts. Every authenticated request resolves to exactly one
/// user row, and the user's [`Role`] drives every authorization decision
/// (see `crate::auth::authorization`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     full_name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE,
///     role TEXT NOT NULL DEFAULT 'user',
///     location_id INTEGER REFERENCES locations(id),
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use fielddesk_shared::models::user::{CreateUser, Role, User};
/// use fielddesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// // Create a new technician account
/// let new_user = CreateUser {
///     username: "jmartin".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     full_name: "Jordan Martin".to_string(),
///     email: "jmartin@example.com".to_string(),
///     role: Role::Technician,
///     location_id: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
///
/// // Find by username (login path)
/// let found = User::find_by_username(&pool, "jmartin").await?;
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Account role stored in the `role` column
///
/// The set of roles is closed. Anything else in the column is a data
/// error and fails row decoding rather than silently granting access.
///
/// Stored and serialized as lowercase strings (`"opentickets"` for
/// [`Role::OpenTickets`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user, location and ticket administration
    Admin,
    /// Day-to-day operations: tickets, equipment, maintenance
    Technician,
    /// Same operational access as a technician
    User,
    /// Restricted account that may only view open tickets
    OpenTickets,
}

impl Role {
    /// All roles, in display order (used for validation messages)
    pub const ALL: [Role; 4] = [Role::Admin, Role::Technician, Role::User, Role::OpenTickets];

    /// Returns the string stored in the database for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Technician => "technician",
            Role::User => "user",
            Role::OpenTickets => "opentickets",
        }
    }

    /// Parses a role from its stored string form
    ///
    /// Returns `None` for anything outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "technician" => Some(Role::Technician),
            "user" => Some(Role::User),
            "opentickets" => Some(Role::OpenTickets),
            _ => None,
        }
    }

    /// Whether this role has administrative access
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role is limited to viewing open tickets
    pub fn is_open_tickets(&self) -> bool {
        matches!(self, Role::OpenTickets)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model representing a staff account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
/// Handlers must not serialize this struct directly; API responses go
/// through a response type that omits `password_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name
    ///
    /// Must be unique across all users
    pub username: String,

    /// Argon2id password hash
    ///
    /// Never store plaintext passwords!
    /// Use `crate::auth::password` for hashing/verification
    pub password_hash: String,

    /// Display name shown on tickets and comments
    pub full_name: String,

    /// Email address
    ///
    /// Must be unique across all users
    pub email: String,

    /// Account role (drives every authorization decision)
    pub role: Role,

    /// Home location, if the account is tied to a site
    pub location_id: Option<i64>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// All fields except `location_id` are required. `password_hash` must
/// already be an Argon2id hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login name (must be unique)
    pub username: String,

    /// Argon2id password hash (NOT a plaintext password!)
    pub password_hash: String,

    /// Display name
    pub full_name: String,

    /// Email address (must be unique)
    pub email: String,

    /// Account role
    pub role: Role,

    /// Optional home location
    pub location_id: Option<i64>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New login name
    pub username: Option<String>,

    /// New password hash (set when an admin resets a password)
    pub password_hash: Option<String>,

    /// New display name
    pub full_name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New role
    pub role: Option<Role>,

    /// New home location (use Some(None) to clear)
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub location_id: Option<Option<i64>>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - User creation data
    ///
    /// # Returns
    ///
    /// The newly created user with generated ID and timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username or email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, email, role, location_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, username, password_hash, full_name, email, role, location_id, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.role)
        .bind(data.location_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `id` - User ID to search for
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, full_name, email, role, location_id, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by login name
    ///
    /// This is the lookup used by the login handler.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `username` - Login name to search for (exact match)
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, full_name, email, role, location_id, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users, ordered by username
    ///
    /// Used by the user management page and by ticket assignment
    /// dropdowns. The user table is small (staff accounts only), so no
    /// pagination is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, full_name, email, role, location_id, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `id` - ID of user to update
    /// * `data` - Fields to update (only non-None values are updated)
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username or email already exists for another user
    /// - Database connection fails
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut sets: Vec<&str> = Vec::new();

        if data.username.is_some() {
            sets.push("username = ?");
        }
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }
        if data.full_name.is_some() {
            sets.push("full_name = ?");
        }
        if data.email.is_some() {
            sets.push("email = ?");
        }
        if data.role.is_some() {
            sets.push("role = ?");
        }
        if data.location_id.is_some() {
            sets.push("location_id = ?");
        }

        if sets.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ? RETURNING id, username, password_hash, full_name, email, role, location_id, created_at",
            sets.join(", ")
        );

        // Binds must follow the order the placeholders appear in the query
        let mut q = sqlx::query_as::<_, User>(&query);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(location_opt) = data.location_id {
            q = q.bind(location_opt);
        }

        let user = q.bind(id).fetch_optional(pool).await?;

        Ok(user)
    }

    /// Replaces a user's password hash
    ///
    /// Used by the profile page after the current password has been
    /// verified, and by admin password resets.
    ///
    /// # Returns
    ///
    /// True if the user was found and updated, false otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn update_password(
        pool: &SqlitePool,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts total number of users
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!(Role::parse("superadmin"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::OpenTickets).unwrap();
        assert_eq!(json, "\"opentickets\"");

        let parsed: Role = serde_json::from_str("\"technician\"").unwrap();
        assert_eq!(parsed, Role::Technician);
    }

    #[test]
    fn test_role_predicates() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Technician.is_admin());
        assert!(Role::OpenTickets.is_open_tickets());
        assert!(!Role::User.is_open_tickets());
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.username.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.full_name.is_none());
        assert!(update.email.is_none());
        assert!(update.role.is_none());
        assert!(update.location_id.is_none());
    }

    // Database round trips for this model live in tests/models_tests.rs
}

/// Location model and database operations
///
/// Locations are the physical sites that users, equipment, and tickets
/// attach to. Deleting one never cascades into deleting records;
/// everything pointing at the location is unlinked instead, and the
/// caller gets back how many rows were detached.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE locations (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL UNIQUE,
///     address TEXT,
///     contact_person TEXT,
///     contact_phone TEXT,
///     anydesk_id TEXT,
///     created_at TEXT NOT NULL
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

/// Location model representing a physical site
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    /// Unique location ID
    pub id: i64,

    /// Site name (must be unique)
    pub name: String,

    /// Street address
    pub address: Option<String>,

    /// On-site contact person
    pub contact_person: Option<String>,

    /// Phone number for the on-site contact
    pub contact_phone: Option<String>,

    /// AnyDesk ID for remote support
    pub anydesk_id: Option<String>,

    /// When the location was added
    pub created_at: DateTime<Utc>,
}

/// Location row with the number of devices currently at the site
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LocationWithCounts {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub anydesk_id: Option<String>,
    pub created_at: DateTime<Utc>,

    /// Devices currently assigned to this site
    pub equipment_count: i64,
}

/// Rows detached when a location is deleted
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnlinkCounts {
    /// Devices whose `location_id` was cleared
    pub equipment: i64,

    /// Tickets whose `location_id` was cleared
    pub tickets: i64,

    /// Users whose home location was cleared
    pub users: i64,
}

/// Input for creating a new location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLocation {
    /// Site name (must be unique)
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub anydesk_id: Option<String>,
}

/// Input for updating an existing location
///
/// All fields are optional; nullable columns use Some(None) to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateLocation {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub contact_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub anydesk_id: Option<Option<String>>,
}

impl Location {
    /// Creates a new location
    ///
    /// # Errors
    ///
    /// Returns an error if the name already exists (unique constraint
    /// violation) or the database connection fails
    pub async fn create(pool: &SqlitePool, data: CreateLocation) -> Result<Self, sqlx::Error> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, address, contact_person, contact_phone, anydesk_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, address, contact_person, contact_phone, anydesk_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.address)
        .bind(data.contact_person)
        .bind(data.contact_phone)
        .bind(data.anydesk_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(location)
    }

    /// Finds a location by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, address, contact_person, contact_phone, anydesk_id, created_at
            FROM locations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(location)
    }

    /// Lists all locations, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, address, contact_person, contact_phone, anydesk_id, created_at
            FROM locations
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(locations)
    }

    /// Lists all locations with their current device counts
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_with_counts(pool: &SqlitePool) -> Result<Vec<LocationWithCounts>, sqlx::Error> {
        let locations = sqlx::query_as::<_, LocationWithCounts>(
            r#"
            SELECT l.id, l.name, l.address, l.contact_person, l.contact_phone,
                   l.anydesk_id, l.created_at,
                   COUNT(e.id) AS equipment_count
            FROM locations l
            LEFT JOIN equipment e ON e.location_id = l.id
            GROUP BY l.id
            ORDER BY l.name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(locations)
    }

    /// Counts all locations
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM locations")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates an existing location
    ///
    /// Only non-None fields in `data` will be updated.
    ///
    /// # Returns
    ///
    /// The updated location if found, None if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the new name collides with another location
    /// or the database connection fails
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateLocation,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut sets: Vec<&str> = Vec::new();

        if data.name.is_some() {
            sets.push("name = ?");
        }
        if data.address.is_some() {
            sets.push("address = ?");
        }
        if data.contact_person.is_some() {
            sets.push("contact_person = ?");
        }
        if data.contact_phone.is_some() {
            sets.push("contact_phone = ?");
        }
        if data.anydesk_id.is_some() {
            sets.push("anydesk_id = ?");
        }

        if sets.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let query = format!(
            "UPDATE locations SET {} WHERE id = ? RETURNING id, name, address, contact_person, contact_phone, anydesk_id, created_at",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, Location>(&query);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(address_opt) = data.address {
            q = q.bind(address_opt);
        }
        if let Some(person_opt) = data.contact_person {
            q = q.bind(person_opt);
        }
        if let Some(phone_opt) = data.contact_phone {
            q = q.bind(phone_opt);
        }
        if let Some(anydesk_opt) = data.anydesk_id {
            q = q.bind(anydesk_opt);
        }

        let location = q.bind(id).fetch_optional(pool).await?;

        Ok(location)
    }

    /// Deletes a location, detaching everything that points at it
    ///
    /// Equipment, tickets, and users referencing the location get their
    /// `location_id` cleared in the same transaction as the delete, so
    /// enforced foreign keys never reject the removal and no record is
    /// lost with the site.
    ///
    /// # Returns
    ///
    /// The unlink counts, or None if the location does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<Option<UnlinkCounts>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM locations WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let equipment = sqlx::query("UPDATE equipment SET location_id = NULL WHERE location_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let tickets = sqlx::query("UPDATE tickets SET location_id = NULL WHERE location_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let users = sqlx::query("UPDATE users SET location_id = NULL WHERE location_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(UnlinkCounts {
            equipment: equipment as i64,
            tickets: tickets as i64,
            users: users as i64,
        }))
    }
}

/// Database models for FieldDesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Staff accounts and roles
/// - `session`: Server-side login sessions
/// - `ticket`: Support tickets, filtering, and pagination
/// - `comment`: Ticket comment threads
/// - `location`: Sites that users, equipment, and tickets attach to
/// - `equipment`: Tracked devices and their lifecycle status
/// - `maintenance`: Per-device maintenance history
/// - `access_request`: Public requests for an account
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
/// # Ok(())
/// # }
/// ```
pub mod access_request;
pub mod comment;
pub mod equipment;
pub mod location;
pub mod maintenance;
pub mod session;
pub mod ticket;
pub mod user;

/// Deserializes `Option<Option<T>>` so JSON `null` means "clear"
///
/// Serde's stock `Option` treats null and absent the same, which makes
/// Some(None) unreachable from JSON. Update inputs mark their nullable
/// columns with this, so an omitted field is left alone while an
/// explicit null clears the column.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Equipment model, filtering, and database operations
///
/// Equipment rows track the devices the team supports. The listing
/// filter follows the same shape as the ticket filter: pure functions
/// produce the WHERE clause and the ordered bind values, and the page
/// window is computed from a count before the page itself is fetched.
///
/// Deleting a device takes its maintenance history with it and detaches
/// any tickets that referenced it, in one transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE equipment (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     device_type TEXT NOT NULL,
///     model TEXT NOT NULL,
///     serial_number TEXT NOT NULL UNIQUE,
///     location_id INTEGER REFERENCES locations(id),
///     ip_address TEXT,
///     status TEXT NOT NULL DEFAULT 'active',
///     installation_date TEXT
/// );
/// ```
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use crate::models::ticket::BindValue;
use crate::pagination::window;

/// Device lifecycle status
///
/// Stored lowercase. Filter input is lowercased before matching, so
/// `?status=Active` and `?status=active` select the same rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    /// In service
    Active,
    /// Pulled for repair or scheduled work
    Maintenance,
    /// Out of service permanently
    Retired,
}

impl EquipmentStatus {
    /// All statuses
    pub const ALL: [EquipmentStatus; 3] = [
        EquipmentStatus::Active,
        EquipmentStatus::Maintenance,
        EquipmentStatus::Retired,
    ];

    /// Returns the string stored in the database for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "active",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Retired => "retired",
        }
    }

    /// Parses a status from its stored string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(EquipmentStatus::Active),
            "maintenance" => Some(EquipmentStatus::Maintenance),
            "retired" => Some(EquipmentStatus::Retired),
            _ => None,
        }
    }
}

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Active
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equipment model representing a tracked device
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Equipment {
    /// Unique equipment ID
    pub id: i64,

    /// Device category (free text, e.g. "printer", "router")
    pub device_type: String,

    /// Manufacturer model
    pub model: String,

    /// Serial number (must be unique)
    pub serial_number: String,

    /// Site the device lives at, if assigned
    pub location_id: Option<i64>,

    /// Static IP, if the device has one
    pub ip_address: Option<String>,

    /// Lifecycle status
    pub status: EquipmentStatus,

    /// When the device was installed (date only)
    pub installation_date: Option<NaiveDate>,
}

/// Equipment row joined with its location name
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EquipmentWithLocation {
    pub id: i64,
    pub device_type: String,
    pub model: String,
    pub serial_number: String,
    pub location_id: Option<i64>,
    pub ip_address: Option<String>,
    pub status: EquipmentStatus,
    pub installation_date: Option<NaiveDate>,

    /// Name of the site the device lives at, if assigned
    pub location_name: Option<String>,
}

/// Rows touched when a device is deleted
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EquipmentCleanup {
    /// Maintenance records deleted with the device
    pub maintenance_records: i64,

    /// Tickets whose `equipment_id` was cleared
    pub tickets_unlinked: i64,
}

/// Input for creating a new device
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 100, message = "Device type must be 1-100 characters"))]
    pub device_type: String,
    #[validate(length(min = 1, max = 100, message = "Model must be 1-100 characters"))]
    pub model: String,
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1-100 characters"))]
    pub serial_number: String,
    pub location_id: Option<i64>,
    pub ip_address: Option<String>,
    /// Falls back to `active` when omitted
    pub status: Option<EquipmentStatus>,
    pub installation_date: Option<NaiveDate>,
}

/// Input for updating an existing device
///
/// All fields are optional; nullable columns use Some(None) to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 100, message = "Device type must be 1-100 characters"))]
    pub device_type: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Model must be 1-100 characters"))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1-100 characters"))]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub location_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub ip_address: Option<Option<String>>,
    pub status: Option<EquipmentStatus>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub installation_date: Option<Option<NaiveDate>>,
}

/// Normalized equipment listing filter
///
/// Like the ticket filter, unknown filter text is bound as-is and
/// simply selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentFilter {
    /// Exact device type match
    pub device_type: Option<String>,

    /// Status match (already lowercased)
    pub status: Option<String>,

    /// Site filter
    pub location_id: Option<i64>,
}

impl EquipmentFilter {
    /// Builds a filter from raw query parameters
    ///
    /// Blank strings are treated as absent, the status value is
    /// lowercased, and `location_id` must parse as an integer.
    pub fn from_params(
        device_type: Option<String>,
        status: Option<String>,
        location_id: Option<String>,
    ) -> Self {
        EquipmentFilter {
            device_type: device_type.filter(|s| !s.is_empty()),
            status: status
                .filter(|s| !s.is_empty())
                .map(|s| s.to_lowercase()),
            location_id: location_id.and_then(|s| s.parse::<i64>().ok()),
        }
    }

    /// Renders the WHERE clause for this filter
    ///
    /// Empty string or `" WHERE ..."` with a leading space, to append
    /// after a `FROM equipment e` clause.
    pub fn where_sql(&self) -> String {
        let mut conds: Vec<&str> = Vec::new();

        if self.device_type.is_some() {
            conds.push("e.device_type = ?");
        }
        if self.status.is_some() {
            conds.push("e.status = ?");
        }
        if self.location_id.is_some() {
            conds.push("e.location_id = ?");
        }

        if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        }
    }

    /// Emits bind values in placeholder order
    pub fn params(&self) -> Vec<BindValue> {
        let mut params = Vec::new();

        if let Some(ref device_type) = self.device_type {
            params.push(BindValue::Text(device_type.clone()));
        }
        if let Some(ref status) = self.status {
            params.push(BindValue::Text(status.clone()));
        }
        if let Some(location_id) = self.location_id {
            params.push(BindValue::Int(location_id));
        }

        params
    }
}

/// One page of equipment listing results
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentPage {
    /// Rows for the served page, newest first
    pub equipment: Vec<EquipmentWithLocation>,

    /// Total rows matching the filter
    pub total: i64,

    /// The 1-based page actually served (after clamping)
    pub page: i64,

    /// Total number of pages (at least 1)
    pub total_pages: i64,
}

const EQUIPMENT_COLUMNS: &str = "id, device_type, model, serial_number, location_id, ip_address, \
     status, installation_date";

impl Equipment {
    /// Creates a new device
    ///
    /// Missing status falls back to `active`.
    ///
    /// # Errors
    ///
    /// Returns an error if the serial number already exists (unique
    /// constraint violation) or the database connection fails
    pub async fn create(pool: &SqlitePool, data: CreateEquipment) -> Result<Self, sqlx::Error> {
        let equipment = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (device_type, model, serial_number, location_id,
                                   ip_address, status, installation_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, device_type, model, serial_number, location_id, ip_address,
                      status, installation_date
            "#,
        )
        .bind(data.device_type)
        .bind(data.model)
        .bind(data.serial_number)
        .bind(data.location_id)
        .bind(data.ip_address)
        .bind(data.status.unwrap_or_default())
        .bind(data.installation_date)
        .fetch_one(pool)
        .await?;

        Ok(equipment)
    }

    /// Finds a device by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM equipment WHERE id = ?", EQUIPMENT_COLUMNS);

        let equipment = sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(equipment)
    }

    /// Loads a device with its location name joined in
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_with_location(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<EquipmentWithLocation>, sqlx::Error> {
        let equipment = sqlx::query_as::<_, EquipmentWithLocation>(
            r#"
            SELECT e.id, e.device_type, e.model, e.serial_number, e.location_id,
                   e.ip_address, e.status, e.installation_date,
                   l.name AS location_name
            FROM equipment e
            LEFT JOIN locations l ON l.id = e.location_id
            WHERE e.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(equipment)
    }

    /// Runs a filtered, paginated listing query
    ///
    /// Same count-then-page flow as the ticket listing: the requested
    /// page is clamped into range, and rows come back newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn search(
        pool: &SqlitePool,
        filter: &EquipmentFilter,
        requested_page: i64,
    ) -> Result<EquipmentPage, sqlx::Error> {
        let where_sql = filter.where_sql();

        let count_sql = format!("SELECT COUNT(*) FROM equipment e{}", where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in filter.params() {
            count_query = match value {
                BindValue::Text(text) => count_query.bind(text),
                BindValue::Int(int) => count_query.bind(int),
            };
        }
        let total = count_query.fetch_one(pool).await?;

        let page = window(requested_page, total);

        let select_sql = format!(
            "SELECT e.id, e.device_type, e.model, e.serial_number, e.location_id, \
             e.ip_address, e.status, e.installation_date, l.name AS location_name \
             FROM equipment e \
             LEFT JOIN locations l ON l.id = e.location_id\
             {} ORDER BY e.id DESC LIMIT ? OFFSET ?",
            where_sql
        );
        let mut select_query = sqlx::query_as::<_, EquipmentWithLocation>(&select_sql);
        for value in filter.params() {
            select_query = match value {
                BindValue::Text(text) => select_query.bind(text),
                BindValue::Int(int) => select_query.bind(int),
            };
        }
        let equipment = select_query
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await?;

        Ok(EquipmentPage {
            equipment,
            total,
            page: page.page,
            total_pages: page.total_pages,
        })
    }

    /// Lists the devices at one location
    ///
    /// Used by the location detail view.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_for_location(
        pool: &SqlitePool,
        location_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM equipment WHERE location_id = ? ORDER BY device_type, model",
            EQUIPMENT_COLUMNS
        );

        let equipment = sqlx::query_as::<_, Equipment>(&query)
            .bind(location_id)
            .fetch_all(pool)
            .await?;

        Ok(equipment)
    }

    /// Lists the distinct device types in use
    ///
    /// Feeds the listing page's type filter.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn device_types(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
        let types = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT device_type FROM equipment ORDER BY device_type",
        )
        .fetch_all(pool)
        .await?;

        Ok(types)
    }

    /// Counts all tracked devices
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM equipment")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates an existing device
    ///
    /// Only non-None fields in `data` will be updated.
    ///
    /// # Returns
    ///
    /// The updated device if found, None if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the new serial number collides with another
    /// device or the database connection fails
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateEquipment,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut sets: Vec<&str> = Vec::new();

        if data.device_type.is_some() {
            sets.push("device_type = ?");
        }
        if data.model.is_some() {
            sets.push("model = ?");
        }
        if data.serial_number.is_some() {
            sets.push("serial_number = ?");
        }
        if data.location_id.is_some() {
            sets.push("location_id = ?");
        }
        if data.ip_address.is_some() {
            sets.push("ip_address = ?");
        }
        if data.status.is_some() {
            sets.push("status = ?");
        }
        if data.installation_date.is_some() {
            sets.push("installation_date = ?");
        }

        if sets.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ? RETURNING {}",
            sets.join(", "),
            EQUIPMENT_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Equipment>(&query);

        if let Some(device_type) = data.device_type {
            q = q.bind(device_type);
        }
        if let Some(model) = data.model {
            q = q.bind(model);
        }
        if let Some(serial_number) = data.serial_number {
            q = q.bind(serial_number);
        }
        if let Some(location_opt) = data.location_id {
            q = q.bind(location_opt);
        }
        if let Some(ip_opt) = data.ip_address {
            q = q.bind(ip_opt);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(date_opt) = data.installation_date {
            q = q.bind(date_opt);
        }

        let equipment = q.bind(id).fetch_optional(pool).await?;

        Ok(equipment)
    }

    /// Deletes a device, its maintenance history, and ticket links
    ///
    /// Maintenance records go with the device; tickets that referenced
    /// it survive with `equipment_id` cleared. All in one transaction.
    ///
    /// # Returns
    ///
    /// The cleanup counts, or None if the device does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<EquipmentCleanup>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM equipment WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let maintenance_records =
            sqlx::query("DELETE FROM maintenance WHERE equipment_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let tickets_unlinked =
            sqlx::query("UPDATE tickets SET equipment_id = NULL WHERE equipment_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(EquipmentCleanup {
            maintenance_records: maintenance_records as i64,
            tickets_unlinked: tickets_unlinked as i64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in EquipmentStatus::ALL {
            assert_eq!(EquipmentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_default_status_is_active() {
        assert_eq!(EquipmentStatus::default(), EquipmentStatus::Active);
    }

    #[test]
    fn test_from_params_lowercases_status() {
        let filter =
            EquipmentFilter::from_params(None, Some("Retired".to_string()), None);
        assert_eq!(filter.status.as_deref(), Some("retired"));
    }

    #[test]
    fn test_from_params_drops_blank_and_non_numeric() {
        let filter = EquipmentFilter::from_params(
            Some(String::new()),
            Some(String::new()),
            Some("HQ".to_string()),
        );
        assert_eq!(filter, EquipmentFilter::default());
    }

    #[test]
    fn test_where_sql_and_params_in_order() {
        let filter = EquipmentFilter {
            device_type: Some("printer".to_string()),
            status: Some("active".to_string()),
            location_id: Some(2),
        };

        assert_eq!(
            filter.where_sql(),
            " WHERE e.device_type = ? AND e.status = ? AND e.location_id = ?"
        );
        assert_eq!(
            filter.params(),
            vec![
                BindValue::Text("printer".to_string()),
                BindValue::Text("active".to_string()),
                BindValue::Int(2),
            ]
        );
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        assert_eq!(EquipmentFilter::default().where_sql(), "");
        assert!(EquipmentFilter::default().params().is_empty());
    }
}

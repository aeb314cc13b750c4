/// Maintenance history model
///
/// Each row records one piece of work done on a device. History is
/// write-once: records are only ever added or deleted along with their
/// equipment, never edited.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE maintenance (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     equipment_id INTEGER NOT NULL REFERENCES equipment(id),
///     maintenance_type TEXT NOT NULL,
///     description TEXT NOT NULL,
///     date_performed TEXT NOT NULL,
///     performed_by INTEGER REFERENCES users(id)
/// );
/// ```
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

/// One maintenance record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceRecord {
    /// Unique record ID
    pub id: i64,

    /// Device the work was done on
    pub equipment_id: i64,

    /// Kind of work (free text, e.g. "repair", "cleaning")
    pub maintenance_type: String,

    /// What was done
    pub description: String,

    /// When the work happened (date only)
    pub date_performed: NaiveDate,

    /// Who did the work, if recorded
    pub performed_by: Option<i64>,
}

/// Maintenance record joined with the performer's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceWithPerformer {
    pub id: i64,
    pub equipment_id: i64,
    pub maintenance_type: String,
    pub description: String,
    pub date_performed: NaiveDate,
    pub performed_by: Option<i64>,

    /// Username of whoever did the work, if recorded
    pub performer_username: Option<String>,
}

/// Input for recording maintenance work
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMaintenance {
    #[validate(length(min = 1, max = 100, message = "Maintenance type must be 1-100 characters"))]
    pub maintenance_type: String,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    /// Defaults to today when omitted
    pub date_performed: Option<NaiveDate>,
}

impl MaintenanceRecord {
    /// Records maintenance work on a device
    ///
    /// The date defaults to today when the input leaves it out.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `equipment_id` - Device the work was done on
    /// * `performed_by` - User recording the work
    /// * `data` - Work details
    ///
    /// # Returns
    ///
    /// The new record, or None if the device does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn add(
        pool: &SqlitePool,
        equipment_id: i64,
        performed_by: i64,
        data: CreateMaintenance,
    ) -> Result<Option<Self>, sqlx::Error> {
        let equipment_exists =
            sqlx::query_scalar::<_, i64>("SELECT id FROM equipment WHERE id = ?")
                .bind(equipment_id)
                .fetch_optional(pool)
                .await?;

        if equipment_exists.is_none() {
            return Ok(None);
        }

        let record = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            INSERT INTO maintenance (equipment_id, maintenance_type, description,
                                     date_performed, performed_by)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, equipment_id, maintenance_type, description, date_performed, performed_by
            "#,
        )
        .bind(equipment_id)
        .bind(data.maintenance_type)
        .bind(data.description)
        .bind(data.date_performed.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(performed_by)
        .fetch_one(pool)
        .await?;

        Ok(Some(record))
    }

    /// Lists a device's maintenance history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_for_equipment(
        pool: &SqlitePool,
        equipment_id: i64,
    ) -> Result<Vec<MaintenanceWithPerformer>, sqlx::Error> {
        let records = sqlx::query_as::<_, MaintenanceWithPerformer>(
            r#"
            SELECT m.id, m.equipment_id, m.maintenance_type, m.description,
                   m.date_performed, m.performed_by,
                   u.username AS performer_username
            FROM maintenance m
            LEFT JOIN users u ON u.id = m.performed_by
            WHERE m.equipment_id = ?
            ORDER BY m.date_performed DESC, m.id DESC
            "#,
        )
        .bind(equipment_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}

/// Access request model
///
/// The one record anonymous visitors can create: a request for an
/// account, reviewed later by an administrator. Submitting one also
/// triggers an outbound notification (see `crate::notify`), but the
/// request is stored regardless of whether the notification goes out.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE access_requests (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     full_name TEXT NOT NULL,
///     email TEXT NOT NULL,
///     location TEXT NOT NULL,
///     message TEXT,
///     requested_at TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'pending',
///     processed_at TEXT,
///     processed_by INTEGER REFERENCES users(id),
///     notes TEXT
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

/// Review state of an access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessRequestStatus {
    /// Awaiting review
    Pending,
    /// Approved; an account was (or will be) created by hand
    Approved,
    /// Turned down
    Rejected,
}

impl AccessRequestStatus {
    /// Returns the string stored in the database for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRequestStatus::Pending => "pending",
            AccessRequestStatus::Approved => "approved",
            AccessRequestStatus::Rejected => "rejected",
        }
    }

    /// Parses a status from its stored string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(AccessRequestStatus::Pending),
            "approved" => Some(AccessRequestStatus::Approved),
            "rejected" => Some(AccessRequestStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request for an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessRequest {
    /// Unique request ID
    pub id: i64,

    /// Requester's name
    pub full_name: String,

    /// Requester's email (not validated against users; they have no
    /// account yet)
    pub email: String,

    /// Site the requester works at (free text)
    pub location: String,

    /// Optional message from the requester
    pub message: Option<String>,

    /// When the request was submitted
    pub requested_at: DateTime<Utc>,

    /// Review state
    pub status: AccessRequestStatus,

    /// When the request was reviewed
    pub processed_at: Option<DateTime<Utc>>,

    /// Administrator who reviewed it
    pub processed_by: Option<i64>,

    /// Reviewer's notes
    pub notes: Option<String>,
}

/// Input for submitting an access request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAccessRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Location must be 1-100 characters"))]
    pub location: String,
    pub message: Option<String>,
}

impl AccessRequest {
    /// Stores a new access request in `pending` state
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn create(
        pool: &SqlitePool,
        data: CreateAccessRequest,
    ) -> Result<Self, sqlx::Error> {
        let request = sqlx::query_as::<_, AccessRequest>(
            r#"
            INSERT INTO access_requests (full_name, email, location, message,
                                         requested_at, status)
            VALUES (?, ?, ?, ?, ?, 'pending')
            RETURNING id, full_name, email, location, message, requested_at,
                      status, processed_at, processed_by, notes
            "#,
        )
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.location)
        .bind(data.message)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(request)
    }

    /// Lists access requests, newest first
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `status` - Optional status filter; unknown values match nothing
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(
        pool: &SqlitePool,
        status: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let requests = match status {
            Some(status) => {
                sqlx::query_as::<_, AccessRequest>(
                    r#"
                    SELECT id, full_name, email, location, message, requested_at,
                           status, processed_at, processed_by, notes
                    FROM access_requests
                    WHERE status = ?
                    ORDER BY requested_at DESC, id DESC
                    "#,
                )
                .bind(status)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AccessRequest>(
                    r#"
                    SELECT id, full_name, email, location, message, requested_at,
                           status, processed_at, processed_by, notes
                    FROM access_requests
                    ORDER BY requested_at DESC, id DESC
                    "#,
                )
                .fetch_all(pool)
                .await?
            }
        };

        Ok(requests)
    }

    /// Marks a request approved or rejected
    ///
    /// Stamps `processed_at` and `processed_by`. Re-processing an
    /// already reviewed request overwrites the previous decision.
    ///
    /// # Returns
    ///
    /// The updated request, or None if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn process(
        pool: &SqlitePool,
        id: i64,
        processed_by: i64,
        status: AccessRequestStatus,
        notes: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let request = sqlx::query_as::<_, AccessRequest>(
            r#"
            UPDATE access_requests
            SET status = ?, processed_at = ?, processed_by = ?, notes = ?
            WHERE id = ?
            RETURNING id, full_name, email, location, message, requested_at,
                      status, processed_at, processed_by, notes
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(processed_by)
        .bind(notes)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AccessRequestStatus::Pending,
            AccessRequestStatus::Approved,
            AccessRequestStatus::Rejected,
        ] {
            assert_eq!(AccessRequestStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_parse_is_case_sensitive() {
        assert_eq!(AccessRequestStatus::parse("Pending"), None);
        assert_eq!(AccessRequestStatus::parse("denied"), None);
    }
}

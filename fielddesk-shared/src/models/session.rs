/// Server-side session model
///
/// A session row is created at login and consulted on every
/// authenticated request. The browser holds a signed cookie carrying
/// the raw session token; only the SHA-256 hash of that token is
/// stored here, so a leaked database copy cannot be replayed as a
/// cookie.
///
/// Sessions expire on idleness: a row whose `last_seen_at` is older
/// than the configured idle window no longer authenticates, and each
/// successful validation slides the window forward.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash TEXT NOT NULL UNIQUE,
///     created_at TEXT NOT NULL,
///     last_seen_at TEXT NOT NULL
/// );
/// ```
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// One live login session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// SHA-256 hex digest of the session token (never the raw token)
    pub token_hash: String,

    /// When the session was created (login time)
    pub created_at: DateTime<Utc>,

    /// Last time this session authenticated a request
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session row for a freshly issued token
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `user_id` - User the session belongs to
    /// * `token_hash` - SHA-256 hex digest of the raw token
    ///
    /// # Errors
    ///
    /// Returns an error if the hash collides with an existing session
    /// or the database connection fails
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        token_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, created_at, last_seen_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, token_hash, created_at, last_seen_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Validates a session and slides its idle window forward
    ///
    /// A single UPDATE both checks the idle cutoff and touches
    /// `last_seen_at`, so two concurrent requests on the same session
    /// cannot disagree about whether it was still alive.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `token_hash` - SHA-256 hex digest of the presented token
    /// * `idle_seconds` - Idle window; sessions unseen for longer are dead
    ///
    /// # Returns
    ///
    /// The refreshed session, or None if the token is unknown or the
    /// session has idled out
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn validate_and_touch(
        pool: &SqlitePool,
        token_hash: &str,
        idle_seconds: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let now = Utc::now();
        let cutoff = now - Duration::seconds(idle_seconds);

        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET last_seen_at = ?
            WHERE token_hash = ? AND last_seen_at > ?
            RETURNING id, user_id, token_hash, created_at, last_seen_at
            "#,
        )
        .bind(now)
        .bind(token_hash)
        .bind(cutoff)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Deletes a session by ID (logout)
    ///
    /// # Returns
    ///
    /// True if a session was deleted, false if it was already gone
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes sessions that have idled out
    ///
    /// Called opportunistically at login so the table stays bounded
    /// without a background job.
    ///
    /// # Returns
    ///
    /// Number of sessions removed
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn purge_expired(pool: &SqlitePool, idle_seconds: i64) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now() - Duration::seconds(idle_seconds);

        let result = sqlx::query("DELETE FROM sessions WHERE last_seen_at <= ?")
            .bind(cutoff)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

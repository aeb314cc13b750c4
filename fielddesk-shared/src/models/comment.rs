/// Ticket comment model
///
/// Comments form the conversation thread under a ticket. Adding one
/// also bumps the ticket's `updated_at` inside the same transaction,
/// so "recently active" orderings see commented tickets move up.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ticket_comments (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     ticket_id INTEGER NOT NULL REFERENCES tickets(id),
///     user_id INTEGER NOT NULL REFERENCES users(id),
///     content TEXT NOT NULL,
///     created_at TEXT NOT NULL
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// One comment on a ticket
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: i64,

    /// Ticket the comment belongs to
    pub ticket_id: i64,

    /// Author
    pub user_id: i64,

    /// Comment body
    pub content: String,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

/// Comment row joined with the author's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,

    /// Author's username (None only if the row is orphaned)
    pub author_username: Option<String>,
}

impl Comment {
    /// Adds a comment to a ticket
    ///
    /// Verifies the ticket exists, inserts the comment, and bumps the
    /// ticket's `updated_at`, all in one transaction.
    ///
    /// # Returns
    ///
    /// The new comment, or None if the ticket does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn add(
        pool: &SqlitePool,
        ticket_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let ticket_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM tickets WHERE id = ?")
            .bind(ticket_id)
            .fetch_optional(&mut *tx)
            .await?;

        if ticket_exists.is_none() {
            return Ok(None);
        }

        let now = Utc::now();

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO ticket_comments (ticket_id, user_id, content, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, ticket_id, user_id, content, created_at
            "#,
        )
        .bind(ticket_id)
        .bind(user_id)
        .bind(content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tickets SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(ticket_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(comment))
    }

    /// Lists a ticket's comments in conversation order (oldest first)
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_for_ticket(
        pool: &SqlitePool,
        ticket_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.ticket_id, c.user_id, c.content, c.created_at,
                   u.username AS author_username
            FROM ticket_comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.ticket_id = ?
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }
}

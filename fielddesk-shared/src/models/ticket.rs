/// Ticket model, filtering, and database operations
///
/// Tickets are the core record of the system. Listing them is driven by
/// [`TicketFilter`], which turns the caller's query parameters into a
/// WHERE clause plus an ordered list of bind values. The clause text and
/// the bind order are produced by pure functions so the exact SQL a
/// filter generates can be asserted in unit tests without a database.
///
/// Restricted accounts (role `opentickets`) get `open_only` set, which
/// pins the listing to open tickets regardless of the other parameters.
/// A conflicting explicit status filter is kept alongside the pin, which
/// simply yields an empty result set.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tickets (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'Open',
///     priority TEXT NOT NULL DEFAULT 'Medium',
///     created_by INTEGER NOT NULL REFERENCES users(id),
///     assigned_to INTEGER REFERENCES users(id),
///     location_id INTEGER REFERENCES locations(id),
///     equipment_id INTEGER REFERENCES equipment(id),
///     due_date TEXT,
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use fielddesk_shared::models::ticket::{Ticket, TicketFilter};
/// # use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// // Page 2 of high-priority tickets mentioning "printer"
/// let filter = TicketFilter::from_params(
///     None,
///     Some("High".to_string()),
///     None,
///     Some("printer".to_string()),
///     false,
/// );
///
/// let page = Ticket::search(&pool, &filter, 2).await?;
/// println!("{} of {} tickets", page.tickets.len(), page.total);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use crate::pagination::window;

/// Ticket lifecycle status
///
/// Stored with the display spelling (`"In Progress"` includes the
/// space), so the column value and the UI label are the same string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TicketStatus {
    Open,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    /// Returns the string stored in the database for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }

    /// Parses a status from its stored string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Open" => Some(TicketStatus::Open),
            "In Progress" => Some(TicketStatus::InProgress),
            "Resolved" => Some(TicketStatus::Resolved),
            "Closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    /// Whether the ticket still needs attention
    pub fn is_open(&self) -> bool {
        matches!(self, TicketStatus::Open)
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::Open
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    /// All priorities, lowest first
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Critical,
    ];

    /// Returns the string stored in the database for this priority
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
            TicketPriority::Critical => "Critical",
        }
    }

    /// Parses a priority from its stored string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(TicketPriority::Low),
            "Medium" => Some(TicketPriority::Medium),
            "High" => Some(TicketPriority::High),
            "Critical" => Some(TicketPriority::Critical),
            _ => None,
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Medium
    }
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    /// Unique ticket ID
    pub id: i64,

    /// Short summary line
    pub title: String,

    /// Full problem description
    pub description: String,

    /// Lifecycle status
    pub status: TicketStatus,

    /// Priority
    pub priority: TicketPriority,

    /// User who opened the ticket
    pub created_by: i64,

    /// User the ticket is assigned to, if any
    pub assigned_to: Option<i64>,

    /// Site the ticket concerns, if any
    pub location_id: Option<i64>,

    /// Device the ticket concerns, if any
    pub equipment_id: Option<i64>,

    /// Optional due date (date only, `YYYY-MM-DD`)
    pub due_date: Option<NaiveDate>,

    /// When the ticket was opened
    pub created_at: DateTime<Utc>,

    /// Last modification time (bumped by edits, comments, status
    /// changes, and assignment changes)
    pub updated_at: DateTime<Utc>,
}

/// Ticket row joined with creator and assignee usernames
///
/// This is the shape listings and exports work with, so clients never
/// have to resolve user IDs themselves.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketWithNames {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub location_id: Option<i64>,
    pub equipment_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Username of the creator (None only if the row is orphaned)
    pub created_by_username: Option<String>,

    /// Username of the assignee, if assigned
    pub assigned_to_username: Option<String>,
}

/// Single-ticket view with location and equipment labels joined in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub location_id: Option<i64>,
    pub equipment_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_username: Option<String>,
    pub assigned_to_username: Option<String>,

    /// Name of the linked location, if any
    pub location_name: Option<String>,

    /// Model of the linked device, if any
    pub equipment_model: Option<String>,
}

/// Input for creating a new ticket
///
/// Status and priority fall back to `Open` / `Medium` when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTicket {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to: Option<i64>,
    pub location_id: Option<i64>,
    pub equipment_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

/// Input for updating an existing ticket
///
/// All fields are optional. Only non-None fields will be updated;
/// nullable columns use Some(None) to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTicket {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub assigned_to: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub location_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub equipment_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// A bind value produced by [`TicketFilter::params`]
///
/// Filters mix text and integer parameters, and a plain value enum
/// keeps the generated parameter list inspectable in unit tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

/// Normalized ticket listing filter
///
/// Status and priority stay as free text on purpose: an unknown value
/// is bound into the equality match and simply selects nothing, which
/// mirrors how the listing treats any other non-matching filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Exact status match
    pub status: Option<String>,

    /// Exact priority match
    pub priority: Option<String>,

    /// Assignee user ID
    pub assigned_to: Option<i64>,

    /// Substring match against title and description
    pub search: Option<String>,

    /// Pin the listing to open tickets (restricted accounts)
    pub open_only: bool,
}

impl TicketFilter {
    /// Builds a filter from raw query parameters
    ///
    /// Blank strings are treated as absent. `assigned_to` must parse as
    /// an integer, otherwise it is dropped. The search term is trimmed,
    /// and a whitespace-only term is dropped. `open_only` comes from the
    /// caller's role, never from the query string, and an explicit
    /// status that conflicts with it is kept as-is.
    pub fn from_params(
        status: Option<String>,
        priority: Option<String>,
        assigned_to: Option<String>,
        search: Option<String>,
        open_only: bool,
    ) -> Self {
        TicketFilter {
            status: status.filter(|s| !s.is_empty()),
            priority: priority.filter(|s| !s.is_empty()),
            assigned_to: assigned_to.and_then(|s| s.parse::<i64>().ok()),
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            open_only,
        }
    }

    /// Renders the WHERE clause for this filter
    ///
    /// Returns either an empty string or `" WHERE ..."` with a leading
    /// space, ready to append after a `FROM tickets t` clause. The
    /// `open_only` pin is a literal condition; everything else binds a
    /// `?` placeholder in the order [`TicketFilter::params`] emits.
    pub fn where_sql(&self) -> String {
        let mut conds: Vec<&str> = Vec::new();

        if self.open_only {
            conds.push("t.status = 'Open'");
        }
        if self.status.is_some() {
            conds.push("t.status = ?");
        }
        if self.priority.is_some() {
            conds.push("t.priority = ?");
        }
        if self.assigned_to.is_some() {
            conds.push("t.assigned_to = ?");
        }
        if self.search.is_some() {
            conds.push("(t.title LIKE ? OR t.description LIKE ?)");
        }

        if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        }
    }

    /// Emits bind values in placeholder order
    ///
    /// The search term is wrapped in `%` wildcards and emitted twice,
    /// once for the title match and once for the description match.
    /// LIKE is case-insensitive for ASCII under SQLite's default
    /// collation, which is what the search box expects.
    pub fn params(&self) -> Vec<BindValue> {
        let mut params = Vec::new();

        if let Some(ref status) = self.status {
            params.push(BindValue::Text(status.clone()));
        }
        if let Some(ref priority) = self.priority {
            params.push(BindValue::Text(priority.clone()));
        }
        if let Some(assigned_to) = self.assigned_to {
            params.push(BindValue::Int(assigned_to));
        }
        if let Some(ref search) = self.search {
            let pattern = format!("%{}%", search);
            params.push(BindValue::Text(pattern.clone()));
            params.push(BindValue::Text(pattern));
        }

        params
    }
}

/// One page of ticket listing results
#[derive(Debug, Clone, Serialize)]
pub struct TicketPage {
    /// Rows for the served page, newest first
    pub tickets: Vec<TicketWithNames>,

    /// Total rows matching the filter (across all pages)
    pub total: i64,

    /// The 1-based page actually served (after clamping)
    pub page: i64,

    /// Total number of pages (at least 1)
    pub total_pages: i64,
}

/// Ticket counts by status, for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketStats {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
}

const TICKET_COLUMNS: &str = "id, title, description, status, priority, created_by, assigned_to, \
     location_id, equipment_id, due_date, created_at, updated_at";

const JOINED_SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.priority, \
     t.created_by, t.assigned_to, t.location_id, t.equipment_id, t.due_date, \
     t.created_at, t.updated_at, \
     u1.username AS created_by_username, u2.username AS assigned_to_username \
     FROM tickets t \
     LEFT JOIN users u1 ON u1.id = t.created_by \
     LEFT JOIN users u2 ON u2.id = t.assigned_to";

impl Ticket {
    /// Creates a new ticket
    ///
    /// Missing status and priority fall back to `Open` and `Medium`.
    /// Both timestamps are set to the current time.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `created_by` - ID of the user opening the ticket
    /// * `data` - Ticket fields
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced user, location, or device does
    /// not exist, or if the database connection fails
    pub async fn create(
        pool: &SqlitePool,
        created_by: i64,
        data: CreateTicket,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (title, description, status, priority, created_by,
                                 assigned_to, location_id, equipment_id, due_date,
                                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, description, status, priority, created_by, assigned_to,
                      location_id, equipment_id, due_date, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.priority.unwrap_or_default())
        .bind(created_by)
        .bind(data.assigned_to)
        .bind(data.location_id)
        .bind(data.equipment_id)
        .bind(data.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(ticket)
    }

    /// Finds a ticket by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS);

        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(ticket)
    }

    /// Loads the single-ticket view with usernames and labels joined in
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_detail(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<TicketDetail>, sqlx::Error> {
        let detail = sqlx::query_as::<_, TicketDetail>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.priority,
                   t.created_by, t.assigned_to, t.location_id, t.equipment_id,
                   t.due_date, t.created_at, t.updated_at,
                   u1.username AS created_by_username,
                   u2.username AS assigned_to_username,
                   l.name AS location_name,
                   e.model AS equipment_model
            FROM tickets t
            LEFT JOIN users u1 ON u1.id = t.created_by
            LEFT JOIN users u2 ON u2.id = t.assigned_to
            LEFT JOIN locations l ON l.id = t.location_id
            LEFT JOIN equipment e ON e.id = t.equipment_id
            WHERE t.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(detail)
    }

    /// Runs a filtered, paginated listing query
    ///
    /// Counts the matching rows first, clamps the requested page into
    /// range, then fetches one page ordered by creation time descending
    /// with ties broken by ID descending. Asking for page 50 of a
    /// 3-page result returns page 3, not an empty page.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `filter` - Normalized listing filter
    /// * `requested_page` - 1-based page number from the client
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn search(
        pool: &SqlitePool,
        filter: &TicketFilter,
        requested_page: i64,
    ) -> Result<TicketPage, sqlx::Error> {
        let where_sql = filter.where_sql();

        let count_sql = format!("SELECT COUNT(*) FROM tickets t{}", where_sql);
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
            "{}{} ORDER BY t.created_at DESC, t.id DESC LIMIT ? OFFSET ?",
            JOINED_SELECT, where_sql
        );
        let mut select_query = sqlx::query_as::<_, TicketWithNames>(&select_sql);
        for value in filter.params() {
            select_query = match value {
                BindValue::Text(text) => select_query.bind(text),
                BindValue::Int(int) => select_query.bind(int),
            };
        }
        let tickets = select_query
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await?;

        Ok(TicketPage {
            tickets,
            total,
            page: page.page,
            total_pages: page.total_pages,
        })
    }

    /// Lists every ticket matching a filter, without pagination
    ///
    /// Used by the CSV export, which reuses the listing filter so an
    /// export always contains exactly what the listing showed. Same
    /// ordering as [`Ticket::search`].
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_filtered(
        pool: &SqlitePool,
        filter: &TicketFilter,
    ) -> Result<Vec<TicketWithNames>, sqlx::Error> {
        let select_sql = format!(
            "{}{} ORDER BY t.created_at DESC, t.id DESC",
            JOINED_SELECT,
            filter.where_sql()
        );

        let mut query = sqlx::query_as::<_, TicketWithNames>(&select_sql);
        for value in filter.params() {
            query = match value {
                BindValue::Text(text) => query.bind(text),
                BindValue::Int(int) => query.bind(int),
            };
        }

        let tickets = query.fetch_all(pool).await?;

        Ok(tickets)
    }

    /// Updates an existing ticket
    ///
    /// Only non-None fields in `data` are written. `updated_at` is
    /// always bumped, even when nothing else changes.
    ///
    /// # Returns
    ///
    /// The updated ticket if found, None if the ticket doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateTicket,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tickets SET updated_at = ?");

        if data.title.is_some() {
            query.push_str(", title = ?");
        }
        if data.description.is_some() {
            query.push_str(", description = ?");
        }
        if data.status.is_some() {
            query.push_str(", status = ?");
        }
        if data.priority.is_some() {
            query.push_str(", priority = ?");
        }
        if data.assigned_to.is_some() {
            query.push_str(", assigned_to = ?");
        }
        if data.location_id.is_some() {
            query.push_str(", location_id = ?");
        }
        if data.equipment_id.is_some() {
            query.push_str(", equipment_id = ?");
        }
        if data.due_date.is_some() {
            query.push_str(", due_date = ?");
        }

        query.push_str(" WHERE id = ? RETURNING ");
        query.push_str(TICKET_COLUMNS);

        // Binds must follow the order the placeholders appear in the query
        let mut q = sqlx::query_as::<_, Ticket>(&query).bind(Utc::now());

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assigned_opt) = data.assigned_to {
            q = q.bind(assigned_opt);
        }
        if let Some(location_opt) = data.location_id {
            q = q.bind(location_opt);
        }
        if let Some(equipment_opt) = data.equipment_id {
            q = q.bind(equipment_opt);
        }
        if let Some(due_opt) = data.due_date {
            q = q.bind(due_opt);
        }

        let ticket = q.bind(id).fetch_optional(pool).await?;

        Ok(ticket)
    }

    /// Sets the ticket's status and bumps `updated_at`
    ///
    /// # Returns
    ///
    /// The updated ticket if found, None if the ticket doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn update_status(
        pool: &SqlitePool,
        id: i64,
        status: TicketStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET status = ?, updated_at = ? WHERE id = ? RETURNING {}",
            TICKET_COLUMNS
        );

        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(ticket)
    }

    /// Sets or clears the assignee and bumps `updated_at`
    ///
    /// # Returns
    ///
    /// The updated ticket if found, None if the ticket doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn assign(
        pool: &SqlitePool,
        id: i64,
        assigned_to: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET assigned_to = ?, updated_at = ? WHERE id = ? RETURNING {}",
            TICKET_COLUMNS
        );

        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(assigned_to)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(ticket)
    }

    /// Deletes a ticket and its comment thread
    ///
    /// Comments are removed in the same transaction so a failed delete
    /// never leaves an orphaned thread behind.
    ///
    /// # Returns
    ///
    /// True if the ticket existed and was deleted, false if it was
    /// already gone (deleting twice is not an error)
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM ticket_comments WHERE ticket_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tickets by status for the dashboard
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn stats(pool: &SqlitePool) -> Result<TicketStats, sqlx::Error> {
        let stats = sqlx::query_as::<_, TicketStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN status = 'Open' THEN 1 ELSE 0 END), 0) AS open,
                   COALESCE(SUM(CASE WHEN status = 'In Progress' THEN 1 ELSE 0 END), 0) AS in_progress,
                   COALESCE(SUM(CASE WHEN status = 'Resolved' THEN 1 ELSE 0 END), 0) AS resolved,
                   COALESCE(SUM(CASE WHEN status = 'Closed' THEN 1 ELSE 0 END), 0) AS closed
            FROM tickets
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }

    /// Returns the most recently opened tickets, for the dashboard
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn recent(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<TicketWithNames>, sqlx::Error> {
        let query = format!(
            "{} ORDER BY t.created_at DESC, t.id DESC LIMIT ?",
            JOINED_SELECT
        );

        let tickets = sqlx::query_as::<_, TicketWithNames>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(tickets)
    }

    /// Returns the most recent tickets for a single location
    ///
    /// Used by the location detail view.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn recent_for_location(
        pool: &SqlitePool,
        location_id: i64,
        limit: i64,
    ) -> Result<Vec<TicketWithNames>, sqlx::Error> {
        let query = format!(
            "{} WHERE t.location_id = ? ORDER BY t.created_at DESC, t.id DESC LIMIT ?",
            JOINED_SELECT
        );

        let tickets = sqlx::query_as::<_, TicketWithNames>(&query)
            .bind(location_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in TicketStatus::ALL {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_in_progress_spelling() {
        assert_eq!(TicketStatus::InProgress.as_str(), "In Progress");

        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn test_priority_round_trip() {
        for priority in TicketPriority::ALL {
            assert_eq!(TicketPriority::parse(priority.as_str()), Some(priority));
        }
    }

    #[test]
    fn test_defaults_are_open_and_medium() {
        assert_eq!(TicketStatus::default(), TicketStatus::Open);
        assert_eq!(TicketPriority::default(), TicketPriority::Medium);
    }

    #[test]
    fn test_from_params_drops_blank_values() {
        let filter = TicketFilter::from_params(
            Some(String::new()),
            Some(String::new()),
            Some(String::new()),
            Some("   ".to_string()),
            false,
        );
        assert_eq!(filter, TicketFilter::default());
    }

    #[test]
    fn test_from_params_drops_non_numeric_assignee() {
        let filter =
            TicketFilter::from_params(None, None, Some("abc".to_string()), None, false);
        assert_eq!(filter.assigned_to, None);

        let filter = TicketFilter::from_params(None, None, Some("7".to_string()), None, false);
        assert_eq!(filter.assigned_to, Some(7));
    }

    #[test]
    fn test_from_params_trims_search() {
        let filter =
            TicketFilter::from_params(None, None, None, Some("  printer  ".to_string()), false);
        assert_eq!(filter.search.as_deref(), Some("printer"));
    }

    #[test]
    fn test_where_sql_empty_filter() {
        assert_eq!(TicketFilter::default().where_sql(), "");
        assert!(TicketFilter::default().params().is_empty());
    }

    #[test]
    fn test_where_sql_all_conditions_in_order() {
        let filter = TicketFilter {
            status: Some("Open".to_string()),
            priority: Some("High".to_string()),
            assigned_to: Some(3),
            search: Some("printer".to_string()),
            open_only: true,
        };

        assert_eq!(
            filter.where_sql(),
            " WHERE t.status = 'Open' AND t.status = ? AND t.priority = ? \
             AND t.assigned_to = ? AND (t.title LIKE ? OR t.description LIKE ?)"
        );
    }

    #[test]
    fn test_params_match_placeholder_order() {
        let filter = TicketFilter {
            status: Some("Resolved".to_string()),
            priority: Some("Low".to_string()),
            assigned_to: Some(3),
            search: Some("printer".to_string()),
            open_only: true,
        };

        assert_eq!(
            filter.params(),
            vec![
                BindValue::Text("Resolved".to_string()),
                BindValue::Text("Low".to_string()),
                BindValue::Int(3),
                BindValue::Text("%printer%".to_string()),
                BindValue::Text("%printer%".to_string()),
            ]
        );
    }

    #[test]
    fn test_open_only_pin_binds_nothing() {
        let filter = TicketFilter {
            open_only: true,
            ..Default::default()
        };

        assert_eq!(filter.where_sql(), " WHERE t.status = 'Open'");
        assert!(filter.params().is_empty());
    }

    #[test]
    fn test_conflicting_status_is_kept() {
        // A restricted account asking for Closed keeps both conditions,
        // which can never match at once
        let filter = TicketFilter::from_params(
            Some("Closed".to_string()),
            None,
            None,
            None,
            true,
        );

        assert_eq!(
            filter.where_sql(),
            " WHERE t.status = 'Open' AND t.status = ?"
        );
        assert_eq!(
            filter.params(),
            vec![BindValue::Text("Closed".to_string())]
        );
    }

    #[test]
    fn test_unknown_status_text_is_bound_as_is() {
        let filter =
            TicketFilter::from_params(Some("Reopened".to_string()), None, None, None, false);
        assert_eq!(filter.status.as_deref(), Some("Reopened"));
        assert_eq!(filter.where_sql(), " WHERE t.status = ?");
    }

    // Listing, pagination, and cascade behavior run against an
    // in-memory database in tests/models_tests.rs
}

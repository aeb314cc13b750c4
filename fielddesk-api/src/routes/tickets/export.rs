/// Ticket CSV export endpoint
///
/// Downloads the current listing as CSV. The export accepts the same
/// filter parameters as the listing and applies identical semantics,
/// but never paginates: the file contains every matching row.
///
/// # Endpoint
///
/// `GET /tickets/export?status=Open&search=printer`
///
/// # Response
///
/// `text/csv` attachment named `tickets_export_YYYYMMDD_HHMMSS.csv`
/// with a fixed column set:
///
/// ```text
/// ID,Title,Description,Status,Priority,Created At,Updated At,Due Date,Created By,Assigned To
/// ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Query, State},
    http::header::{self, HeaderName},
    Extension,
};
use chrono::Utc;
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::ticket::{Ticket, TicketFilter, TicketWithNames};

use super::list::TicketListQuery;

/// Column headers, in file order
const CSV_HEADERS: [&str; 10] = [
    "ID",
    "Title",
    "Description",
    "Status",
    "Priority",
    "Created At",
    "Updated At",
    "Due Date",
    "Created By",
    "Assigned To",
];

/// Renders matching tickets into CSV bytes
///
/// Timestamps use `YYYY-MM-DD HH:MM:SS`, the due date is date-only,
/// and absent values (no due date, unassigned) become empty cells.
fn render_csv(tickets: &[TicketWithNames]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;

    for ticket in tickets {
        writer.write_record([
            ticket.id.to_string(),
            ticket.title.clone(),
            ticket.description.clone(),
            ticket.status.to_string(),
            ticket.priority.to_string(),
            ticket.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ticket.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ticket
                .due_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            ticket.created_by_username.clone().unwrap_or_default(),
            ticket.assigned_to_username.clone().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

/// Ticket export endpoint handler
///
/// The `page` parameter is accepted and ignored so a client can reuse
/// the listing URL verbatim.
///
/// # Errors
///
/// - 401 Unauthorized: No session
/// - 403 Forbidden: Restricted account
/// - 500 Internal Server Error: Database or CSV error
pub async fn export_tickets(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<TicketListQuery>,
) -> ApiResult<([(HeaderName, String); 2], Vec<u8>)> {
    authorize(Some(&current), Capability::ExportTickets)?;

    let filter = TicketFilter::from_params(
        query.status,
        query.priority,
        query.assigned_to,
        query.search,
        current.role.is_open_tickets(),
    );

    let tickets = Ticket::list_filtered(&state.db, &filter).await?;

    let body = render_csv(&tickets)
        .map_err(|err| ApiError::InternalError(format!("CSV rendering failed: {}", err)))?;

    let filename = format!("tickets_export_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));

    tracing::info!(
        user_id = current.user_id,
        rows = tickets.len(),
        %filename,
        "Exported tickets to CSV"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

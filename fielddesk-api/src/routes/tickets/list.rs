/// Ticket listing endpoint
///
/// Filtered, paginated ticket listing. Filters combine with AND; blank
/// or malformed filter values are treated as absent rather than errors,
/// and unknown status or priority text simply matches nothing.
///
/// # Endpoint
///
/// `GET /tickets?status=Open&priority=High&assigned_to=3&search=printer&page=2`
///
/// # Example Response
///
/// ```json
/// {
///   "tickets": [ ... ],
///   "total": 23,
///   "page": 2,
///   "total_pages": 3
/// }
/// ```

use crate::app::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::ticket::{Ticket, TicketFilter, TicketPage};
use serde::Deserialize;

/// Ticket listing query parameters
///
/// Everything arrives as optional text; normalization (blank handling,
/// integer parsing, trimming) happens in [`TicketFilter::from_params`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListQuery {
    /// Exact status match, e.g. `Open`
    pub status: Option<String>,

    /// Exact priority match, e.g. `High`
    pub priority: Option<String>,

    /// Assignee user ID; non-numeric text is ignored
    pub assigned_to: Option<String>,

    /// Substring match against title and description
    pub search: Option<String>,

    /// 1-based page number; out-of-range values are clamped
    pub page: Option<i64>,
}

/// Ticket listing endpoint handler
///
/// The `opentickets` role sees only Open tickets: the pin comes from
/// the session, and an explicit conflicting `status` filter is still
/// applied on top, yielding zero rows rather than a policy bypass.
///
/// # Errors
///
/// - 401 Unauthorized: No session
/// - 500 Internal Server Error: Database error
pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<TicketListQuery>,
) -> ApiResult<Json<TicketPage>> {
    authorize(Some(&current), Capability::ListTickets)?;

    let filter = TicketFilter::from_params(
        query.status,
        query.priority,
        query.assigned_to,
        query.search,
        current.role.is_open_tickets(),
    );

    let page = Ticket::search(&state.db, &filter, query.page.unwrap_or(1)).await?;

    Ok(Json(page))
}

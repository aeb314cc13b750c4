/// Dashboard endpoint
///
/// One round trip for the landing page: ticket counts by status,
/// headline inventory numbers, and the most recent tickets.
///
/// # Endpoint
///
/// ```text
/// GET /v1/dashboard
/// ```
///
/// # Response
///
/// ```json
/// {
///   "tickets": { "total": 42, "open": 7, "in_progress": 3, "resolved": 20, "closed": 12 },
///   "user_count": 9,
///   "equipment_count": 120,
///   "location_count": 4,
///   "recent_tickets": [ ... ]
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::equipment::Equipment;
use fielddesk_shared::models::location::Location;
use fielddesk_shared::models::ticket::{Ticket, TicketStats, TicketWithNames};
use fielddesk_shared::models::user::User;
use serde::Serialize;

/// How many recent tickets the dashboard shows
const RECENT_TICKETS: i64 = 5;

/// Dashboard response
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Ticket counts by status
    pub tickets: TicketStats,

    /// Total staff accounts
    pub user_count: i64,

    /// Total tracked devices
    pub equipment_count: i64,

    /// Total sites
    pub location_count: i64,

    /// Newest tickets, most recent first
    pub recent_tickets: Vec<TicketWithNames>,
}

/// Dashboard endpoint handler
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<DashboardResponse>> {
    authorize(Some(&current), Capability::ViewDashboard)?;

    let tickets = Ticket::stats(&state.db).await?;
    let user_count = User::count(&state.db).await?;
    let equipment_count = Equipment::count(&state.db).await?;
    let location_count = Location::count(&state.db).await?;
    let recent_tickets = Ticket::recent(&state.db, RECENT_TICKETS).await?;

    Ok(Json(DashboardResponse {
        tickets,
        user_count,
        equipment_count,
        location_count,
        recent_tickets,
    }))
}

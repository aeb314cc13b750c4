/// Ticket assignment endpoint
///
/// Sending `null` (or omitting the field) clears the current
/// assignee, so assignment and unassignment share one route.
///
/// # Endpoint
///
/// `PUT /tickets/:id/assign`
///
/// # Example Request
///
/// ```json
/// { "assigned_to": 3 }
/// ```
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::ticket::Ticket;
use serde::Deserialize;

/// Assignment request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignTicketRequest {
    /// User id to assign, or `null` to unassign
    #[serde(default)]
    pub assigned_to: Option<i64>,
}

/// Ticket assignment endpoint handler
///
/// # Errors
///
/// - 400 Bad Request: `assigned_to` does not reference a user
/// - 403 Forbidden: Restricted account
/// - 404 Not Found: No such ticket
pub async fn assign_ticket(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignTicketRequest>,
) -> ApiResult<Json<Ticket>> {
    authorize(Some(&current), Capability::AssignTicket)?;

    let ticket = Ticket::assign(&state.db, id, payload.assigned_to)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Ticket not found".to_string(),
            redirect: Some("/tickets".to_string()),
        })?;

    match ticket.assigned_to {
        Some(assignee) => tracing::info!(
            ticket_id = ticket.id,
            assigned_to = assignee,
            changed_by = current.user_id,
            "Ticket assigned"
        ),
        None => tracing::info!(
            ticket_id = ticket.id,
            changed_by = current.user_id,
            "Ticket unassigned"
        ),
    }

    Ok(Json(ticket))
}

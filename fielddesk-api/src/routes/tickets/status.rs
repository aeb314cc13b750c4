/// Ticket status endpoint
///
/// Status changes are part of everyday ticket work, so the transition
/// gets its own endpoint instead of riding on the admin-only ticket
/// edit.
///
/// # Endpoint
///
/// `PUT /tickets/:id/status`
///
/// # Example Request
///
/// ```json
/// { "status": "In Progress" }
/// ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::ticket::{Ticket, TicketStatus};
use serde::Deserialize;

/// Status change request
///
/// An unknown status string is rejected at deserialization, so the
/// database only ever sees the four known values.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TicketStatus,
}

/// Ticket status endpoint handler
///
/// # Errors
///
/// - 400 Bad Request: Unknown status value
/// - 403 Forbidden: Restricted account
/// - 404 Not Found: No such ticket
pub async fn update_ticket_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Ticket>> {
    authorize(Some(&current), Capability::UpdateTicketStatus)?;

    let ticket = Ticket::update_status(&state.db, id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Ticket not found".to_string(),
            redirect: Some("/tickets".to_string()),
        })?;

    tracing::info!(
        ticket_id = ticket.id,
        status = %ticket.status,
        changed_by = current.user_id,
        "Ticket status changed"
    );

    Ok(Json(ticket))
}

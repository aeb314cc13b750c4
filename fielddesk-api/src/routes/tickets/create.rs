/// Ticket creation endpoint
///
/// # Endpoint
///
/// `POST /tickets`
///
/// # Example Request
///
/// ```json
/// {
///   "title": "Printer jammed",
///   "description": "Tray 2 jams on every duplex job",
///   "priority": "High",
///   "location_id": 2,
///   "equipment_id": 14,
///   "due_date": "2025-09-01"
/// }
/// ```
///
/// Status and priority default to `Open` and `Medium` when omitted.

use crate::app::AppState;
use crate::error::ApiResult;
use axum::{extract::State, Extension, Json};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::ticket::{CreateTicket, Ticket};
use validator::Validate;

/// Ticket creation endpoint handler
///
/// The creator is taken from the session, never from the payload.
///
/// # Errors
///
/// - 400 Bad Request: Validation failed, or a referenced user, site, or
///   device does not exist
/// - 403 Forbidden: Caller is not an administrator
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateTicket>,
) -> ApiResult<Json<Ticket>> {
    authorize(Some(&current), Capability::CreateTicket)?;
    payload.validate()?;

    let ticket = Ticket::create(&state.db, current.user_id, payload).await?;

    tracing::info!(
        ticket_id = ticket.id,
        created_by = current.user_id,
        status = %ticket.status,
        priority = %ticket.priority,
        "Ticket created"
    );

    Ok(Json(ticket))
}

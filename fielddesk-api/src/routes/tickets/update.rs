/// Ticket edit endpoint
///
/// Partial update: only fields present in the payload are written, and
/// JSON null clears a nullable field. `updated_at` is bumped even when
/// the payload changes nothing, which keeps "touched" semantics simple.
///
/// # Endpoint
///
/// `PUT /tickets/:id`
///
/// # Example Request
///
/// ```json
/// {
///   "priority": "Critical",
///   "due_date": null
/// }
/// ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::ticket::{Ticket, UpdateTicket};
use validator::Validate;

/// Ticket edit endpoint handler
///
/// # Errors
///
/// - 400 Bad Request: Validation failed, or a referenced user, site, or
///   device does not exist
/// - 403 Forbidden: Caller is not an administrator
/// - 404 Not Found: No such ticket
pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTicket>,
) -> ApiResult<Json<Ticket>> {
    authorize(Some(&current), Capability::EditTicket)?;
    payload.validate()?;

    let ticket = Ticket::update(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Ticket not found".to_string(),
            redirect: Some("/tickets".to_string()),
        })?;

    tracing::info!(
        ticket_id = ticket.id,
        updated_by = current.user_id,
        "Ticket updated"
    );

    Ok(Json(ticket))
}

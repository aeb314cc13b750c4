/// Ticket deletion endpoint
///
/// Deleting removes the ticket and its whole comment thread. The
/// operation is idempotent: deleting a ticket that is already gone is
/// a normal response reporting `deleted: false`, not an error, so a
/// double-clicked delete button never shows a failure.
///
/// # Endpoint
///
/// `DELETE /tickets/:id`
///
/// # Example Response
///
/// ```json
/// { "deleted": true }
/// ```

use crate::app::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::ticket::Ticket;
use serde::Serialize;

/// Ticket deletion response
#[derive(Debug, Serialize)]
pub struct DeleteTicketResponse {
    /// Whether a ticket was actually removed
    pub deleted: bool,
}

/// Ticket deletion endpoint handler
///
/// # Errors
///
/// - 403 Forbidden: Caller is not an administrator
/// - 500 Internal Server Error: Database error
pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteTicketResponse>> {
    authorize(Some(&current), Capability::DeleteTicket)?;

    let deleted = Ticket::delete(&state.db, id).await?;

    if deleted {
        tracing::info!(ticket_id = id, deleted_by = current.user_id, "Ticket deleted");
    }

    Ok(Json(DeleteTicketResponse { deleted }))
}

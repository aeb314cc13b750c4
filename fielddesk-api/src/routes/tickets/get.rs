/// Single ticket endpoint
///
/// Returns one ticket with usernames and labels resolved, plus its
/// comment thread in conversation order.
///
/// # Endpoint
///
/// `GET /tickets/:id`
///
/// # Example Response
///
/// ```json
/// {
///   "ticket": {
///     "id": 7,
///     "title": "Printer jammed",
///     "status": "Open",
///     "created_by_username": "jsmith",
///     "location_name": "North Depot",
///     ...
///   },
///   "comments": [
///     { "content": "Looking at it now", "author_username": "mlopez", ... }
///   ]
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
use fielddesk_shared::models::comment::{Comment, CommentWithAuthor};
use fielddesk_shared::models::ticket::{Ticket, TicketDetail};
use serde::Serialize;

/// Single ticket response
#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    /// The ticket with names and labels joined in
    pub ticket: TicketDetail,

    /// Comment thread, oldest first
    pub comments: Vec<CommentWithAuthor>,
}

/// Single ticket endpoint handler
///
/// Viewing a single ticket is allowed for every role, including
/// restricted accounts; the ID is not secret and the listing already
/// reveals it.
///
/// # Errors
///
/// - 401 Unauthorized: No session
/// - 404 Not Found: No such ticket (client is pointed back at the listing)
pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TicketDetailResponse>> {
    authorize(Some(&current), Capability::ViewTicket)?;

    let ticket = Ticket::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Ticket not found".to_string(),
            redirect: Some("/tickets".to_string()),
        })?;

    let comments = Comment::list_for_ticket(&state.db, id).await?;

    Ok(Json(TicketDetailResponse { ticket, comments }))
}

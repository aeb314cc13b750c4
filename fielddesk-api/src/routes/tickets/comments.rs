/// Ticket comment endpoint
///
/// Comments are append-only. Every signed-in role may comment, and the
/// author is always the session user, never a value from the request.
///
/// # Endpoint
///
/// `POST /tickets/:id/comments`
///
/// # Example Request
///
/// ```json
/// { "content": "Replaced the fuser unit, monitoring for a day." }
/// ```
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::comment::Comment;
use serde::Deserialize;
use validator::Validate;

/// New comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub content: String,
}

/// Ticket comment endpoint handler
///
/// # Errors
///
/// - 400 Bad Request: Empty comment body
/// - 404 Not Found: No such ticket
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AddCommentRequest>,
) -> ApiResult<Json<Comment>> {
    authorize(Some(&current), Capability::AddComment)?;
    payload.validate()?;

    let comment = Comment::add(&state.db, id, current.user_id, &payload.content)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Ticket not found".to_string(),
            redirect: Some("/tickets".to_string()),
        })?;

    tracing::info!(
        ticket_id = id,
        comment_id = comment.id,
        author = current.user_id,
        "Comment added"
    );

    Ok(Json(comment))
}

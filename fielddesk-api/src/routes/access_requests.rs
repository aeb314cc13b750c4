/// Access request endpoints
///
/// Submission is the one unauthenticated write in the API so that
/// prospective users can ask for an account from the login page.
/// Review and processing are admin operations.
///
/// # Endpoints
///
/// - `POST /access-requests` - Submit a request (public)
/// - `GET  /access-requests` - List requests (admin)
/// - `POST /access-requests/:id/process` - Approve or reject (admin)
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::access_request::{
    AccessRequest, AccessRequestStatus, CreateAccessRequest,
};
use serde::Deserialize;
use validator::Validate;

/// Access request listing query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessRequestListQuery {
    /// Filter by status (`pending`, `approved`, `rejected`)
    pub status: Option<String>,
}

/// Review decision request
///
/// # Example Request
///
/// ```json
/// { "status": "approved", "notes": "Account created 2025-08-14" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessAccessRequestRequest {
    pub status: AccessRequestStatus,
    pub notes: Option<String>,
}

/// Access request submission endpoint handler
///
/// Public. The request is stored first; notification delivery is best
/// effort and a delivery failure never fails the submission.
///
/// # Example Request
///
/// ```json
/// {
///   "full_name": "Dana Voss",
///   "email": "dana@example.com",
///   "location": "North Branch",
///   "message": "New site coordinator, need ticket access."
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: Validation failure
pub async fn submit_access_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccessRequest>,
) -> ApiResult<Json<AccessRequest>> {
    payload.validate()?;

    let request = AccessRequest::create(&state.db, payload).await?;

    if let Err(err) = state.notifier.access_request_received(&request).await {
        tracing::warn!(
            request_id = request.id,
            error = %err,
            "Access request notification failed"
        );
    }

    tracing::info!(
        request_id = request.id,
        email = %request.email,
        "Access request submitted"
    );

    Ok(Json(request))
}

/// Access request listing endpoint handler
///
/// Newest first. An unknown `status` value matches nothing rather
/// than erroring.
pub async fn list_access_requests(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<AccessRequestListQuery>,
) -> ApiResult<Json<Vec<AccessRequest>>> {
    authorize(Some(&current), Capability::ListAccessRequests)?;

    let requests = AccessRequest::list(&state.db, query.status.as_deref()).await?;

    Ok(Json(requests))
}

/// Access request review endpoint handler
///
/// Records the decision and who made it. Setting a request back to
/// `pending` is not a decision and is rejected.
///
/// # Errors
///
/// - 400 Bad Request: Status is not `approved` or `rejected`
/// - 403 Forbidden: Caller is not an administrator
/// - 404 Not Found: No such request
pub async fn process_access_request(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ProcessAccessRequestRequest>,
) -> ApiResult<Json<AccessRequest>> {
    authorize(Some(&current), Capability::ProcessAccessRequest)?;

    if payload.status == AccessRequestStatus::Pending {
        return Err(ApiError::BadRequest(
            "Status must be approved or rejected".to_string(),
        ));
    }

    let request = AccessRequest::process(&state.db, id, current.user_id, payload.status, payload.notes)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Access request not found".to_string(),
            redirect: None,
        })?;

    tracing::info!(
        request_id = request.id,
        status = %request.status.as_str(),
        processed_by = current.user_id,
        "Access request processed"
    );

    Ok(Json(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_request_parses_lowercase_status() {
        let approved: ProcessAccessRequestRequest =
            serde_json::from_str(r#"{"status": "approved"}"#).unwrap();
        assert_eq!(approved.status, AccessRequestStatus::Approved);
        assert_eq!(approved.notes, None);

        let unknown: Result<ProcessAccessRequestRequest, _> =
            serde_json::from_str(r#"{"status": "Approved"}"#);
        assert!(unknown.is_err());
    }
}

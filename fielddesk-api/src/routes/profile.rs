/// Profile endpoints
///
/// Self-service account settings for the logged-in user. Unlike the
/// admin user endpoints, a password change here must prove knowledge of
/// the current password first; a hijacked session alone is not enough
/// to lock the owner out.
///
/// # Endpoints
///
/// - `GET /v1/profile` - The logged-in user's account
/// - `PUT /v1/profile` - Update name, email, or password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::users::UserInfo,
};
use axum::{extract::State, Extension, Json};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::auth::password::{hash_password, validate_password_strength, verify_password};
use fielddesk_shared::models::user::{UpdateUser, User};
use serde::Deserialize;
use validator::Validate;

/// Profile update request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Required when `new_password` is set
    pub current_password: Option<String>,

    /// New password; triggers the current-password check
    pub new_password: Option<String>,
}

fn field_error(field: &str, message: &str) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: field.to_string(),
        message: message.to_string(),
    }])
}

/// Get profile endpoint handler
///
/// # Endpoint
///
/// `GET /v1/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<UserInfo>> {
    authorize(Some(&current), Capability::ViewProfile)?;

    let user = load_account(&state, &current).await?;
    Ok(Json(UserInfo::from(&user)))
}

/// Update profile endpoint handler
///
/// # Endpoint
///
/// `PUT /v1/profile`
///
/// # Example Request
///
/// ```json
/// {
///   "full_name": "John A. Smith",
///   "current_password": "old passphrase",
///   "new_password": "new longer passphrase"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: Validation failed, or the current password is wrong
/// - 409 Conflict: New email already taken
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserInfo>> {
    authorize(Some(&current), Capability::EditProfile)?;
    payload.validate()?;

    let user = load_account(&state, &current).await?;

    let password_hash = match payload.new_password.as_deref() {
        Some(new_password) => {
            let current_password = payload
                .current_password
                .as_deref()
                .ok_or_else(|| field_error("current_password", "Current password is required"))?;

            if !verify_password(current_password, &user.password_hash)? {
                return Err(field_error(
                    "current_password",
                    "Current password is incorrect",
                ));
            }

            validate_password_strength(new_password)
                .map_err(|message| field_error("new_password", &message))?;

            Some(hash_password(new_password)?)
        }
        None => None,
    };

    let changed_password = password_hash.is_some();

    let updated = User::update(
        &state.db,
        current.user_id,
        UpdateUser {
            full_name: payload.full_name,
            email: payload.email,
            password_hash,
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized {
        message: "Please log in to access this page.".to_string(),
        redirect: "/login".to_string(),
    })?;

    tracing::info!(
        user_id = updated.id,
        changed_password,
        "Profile updated"
    );

    Ok(Json(UserInfo::from(&updated)))
}

/// Loads the caller's account row
///
/// The session middleware already proved the session, so a missing row
/// means the account was deleted while logged in; the session is
/// treated as dead.
async fn load_account(state: &AppState, current: &CurrentUser) -> Result<User, ApiError> {
    User::find_by_id(&state.db, current.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized {
            message: "Please log in to access this page.".to_string(),
            redirect: "/login".to_string(),
        })
}

/// User administration endpoints
///
/// Account management is reserved for administrators. Passwords arrive
/// in plaintext over TLS and are hashed before they get anywhere near
/// the users table; responses never include the hash.
///
/// # Endpoints
///
/// - `GET /v1/users` - List all accounts (admin)
/// - `POST /v1/users` - Create an account (admin)
/// - `GET /v1/users/:id` - Fetch one account (admin)
/// - `PUT /v1/users/:id` - Edit an account, optionally resetting the password (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::auth::password::{hash_password, validate_password_strength};
use fielddesk_shared::models::user::{CreateUser, Role, UpdateUser, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User shape returned by the API
///
/// Mirrors [`User`] minus the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub location_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            location_id: user.location_id,
            created_at: user.created_at,
        }
    }
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Plaintext password; strength is checked before hashing
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Defaults to the ordinary `user` role when omitted
    #[serde(default = "default_role")]
    pub role: Role,

    pub location_id: Option<i64>,
}

fn default_role() -> Role {
    Role::User
}

/// Update user request
///
/// All fields optional; a present `password` resets the password.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,

    pub password: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub role: Option<Role>,

    /// Omit to leave unchanged; send null to clear
    #[serde(default, deserialize_with = "fielddesk_shared::models::double_option")]
    pub location_id: Option<Option<i64>>,
}

/// Checks a plaintext password and turns a failure into field details
fn check_password(password: &str) -> Result<(), ApiError> {
    validate_password_strength(password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })
}

/// List users endpoint handler
///
/// # Endpoint
///
/// `GET /v1/users`
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<UserInfo>>> {
    authorize(Some(&current), Capability::ListUsers)?;

    let users = User::list(&state.db).await?;
    Ok(Json(users.iter().map(UserInfo::from).collect()))
}

/// Create user endpoint handler
///
/// # Endpoint
///
/// `POST /v1/users`
///
/// # Example Request
///
/// ```json
/// {
///   "username": "mlopez",
///   "password": "a long passphrase",
///   "full_name": "Maria Lopez",
///   "email": "mlopez@example.com",
///   "role": "technician",
///   "location_id": 2
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: Field validation failed
/// - 403 Forbidden: Caller is not an administrator
/// - 409 Conflict: Username or email already taken
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    authorize(Some(&current), Capability::AddUser)?;
    payload.validate()?;
    check_password(&payload.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: payload.username,
            password_hash: hash_password(&payload.password)?,
            full_name: payload.full_name,
            email: payload.email,
            role: payload.role,
            location_id: payload.location_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        created_by = current.user_id,
        "User account created"
    );

    Ok(Json(UserInfo::from(&user)))
}

/// Get user endpoint handler
///
/// # Endpoint
///
/// `GET /v1/users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserInfo>> {
    authorize(Some(&current), Capability::ListUsers)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "User not found".to_string(),
            redirect: Some("/users".to_string()),
        })?;

    Ok(Json(UserInfo::from(&user)))
}

/// Update user endpoint handler
///
/// # Endpoint
///
/// `PUT /v1/users/:id`
///
/// # Errors
///
/// - 400 Bad Request: Field validation failed
/// - 403 Forbidden: Caller is not an administrator
/// - 404 Not Found: No such user
/// - 409 Conflict: New username or email already taken
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    authorize(Some(&current), Capability::EditUser)?;
    payload.validate()?;

    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            check_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            username: payload.username,
            password_hash,
            full_name: payload.full_name,
            email: payload.email,
            role: payload.role,
            location_id: payload.location_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound {
        message: "User not found".to_string(),
        redirect: Some("/users".to_string()),
    })?;

    tracing::info!(
        user_id = user.id,
        updated_by = current.user_id,
        "User account updated"
    );

    Ok(Json(UserInfo::from(&user)))
}

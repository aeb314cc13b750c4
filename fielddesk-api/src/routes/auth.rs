/// Authentication endpoints
///
/// This module provides session-based authentication:
/// - Login (issues a signed session cookie)
/// - Logout (revokes the server-side session)
/// - Current user lookup
///
/// # Endpoints
///
/// - `POST /v1/auth/login` - Verify credentials and start a session
/// - `POST /v1/auth/logout` - End the current session
/// - `GET /v1/auth/me` - Describe the logged-in user
///
/// # Session Model
///
/// Sessions live server-side, keyed by the SHA-256 digest of a random
/// token. The client only ever holds the raw token wrapped in an
/// HMAC-signed cookie, so a leaked database reveals no usable
/// credentials and a tampered cookie fails before any query runs.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::UserInfo,
};
use axum::{
    extract::State,
    http::header::{self, HeaderName},
    Extension, Json,
};
use fielddesk_shared::auth::middleware::{CurrentUser, SESSION_COOKIE};
use fielddesk_shared::auth::password::verify_password;
use fielddesk_shared::auth::token::{generate_session_token, hash_token, sign_session_cookie};
use fielddesk_shared::models::session::Session;
use fielddesk_shared::models::user::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Plaintext password (verified against the stored hash)
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The authenticated user
    pub user: UserInfo,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Builds the Set-Cookie header value for a fresh session
///
/// The cookie is HttpOnly and SameSite=Lax. Secure is added in
/// production where TLS terminates in front of the server.
fn session_cookie_header(value: &str, production: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, value
    );
    if production {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the Set-Cookie header value that clears the session cookie
fn clear_session_cookie_header() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Login endpoint handler
///
/// Verifies the credentials, sweeps out expired sessions as login-time
/// housekeeping, then creates a session row and hands the signed token
/// back as a cookie.
///
/// # Endpoint
///
/// `POST /v1/auth/login`
///
/// # Example Request
///
/// ```json
/// {
///   "username": "jsmith",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: Missing username or password
/// - 401 Unauthorized: Unknown username or wrong password
/// - 500 Internal Server Error: Database error
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<([(HeaderName, String); 1], Json<LoginResponse>)> {
    payload.validate()?;

    let user = User::find_by_username(&state.db, &payload.username).await?;

    let user = match user {
        Some(user) if verify_password(&payload.password, &user.password_hash)? => user,
        _ => {
            tracing::info!(username = %payload.username, "Rejected login attempt");
            return Err(ApiError::Unauthorized {
                message: "Invalid username or password".to_string(),
                redirect: "/login".to_string(),
            });
        }
    };

    // Expired sessions get swept on login rather than on a timer
    let purged = Session::purge_expired(&state.db, state.config.session.idle_seconds).await?;
    if purged > 0 {
        tracing::debug!(purged, "Removed expired sessions");
    }

    let token = generate_session_token();
    let session = Session::create(&state.db, user.id, &hash_token(&token)).await?;
    let signed = sign_session_cookie(&state.config.session.secret, &token)?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        session_id = session.id,
        "User logged in"
    );

    Ok((
        [(
            header::SET_COOKIE,
            session_cookie_header(&signed, state.config.api.production),
        )],
        Json(LoginResponse {
            user: UserInfo::from(&user),
        }),
    ))
}

/// Logout endpoint handler
///
/// Deletes the server-side session and tells the browser to drop the
/// cookie. Logging out twice is harmless; the second call just finds
/// nothing to delete.
///
/// # Endpoint
///
/// `POST /v1/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<([(HeaderName, String); 1], Json<LogoutResponse>)> {
    Session::delete(&state.db, current.session_id).await?;

    tracing::info!(
        user_id = current.user_id,
        username = %current.username,
        "User logged out"
    );

    Ok((
        [(header::SET_COOKIE, clear_session_cookie_header())],
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

/// Current user endpoint handler
///
/// # Endpoint
///
/// `GET /v1/auth/me`
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<UserInfo>> {
    // The session just authenticated, so the account should exist;
    // if it was deleted mid-session the session is no longer valid
    let user = User::find_by_id(&state.db, current.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized {
            message: "Please log in to access this page.".to_string(),
            redirect: "/login".to_string(),
        })?;

    Ok(Json(UserInfo::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            username: "jsmith".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(valid.validate().is_ok());

        let missing_username = LoginRequest {
            username: "".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(missing_username.validate().is_err());

        let missing_password = LoginRequest {
            username: "jsmith".to_string(),
            password: "".to_string(),
        };
        assert!(missing_password.validate().is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let dev = session_cookie_header("abc.123", false);
        assert_eq!(dev, "fielddesk_session=abc.123; HttpOnly; SameSite=Lax; Path=/");

        let prod = session_cookie_header("abc.123", true);
        assert!(prod.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let header = clear_session_cookie_header();
        assert!(header.starts_with("fielddesk_session=;"));
        assert!(header.contains("Max-Age=0"));
    }
}

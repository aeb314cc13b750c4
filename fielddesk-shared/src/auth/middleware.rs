/// Session authentication middleware for Axum
///
/// Resolves the signed session cookie on every protected request:
/// verify the cookie signature, look the session up by token hash,
/// slide its idle window, load the user, and park a [`CurrentUser`]
/// in the request extensions for handlers to pick up.
///
/// Requests with no cookie, a forged cookie, or an idled-out session
/// are rejected before any handler runs.
///
/// # Request Extensions
///
/// After successful authentication the middleware adds:
/// - `CurrentUser`: user id, username, role, and session id
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use fielddesk_shared::auth::middleware::{create_session_middleware, CurrentUser};
/// use sqlx::SqlitePool;
///
/// async fn protected_handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", current.username)
/// }
///
/// fn router(pool: SqlitePool) -> Router {
///     Router::new()
///         .route("/protected", get(protected_handler))
///         .layer(middleware::from_fn(create_session_middleware(
///             pool,
///             "session-secret".to_string(),
///             3600,
///         )))
/// }
/// ```
use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use super::token::{hash_token, verify_session_cookie, TokenError};
use crate::models::session::Session;
use crate::models::user::{Role, User};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "fielddesk_session";

/// The authenticated identity attached to request extensions
///
/// Handlers extract this with Axum's `Extension` extractor and hand it
/// to the authorization gate.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Authenticated user ID
    pub user_id: i64,

    /// Login name (for logging and response payloads)
    pub username: String,

    /// Account role
    pub role: Role,

    /// The session row backing this login (logout deletes it)
    pub session_id: i64,
}

/// Error type for session authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session cookie on the request
    #[error("No session cookie was presented")]
    MissingSession,

    /// Cookie failed signature verification, or the session is
    /// unknown or has idled out
    #[error("The session is invalid or has expired")]
    InvalidSession,

    /// Database failure while resolving the session
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cookie verification failure unrelated to the cookie itself
    #[error("Cookie verification error: {0}")]
    Token(#[from] TokenError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingSession | AuthError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthorized",
                    "message": "Please log in to access this page.",
                    "redirect": "/login",
                })),
            )
                .into_response(),
            AuthError::Database(ref e) => {
                tracing::error!(error = %e, "session lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "internal_error",
                        "message": "An internal error occurred",
                    })),
                )
                    .into_response()
            }
            AuthError::Token(ref e) => {
                tracing::error!(error = %e, "cookie verification failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "internal_error",
                        "message": "An internal error occurred",
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Pulls the session cookie value out of the request headers
///
/// Handles multiple `Cookie` headers and the usual `a=1; b=2` packing.
/// Returns the raw (still signed) cookie value.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

/// Session authentication middleware
///
/// Verifies the cookie, validates and touches the session, loads the
/// user, and stores a [`CurrentUser`] in the request extensions.
///
/// # Errors
///
/// Returns `AuthError::MissingSession` / `AuthError::InvalidSession`
/// for requests that should see the login page, and passes through
/// database errors as 500s
pub async fn session_auth_middleware(
    pool: SqlitePool,
    secret: String,
    idle_seconds: i64,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let cookie_value = session_cookie(req.headers())
        .ok_or(AuthError::MissingSession)?
        .to_string();

    let token = verify_session_cookie(&secret, &cookie_value)?.ok_or(AuthError::InvalidSession)?;

    let session = Session::validate_and_touch(&pool, &hash_token(&token), idle_seconds)
        .await?
        .ok_or(AuthError::InvalidSession)?;

    // A session row without its user means the row is orphaned; treat
    // it the same as an expired session
    let user = User::find_by_id(&pool, session.user_id)
        .await?
        .ok_or(AuthError::InvalidSession)?;

    let current = CurrentUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
        session_id: session.id,
    };

    tracing::debug!(user_id = current.user_id, role = %current.role, "session authenticated");

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Creates a session middleware closure with captured configuration
///
/// Returns a closure suitable for `axum::middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, Router};
/// use fielddesk_shared::auth::middleware::create_session_middleware;
/// use sqlx::SqlitePool;
///
/// fn protect(router: Router, pool: SqlitePool) -> Router {
///     router.layer(middleware::from_fn(create_session_middleware(
///         pool,
///         "session-secret".to_string(),
///         3600,
///     )))
/// }
/// ```
pub fn create_session_middleware(
    pool: SqlitePool,
    secret: String,
    idle_seconds: i64,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>> + Clone
{
    move |req: Request, next: Next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(session_auth_middleware(pool, secret, idle_seconds, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_simple() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("fielddesk_session=abc.def"),
        );

        assert_eq!(session_cookie(&headers), Some("abc.def"));
    }

    #[test]
    fn test_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; fielddesk_session=tok.sig; lang=en"),
        );

        assert_eq!(session_cookie(&headers), Some("tok.sig"));
    }

    #[test]
    fn test_session_cookie_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("fielddesk_session=tok.sig"),
        );

        assert_eq!(session_cookie(&headers), Some("tok.sig"));
    }

    #[test]
    fn test_session_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));

        assert_eq!(session_cookie(&headers), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_does_not_match_prefix_names() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("fielddesk_session_old=stale; fielddesk_session=fresh"),
        );

        assert_eq!(session_cookie(&headers), Some("fresh"));
    }

    #[test]
    fn test_auth_error_status_codes() {
        let resp = AuthError::MissingSession.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::InvalidSession.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

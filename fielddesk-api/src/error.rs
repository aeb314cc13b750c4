/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers should return `Result<T, ApiError>` which automatically
/// converts to appropriate HTTP status codes.
///
/// Denials carry a `redirect` field telling the client where to send the
/// user, mirroring the navigation the permission layer expects: `/login`
/// when unauthenticated, `/tickets` for restricted accounts, `/dashboard`
/// for everyone else.
///
/// # Example
///
/// ```
/// use fielddesk_api::error::ApiResult;
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     // Business logic that can fail
///     let count = 3;
///     Ok(Json(json!({ "count": count })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fielddesk_shared::auth::authorization::AuthzError;
use fielddesk_shared::auth::password::PasswordError;
use fielddesk_shared::auth::token::TokenError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - no valid session
    Unauthorized {
        message: String,
        redirect: String,
    },

    /// Forbidden (403) - authenticated but not allowed
    Forbidden {
        message: String,
        redirect: String,
    },

    /// Not found (404)
    NotFound {
        message: String,
        redirect: Option<String>,
    },

    /// Conflict (409) - e.g., duplicate username
    Conflict(String),

    /// Bad request (400) - field-level validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Where the client should navigate after a denial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized { message, .. } => write!(f, "Unauthorized: {}", message),
            ApiError::Forbidden { message, .. } => write!(f, "Forbidden: {}", message),
            ApiError::NotFound { message, .. } => write!(f, "Not found: {}", message),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, redirect, details) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                msg,
                None,
                None,
            ),
            ApiError::Unauthorized { message, redirect } => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                message,
                Some(redirect),
                None,
            ),
            ApiError::Forbidden { message, redirect } => (
                StatusCode::FORBIDDEN,
                "forbidden",
                message,
                Some(redirect),
                None,
            ),
            ApiError::NotFound { message, redirect } => (
                StatusCode::NOT_FOUND,
                "not_found",
                message,
                redirect,
                None,
            ),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                "conflict",
                msg,
                None,
                None,
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                None,
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            redirect,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// SQLite reports constraint failures in the error message rather than a
/// named constraint, e.g. `UNIQUE constraint failed: users.username`, so
/// the offending column is recovered from the text.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound {
                message: "Resource not found".to_string(),
                redirect: None,
            },
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();

                if message.contains("UNIQUE constraint failed") {
                    return ApiError::Conflict(unique_violation_message(&message));
                }

                if message.contains("FOREIGN KEY constraint failed") {
                    return ApiError::BadRequest(
                        "A referenced record does not exist".to_string(),
                    );
                }

                ApiError::InternalError(format!("Database error: {}", message))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Maps a SQLite unique violation to a client-facing message
fn unique_violation_message(message: &str) -> String {
    if message.contains("users.username") {
        "Username already exists".to_string()
    } else if message.contains("users.email") {
        "Email already exists".to_string()
    } else if message.contains("equipment.serial_number") {
        "Serial number already exists".to_string()
    } else if message.contains("locations.name") {
        "A location with this name already exists".to_string()
    } else {
        "A record with this value already exists".to_string()
    }
}

/// Convert permission denials to API errors
///
/// The denial message and redirect target are decided by the permission
/// layer; this just picks the status code.
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthenticated => ApiError::Unauthorized {
                message: err.to_string(),
                redirect: err.redirect_target().to_string(),
            },
            AuthzError::OpenTicketsOnly | AuthzError::PermissionDenied => ApiError::Forbidden {
                message: err.to_string(),
                redirect: err.redirect_target().to_string(),
            },
        }
    }
}

/// Convert field validation failures to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert cookie signing errors to API errors
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::InternalError(format!("Session cookie error: {}", err))
    }
}

/// Authentication and authorization utilities
///
/// This module provides the security primitives for FieldDesk:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`token`]: session token generation and signed-cookie handling
/// - [`middleware`]: Axum middleware resolving the session cookie to a [`middleware::CurrentUser`]
/// - [`authorization`]: the role gate every protected operation passes through
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Cookies**: HMAC-SHA256 signed, server-side session state
/// - **Constant-time Comparison**: all verification uses constant-time operations
///
/// # Example
///
/// ```no_run
/// use fielddesk_shared::auth::password::{hash_password, verify_password};
/// use fielddesk_shared::auth::token::{generate_session_token, hash_token, sign_session_cookie};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Session establishment
/// let token = generate_session_token();
/// let stored_hash = hash_token(&token);
/// let cookie_value = sign_session_cookie("session-secret", &token)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod middleware;
pub mod password;
pub mod token;

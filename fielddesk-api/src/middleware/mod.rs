/// Middleware modules for the API server
///
/// Session authentication lives in the shared crate; this module holds
/// middleware specific to the HTTP surface:
/// - Security headers

pub mod security;

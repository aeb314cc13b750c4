/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use fielddesk_api::{app::AppState, config::Config};
/// use fielddesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     max_connections: config.database.max_connections,
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = fielddesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use fielddesk_shared::auth::middleware::create_session_middleware;
use fielddesk_shared::notify::{LogNotifier, Notifier};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Channel for telling administrators about new access requests
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Creates new application state with the default log notifier
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier: Arc::new(LogNotifier::new()),
        }
    }

    /// Creates application state with a specific notifier
    ///
    /// Used by tests to observe notifications without a real channel.
    pub fn with_notifier(db: SqlitePool, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// ├── /v1/                          # API v1 (versioned)
/// │   ├── /auth/
/// │   │   ├── POST /login           # Public
/// │   │   ├── POST /logout          # Authenticated
/// │   │   └── GET  /me              # Authenticated
/// │   ├── GET /dashboard            # Authenticated
/// │   ├── /tickets/                 # Authenticated
/// │   │   ├── GET    /              # List with filters + pagination
/// │   │   ├── POST   /              # Create (admin)
/// │   │   ├── GET    /export        # CSV download
/// │   │   ├── GET    /:id           # Detail with comments
/// │   │   ├── PUT    /:id           # Edit (admin)
/// │   │   ├── DELETE /:id           # Delete (admin)
/// │   │   ├── PUT    /:id/status    # Change status
/// │   │   ├── PUT    /:id/assign    # Reassign
/// │   │   └── POST   /:id/comments  # Comment
/// │   ├── /equipment/               # Authenticated
/// │   ├── /locations/               # Authenticated
/// │   ├── /users/                   # Authenticated (admin)
/// │   ├── /profile/                 # Authenticated
/// │   └── /access-requests/
/// │       ├── POST /                # Public submission
/// │       ├── GET  /                # Authenticated (admin)
/// │       └── POST /:id/process     # Authenticated (admin)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Session authentication (per-group basis)
///
/// Per-capability permission checks happen inside each handler, so the
/// session layer only establishes WHO is asking, not what they may do.
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    let session_layer = axum::middleware::from_fn(create_session_middleware(
        state.db.clone(),
        state.config.session.secret.clone(),
        state.config.session.idle_seconds,
    ));

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Login is public; everything else under /auth requires a session
    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .merge(
            Router::new()
                .route("/logout", post(routes::auth::logout))
                .route("/me", get(routes::auth::me))
                .layer(session_layer.clone()),
        );

    let dashboard_routes = Router::new()
        .route("/dashboard", get(routes::dashboard::dashboard))
        .layer(session_layer.clone());

    let ticket_routes = Router::new()
        .route(
            "/",
            get(routes::tickets::list_tickets).post(routes::tickets::create_ticket),
        )
        .route("/export", get(routes::tickets::export_tickets))
        .route(
            "/:id",
            get(routes::tickets::get_ticket)
                .put(routes::tickets::update_ticket)
                .delete(routes::tickets::delete_ticket),
        )
        .route("/:id/status", put(routes::tickets::update_ticket_status))
        .route("/:id/assign", put(routes::tickets::assign_ticket))
        .route("/:id/comments", post(routes::tickets::add_comment))
        .layer(session_layer.clone());

    let equipment_routes = Router::new()
        .route(
            "/",
            get(routes::equipment::list_equipment).post(routes::equipment::create_equipment),
        )
        .route("/types", get(routes::equipment::device_types))
        .route(
            "/:id",
            get(routes::equipment::get_equipment)
                .put(routes::equipment::update_equipment)
                .delete(routes::equipment::delete_equipment),
        )
        .route("/:id/maintenance", post(routes::equipment::add_maintenance))
        .layer(session_layer.clone());

    let location_routes = Router::new()
        .route(
            "/",
            get(routes::locations::list_locations).post(routes::locations::create_location),
        )
        .route(
            "/:id",
            get(routes::locations::get_location)
                .put(routes::locations::update_location)
                .delete(routes::locations::delete_location),
        )
        .layer(session_layer.clone());

    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/:id",
            get(routes::users::get_user).put(routes::users::update_user),
        )
        .layer(session_layer.clone());

    let profile_routes = Router::new()
        .route(
            "/",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .layer(session_layer.clone());

    // Submission is public so prospective users can ask for an account;
    // review and processing require an admin session
    let access_request_routes = Router::new()
        .route("/", post(routes::access_requests::submit_access_request))
        .merge(
            Router::new()
                .route("/", get(routes::access_requests::list_access_requests))
                .route(
                    "/:id/process",
                    post(routes::access_requests::process_access_request),
                )
                .layer(session_layer.clone()),
        );

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(dashboard_routes)
        .nest("/tickets", ticket_routes)
        .nest("/equipment", equipment_routes)
        .nest("/locations", location_routes)
        .nest("/users", user_routes)
        .nest("/profile", profile_routes)
        .nest("/access-requests", access_request_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

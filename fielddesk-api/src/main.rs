//! # FieldDesk API Server
//!
//! This is the main API server for FieldDesk, the IT support desk for
//! distributed field sites.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Session-based authentication with signed cookies
//! - Role-gated ticket, equipment, location and user management
//! - Public access request intake with admin review
//! - CSV ticket export
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fielddesk-api
//! ```

use fielddesk_api::app::AppState;
use fielddesk_api::config::Config;
use fielddesk_shared::db::migrations::{ensure_database_exists, run_migrations};
use fielddesk_shared::db::pool::{create_pool, DatabaseConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fielddesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "FieldDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    ensure_database_exists(&config.database.url).await?;
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let state = AppState::new(pool, config.clone());
    let app = fielddesk_api::app::build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

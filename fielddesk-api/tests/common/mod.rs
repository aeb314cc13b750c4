/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory test database with migrations applied
/// - One seeded account per role
/// - Login helper that returns the session cookie
/// - Request builder and body helpers

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use fielddesk_api::app::{build_router, AppState};
use fielddesk_api::config::{ApiConfig, Config, DatabaseConfig, SessionConfig};
use fielddesk_shared::auth::password::hash_password;
use fielddesk_shared::db::migrations::run_migrations;
use fielddesk_shared::db::pool::create_test_pool;
use fielddesk_shared::models::ticket::{CreateTicket, Ticket, TicketPriority, TicketStatus};
use fielddesk_shared::models::user::{CreateUser, Role, User};
use fielddesk_shared::notify::MockNotifier;
use sqlx::SqlitePool;
use std::sync::{Arc, OnceLock};
use tower::Service as _;

/// Password shared by every seeded account
pub const TEST_PASSWORD: &str = "password123";

/// Argon2 hashing is slow, so the seed hash is computed once per test
/// process and shared by all seeded accounts.
fn seed_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).expect("password hashing should succeed"))
        .clone()
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
    pub notifier: Arc<MockNotifier>,
    pub admin: User,
    pub technician: User,
    pub regular: User,
    pub kiosk: User,
}

impl TestContext {
    /// Creates a new test context with a fresh in-memory database
    ///
    /// Seeds one account per role, all sharing [`TEST_PASSWORD`]:
    /// `admin`, `tech`, `casey` (user) and `frontdesk` (opentickets).
    pub async fn new() -> anyhow::Result<Self> {
        let db = create_test_pool().await?;
        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            session: SessionConfig {
                secret: "integration-test-secret-0123456789abcdef".to_string(),
                idle_seconds: 3600,
            },
        };

        let admin = seed_user(&db, "admin", "Avery Admin", Role::Admin).await?;
        let technician = seed_user(&db, "tech", "Toni Field", Role::Technician).await?;
        let regular = seed_user(&db, "casey", "Casey Jones", Role::User).await?;
        let kiosk = seed_user(&db, "frontdesk", "Front Desk", Role::OpenTickets).await?;

        let notifier = Arc::new(MockNotifier::new());
        let state = AppState::with_notifier(db.clone(), config.clone(), notifier.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            notifier,
            admin,
            technician,
            regular,
            kiosk,
        })
    }

    /// Logs in and returns the session cookie for later requests
    ///
    /// Panics if the login does not succeed, since every caller is a
    /// test that cannot proceed without a session.
    pub async fn login(&mut self, username: &str) -> String {
        let request = json_request(
            "POST",
            "/v1/auth/login",
            None,
            serde_json::json!({ "username": username, "password": TEST_PASSWORD }),
        );

        let response = self.send(request).await;
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "login as {username} should succeed"
        );

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login response should set a session cookie")
            .to_str()
            .expect("cookie should be ASCII")
            .to_string();

        // Everything before the first attribute is the name=value pair
        set_cookie
            .split(';')
            .next()
            .expect("cookie should have a value")
            .to_string()
    }

    /// Dispatches a request to the app under test
    pub async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        self.app
            .call(request)
            .await
            .expect("infallible app call should not error")
    }
}

/// Creates a user directly in the database, bypassing the API
pub async fn seed_user(
    db: &SqlitePool,
    username: &str,
    full_name: &str,
    role: Role,
) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            username: username.to_string(),
            password_hash: seed_password_hash(),
            full_name: full_name.to_string(),
            email: format!("{username}@example.com"),
            role,
            location_id: None,
        },
    )
    .await?;
    Ok(user)
}

/// Creates a ticket directly in the database, bypassing the API
pub async fn seed_ticket(
    db: &SqlitePool,
    created_by: i64,
    title: &str,
    status: TicketStatus,
) -> anyhow::Result<Ticket> {
    let ticket = Ticket::create(
        db,
        created_by,
        CreateTicket {
            title: title.to_string(),
            description: format!("{title} (seeded)"),
            status: Some(status),
            priority: Some(TicketPriority::Medium),
            assigned_to: None,
            location_id: None,
            equipment_id: None,
            due_date: None,
        },
    )
    .await?;
    Ok(ticket)
}

/// Builds a request with an optional session cookie and JSON body
pub fn json_request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Builds a bodyless request with an optional session cookie
pub fn bare_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request should build")
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Reads a response body as text
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Integration tests for database migrations
///
/// Run with: cargo test --test db_migrations_tests
///
/// Migrations are embedded at compile time and run against SQLite, so
/// these tests need no external services. Most cases use in-memory
/// databases; the create/drop cases use throwaway files under the
/// system temp directory.

use fielddesk_shared::db::migrations::{
    drop_database, ensure_database_exists, get_migration_status, run_migrations,
};
use fielddesk_shared::db::pool::{close_pool, create_pool, create_test_pool, DatabaseConfig};
use sqlx::migrate::MigrateDatabase;
use sqlx::Sqlite;
use std::path::{Path, PathBuf};

/// Builds a unique throwaway database path for a file-backed test
fn temp_db(tag: &str) -> (String, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "fielddesk_migrate_{}_{}_{}.db",
        tag,
        std::process::id(),
        rand::random::<u32>()
    ));
    (format!("sqlite://{}", path.display()), path)
}

/// Removes the database file along with its WAL sidecars
fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

#[tokio::test]
async fn test_ensure_database_exists() {
    let (url, path) = temp_db("ensure");

    let result = ensure_database_exists(&url).await;
    assert!(result.is_ok(), "Failed to create database: {:?}", result.err());

    // Calling again on an existing database is a no-op
    let result = ensure_database_exists(&url).await;
    assert!(result.is_ok(), "Second call should succeed: {:?}", result.err());

    assert!(
        Sqlite::database_exists(&url).await.unwrap_or(false),
        "Database file should exist"
    );

    remove_db_files(&path);
}

#[tokio::test]
async fn test_run_migrations() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    let result = run_migrations(&pool).await;
    assert!(result.is_ok(), "Migrations failed: {:?}", result.err());

    // Verify migrations were applied
    let status = get_migration_status(&pool)
        .await
        .expect("Failed to get migration status");
    assert!(status.applied_migrations > 0, "No migrations were applied");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    // Run migrations first time
    run_migrations(&pool).await.expect("First migration run failed");

    let status_1 = get_migration_status(&pool).await.expect("Failed to get status");

    // Run migrations again (should be a no-op)
    run_migrations(&pool).await.expect("Second migration run failed");

    let status_2 = get_migration_status(&pool).await.expect("Failed to get status");

    assert_eq!(
        status_1.applied_migrations, status_2.applied_migrations,
        "Migrations should be idempotent"
    );

    close_pool(pool).await;
}

#[tokio::test]
async fn test_get_migration_status_before_migrations() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    // Get status before running migrations
    let status = get_migration_status(&pool)
        .await
        .expect("Failed to get migration status");

    assert_eq!(
        status.applied_migrations, 0,
        "Should have 0 migrations before running"
    );
    assert!(status.latest_version.is_none(), "Latest version should be None");
    assert!(!status.is_up_to_date, "Should not be up to date yet");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_get_migration_status_after_migrations() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");

    let status = get_migration_status(&pool)
        .await
        .expect("Failed to get migration status");

    assert!(status.applied_migrations > 0, "Should have migrations applied");
    assert!(status.latest_version.is_some(), "Latest version should be set");
    assert!(status.is_up_to_date, "Should be up to date after migrations");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migration_creates_all_tables() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");

    // Verify all expected tables exist
    let expected_tables = vec![
        "locations",
        "users",
        "sessions",
        "equipment",
        "tickets",
        "ticket_comments",
        "maintenance",
        "access_requests",
    ];

    for table_name in expected_tables {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM sqlite_master
                WHERE type = 'table'
                AND name = ?
            )",
        )
        .bind(table_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to check for table {}: {}", table_name, e));

        assert!(exists, "Table '{}' should exist after migrations", table_name);
    }

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migration_creates_indexes() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");

    // The listing and session paths lean on these
    let expected_indexes = vec![
        "idx_sessions_last_seen",
        "idx_tickets_status",
        "idx_tickets_created_at",
        "idx_tickets_assigned_to",
        "idx_ticket_comments_ticket",
        "idx_equipment_location",
        "idx_maintenance_equipment",
        "idx_access_requests_status",
    ];

    for index_name in expected_indexes {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM sqlite_master
                WHERE type = 'index'
                AND name = ?
            )",
        )
        .bind(index_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to check for index {}: {}", index_name, e));

        assert!(exists, "Index '{}' should exist after migrations", index_name);
    }

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migrations_on_file_backed_database() {
    let (url, path) = temp_db("filebacked");

    ensure_database_exists(&url).await.expect("Failed to create database");

    let config = DatabaseConfig {
        url: url.clone(),
        ..Default::default()
    };
    let pool = create_pool(config).await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");

    let status = get_migration_status(&pool).await.expect("Failed to get status");
    assert!(status.is_up_to_date);

    close_pool(pool).await;
    remove_db_files(&path);
}

#[tokio::test]
async fn test_drop_database() {
    let (url, path) = temp_db("drop");

    ensure_database_exists(&url).await.expect("Failed to create database");
    assert!(Sqlite::database_exists(&url).await.unwrap_or(false));

    let result = drop_database(&url).await;
    assert!(result.is_ok(), "Failed to drop database: {:?}", result.err());

    assert!(
        !Sqlite::database_exists(&url).await.unwrap_or(true),
        "Database should not exist after dropping"
    );

    remove_db_files(&path);
}

/// Integration tests for the database connection pool
///
/// Run with: cargo test --test db_pool_tests
///
/// The pool targets SQLite, so these tests need no external services:
/// file-backed cases use throwaway files under the system temp directory
/// and the rest run against in-memory databases.

use fielddesk_shared::db::pool::{
    close_pool, create_pool, create_test_pool, get_pool_stats, health_check, DatabaseConfig,
};
use std::path::{Path, PathBuf};

/// Builds a unique throwaway database path for a file-backed test
fn temp_db(tag: &str) -> (String, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "fielddesk_pool_{}_{}_{}.db",
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
async fn test_create_pool_success() {
    let (url, path) = temp_db("create");
    let config = DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        ..Default::default()
    };

    let result = create_pool(config).await;
    assert!(result.is_ok(), "Failed to create pool: {:?}", result.err());

    let pool = result.unwrap();

    // Verify pool was created
    let stats = get_pool_stats(&pool);
    assert!(
        stats.total_connections > 0,
        "Pool should have at least one connection"
    );

    close_pool(pool).await;
    remove_db_files(&path);
}

#[tokio::test]
async fn test_create_pool_with_missing_parent_directory() {
    // create_if_missing creates the file, never intermediate directories
    let config = DatabaseConfig {
        url: "sqlite:///definitely/missing/fielddesk/pool.db".to_string(),
        max_connections: 1,
        min_connections: 0,
        connect_timeout_seconds: 2,
        ..Default::default()
    };

    let result = create_pool(config).await;
    assert!(result.is_err(), "Should fail when the directory does not exist");
}

#[tokio::test]
async fn test_health_check_success() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    let result = health_check(&pool).await;
    assert!(result.is_ok(), "Health check should succeed");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_pool_query_execution() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    // Test simple parameterized query
    let row: (i64,) = sqlx::query_as("SELECT ?")
        .bind(42i64)
        .fetch_one(&pool)
        .await
        .expect("Failed to execute query");

    assert_eq!(row.0, 42);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_pool_concurrent_queries() {
    let (url, path) = temp_db("concurrent");
    let config = DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        ..Default::default()
    };

    let pool = create_pool(config).await.expect("Failed to create pool");

    // Run 20 concurrent queries (more than pool size to test queueing)
    let mut handles = vec![];

    for i in 0..20i64 {
        let pool_clone = pool.clone();
        let handle = tokio::spawn(async move {
            let row: (i64,) = sqlx::query_as("SELECT ?")
                .bind(i)
                .fetch_one(&pool_clone)
                .await
                .expect("Failed to execute query");

            assert_eq!(row.0, i);
        });
        handles.push(handle);
    }

    // Wait for all queries to complete
    for handle in handles {
        handle.await.expect("Task panicked");
    }

    close_pool(pool).await;
    remove_db_files(&path);
}

#[tokio::test]
async fn test_get_pool_stats() {
    let (url, path) = temp_db("stats");
    let config = DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 2,
        ..Default::default()
    };

    let pool = create_pool(config).await.expect("Failed to create pool");

    let stats = get_pool_stats(&pool);
    assert!(
        stats.total_connections <= 5,
        "Should not exceed max_connections"
    );

    // Acquire a connection to change stats
    let _conn = pool.acquire().await.expect("Failed to acquire connection");

    let stats_with_active = get_pool_stats(&pool);
    assert!(
        stats_with_active.active_connections > 0,
        "Should have at least one active connection"
    );

    close_pool(pool).await;
    remove_db_files(&path);
}

#[tokio::test]
async fn test_pool_transaction() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    sqlx::query("CREATE TABLE scratch (n INTEGER NOT NULL)")
        .execute(&pool)
        .await
        .expect("Failed to create table");

    // Committed work is visible afterwards
    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    sqlx::query("INSERT INTO scratch (n) VALUES (1)")
        .execute(&mut *tx)
        .await
        .expect("Failed to insert in transaction");
    tx.commit().await.expect("Failed to commit transaction");

    // Rolled-back work is not
    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    sqlx::query("INSERT INTO scratch (n) VALUES (2)")
        .execute(&mut *tx)
        .await
        .expect("Failed to insert in transaction");
    tx.rollback().await.expect("Failed to rollback transaction");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scratch")
        .fetch_one(&pool)
        .await
        .expect("Failed to count rows");
    assert_eq!(count, 1, "Only the committed row should remain");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_close_pool() {
    let pool = create_test_pool().await.expect("Failed to create pool");

    close_pool(pool.clone()).await;

    // Attempting to use the pool after close should fail
    let result: Result<(i64,), _> = sqlx::query_as("SELECT 1").fetch_one(&pool).await;

    assert!(result.is_err(), "Queries should fail after pool is closed");
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    // Every pool connection carries PRAGMA foreign_keys = ON; a dangling
    // reference must be rejected rather than silently stored
    let pool = create_test_pool().await.expect("Failed to create pool");

    sqlx::query(
        "CREATE TABLE parents (id INTEGER PRIMARY KEY);
         CREATE TABLE children (
             id INTEGER PRIMARY KEY,
             parent_id INTEGER NOT NULL REFERENCES parents(id)
         )",
    )
    .execute(&pool)
    .await
    .expect("Failed to create tables");

    let result = sqlx::query("INSERT INTO children (parent_id) VALUES (999)")
        .execute(&pool)
        .await;

    assert!(result.is_err(), "Dangling foreign key should be rejected");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_database_config_defaults() {
    let (url, path) = temp_db("defaults");
    let config = DatabaseConfig {
        url,
        ..Default::default()
    };

    let pool = create_pool(config)
        .await
        .expect("Failed to create pool with defaults");

    let stats = get_pool_stats(&pool);
    assert!(stats.total_connections > 0);

    close_pool(pool).await;
    remove_db_files(&path);
}

//! Database initialization
//!
//! Creates the SQLite database on first run and applies the schema
//! idempotently on every start.

use crate::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

pub mod models;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // mode=rwc creates the database file if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent — safe to call on every start)
///
/// Also used by tests against in-memory pools.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_alumni_table(pool).await?;
    create_departments_table(pool).await?;
    create_users_table(pool).await?;
    Ok(())
}

/// Alumni contact records, keyed by roll number
///
/// Canonical schema: roll-keyed with designation (no location column).
async fn create_alumni_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alumni (
            roll        TEXT PRIMARY KEY,
            name        TEXT,
            phone       TEXT,
            email       TEXT,
            dept        TEXT,
            designation TEXT,
            year        INTEGER,
            address     TEXT,
            company     TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Canonical department names, unique by name
///
/// The UNIQUE constraint is the concurrency-control mechanism for lazy
/// department creation (INSERT OR IGNORE + re-read).
async fn create_departments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            dept_name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Staff accounts
///
/// `password` is NULL for accounts created via Google sign-in.
/// `reset_token` holds the SHA-256 hex of the raw reset token;
/// `reset_token_expires` is a Unix timestamp in seconds.
async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            email               TEXT NOT NULL UNIQUE,
            password            TEXT,
            name                TEXT NOT NULL,
            role                TEXT NOT NULL DEFAULT 'user',
            google_id           TEXT,
            reset_token         TEXT,
            reset_token_expires INTEGER,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool")
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = memory_pool().await;
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alumni")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn department_names_are_unique() {
        let pool = memory_pool().await;
        create_schema(&pool).await.unwrap();

        sqlx::query("INSERT INTO departments (dept_name) VALUES ('CSE')")
            .execute(&pool)
            .await
            .unwrap();
        let dup = sqlx::query("INSERT INTO departments (dept_name) VALUES ('CSE')")
            .execute(&pool)
            .await;
        assert!(dup.is_err());
    }
}

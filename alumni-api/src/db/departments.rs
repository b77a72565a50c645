//! Department lookup and lazy creation
//!
//! Departments are created the first time an unseen name is supplied
//! during a save or import. The UNIQUE name constraint plus
//! INSERT OR IGNORE and a re-read resolve concurrent creation races;
//! the loser finds the row the winner created.

use alumni_common::db::models::Department;
use alumni_common::Result;
use sqlx::SqlitePool;
use tracing::warn;

/// All departments, ordered by name
pub async fn list_departments(pool: &SqlitePool) -> Result<Vec<Department>> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, dept_name FROM departments ORDER BY dept_name")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, dept_name)| Department { id, dept_name })
        .collect())
}

/// Case-insensitive lookup of the canonical department name
///
/// Used by search normalization. A failed lookup must not abort the
/// search, so errors are logged and reported as "not found".
pub async fn lookup_canonical(pool: &SqlitePool, name: &str) -> Option<String> {
    let result: std::result::Result<Option<String>, sqlx::Error> = sqlx::query_scalar(
        "SELECT dept_name FROM departments WHERE LOWER(dept_name) = LOWER(?)",
    )
    .bind(name)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(found) => found,
        Err(e) => {
            warn!("Department lookup failed for {:?}: {}", name, e);
            None
        }
    }
}

/// Get or create a department by exact name, returning its id
///
/// Runs as a single all-or-nothing transaction: read, insert-or-ignore
/// when absent, re-read, commit. The existence check is case-sensitive;
/// "CSE" and "cse" are distinct canonical entries here.
pub async fn get_or_create(pool: &SqlitePool, name: &str) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM departments WHERE dept_name = ?")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

    if let Some(id) = existing {
        tx.commit().await?;
        return Ok(id);
    }

    sqlx::query("INSERT OR IGNORE INTO departments (dept_name) VALUES (?)")
        .bind(name)
        .execute(&mut *tx)
        .await?;

    // Re-read rather than last_insert_rowid: if a concurrent creator
    // won the race, the IGNOREd insert leaves rowid stale.
    let id: i64 = sqlx::query_scalar("SELECT id FROM departments WHERE dept_name = ?")
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(id)
}

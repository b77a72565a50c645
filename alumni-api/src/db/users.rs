//! User account persistence

use alumni_common::db::models::User;
use alumni_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, email, password, name, role, google_id, \
                            reset_token, reset_token_expires, created_at";

type UserRow = (
    i64,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<i64>,
    String,
);

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.0,
        email: row.1,
        password: row.2,
        name: row.3,
        role: row.4,
        google_id: row.5,
        reset_token: row.6,
        reset_token_expires: row.7,
        created_at: row.8,
    }
}

/// Public view of an account (no credential material)
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(user_from_row))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(user_from_row))
}

/// Match an account by email or linked Google subject id
pub async fn find_by_email_or_google_id(
    pool: &SqlitePool,
    email: &str,
    google_id: &str,
) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE email = ? OR google_id = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .bind(google_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(user_from_row))
}

/// Insert a new account, returning its id
pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: Option<&str>,
    name: &str,
    role: &str,
    google_id: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO users (email, password, name, role, google_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .bind(google_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// All accounts, newest first
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserSummary>> {
    let rows: Vec<(i64, String, String, String, String)> = sqlx::query_as(
        "SELECT id, email, name, role, created_at FROM users ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, email, name, role, created_at)| UserSummary {
            id,
            email,
            name,
            role,
            created_at,
        })
        .collect())
}

/// Delete an account; false when the id does not exist
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Change an account's role; false when the id does not exist
pub async fn update_role(pool: &SqlitePool, id: i64, role: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Store a reset-token hash and its expiry (Unix seconds)
pub async fn set_reset_token(
    pool: &SqlitePool,
    id: i64,
    token_hash: &str,
    expires: i64,
) -> Result<()> {
    sqlx::query("UPDATE users SET reset_token = ?, reset_token_expires = ? WHERE id = ?")
        .bind(token_hash)
        .bind(expires)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Find the account holding an unexpired reset-token hash
pub async fn find_by_reset_token(
    pool: &SqlitePool,
    token_hash: &str,
    now: i64,
) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE reset_token = ? AND reset_token_expires > ?",
        USER_COLUMNS
    ))
    .bind(token_hash)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(user_from_row))
}

/// Store a new credential and clear the reset fields
pub async fn update_password_and_clear_reset(
    pool: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE users SET password = ?, reset_token = NULL, reset_token_expires = NULL \
         WHERE id = ?",
    )
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Link a Google subject id to an existing account
pub async fn set_google_id(pool: &SqlitePool, id: i64, google_id: &str) -> Result<()> {
    sqlx::query("UPDATE users SET google_id = ? WHERE id = ?")
        .bind(google_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

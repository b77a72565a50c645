//! Shared helpers for router-level integration tests

use alumni_api::{build_router, AppState};
use alumni_common::config::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower::util::ServiceExt; // for `oneshot`

/// Config pointing at nothing external; tokens sign with a fixed secret
pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_path: PathBuf::from(":memory:"),
        token_secret: "integration-test-secret".to_string(),
        google_client_id: None,
        frontend_url: "http://localhost:5173".to_string(),
        upload_dir: std::env::temp_dir(),
        max_upload_bytes: 1024 * 1024,
    }
}

/// Fresh in-memory database with the full schema applied
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    alumni_common::db::create_schema(&pool)
        .await
        .expect("schema");
    pool
}

/// App plus a handle on its pool for seeding and assertions
pub async fn setup_app() -> (Router, SqlitePool) {
    let pool = memory_pool().await;
    let state = AppState::new(pool.clone(), test_config());
    (build_router(state), pool)
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

/// Send a JSON request, returning status and parsed body
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let json = extract_json(response.into_body()).await;
    (status, json)
}

/// Seed one alumni row directly
pub async fn seed_alumnus(
    pool: &SqlitePool,
    roll: &str,
    name: &str,
    phone: Option<&str>,
    email: Option<&str>,
    dept: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO alumni (roll, name, phone, email, dept) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(roll)
    .bind(name)
    .bind(phone)
    .bind(email)
    .bind(dept)
    .execute(pool)
    .await
    .expect("seed alumnus");
}

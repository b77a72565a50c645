//! Integration tests for authentication and user management
//!
//! Covers login, the admin guard, the forgot/reset password flow, and
//! the self-protection rules on destructive account operations.

use alumni_api::db::users;
use alumni_api::notify::ResetNotifier;
use alumni_api::{build_router, AppState};
use alumni_common::auth::hash_password;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};

mod common;
use common::{memory_pool, send_json, test_config};

/// Captures reset links instead of logging them
#[derive(Default)]
struct CapturingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl ResetNotifier for CapturingNotifier {
    fn send_reset(&self, email: &str, _name: &str, reset_url: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), reset_url.to_string()));
    }
}

async fn seed_user(pool: &SqlitePool, email: &str, password: &str, role: &str) -> i64 {
    let hashed = hash_password(password);
    users::insert_user(pool, email, Some(&hashed), "Test User", role, None)
        .await
        .expect("seed user")
}

async fn login_token(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn setup() -> (Router, SqlitePool, Arc<CapturingNotifier>) {
    let pool = memory_pool().await;
    let notifier = Arc::new(CapturingNotifier::default());
    let state =
        AppState::new(pool.clone(), test_config()).with_notifier(notifier.clone());
    (build_router(state), pool, notifier)
}

#[tokio::test]
async fn login_returns_token_and_user_summary() {
    let (app, pool, _) = setup().await;
    let id = seed_user(&pool, "admin@example.com", "s3cret-pw", "admin").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "admin@example.com", "password": "s3cret-pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["id"], id);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn login_failures_are_generic() {
    let (app, pool, _) = setup().await;
    seed_user(&pool, "a@b.com", "right-password", "user").await;

    for payload in [
        json!({"email": "a@b.com", "password": "wrong-password"}),
        json!({"email": "nobody@b.com", "password": "whatever-pw"}),
    ] {
        let (status, body) = send_json(&app, "POST", "/auth/login", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid email or password");
    }
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let (app, _pool, _) = setup().await;

    let (status, body) = send_json(&app, "GET", "/auth/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access denied. No token provided.");

    let (status, body) = send_json(&app, "GET", "/auth/users", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn admin_guard_blocks_plain_users() {
    let (app, pool, _) = setup().await;
    seed_user(&pool, "user@example.com", "user-password", "user").await;
    let token = login_token(&app, "user@example.com", "user-password").await;

    let (status, body) = send_json(&app, "GET", "/auth/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Admin only.");
}

#[tokio::test]
async fn register_creates_account_once() {
    let (app, pool, _) = setup().await;
    seed_user(&pool, "admin@example.com", "admin-password", "admin").await;
    let token = login_token(&app, "admin@example.com", "admin-password").await;

    let payload = json!({"email": "new@example.com", "password": "new-password", "name": "New"});
    let (status, body) =
        send_json(&app, "POST", "/auth/register", Some(&token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) =
        send_json(&app, "POST", "/auth/register", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    // The new account can log in with its password
    login_token(&app, "new@example.com", "new-password").await;
}

#[tokio::test]
async fn register_rejects_unknown_roles() {
    let (app, pool, _) = setup().await;
    seed_user(&pool, "admin@example.com", "admin-password", "admin").await;
    let token = login_token(&app, "admin@example.com", "admin-password").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/register",
        Some(&token),
        Some(json!({"email": "x@y.com", "password": "pw-123456", "name": "X", "role": "root"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cannot_delete_own_account() {
    let (app, pool, _) = setup().await;
    let admin_id = seed_user(&pool, "admin@example.com", "admin-password", "admin").await;
    let token = login_token(&app, "admin@example.com", "admin-password").await;

    let (status, body) = send_json(
        &app,
        "DELETE",
        &format!("/auth/users/{}", admin_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete your own account");
}

#[tokio::test]
async fn delete_removes_other_accounts() {
    let (app, pool, _) = setup().await;
    seed_user(&pool, "admin@example.com", "admin-password", "admin").await;
    let other_id = seed_user(&pool, "other@example.com", "other-password", "user").await;
    let token = login_token(&app, "admin@example.com", "admin-password").await;

    let (status, body) = send_json(
        &app,
        "DELETE",
        &format!("/auth/users/{}", other_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedUser"]["email"], "other@example.com");

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/auth/users/{}", other_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_change_validates_and_protects_self() {
    let (app, pool, _) = setup().await;
    let admin_id = seed_user(&pool, "admin@example.com", "admin-password", "admin").await;
    let other_id = seed_user(&pool, "other@example.com", "other-password", "user").await;
    let token = login_token(&app, "admin@example.com", "admin-password").await;

    let (status, _) = send_json(
        &app,
        "PATCH",
        &format!("/auth/users/{}/role", other_id),
        Some(&token),
        Some(json!({"role": "superuser"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app,
        "PATCH",
        &format!("/auth/users/{}/role", admin_id),
        Some(&token),
        Some(json!({"role": "user"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot change your own role");

    let (status, body) = send_json(
        &app,
        "PATCH",
        &format!("/auth/users/{}/role", other_id),
        Some(&token),
        Some(json!({"role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn me_returns_token_holder() {
    let (app, pool, _) = setup().await;
    let id = seed_user(&pool, "user@example.com", "user-password", "user").await;
    let token = login_token(&app, "user@example.com", "user-password").await;

    let (status, body) = send_json(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["email"], "user@example.com");
}

#[tokio::test]
async fn forgot_password_does_not_reveal_accounts() {
    let (app, _pool, notifier) = setup().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/forgot-password",
        None,
        Some(json!({"email": "ghost@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reset_flow_changes_password_once() {
    let (app, pool, notifier) = setup().await;
    seed_user(&pool, "user@example.com", "old-password", "user").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/forgot-password",
        None,
        Some(json!({"email": "user@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let raw_token = {
        let sent = notifier.sent.lock().unwrap();
        let (_, url) = sent.first().expect("reset link delivered");
        url.split("token=").nth(1).unwrap().to_string()
    };

    // The stored value is the hash, never the raw token
    let stored: Option<String> =
        sqlx::query_scalar("SELECT reset_token FROM users WHERE email = 'user@example.com'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_ne!(stored.as_deref(), Some(raw_token.as_str()));

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/reset-password",
        None,
        Some(json!({"token": raw_token.clone(), "newPassword": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/reset-password",
        None,
        Some(json!({"token": raw_token.clone(), "newPassword": "new-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // New password works, old one doesn't, token is spent
    login_token(&app, "user@example.com", "new-password").await;
    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "user@example.com", "password": "old-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/reset-password",
        None,
        Some(json!({"token": raw_token, "newPassword": "another-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or expired reset token");
}

#[tokio::test]
async fn google_signin_unconfigured_is_rejected() {
    let (app, _pool, _) = setup().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/google",
        None,
        Some(json!({"id_token": "some-token"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Google sign-in is not configured");
}

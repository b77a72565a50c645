//! Authentication endpoints
//!
//! Login, admin-driven registration, the forgot/reset password flow,
//! and Google sign-in. Credential failures answer generically so
//! callers cannot probe which part failed.

use alumni_common::auth::{
    generate_reset_token, hash_password, hash_reset_token, sign_token, verify_password, Claims,
    MIN_PASSWORD_LEN, RESET_TOKEN_TTL_SECS,
};
use alumni_common::db::models::{Role, User};
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::middleware::require_admin;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = Claims::new(user.id, &user.email, &user.role);
    sign_token(&claims, &state.config.token_secret)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

fn login_response(state: &AppState, user: &User) -> ApiResult<Json<Value>> {
    let token = issue_token(state, user)?;
    Ok(Json(json!({
        "token": token,
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "role": user.role,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let invalid = || ApiError::BadRequest("Invalid email or password".to_string());

    let user = users::find_by_email(&state.db, &body.email)
        .await?
        .ok_or_else(invalid)?;

    let stored = user.password.as_deref().ok_or_else(invalid)?;
    if !verify_password(&body.password, stored) {
        return Err(invalid());
    }

    login_response(&state, &user)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    pub role: Option<String>,
}

/// POST /auth/register (admin only)
pub async fn register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Json<Value>> {
    require_admin(&claims)?;

    if body.email.is_empty() || body.password.is_empty() || body.name.is_empty() {
        return Err(ApiError::BadRequest(
            "Email, password, and name are required".to_string(),
        ));
    }

    let role = match &body.role {
        Some(value) => Role::parse(value)
            .ok_or_else(|| {
                ApiError::BadRequest("Invalid role. Must be \"user\" or \"admin\"".to_string())
            })?
            .as_str(),
        None => Role::User.as_str(),
    };

    if users::find_by_email(&state.db, &body.email).await?.is_some() {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let hashed = hash_password(&body.password);
    users::insert_user(&state.db, &body.email, Some(&hashed), &body.name, role, None).await?;

    info!("Created account {} with role {}", body.email, role);
    Ok(Json(json!({
        "success": true,
        "message": "User created successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /auth/forgot-password
///
/// Always answers success to avoid account enumeration. When the
/// account exists, a one-hour reset token is stored (hashed) and the
/// raw value handed to the notifier.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Value>> {
    if body.email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let sent = json!({
        "success": true,
        "message": "If email exists, reset link has been sent",
    });

    let Some(user) = users::find_by_email(&state.db, &body.email).await? else {
        return Ok(Json(sent));
    };

    let (raw_token, token_hash) = generate_reset_token();
    let expires = chrono::Utc::now().timestamp() + RESET_TOKEN_TTL_SECS;
    users::set_reset_token(&state.db, user.id, &token_hash, expires).await?;

    let reset_url = format!(
        "{}/reset-password?token={}",
        state.config.frontend_url, raw_token
    );
    state.notifier.send_reset(&user.email, &user.name, &reset_url);

    Ok(Json(sent))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default, rename = "newPassword")]
    pub new_password: String,
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    if body.token.is_empty() || body.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Token and password are required".to_string(),
        ));
    }
    if body.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let token_hash = hash_reset_token(&body.token);
    let now = chrono::Utc::now().timestamp();
    let user = users::find_by_reset_token(&state.db, &token_hash, now)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let hashed = hash_password(&body.new_password);
    users::update_password_and_clear_reset(&state.db, user.id, &hashed).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password reset successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    #[serde(default)]
    pub id_token: String,
}

/// POST /auth/google
///
/// Verifies the posted ID token, then links an email-matched account
/// (storing the Google subject id if absent) or creates a fresh
/// user-role account.
pub async fn google_signin(
    State(state): State<AppState>,
    Json(body): Json<GoogleSignInRequest>,
) -> ApiResult<Json<Value>> {
    if body.id_token.is_empty() {
        return Err(ApiError::BadRequest("id_token is required".to_string()));
    }

    let verifier = state
        .google
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("Google sign-in is not configured".to_string()))?;

    let identity = verifier.verify(&body.id_token).await?;

    let user = match users::find_by_email_or_google_id(
        &state.db,
        &identity.email,
        &identity.subject,
    )
    .await?
    {
        Some(existing) => {
            if existing.google_id.is_none() {
                users::set_google_id(&state.db, existing.id, &identity.subject).await?;
            }
            existing
        }
        None => {
            let id = users::insert_user(
                &state.db,
                &identity.email,
                None,
                &identity.name,
                Role::User.as_str(),
                Some(&identity.subject),
            )
            .await?;
            users::find_by_id(&state.db, id).await?.ok_or_else(|| {
                error!("Google-created account {} vanished on re-read", id);
                ApiError::Internal("Sign-in failed".to_string())
            })?
        }
    };

    login_response(&state, &user)
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Value>> {
    let user = users::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "role": user.role,
    })))
}

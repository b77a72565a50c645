//! Bearer-token authentication middleware
//!
//! Validates the Authorization header on protected routes and injects
//! the verified claims into request extensions for handlers to read.
//! Failure messages stay generic so callers learn nothing about which
//! part of the check failed.

use alumni_common::auth::{verify_token, Claims};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware for token-protected routes
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Access denied. No token provided.".to_string()))?;

    let claims = verify_token(token, &state.config.token_secret)
        .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Reject non-admin callers on admin-only routes
pub fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Access denied. Admin only.".to_string()))
    }
}

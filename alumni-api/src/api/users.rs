//! User management endpoints (admin only)
//!
//! A caller can never delete their own account or change their own
//! role, so at least one admin always remains reachable.

use alumni_common::auth::Claims;
use alumni_common::db::models::Role;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::middleware::require_admin;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /auth/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Value>> {
    require_admin(&claims)?;
    let users = users::list_users(&state.db).await?;
    Ok(Json(json!(users)))
}

/// DELETE /auth/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    require_admin(&claims)?;

    if id == claims.sub {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    let user = users::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    users::delete_user(&state.db, id).await?;
    info!("Deleted account {} ({})", user.email, id);

    Ok(Json(json!({
        "success": true,
        "message": format!("User {} has been permanently deleted", user.email),
        "deletedUser": {
            "email": user.email,
            "name": user.name,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct RoleChangeRequest {
    #[serde(default)]
    pub role: String,
}

/// PATCH /auth/users/:id/role
pub async fn change_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<RoleChangeRequest>,
) -> ApiResult<Json<Value>> {
    require_admin(&claims)?;

    let role = Role::parse(&body.role).ok_or_else(|| {
        ApiError::BadRequest("Invalid role. Must be \"user\" or \"admin\"".to_string())
    })?;

    if id == claims.sub {
        return Err(ApiError::BadRequest(
            "Cannot change your own role".to_string(),
        ));
    }

    let changed = users::update_role(&state.db, id, role.as_str()).await?;
    if !changed {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!("Changed role of account {} to {}", id, role.as_str());
    Ok(Json(json!({
        "success": true,
        "message": format!("User role updated to {}", role.as_str()),
        "role": role.as_str(),
    })))
}

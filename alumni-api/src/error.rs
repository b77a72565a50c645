//! HTTP-facing error type
//!
//! Every error renders as `{"error": <message>}` with the status class
//! of its taxonomy: validation 400, auth 401/403, missing 404,
//! persistence and infrastructure 500.

use alumni_common::Error as CommonError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Database failure (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Shared-crate error, mapped by variant
    #[error("{0}")]
    Common(#[from] CommonError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Common(e) => match e {
                CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
                CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                CommonError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
                other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_variants_map_to_status_classes() {
        let resp = ApiError::Common(CommonError::InvalidInput("bad".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Common(CommonError::NotFound("gone".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::Common(CommonError::Auth("nope".into())).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = ApiError::Common(CommonError::Internal("boom".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

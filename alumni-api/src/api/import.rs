//! Bulk import endpoint
//!
//! Accepts one spreadsheet file via multipart upload, stages it under
//! the configured upload directory, runs the import, and removes the
//! temp file whatever the outcome.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::import::{self, sheet};
use crate::AppState;

/// POST /alumni/import-excel
pub async fn import_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut upload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
        upload = Some(bytes.to_vec());
        break;
    }

    let bytes = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let path = temp_path(&state);
    tokio::fs::write(&path, &bytes).await.map_err(|e| {
        error!("Failed to stage upload at {}: {}", path.display(), e);
        ApiError::Internal("Failed to store uploaded file".to_string())
    })?;

    // Parse and reconcile, then clean up the temp file regardless
    let result = run_file_import(&state, &path).await;
    tokio::fs::remove_file(&path).await.ok();

    let summary = result?;
    Ok(Json(json!({
        "success": true,
        "inserted": summary.inserted,
        "updated": summary.updated,
        "total": summary.total,
    })))
}

async fn run_file_import(state: &AppState, path: &Path) -> ApiResult<import::ImportSummary> {
    let rows = sheet::read_first_sheet(path)?;
    Ok(import::run_import(&state.db, &rows).await?)
}

fn temp_path(state: &AppState) -> PathBuf {
    let stamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    state
        .config
        .upload_dir
        .join(format!("alumni-import-{}-{}.xlsx", std::process::id(), stamp))
}

//! Alumni search, save, and departments endpoints

use alumni_common::db::models::AlumniRecord;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::error;

use crate::db::departments;
use crate::error::{ApiError, ApiResult};
use crate::search;
use crate::AppState;

/// POST /alumni/search
///
/// Flat key-value filter object in, `{success, message, data}` out.
pub async fn search_alumni(
    State(state): State<AppState>,
    Json(filters): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let rows = search::run_search(&state.db, &filters).await.map_err(|e| {
        error!("Search failed: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    if rows.is_empty() {
        return Ok(Json(json!({
            "success": false,
            "message": "No matching records found.",
            "data": [],
        })));
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Found {} records", rows.len()),
        "data": rows,
    })))
}

fn trimmed_string(body: &Map<String, Value>, key: &str) -> Option<String> {
    let value = body.get(key)?;
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn year_value(body: &Map<String, Value>) -> Option<i64> {
    match body.get("year")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// POST /alumni
///
/// Single-record upsert keyed by roll number. Roll and name are
/// required; everything else is trimmed, blank becoming NULL.
pub async fn save_alumni(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let roll = trimmed_string(&body, "roll")
        .ok_or_else(|| ApiError::BadRequest("Roll number is required".to_string()))?;
    let name = trimmed_string(&body, "name")
        .ok_or_else(|| ApiError::BadRequest("Name is required".to_string()))?;

    let record = AlumniRecord {
        roll,
        name: Some(name),
        phone: trimmed_string(&body, "phone"),
        email: trimmed_string(&body, "email"),
        dept: trimmed_string(&body, "dept"),
        designation: trimmed_string(&body, "designation"),
        year: year_value(&body),
        address: trimmed_string(&body, "address"),
        company: trimmed_string(&body, "company"),
    };

    crate::db::alumni::save_record(&state.db, &record)
        .await
        .map_err(|e| {
            error!("Save failed for roll {}: {}", record.roll, e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(json!({ "success": true, "message": "Record saved" })))
}

/// GET /alumni/departments
pub async fn list_departments(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let departments = departments::list_departments(&state.db)
        .await
        .map_err(|e| {
            error!("Department listing failed: {}", e);
            ApiError::Internal("Failed to fetch departments".to_string())
        })?;
    Ok(Json(json!(departments)))
}

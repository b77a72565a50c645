//! Bulk import reconciliation
//!
//! Takes tabular rows (header row first), resolves headers against a
//! fixed synonym table, and upserts each data row through the same
//! save path as the single-record endpoint. Rows are processed
//! strictly one at a time; a failing row is logged and skipped, never
//! aborting the rest of the file.

use alumni_common::db::models::AlumniRecord;
use alumni_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::alumni::{save_record, WriteOutcome};

pub mod sheet;

use sheet::Cell;

/// Accepted header synonyms for the key column
pub const KEY_HEADER_SYNONYMS: &[&str] = &["roll", "roll no", "rollno", "register no", "reg no"];

/// Header synonyms for the non-key fields
const FIELD_HEADER_SYNONYMS: &[(&str, &[&str])] = &[
    ("name", &["name"]),
    ("phone", &["phone"]),
    ("email", &["email"]),
    ("dept", &["dept", "department"]),
    ("designation", &["designation"]),
    ("year", &["year"]),
    ("address", &["address"]),
    ("company", &["company"]),
];

/// Resolved header-to-column mapping
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub key: usize,
    pub name: Option<usize>,
    pub phone: Option<usize>,
    pub email: Option<usize>,
    pub dept: Option<usize>,
    pub designation: Option<usize>,
    pub year: Option<usize>,
    pub address: Option<usize>,
    pub company: Option<usize>,
}

/// Aggregate counts reported after an import
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: u64,
    pub updated: u64,
    pub total: u64,
}

fn matches_any(header: &str, synonyms: &[&str]) -> bool {
    synonyms.iter().any(|s| header.eq_ignore_ascii_case(s))
}

/// Resolve the header row into a column map
///
/// The key header must match exactly one column; zero or multiple
/// matches reject the whole import before any row is processed.
pub fn resolve_columns(header_row: &[Cell]) -> Result<ColumnMap> {
    let headers: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| cell.as_ref().map(|h| h.trim().to_lowercase()))
        .collect();

    let key_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            h.as_deref()
                .filter(|h| matches_any(h, KEY_HEADER_SYNONYMS))
                .map(|_| i)
        })
        .collect();

    let key = match key_columns.as_slice() {
        [single] => *single,
        [] => {
            return Err(Error::InvalidInput(format!(
                "Key column is required. Accepted headers: {}",
                KEY_HEADER_SYNONYMS.join(" / ")
            )))
        }
        _ => {
            return Err(Error::InvalidInput(
                "Multiple columns match the key header; import rejected".to_string(),
            ))
        }
    };

    let find = |field: &str| -> Option<usize> {
        let synonyms = FIELD_HEADER_SYNONYMS
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, syns)| *syns)?;
        headers.iter().position(|h| {
            h.as_deref()
                .map(|h| matches_any(h, synonyms))
                .unwrap_or(false)
        })
    };

    Ok(ColumnMap {
        key,
        name: find("name"),
        phone: find("phone"),
        email: find("email"),
        dept: find("dept"),
        designation: find("designation"),
        year: find("year"),
        address: find("address"),
        company: find("company"),
    })
}

fn cell_at(row: &[Cell], column: Option<usize>) -> Option<String> {
    let value = row.get(column?)?.as_ref()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Build a record from one data row; None when the row is skippable
/// (entirely empty, or blank key cell)
pub fn record_from_row(columns: &ColumnMap, row: &[Cell]) -> Option<AlumniRecord> {
    if row.iter().all(|c| c.is_none()) {
        return None;
    }

    let roll = cell_at(row, Some(columns.key))?;

    let year = cell_at(row, columns.year).and_then(|raw| match raw.parse::<i64>() {
        Ok(y) => Some(y),
        Err(_) => {
            warn!("Dropping non-numeric year cell {:?} for roll {}", raw, roll);
            None
        }
    });

    Some(AlumniRecord {
        roll,
        name: cell_at(row, columns.name),
        phone: cell_at(row, columns.phone),
        email: cell_at(row, columns.email),
        dept: cell_at(row, columns.dept),
        designation: cell_at(row, columns.designation),
        year,
        address: cell_at(row, columns.address),
        company: cell_at(row, columns.company),
    })
}

/// Reconcile a whole table (header row first) against the store
pub async fn run_import(pool: &SqlitePool, rows: &[Vec<Cell>]) -> Result<ImportSummary> {
    let Some((header_row, data_rows)) = rows.split_first() else {
        return Err(Error::InvalidInput("Spreadsheet is empty".to_string()));
    };

    let columns = resolve_columns(header_row)?;

    let mut summary = ImportSummary::default();
    for (index, row) in data_rows.iter().enumerate() {
        let Some(record) = record_from_row(&columns, row) else {
            continue;
        };

        match save_record(pool, &record).await {
            Ok(WriteOutcome::Inserted) => summary.inserted += 1,
            Ok(WriteOutcome::Updated) => summary.updated += 1,
            Err(e) => {
                // Row 1 is the header, so data rows start at 2
                warn!("Import row {} failed (roll {}): {}", index + 2, record.roll, e);
            }
        }
    }

    summary.total = summary.inserted + summary.updated;
    info!(
        "Import complete: {} inserted, {} updated, {} total",
        summary.inserted, summary.updated, summary.total
    );
    Ok(summary)
}

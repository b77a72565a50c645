//! Alumni record persistence
//!
//! Upsert keyed by roll number. On conflict every non-key column is
//! overwritten with the incoming value — a blank incoming field nulls
//! out a previously stored one (overwrite, not merge).

use alumni_common::db::models::AlumniRecord;
use alumni_common::Result;
use sqlx::SqlitePool;

use super::departments;

/// What the upsert did
///
/// SQLite reports one affected row for either path, so the outcome is
/// determined by an existence probe before the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Updated,
}

/// Save one record: resolve the department first, then upsert by roll
///
/// Department auto-creation runs in its own transaction; if it fails,
/// the alumni row is not written and the error surfaces to the caller.
pub async fn save_record(pool: &SqlitePool, record: &AlumniRecord) -> Result<WriteOutcome> {
    if let Some(dept) = &record.dept {
        departments::get_or_create(pool, dept).await?;
    }

    // Probe and upsert share one transaction so the reported outcome
    // matches what this write actually did.
    let mut tx = pool.begin().await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM alumni WHERE roll = ?)")
        .bind(&record.roll)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO alumni (roll, name, phone, email, dept, designation, year, address, company)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(roll) DO UPDATE SET
            name        = excluded.name,
            phone       = excluded.phone,
            email       = excluded.email,
            dept        = excluded.dept,
            designation = excluded.designation,
            year        = excluded.year,
            address     = excluded.address,
            company     = excluded.company
        "#,
    )
    .bind(&record.roll)
    .bind(&record.name)
    .bind(&record.phone)
    .bind(&record.email)
    .bind(&record.dept)
    .bind(&record.designation)
    .bind(record.year)
    .bind(&record.address)
    .bind(&record.company)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(if exists {
        WriteOutcome::Updated
    } else {
        WriteOutcome::Inserted
    })
}

//! Scan bookkeeping
//!
//! Persists the per-root watermark the scheduler passes to the scan engine:
//! the start time of the last successfully completed scan.

use chime_core::error::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Last successful scan time for a root folder, if any
pub async fn last_scan_at(pool: &SqlitePool, root: &str) -> Result<Option<DateTime<Utc>>> {
    let row = sqlx::query("SELECT last_scan_at FROM scan_state WHERE root = ?")
        .bind(root)
        .fetch_optional(pool)
        .await?;

    Ok(row.and_then(|row| DateTime::from_timestamp(row.get::<i64, _>("last_scan_at"), 0)))
}

/// Record a successful scan of a root folder
pub async fn set_last_scan_at(pool: &SqlitePool, root: &str, at: DateTime<Utc>) -> Result<()> {
    sqlx::query(
        "INSERT INTO scan_state (root, last_scan_at, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(root) DO UPDATE SET
             last_scan_at = excluded.last_scan_at,
             updated_at = excluded.updated_at",
    )
    .bind(root)
    .bind(at.timestamp())
    .bind(Utc::now().timestamp())
    .execute(pool)
    .await?;

    Ok(())
}

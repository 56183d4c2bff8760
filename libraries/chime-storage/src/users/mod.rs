//! Users vertical slice
//!
//! Minimal account rows. The scan engine only asks one question here:
//! whether an administrator exists, which gates playlist import.

use chime_core::error::Result;
use chime_core::ChimeError;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// A Chime account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Create a new user, returning its row id
pub async fn create(pool: &SqlitePool, name: &str, is_admin: bool) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (name, is_admin, created_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(i64::from(is_admin))
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Get all users, ordered by name
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query("SELECT id, name, is_admin, created_at FROM users ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(User {
                id: row.get("id"),
                name: row.get("name"),
                is_admin: row.get::<i64, _>("is_admin") != 0,
                created_at: DateTime::from_timestamp(row.get::<i64, _>("created_at"), 0)
                    .ok_or_else(|| ChimeError::storage("Invalid timestamp"))?,
            })
        })
        .collect()
}

/// Whether at least one administrator account exists
pub async fn has_admin(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_admin = 1")
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

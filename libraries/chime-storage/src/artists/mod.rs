//! Artists vertical slice
//!
//! Artist rows aggregate the tracks referencing an identifier as either
//! track artist or album artist. Recompute-only, like the albums slice.

use chime_core::error::Result;
use chime_core::types::*;
use chime_core::ChimeError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn to_datetime(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| ChimeError::storage("Invalid timestamp"))
}

fn artist_from_row(row: &SqliteRow) -> Result<Artist> {
    Ok(Artist {
        id: row.get("id"),
        name: row.get("name"),
        album_count: row.get::<i64, _>("album_count") as u32,
        song_count: row.get::<i64, _>("song_count") as u32,
        created_at: to_datetime(row.get::<i64, _>("created_at"))?,
        updated_at: to_datetime(row.get::<i64, _>("updated_at"))?,
    })
}

/// Get an artist by its identifier
pub async fn get_by_id(pool: &SqlitePool, id: &ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query(
        "SELECT id, name, album_count, song_count, created_at, updated_at
         FROM artists WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(artist_from_row).transpose()
}

/// Get all artists, ordered by name
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let rows = sqlx::query(
        "SELECT id, name, album_count, song_count, created_at, updated_at
         FROM artists ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(artist_from_row).collect()
}

/// Recompute artist aggregates for the given identifiers.
///
/// A track contributes to an artist through both its `artist_id` and its
/// `album_artist_id`; the union is deduplicated per track before counting.
pub async fn refresh(pool: &SqlitePool, ids: &[ArtistId]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let now = Utc::now().timestamp();
    let marks = placeholders(ids.len());
    let sql = format!(
        "INSERT INTO artists (id, name, album_count, song_count, created_at, updated_at)
         SELECT
             x.aid,
             MAX(x.name),
             COUNT(DISTINCT x.album_id),
             COUNT(DISTINCT x.track_id),
             ?,
             ?
         FROM (
             SELECT artist_id AS aid, artist AS name, album_id, id AS track_id
             FROM tracks WHERE artist_id IN ({marks})
             UNION ALL
             SELECT album_artist_id AS aid, album_artist AS name, album_id, id AS track_id
             FROM tracks WHERE album_artist_id IN ({marks})
         ) x
         GROUP BY x.aid
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             album_count = excluded.album_count,
             song_count = excluded.song_count,
             updated_at = excluded.updated_at"
    );

    let mut query = sqlx::query(&sql).bind(now).bind(now);
    for id in ids {
        query = query.bind(id);
    }
    for id in ids {
        query = query.bind(id);
    }
    query.execute(pool).await?;

    Ok(())
}

/// Remove artist rows no track references in either role, returning the count.
pub async fn purge_empty(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM artists WHERE id NOT IN \
         (SELECT artist_id FROM tracks UNION SELECT album_artist_id FROM tracks)",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

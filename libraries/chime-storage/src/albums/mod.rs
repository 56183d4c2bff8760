//! Albums vertical slice
//!
//! Album rows are aggregates: pure functions of the tracks sharing their
//! identifier at the moment of [`refresh`]. Nothing else writes this table;
//! rows with no remaining tracks are removed by [`purge_empty`].

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

fn album_from_row(row: &SqliteRow) -> Result<Album> {
    Ok(Album {
        id: row.get("id"),
        name: row.get("name"),
        artist: row.get("artist"),
        artist_id: row.get("artist_id"),
        song_count: row.get::<i64, _>("song_count") as u32,
        duration_seconds: row.get("duration_seconds"),
        min_year: row.get::<Option<i64>, _>("min_year").map(|n| n as i32),
        max_year: row.get::<Option<i64>, _>("max_year").map(|n| n as i32),
        compilation: row.get::<i64, _>("compilation") != 0,
        has_cover_art: row.get::<i64, _>("has_cover_art") != 0,
        created_at: to_datetime(row.get::<i64, _>("created_at"))?,
        updated_at: to_datetime(row.get::<i64, _>("updated_at"))?,
    })
}

/// Get an album by its identifier
pub async fn get_by_id(pool: &SqlitePool, id: &AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(
        "SELECT id, name, artist, artist_id, song_count, duration_seconds, min_year, max_year, \
         compilation, has_cover_art, created_at, updated_at
         FROM albums WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(album_from_row).transpose()
}

/// Get all albums, ordered by name
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Album>> {
    let rows = sqlx::query(
        "SELECT id, name, artist, artist_id, song_count, duration_seconds, min_year, max_year, \
         compilation, has_cover_art, created_at, updated_at
         FROM albums ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(album_from_row).collect()
}

/// Recompute album aggregates for the given identifiers.
///
/// Each album row is rebuilt from the current track rows sharing its
/// identifier. Identifiers with no remaining tracks are left untouched here;
/// [`purge_empty`] removes them. Idempotent: refreshing the same identifier
/// twice against unchanged tracks converges to the same row.
pub async fn refresh(pool: &SqlitePool, ids: &[AlbumId]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let now = Utc::now().timestamp();
    let sql = format!(
        "INSERT INTO albums (id, name, artist, artist_id, song_count, duration_seconds, \
         min_year, max_year, compilation, has_cover_art, created_at, updated_at)
         SELECT
             t.album_id,
             MAX(t.album),
             MAX(t.album_artist),
             t.album_artist_id,
             COUNT(*),
             TOTAL(t.duration_seconds),
             MIN(t.year),
             MAX(t.year),
             MAX(t.compilation),
             MAX(t.has_cover_art),
             ?,
             ?
         FROM tracks t
         WHERE t.album_id IN ({})
         GROUP BY t.album_id, t.album_artist_id
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             artist = excluded.artist,
             artist_id = excluded.artist_id,
             song_count = excluded.song_count,
             duration_seconds = excluded.duration_seconds,
             min_year = excluded.min_year,
             max_year = excluded.max_year,
             compilation = excluded.compilation,
             has_cover_art = excluded.has_cover_art,
             updated_at = excluded.updated_at",
        placeholders(ids.len())
    );

    let mut query = sqlx::query(&sql).bind(now).bind(now);
    for id in ids {
        query = query.bind(id);
    }
    query.execute(pool).await?;

    Ok(())
}

/// Remove album rows with zero referencing tracks, returning the count.
pub async fn purge_empty(pool: &SqlitePool) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM albums WHERE id NOT IN (SELECT DISTINCT album_id FROM tracks)")
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

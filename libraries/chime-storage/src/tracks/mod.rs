//! Tracks vertical slice
//!
//! Leaf records of the catalog. The scan engine upserts and deletes rows
//! here; album/artist aggregates are recomputed from these rows by the
//! `albums`/`artists` slices.

use chime_core::error::Result;
use chime_core::types::*;
use chime_core::ChimeError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const TRACK_COLUMNS: &str = "id, path, folder, title, artist, artist_id, album, album_id, \
     album_artist, album_artist_id, compilation, genre, year, track_number, disc_number, \
     duration_seconds, bit_rate, suffix, size, has_cover_art, file_mtime, created_at, \
     updated_at, play_count, rating, starred, starred_at";

/// Directory component of a track path, as stored in the `folder` column.
pub fn folder_of(path: &str) -> String {
    std::path::Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn to_datetime(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| ChimeError::storage("Invalid timestamp"))
}

fn track_from_row(row: &SqliteRow) -> Result<Track> {
    Ok(Track {
        id: row.get("id"),
        path: row.get("path"),
        title: row.get("title"),
        artist: row.get("artist"),
        artist_id: row.get("artist_id"),
        album: row.get("album"),
        album_id: row.get("album_id"),
        album_artist: row.get("album_artist"),
        album_artist_id: row.get("album_artist_id"),
        compilation: row.get::<i64, _>("compilation") != 0,
        genre: row.get("genre"),
        year: row.get::<Option<i64>, _>("year").map(|n| n as i32),
        track_number: row.get::<Option<i64>, _>("track_number").map(|n| n as u32),
        disc_number: row.get::<Option<i64>, _>("disc_number").map(|n| n as u32),
        duration_seconds: row.get("duration_seconds"),
        bit_rate: row.get::<Option<i64>, _>("bit_rate").map(|n| n as u32),
        suffix: row.get("suffix"),
        size: row.get::<i64, _>("size") as u64,
        has_cover_art: row.get::<i64, _>("has_cover_art") != 0,
        file_mtime: to_datetime(row.get::<i64, _>("file_mtime"))?,
        created_at: to_datetime(row.get::<i64, _>("created_at"))?,
        updated_at: to_datetime(row.get::<i64, _>("updated_at"))?,
        annotations: TrackAnnotations {
            play_count: row.get::<i64, _>("play_count") as u32,
            rating: row.get::<i64, _>("rating") as u8,
            starred: row.get::<i64, _>("starred") != 0,
            starred_at: row
                .get::<Option<i64>, _>("starred_at")
                .map(to_datetime)
                .transpose()?,
        },
    })
}

/// Insert or update a track record.
///
/// Upserts on the content-derived identifier; the caller is responsible for
/// carrying user annotations forward when replacing an existing path.
pub async fn put(pool: &SqlitePool, track: &Track) -> Result<()> {
    sqlx::query(
        "INSERT INTO tracks (id, path, folder, title, artist, artist_id, album, album_id, \
         album_artist, album_artist_id, compilation, genre, year, track_number, disc_number, \
         duration_seconds, bit_rate, suffix, size, has_cover_art, file_mtime, created_at, \
         updated_at, play_count, rating, starred, starred_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             path = excluded.path,
             folder = excluded.folder,
             title = excluded.title,
             artist = excluded.artist,
             artist_id = excluded.artist_id,
             album = excluded.album,
             album_id = excluded.album_id,
             album_artist = excluded.album_artist,
             album_artist_id = excluded.album_artist_id,
             compilation = excluded.compilation,
             genre = excluded.genre,
             year = excluded.year,
             track_number = excluded.track_number,
             disc_number = excluded.disc_number,
             duration_seconds = excluded.duration_seconds,
             bit_rate = excluded.bit_rate,
             suffix = excluded.suffix,
             size = excluded.size,
             has_cover_art = excluded.has_cover_art,
             file_mtime = excluded.file_mtime,
             updated_at = excluded.updated_at,
             play_count = excluded.play_count,
             rating = excluded.rating,
             starred = excluded.starred,
             starred_at = excluded.starred_at",
    )
    .bind(&track.id)
    .bind(&track.path)
    .bind(folder_of(&track.path))
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.artist_id)
    .bind(&track.album)
    .bind(&track.album_id)
    .bind(&track.album_artist)
    .bind(&track.album_artist_id)
    .bind(i64::from(track.compilation))
    .bind(&track.genre)
    .bind(track.year.map(i64::from))
    .bind(track.track_number.map(i64::from))
    .bind(track.disc_number.map(i64::from))
    .bind(track.duration_seconds)
    .bind(track.bit_rate.map(i64::from))
    .bind(&track.suffix)
    .bind(track.size as i64)
    .bind(i64::from(track.has_cover_art))
    .bind(track.file_mtime.timestamp())
    .bind(track.created_at.timestamp())
    .bind(track.updated_at.timestamp())
    .bind(i64::from(track.annotations.play_count))
    .bind(i64::from(track.annotations.rating))
    .bind(i64::from(track.annotations.starred))
    .bind(track.annotations.starred_at.map(|t| t.timestamp()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a track by its identifier
pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(track_from_row).transpose()
}

/// Get a track by its file path
pub async fn get_by_path(pool: &SqlitePool, path: &str) -> Result<Option<Track>> {
    let row = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE path = ?"
    ))
    .bind(path)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(track_from_row).transpose()
}

/// All tracks whose file sits directly in `dir` (non-recursive)
pub async fn in_folder(pool: &SqlitePool, dir: &str) -> Result<Vec<Track>> {
    let rows = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE folder = ? ORDER BY path"
    ))
    .bind(dir)
    .fetch_all(pool)
    .await?;

    rows.iter().map(track_from_row).collect()
}

/// All tracks under `path`, including subdirectories
pub async fn under_path(pool: &SqlitePool, path: &str) -> Result<Vec<Track>> {
    let rows = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE folder = ? OR folder LIKE ? || '/%' ORDER BY path"
    ))
    .bind(path)
    .bind(path)
    .fetch_all(pool)
    .await?;

    rows.iter().map(track_from_row).collect()
}

/// Delete a single track
pub async fn delete(pool: &SqlitePool, id: &TrackId) -> Result<()> {
    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete every track under `path`, returning the number removed
pub async fn delete_under_path(pool: &SqlitePool, path: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tracks WHERE folder = ? OR folder LIKE ? || '/%'")
        .bind(path)
        .bind(path)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Distinct directory paths referenced by track records within `root`
pub async fn known_folder_paths(pool: &SqlitePool, root: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT DISTINCT folder FROM tracks WHERE folder = ? OR folder LIKE ? || '/%' \
         ORDER BY folder",
    )
    .bind(root)
    .bind(root)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|row| row.get("folder")).collect())
}

/// Record a completed play
pub async fn increment_play_count(pool: &SqlitePool, id: &TrackId) -> Result<()> {
    sqlx::query("UPDATE tracks SET play_count = play_count + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Set the user rating (0 clears it)
pub async fn set_rating(pool: &SqlitePool, id: &TrackId, rating: u8) -> Result<()> {
    sqlx::query("UPDATE tracks SET rating = ? WHERE id = ?")
        .bind(i64::from(rating.min(5)))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Star or unstar a track
pub async fn set_starred(pool: &SqlitePool, id: &TrackId, starred: bool) -> Result<()> {
    let starred_at = starred.then(|| Utc::now().timestamp());

    sqlx::query("UPDATE tracks SET starred = ?, starred_at = ? WHERE id = ?")
        .bind(i64::from(starred))
        .bind(starred_at)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

//! Album aggregate type

use crate::types::{AlbumId, ArtistId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An album, derived from the set of tracks sharing its identifier.
///
/// Albums are never edited directly; the catalog recomputes them from their
/// constituent tracks via a refresh operation, and removes them once no
/// track references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    /// Effective album artist name
    pub artist: String,
    /// Identifier of the effective album artist
    pub artist_id: ArtistId,
    pub song_count: u32,
    pub duration_seconds: f64,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub compilation: bool,
    pub has_cover_art: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

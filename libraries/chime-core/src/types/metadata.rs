//! Raw metadata extracted from an audio file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw extraction record produced by a [`crate::traits::MetadataExtractor`].
///
/// Tag fields are optional exactly as tagged on disk; mapping them into a
/// catalog [`crate::types::Track`] (placeholders, identity derivation) is the
/// scanner's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    /// Absolute path of the source file
    pub path: PathBuf,

    /// File size in bytes
    pub size: u64,

    /// On-disk modification time
    pub file_mtime: DateTime<Utc>,

    /// Lowercased file extension
    pub suffix: String,

    /// Track title tag
    pub title: Option<String>,

    /// Artist tag
    pub artist: Option<String>,

    /// Album tag
    pub album: Option<String>,

    /// Album artist tag (may differ from track artist)
    pub album_artist: Option<String>,

    /// Compilation flag
    pub compilation: bool,

    /// Genre tag
    pub genre: Option<String>,

    /// Release year
    pub year: Option<i32>,

    /// Track number
    pub track_number: Option<u32>,

    /// Disc number
    pub disc_number: Option<u32>,

    /// Duration in seconds
    pub duration_seconds: f64,

    /// Audio bit rate in kbps
    pub bit_rate: Option<u32>,

    /// Whether the file carries an embedded picture
    pub has_cover_art: bool,
}

impl AudioMetadata {
    /// Check if the tags carry any identifying information
    pub fn is_untagged(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.album_artist.is_none()
    }
}

impl Default for AudioMetadata {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            size: 0,
            file_mtime: DateTime::<Utc>::UNIX_EPOCH,
            suffix: String::new(),
            title: None,
            artist: None,
            album: None,
            album_artist: None,
            compilation: false,
            genre: None,
            year: None,
            track_number: None,
            disc_number: None,
            duration_seconds: 0.0,
            bit_rate: None,
            has_cover_art: false,
        }
    }
}

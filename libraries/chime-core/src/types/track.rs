/// Track domain type
use crate::types::{AlbumId, ArtistId, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog record representing one audio file.
///
/// The identifier is derived from the file path, so re-scanning the same
/// unchanged file never mints a new identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Content-derived track identifier
    pub id: TrackId,

    /// Absolute file path, unique within a root folder
    pub path: String,

    /// Track title
    pub title: String,

    /// Artist name as tagged
    pub artist: String,

    /// Identifier of the track artist
    pub artist_id: ArtistId,

    /// Album name
    pub album: String,

    /// Identifier of the owning album aggregate
    pub album_id: AlbumId,

    /// Album artist name (may be empty when untagged)
    pub album_artist: String,

    /// Identifier of the effective album artist
    pub album_artist_id: ArtistId,

    /// Compilation flag from the tags
    pub compilation: bool,

    /// Genre
    pub genre: Option<String>,

    /// Release year
    pub year: Option<i32>,

    /// Track number
    pub track_number: Option<u32>,

    /// Disc number
    pub disc_number: Option<u32>,

    /// Duration in seconds
    pub duration_seconds: f64,

    /// Bit rate in kbps
    pub bit_rate: Option<u32>,

    /// Lowercased file extension
    pub suffix: String,

    /// File size in bytes
    pub size: u64,

    /// Whether the file carries embedded cover art
    pub has_cover_art: bool,

    /// On-disk modification time at import, used for change detection
    pub file_mtime: DateTime<Utc>,

    /// When the track was first added to the catalog
    pub created_at: DateTime<Utc>,

    /// When the catalog record was last written
    pub updated_at: DateTime<Utc>,

    /// User annotations, preserved across re-import of the same path
    pub annotations: TrackAnnotations,
}

impl Track {
    /// Carry over user annotations from a prior record for the same path.
    pub fn carry_annotations_from(&mut self, previous: &Track) {
        self.annotations = previous.annotations.clone();
        self.created_at = previous.created_at;
    }
}

/// User-owned state attached to a track.
///
/// Never derived from the file; the scanner must copy these forward when it
/// re-imports a path that already has a catalog record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackAnnotations {
    /// Number of completed plays
    pub play_count: u32,

    /// User rating, 0 (unrated) to 5
    pub rating: u8,

    /// Starred flag
    pub starred: bool,

    /// When the track was starred
    pub starred_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track(path: &str) -> Track {
        let now = Utc::now();
        Track {
            id: TrackId::new("t1"),
            path: path.to_string(),
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            artist_id: ArtistId::new("a1"),
            album: "Album".to_string(),
            album_id: AlbumId::new("al1"),
            album_artist: String::new(),
            album_artist_id: ArtistId::new("a1"),
            compilation: false,
            genre: None,
            year: None,
            track_number: Some(1),
            disc_number: None,
            duration_seconds: 180.0,
            bit_rate: Some(320),
            suffix: "mp3".to_string(),
            size: 1024,
            has_cover_art: false,
            file_mtime: now,
            created_at: now,
            updated_at: now,
            annotations: TrackAnnotations::default(),
        }
    }

    #[test]
    fn annotations_carry_forward() {
        let mut old = sample_track("/music/a.mp3");
        old.annotations.play_count = 42;
        old.annotations.rating = 5;
        old.annotations.starred = true;

        let mut reimported = sample_track("/music/a.mp3");
        reimported.title = "Song (remastered)".to_string();
        reimported.carry_annotations_from(&old);

        assert_eq!(reimported.annotations.play_count, 42);
        assert_eq!(reimported.annotations.rating, 5);
        assert!(reimported.annotations.starred);
        assert_eq!(reimported.created_at, old.created_at);
        assert_eq!(reimported.title, "Song (remastered)");
    }

    #[test]
    fn default_annotations_are_empty() {
        let ann = TrackAnnotations::default();
        assert_eq!(ann.play_count, 0);
        assert_eq!(ann.rating, 0);
        assert!(!ann.starred);
        assert!(ann.starred_at.is_none());
    }
}

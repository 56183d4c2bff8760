//! Metadata mapping
//!
//! Maps raw extracted metadata into catalog track records, deriving the
//! stable identifiers. Derivation is deterministic: the same normalized
//! input always produces the same identifier, so re-scanning an unchanged
//! file never mints a new identity.

use chime_core::types::{AlbumId, ArtistId, AudioMetadata, Track, TrackAnnotations, TrackId};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Synthetic artist identity used for compilation albums
pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// Placeholder for tracks with no artist tag
pub const UNKNOWN_ARTIST: &str = "[Unknown Artist]";

/// Placeholder for tracks with no album tag
pub const UNKNOWN_ALBUM: &str = "[Unknown Album]";

fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(&hasher.finalize()[..16])
}

/// Maps extraction records into catalog tracks for one root folder.
pub struct TrackMapper {
    root: PathBuf,
}

impl TrackMapper {
    /// Create a mapper for the given root folder
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map one extraction record into a catalog track.
    ///
    /// The returned record carries default (empty) annotations; the caller
    /// copies prior annotations forward when a record for the path exists.
    pub fn to_track(&self, md: &AudioMetadata) -> Track {
        let path = md.path.to_string_lossy().into_owned();
        let artist = md
            .artist
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_ARTIST)
            .to_string();
        let album_artist = self.effective_artist(md);
        let album = self.album_name(md);
        let now = Utc::now();

        Track {
            id: self.track_id(&path),
            title: self.track_title(md),
            artist_id: ArtistId::new(digest(&artist.to_lowercase())),
            artist,
            album_id: self.album_id(&album_artist, &album),
            album,
            album_artist_id: ArtistId::new(digest(&album_artist.to_lowercase())),
            album_artist,
            compilation: md.compilation,
            genre: md.genre.clone().filter(|s| !s.is_empty()),
            year: md.year,
            track_number: md.track_number,
            disc_number: md.disc_number,
            duration_seconds: md.duration_seconds,
            bit_rate: md.bit_rate,
            suffix: md.suffix.clone(),
            size: md.size,
            has_cover_art: md.has_cover_art,
            file_mtime: md.file_mtime,
            created_at: now,
            updated_at: now,
            annotations: TrackAnnotations::default(),
            path,
        }
    }

    /// Track identifier from the normalized file path
    pub fn track_id(&self, path: &str) -> TrackId {
        TrackId::new(digest(path))
    }

    /// Album identifier from the normalized (effective artist, album) pair
    pub fn album_id(&self, album_artist: &str, album: &str) -> AlbumId {
        let key = format!(
            "{}::{}",
            album_artist.to_lowercase(),
            album.to_lowercase()
        );
        AlbumId::new(digest(&key))
    }

    /// Resolve the effective artist identity for aggregation.
    ///
    /// Resolution order: compilation flag, album-artist tag, track artist
    /// tag, unknown-artist placeholder.
    pub fn effective_artist(&self, md: &AudioMetadata) -> String {
        if md.compilation {
            return VARIOUS_ARTISTS.to_string();
        }
        if let Some(album_artist) = md.album_artist.as_deref().filter(|s| !s.is_empty()) {
            return album_artist.to_string();
        }
        if let Some(artist) = md.artist.as_deref().filter(|s| !s.is_empty()) {
            return artist.to_string();
        }
        UNKNOWN_ARTIST.to_string()
    }

    fn album_name(&self, md: &AudioMetadata) -> String {
        md.album
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_ALBUM)
            .to_string()
    }

    fn track_title(&self, md: &AudioMetadata) -> String {
        if let Some(title) = md.title.as_deref().filter(|s| !s.is_empty()) {
            return title.to_string();
        }
        // Fall back to the root-relative path without its extension
        let relative = md.path.strip_prefix(&self.root).unwrap_or(&md.path);
        relative
            .with_extension("")
            .to_string_lossy()
            .into_owned()
    }
}

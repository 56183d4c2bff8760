/// Collaborator traits consumed by the library synchronization engine
use crate::error::Result;
use crate::types::{AlbumId, ArtistId, AudioMetadata, Track, TrackId};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Catalog repository trait
///
/// Implementers provide persistent storage for tracks and their derived
/// album/artist aggregates. Track writes are individually durable; aggregate
/// rows are only ever recomputed through the refresh operations, and removed
/// by [`Catalog::garbage_collect`] once no track references them.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Load all tracks whose file sits directly in `dir` (non-recursive)
    async fn tracks_in_folder(&self, dir: &str) -> Result<Vec<Track>>;

    /// Load all tracks whose path is under `path`, including subdirectories
    async fn tracks_under_path(&self, path: &str) -> Result<Vec<Track>>;

    /// Insert or update a track record
    async fn put_track(&self, track: &Track) -> Result<()>;

    /// Delete a single track
    async fn delete_track(&self, id: &TrackId) -> Result<()>;

    /// Delete every track under `path`, returning the number removed
    async fn delete_tracks_under_path(&self, path: &str) -> Result<u64>;

    /// Distinct directory paths currently referenced by track records
    /// within the given root folder
    async fn known_folder_paths(&self, root: &str) -> Result<Vec<String>>;

    /// Recompute the album aggregates for the given identifiers
    async fn refresh_albums(&self, ids: &[AlbumId]) -> Result<()>;

    /// Recompute the artist aggregates for the given identifiers
    async fn refresh_artists(&self, ids: &[ArtistId]) -> Result<()>;

    /// Remove aggregates with zero referencing tracks
    async fn garbage_collect(&self, root: &str) -> Result<()>;

    /// Whether an administrator account exists (gates playlist import)
    async fn has_admin_user(&self) -> Result<bool>;
}

/// Metadata extractor trait
///
/// Extraction is batched; a failed call aborts only that batch. Files that
/// cannot be parsed may be skipped (and logged) rather than failing the
/// whole batch.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extract raw metadata for a batch of audio file paths
    async fn extract(&self, paths: &[PathBuf]) -> Result<Vec<AudioMetadata>>;
}

/// Cache warming hints emitted during a scan
///
/// Fire-and-forget: failures must not surface into the scan result.
#[async_trait]
pub trait CacheWarmer: Send + Sync {
    /// Hint that an album's artwork will likely be requested soon
    async fn add_album(&self, id: &AlbumId);

    /// Drain any buffered hints
    async fn flush(&self);
}

/// Playlist import hook
///
/// Invoked for changed directories that contain a playlist file, once an
/// administrator account exists to own the imported playlists.
#[async_trait]
pub trait PlaylistImporter: Send + Sync {
    /// Import playlist files found in `dir`, returning how many were processed
    async fn process_playlists(&self, dir: &Path) -> usize;
}

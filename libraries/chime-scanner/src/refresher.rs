//! Refresh buffer
//!
//! Accumulates the album/artist identifiers touched by track mutations and
//! flushes them as aggregate-recompute requests. Flushing proactively at a
//! batch threshold bounds memory and avoids one enormous recompute at the
//! end of a large scan; refresh itself is idempotent, so flushing the same
//! identifier twice converges to the same aggregate values.

use chime_core::error::Result;
use chime_core::traits::{CacheWarmer, Catalog};
use chime_core::types::{AlbumId, ArtistId, Track};
use std::collections::HashSet;

/// Combined pending count at which the buffer flushes proactively
pub const REFRESH_BATCH_SIZE: usize = 100;

/// Batching accumulator for aggregate-recompute requests.
///
/// Owned by a single in-flight scan run; never shared across runs.
#[derive(Debug)]
pub struct RefreshBuffer {
    albums: HashSet<AlbumId>,
    artists: HashSet<ArtistId>,
    threshold: usize,
}

impl Default for RefreshBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshBuffer {
    /// Create a buffer with the default flush threshold
    pub fn new() -> Self {
        Self::with_threshold(REFRESH_BATCH_SIZE)
    }

    /// Create a buffer with a custom flush threshold
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            albums: HashSet::new(),
            artists: HashSet::new(),
            threshold,
        }
    }

    /// Enqueue an album for recomputation
    pub fn touch_album(&mut self, id: AlbumId) {
        self.albums.insert(id);
    }

    /// Enqueue an artist for recomputation
    pub fn touch_artist(&mut self, id: ArtistId) {
        self.artists.insert(id);
    }

    /// Enqueue every aggregate a track contributes to
    pub fn touch_track(&mut self, track: &Track) {
        self.albums.insert(track.album_id.clone());
        self.artists.insert(track.artist_id.clone());
        self.artists.insert(track.album_artist_id.clone());
    }

    /// Combined pending identifier count
    pub fn pending(&self) -> usize {
        self.albums.len() + self.artists.len()
    }

    /// Whether the pending count has reached the flush threshold
    pub fn needs_flush(&self) -> bool {
        self.pending() >= self.threshold
    }

    /// Recompute all pending aggregates, then clear the sets.
    ///
    /// Albums are refreshed before artists so artist aggregates observe
    /// up-to-date album rows. Flushed album identifiers are hinted to the
    /// cache warmer. On failure the sets are left intact, so the
    /// identifiers are retried by a later flush.
    pub async fn flush<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        warmer: Option<&dyn CacheWarmer>,
    ) -> Result<()> {
        if self.pending() == 0 {
            return Ok(());
        }

        // Hash set iteration order is incidental; sort for reproducible
        // query shapes and logs.
        let mut albums: Vec<AlbumId> = self.albums.iter().cloned().collect();
        albums.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let mut artists: Vec<ArtistId> = self.artists.iter().cloned().collect();
        artists.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        tracing::debug!(
            albums = albums.len(),
            artists = artists.len(),
            "Flushing aggregate refresh buffer"
        );

        catalog.refresh_albums(&albums).await?;
        catalog.refresh_artists(&artists).await?;

        if let Some(warmer) = warmer {
            for id in &albums {
                warmer.add_album(id).await;
            }
        }

        self.albums.clear();
        self.artists.clear();

        Ok(())
    }
}

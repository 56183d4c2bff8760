//! Scan orchestrator
//!
//! Sequences the scan phases over one root folder:
//! load trees -> diff -> process deleted -> process changed -> flush
//! buffers -> import playlists -> catalog GC. Directories are processed
//! sequentially in sorted order; per-directory failures are logged and do
//! not abort the run. Consistency comes from convergent reconciliation:
//! an interrupted or partially failed scan is corrected by a later scan
//! re-observing the same directories as changed.

use crate::detector::detect_changes;
use crate::mapping::TrackMapper;
use crate::refresher::RefreshBuffer;
use crate::walker::{self, DirectoryInfo};
use crate::{Result, ScanError};
use chime_core::traits::{CacheWarmer, Catalog, MetadataExtractor, PlaylistImporter};
use chime_core::types::Track;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default number of files per metadata-extraction call
pub const METADATA_BATCH_SIZE: usize = 100;

/// Statistics from one scan run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCounters {
    /// Tracks added to the catalog
    pub added: u64,

    /// Tracks updated in place
    pub updated: u64,

    /// Tracks removed from the catalog
    pub deleted: u64,
}

impl ScanCounters {
    /// Total number of catalog mutations
    pub fn total(&self) -> u64 {
        self.added + self.updated + self.deleted
    }
}

/// Library synchronization engine for one root folder.
///
/// Reconciles the on-disk file tree with the catalog: tracks are the leaf
/// records, album/artist aggregates are recomputed through the refresh
/// buffer. One scanner instance owns one root; concurrent scans of the same
/// root must be serialized by the caller.
pub struct Scanner<C: Catalog> {
    root: PathBuf,
    root_str: String,
    catalog: Arc<C>,
    extractor: Arc<dyn MetadataExtractor>,
    cache_warmer: Option<Arc<dyn CacheWarmer>>,
    playlist_importer: Option<Arc<dyn PlaylistImporter>>,
    mapper: TrackMapper,
    batch_size: usize,
    // Instance state, not a process-wide latch: with one scanner per root
    // folder, each instance reports its unreadable paths once.
    first_scan_done: AtomicBool,
}

impl<C: Catalog> Scanner<C> {
    /// Create a scanner for a root folder
    pub fn new(
        root: impl Into<PathBuf>,
        catalog: Arc<C>,
        extractor: Arc<dyn MetadataExtractor>,
    ) -> Self {
        let root = root.into();
        let root_str = root.to_string_lossy().into_owned();
        let mapper = TrackMapper::new(root.clone());
        Self {
            root,
            root_str,
            catalog,
            extractor,
            cache_warmer: None,
            playlist_importer: None,
            mapper,
            batch_size: METADATA_BATCH_SIZE,
            first_scan_done: AtomicBool::new(false),
        }
    }

    /// Attach a cache warmer receiving album hints during flushes
    pub fn with_cache_warmer(mut self, warmer: Arc<dyn CacheWarmer>) -> Self {
        self.cache_warmer = Some(warmer);
        self
    }

    /// Attach a playlist importer invoked for changed directories that
    /// contain a playlist file
    pub fn with_playlist_importer(mut self, importer: Arc<dyn PlaylistImporter>) -> Self {
        self.playlist_importer = Some(importer);
        self
    }

    /// Override the metadata-extraction batch size
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The root folder this scanner reconciles
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run one scan against the given watermark.
    ///
    /// Returns an error only when the filesystem tree or the catalog's
    /// directory index cannot be loaded, or when cancelled; per-directory
    /// failures are logged and the run continues. Cancellation is checked
    /// between directory-level units of work, leaving whatever partial
    /// state was reached for the next scan to converge.
    pub async fn scan(
        &self,
        cancel: &CancellationToken,
        watermark: DateTime<Utc>,
    ) -> Result<ScanCounters> {
        let start = Instant::now();
        tracing::debug!(root = %self.root_str, %watermark, "Starting scan");

        // Phase: LoadTrees
        let tree = walker::load_directory_tree(&self.root)?;
        self.report_unreadable(&tree.unreadable);

        let known_dirs = self.catalog.known_folder_paths(&self.root_str).await?;

        // Phase: Diff
        let changes = detect_changes(&tree.directories, &known_dirs, watermark);
        if changes.is_empty() {
            tracing::debug!(root = %self.root_str, "No folder changes found");
            return Ok(ScanCounters::default());
        }

        tracing::info!(
            root = %self.root_str,
            num_changed = changes.changed.len(),
            num_deleted = changes.deleted.len(),
            "Folder changes found"
        );

        let mut counters = ScanCounters::default();
        let mut buffer = RefreshBuffer::new();

        // Phase: ProcessDeleted
        for dir in &changes.deleted {
            if cancel.is_cancelled() {
                tracing::warn!(root = %self.root_str, "Scan cancelled");
                return Err(ScanError::Cancelled);
            }
            if let Err(e) = self
                .process_deleted_dir(dir, &mut buffer, &mut counters)
                .await
            {
                tracing::error!("Failed to process deleted directory {}: {}", dir, e);
                continue;
            }
            if buffer.needs_flush() {
                self.flush_buffer(&mut buffer).await;
            }
        }
        self.flush_buffer(&mut buffer).await;

        // Phase: ProcessChanged
        for dir in &changes.changed {
            if cancel.is_cancelled() {
                tracing::warn!(root = %self.root_str, "Scan cancelled");
                return Err(ScanError::Cancelled);
            }
            if let Err(e) = self
                .process_changed_dir(dir, &mut buffer, &mut counters)
                .await
            {
                tracing::error!("Failed to process changed directory {}: {}", dir, e);
                continue;
            }
            if buffer.needs_flush() {
                self.flush_buffer(&mut buffer).await;
            }
        }

        // Phase: FlushBuffers
        self.flush_buffer(&mut buffer).await;
        if let Some(warmer) = &self.cache_warmer {
            warmer.flush().await;
        }

        // Phase: ImportPlaylists
        self.import_playlists(&changes.changed, &tree.directories)
            .await;

        // Phase: CatalogGC
        if let Err(e) = self.catalog.garbage_collect(&self.root_str).await {
            tracing::error!("Catalog garbage collection failed: {}", e);
        }

        tracing::info!(
            root = %self.root_str,
            added = counters.added,
            updated = counters.updated,
            deleted = counters.deleted,
            elapsed = ?start.elapsed(),
            "Scan finished"
        );

        Ok(counters)
    }

    fn report_unreadable(&self, unreadable: &[String]) {
        let first_scan = !self.first_scan_done.swap(true, Ordering::Relaxed);
        if unreadable.is_empty() {
            return;
        }
        if first_scan {
            tracing::warn!(
                root = %self.root_str,
                paths = ?unreadable,
                "Skipping unreadable paths"
            );
        } else {
            tracing::debug!(
                root = %self.root_str,
                paths = ?unreadable,
                "Skipping unreadable paths"
            );
        }
    }

    /// Reconcile one changed directory against its catalog records.
    async fn process_changed_dir(
        &self,
        dir: &str,
        buffer: &mut RefreshBuffer,
        counters: &mut ScanCounters,
    ) -> Result<()> {
        let start = Instant::now();

        // Working set of the directory's catalog records, keyed by path.
        // Touch every pre-existing record's aggregates, even unchanged
        // ones: side effects like a newly arrived cover-art file must be
        // reflected in the recomputation.
        let mut working: HashMap<String, Track> = HashMap::new();
        for track in self.catalog.tracks_in_folder(dir).await? {
            buffer.touch_track(&track);
            working.insert(track.path.clone(), track);
        }

        let on_disk = walker::list_audio_files(Path::new(dir))?;
        if on_disk.is_empty() && working.is_empty() {
            return Ok(());
        }

        tracing::trace!(
            dir,
            tracks_in_catalog = working.len(),
            files_on_disk = on_disk.len(),
            "Processing changed directory"
        );

        // Partition on-disk files into imports (new or newer than stored)
        // and matches; whatever remains in the working set is an orphan.
        let mut to_import: Vec<PathBuf> = Vec::new();
        let mut previous: HashMap<String, Track> = HashMap::new();
        for (path, mtime) in on_disk {
            let key = path.to_string_lossy().into_owned();
            match working.remove(&key) {
                None => to_import.push(path),
                Some(prior) => {
                    if mtime > prior.file_mtime {
                        to_import.push(path);
                        previous.insert(key, prior);
                    }
                }
            }
        }

        // Bounded batches keep any single extraction call within safe
        // argument limits. A failed batch is skipped; prior batches stay
        // committed and a later scan converges.
        for chunk in to_import.chunks(self.batch_size) {
            let extracted = match self.extractor.extract(chunk).await {
                Ok(extracted) => extracted,
                Err(e) => {
                    tracing::error!(
                        dir,
                        batch_len = chunk.len(),
                        "Metadata extraction failed for batch: {}",
                        e
                    );
                    continue;
                }
            };

            for metadata in &extracted {
                let mut track = self.mapper.to_track(metadata);
                let prior = previous.get(&track.path);
                if let Some(prior) = prior {
                    track.carry_annotations_from(prior);
                }
                match self.catalog.put_track(&track).await {
                    Ok(()) => {
                        if prior.is_some() {
                            counters.updated += 1;
                        } else {
                            counters.added += 1;
                        }
                        buffer.touch_track(&track);
                    }
                    Err(e) => {
                        tracing::error!("Failed to store track {}: {}", track.path, e);
                    }
                }
            }
        }

        // Orphans: catalog records with no matching on-disk file
        for track in working.values() {
            match self.catalog.delete_track(&track.id).await {
                Ok(()) => counters.deleted += 1,
                Err(e) => {
                    tracing::error!("Failed to delete orphaned track {}: {}", track.path, e);
                }
            }
        }

        tracing::debug!(dir, elapsed = ?start.elapsed(), "Finished processing changed directory");
        Ok(())
    }

    /// Purge all catalog records under a directory that no longer exists.
    async fn process_deleted_dir(
        &self,
        dir: &str,
        buffer: &mut RefreshBuffer,
        counters: &mut ScanCounters,
    ) -> Result<()> {
        let tracks = self.catalog.tracks_under_path(dir).await?;
        if tracks.is_empty() {
            return Ok(());
        }

        for track in &tracks {
            buffer.touch_track(track);
        }

        let removed = self.catalog.delete_tracks_under_path(dir).await?;
        counters.deleted += removed;

        tracing::debug!(dir, removed, "Purged deleted directory");
        Ok(())
    }

    async fn flush_buffer(&self, buffer: &mut RefreshBuffer) {
        if let Err(e) = buffer
            .flush(self.catalog.as_ref(), self.cache_warmer.as_deref())
            .await
        {
            tracing::error!("Failed to flush refresh buffer: {}", e);
        }
    }

    /// Invoke the playlist importer for changed directories flagged as
    /// containing a playlist file, once an administrator account exists.
    async fn import_playlists(
        &self,
        changed: &[String],
        tree: &BTreeMap<String, DirectoryInfo>,
    ) {
        let Some(importer) = &self.playlist_importer else {
            return;
        };

        let with_playlists: Vec<&String> = changed
            .iter()
            .filter(|dir| tree.get(*dir).is_some_and(|info| info.has_playlist))
            .collect();
        if with_playlists.is_empty() {
            return;
        }

        match self.catalog.has_admin_user().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("Skipping playlist import until an admin account exists");
                return;
            }
            Err(e) => {
                tracing::warn!("Could not check for admin account: {}", e);
                return;
            }
        }

        let mut imported = 0;
        for dir in with_playlists {
            imported += importer.process_playlists(Path::new(dir)).await;
        }
        if imported > 0 {
            tracing::info!(imported, "Imported playlists");
        }
    }
}

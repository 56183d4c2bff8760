//! End-to-end scan tests over a real SQLite catalog and on-disk trees
//!
//! Covers the reconciliation properties the engine guarantees: counter
//! exactness, idempotence, annotation preservation, deterministic identity,
//! aggregate refresh, orphan purge, and the playlist/cache-warming hooks.


use chime_scanner::{ScanCounters, Scanner, TrackMapper};
use chime_storage::SqliteCatalog;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::*;
use tokio_util::sync::CancellationToken;

struct Fixture {
    db: TestCatalog,
    music: TempDir,
    extractor: Arc<StubExtractor>,
    scanner: Scanner<SqliteCatalog>,
}

impl Fixture {
    async fn new() -> Self {
        let db = TestCatalog::new().await;
        let music = tempfile::tempdir().expect("Failed to create music dir");
        let extractor = Arc::new(StubExtractor::new());
        let catalog = Arc::new(SqliteCatalog::new(db.pool().clone()));
        let scanner = Scanner::new(music.path(), catalog, extractor.clone());

        Self {
            db,
            music,
            extractor,
            scanner,
        }
    }

    /// Write an audio file and register its tags with the stub extractor
    fn add_file(&self, rel: &str, spec: TagSpec) -> String {
        let path = self.music.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel.as_bytes()).unwrap();
        self.extractor.register(path.clone(), spec);
        path.to_string_lossy().into_owned()
    }

    async fn scan(&self) -> ScanCounters {
        self.scanner
            .scan(&CancellationToken::new(), epoch())
            .await
            .expect("scan failed")
    }

    /// Rewrite a stored record's mtime into the past so the on-disk file
    /// counts as newer on the next scan
    async fn backdate_stored_mtime(&self, path: &str) {
        let mut track = chime_storage::tracks::get_by_path(self.db.pool(), path)
            .await
            .unwrap()
            .expect("track to backdate");
        track.file_mtime -= chrono::Duration::hours(1);
        chime_storage::tracks::put(self.db.pool(), &track)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn first_scan_imports_and_refreshes_aggregates() {
    let fx = Fixture::new().await;
    fx.add_file("A/1.mp3", TagSpec::new("Z", "X", "Y"));

    let counters = fx.scan().await;
    assert_eq!(
        counters,
        ScanCounters {
            added: 1,
            updated: 0,
            deleted: 0
        }
    );

    let mapper = TrackMapper::new(fx.music.path());
    let album_id = mapper.album_id("X", "Y");
    let album = chime_storage::albums::get_by_id(fx.db.pool(), &album_id)
        .await
        .unwrap()
        .expect("album aggregate");
    assert_eq!(album.name, "Y");
    assert_eq!(album.artist, "X");
    assert_eq!(album.song_count, 1);

    let artists = chime_storage::artists::get_all(fx.db.pool()).await.unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].name, "X");
    assert_eq!(artists[0].song_count, 1);
}

#[tokio::test]
async fn rescan_with_same_watermark_counts_nothing() {
    let fx = Fixture::new().await;
    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    fx.add_file("A/2.mp3", TagSpec::new("Two", "X", "Y"));

    let first = fx.scan().await;
    assert_eq!(first.added, 2);

    // Same watermark, unchanged filesystem: the directory is re-selected
    // but the reconciler finds nothing newer and nothing orphaned.
    let second = fx.scan().await;
    assert_eq!(second, ScanCounters::default());
}

#[tokio::test]
async fn rescan_after_watermark_advance_short_circuits() {
    let fx = Fixture::new().await;
    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    fx.scan().await;

    // A watermark after every directory mtime yields an empty diff
    let counters = fx
        .scanner
        .scan(&CancellationToken::new(), chrono::Utc::now())
        .await
        .unwrap();
    assert_eq!(counters, ScanCounters::default());
}

#[tokio::test]
async fn counter_exactness_for_mixed_changes() {
    let fx = Fixture::new().await;
    let kept = fx.add_file("A/kept.mp3", TagSpec::new("Kept", "X", "Y"));
    let removed = fx.add_file("A/removed.mp3", TagSpec::new("Removed", "X", "Y"));
    fx.scan().await;

    // One new file, one stored record made stale, one file gone from disk
    fx.add_file("A/new.mp3", TagSpec::new("New", "X", "Y"));
    fx.backdate_stored_mtime(&kept).await;
    fs::remove_file(&removed).unwrap();

    let counters = fx.scan().await;
    assert_eq!(
        counters,
        ScanCounters {
            added: 1,
            updated: 1,
            deleted: 1
        }
    );
}

#[tokio::test]
async fn file_removed_from_surviving_directory_is_orphaned() {
    let fx = Fixture::new().await;
    let one = fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    fx.add_file("A/2.mp3", TagSpec::new("Two", "X", "Y"));
    fx.scan().await;

    fs::remove_file(&one).unwrap();
    let counters = fx.scan().await;
    assert_eq!(counters.deleted, 1);
    assert_eq!(counters.added, 0);

    // The aggregate reflects the purge
    let mapper = TrackMapper::new(fx.music.path());
    let album = chime_storage::albums::get_by_id(fx.db.pool(), &mapper.album_id("X", "Y"))
        .await
        .unwrap()
        .expect("album aggregate");
    assert_eq!(album.song_count, 1);
}

#[tokio::test]
async fn removed_directory_is_purged_and_aggregates_collected() {
    let fx = Fixture::new().await;
    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    fx.add_file("B/1.mp3", TagSpec::new("Other One", "W", "V"));
    fx.add_file("B/2.mp3", TagSpec::new("Other Two", "W", "V"));
    fx.scan().await;

    fs::remove_dir_all(fx.music.path().join("B")).unwrap();
    let counters = fx.scan().await;
    assert_eq!(counters.deleted, 2);

    let remaining = chime_storage::tracks::under_path(
        fx.db.pool(),
        &fx.music.path().to_string_lossy(),
    )
    .await
    .unwrap();
    assert_eq!(remaining.len(), 1);

    // Album V and artist W have no tracks left; GC removes them
    let mapper = TrackMapper::new(fx.music.path());
    assert!(
        chime_storage::albums::get_by_id(fx.db.pool(), &mapper.album_id("W", "V"))
            .await
            .unwrap()
            .is_none()
    );
    let artists = chime_storage::artists::get_all(fx.db.pool()).await.unwrap();
    assert!(artists.iter().all(|a| a.name != "W"));
}

#[tokio::test]
async fn annotations_survive_reimport() {
    let fx = Fixture::new().await;
    let path = fx.add_file("A/1.mp3", TagSpec::new("Original", "X", "Y"));
    fx.scan().await;

    let stored = chime_storage::tracks::get_by_path(fx.db.pool(), &path)
        .await
        .unwrap()
        .unwrap();
    chime_storage::tracks::set_rating(fx.db.pool(), &stored.id, 5)
        .await
        .unwrap();
    chime_storage::tracks::set_starred(fx.db.pool(), &stored.id, true)
        .await
        .unwrap();
    chime_storage::tracks::increment_play_count(fx.db.pool(), &stored.id)
        .await
        .unwrap();

    // Retag the file and make the stored record stale
    fx.extractor.register(
        Path::new(&path).to_path_buf(),
        TagSpec::new("Retitled", "X", "Y"),
    );
    fx.backdate_stored_mtime(&path).await;

    let counters = fx.scan().await;
    assert_eq!(counters.updated, 1);

    let reimported = chime_storage::tracks::get_by_path(fx.db.pool(), &path)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reimported.title, "Retitled");
    assert_eq!(reimported.annotations.rating, 5);
    assert!(reimported.annotations.starred);
    assert_eq!(reimported.annotations.play_count, 1);
    assert_eq!(reimported.created_at, stored.created_at);
}

#[tokio::test]
async fn track_identity_is_stable_across_scans() {
    let fx = Fixture::new().await;
    let path = fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    fx.scan().await;

    let before = chime_storage::tracks::get_by_path(fx.db.pool(), &path)
        .await
        .unwrap()
        .unwrap();

    fx.backdate_stored_mtime(&path).await;
    fx.scan().await;

    let after = chime_storage::tracks::get_by_path(fx.db.pool(), &path)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.id, after.id);
    assert_eq!(before.album_id, after.album_id);

    let all = chime_storage::tracks::under_path(
        fx.db.pool(),
        &fx.music.path().to_string_lossy(),
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn compilation_tracks_share_a_various_artists_album() {
    let fx = Fixture::new().await;
    let mut one = TagSpec::new("One", "Alpha", "Mixed");
    one.compilation = true;
    let mut two = TagSpec::new("Two", "Beta", "Mixed");
    two.compilation = true;
    fx.add_file("comp/1.mp3", one);
    fx.add_file("comp/2.mp3", two);

    fx.scan().await;

    let mapper = TrackMapper::new(fx.music.path());
    let album = chime_storage::albums::get_by_id(
        fx.db.pool(),
        &mapper.album_id(chime_scanner::mapping::VARIOUS_ARTISTS, "Mixed"),
    )
    .await
    .unwrap()
    .expect("compilation album");
    assert_eq!(album.artist, chime_scanner::mapping::VARIOUS_ARTISTS);
    assert_eq!(album.song_count, 2);

    // Track artists keep their own aggregate identities
    let artists = chime_storage::artists::get_all(fx.db.pool()).await.unwrap();
    let names: Vec<_> = artists.iter().map(|a| a.name.as_str()).collect();
    assert!(names.contains(&"Alpha"));
    assert!(names.contains(&"Beta"));
    assert!(names.contains(&chime_scanner::mapping::VARIOUS_ARTISTS));
}

#[tokio::test]
async fn cancelled_scan_stops_between_directories() {
    let fx = Fixture::new().await;
    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = fx.scanner.scan(&cancel, epoch()).await;
    assert!(matches!(result, Err(chime_scanner::ScanError::Cancelled)));

    // Nothing was imported before the first directory unit
    let tracks = chime_storage::tracks::under_path(
        fx.db.pool(),
        &fx.music.path().to_string_lossy(),
    )
    .await
    .unwrap();
    assert!(tracks.is_empty());
}

#[tokio::test]
async fn failed_extraction_batch_is_skipped_and_converges_later() {
    let fx = Fixture::new().await;
    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));

    fx.extractor.set_failing(true);
    let counters = fx.scan().await;
    assert_eq!(counters, ScanCounters::default());

    // The next scan with the same watermark picks the directory up again
    fx.extractor.set_failing(false);
    let counters = fx.scan().await;
    assert_eq!(counters.added, 1);
}

#[tokio::test]
async fn playlist_import_waits_for_admin_account() {
    let fx = Fixture::new().await;
    let importer = Arc::new(RecordingImporter::default());

    let catalog = Arc::new(SqliteCatalog::new(fx.db.pool().clone()));
    let scanner = Scanner::new(fx.music.path(), catalog, fx.extractor.clone())
        .with_playlist_importer(importer.clone());

    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    fs::write(fx.music.path().join("A/list.m3u"), b"1.mp3\n").unwrap();

    scanner.scan(&CancellationToken::new(), epoch()).await.unwrap();
    assert!(importer.dirs.lock().unwrap().is_empty());

    chime_storage::users::create(fx.db.pool(), "admin", true)
        .await
        .unwrap();

    scanner.scan(&CancellationToken::new(), epoch()).await.unwrap();
    let dirs = importer.dirs.lock().unwrap();
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].ends_with("A"));
}

#[tokio::test]
async fn cache_warmer_receives_flushed_albums() {
    let fx = Fixture::new().await;
    let warmer = Arc::new(RecordingWarmer::default());

    let catalog = Arc::new(SqliteCatalog::new(fx.db.pool().clone()));
    let scanner = Scanner::new(fx.music.path(), catalog, fx.extractor.clone())
        .with_cache_warmer(warmer.clone());

    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    scanner.scan(&CancellationToken::new(), epoch()).await.unwrap();

    let mapper = TrackMapper::new(fx.music.path());
    let albums = warmer.albums.lock().unwrap();
    assert!(albums.contains(&mapper.album_id("X", "Y")));
    assert!(warmer.flushed.load(std::sync::atomic::Ordering::Relaxed));
}

#[tokio::test]
async fn untagged_file_gets_placeholder_identities() {
    let fx = Fixture::new().await;
    let path = fx.add_file("loose/nameless.mp3", TagSpec::default());

    let counters = fx.scan().await;
    assert_eq!(counters.added, 1);

    let track = chime_storage::tracks::get_by_path(fx.db.pool(), &path)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(track.title, "loose/nameless");
    assert_eq!(track.artist, chime_scanner::mapping::UNKNOWN_ARTIST);
    assert_eq!(track.album, chime_scanner::mapping::UNKNOWN_ALBUM);

    let albums = chime_storage::albums::get_all(fx.db.pool()).await.unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].name, chime_scanner::mapping::UNKNOWN_ALBUM);
}

#[tokio::test]
async fn directory_with_only_images_is_never_selected() {
    let fx = Fixture::new().await;
    fx.add_file("A/1.mp3", TagSpec::new("One", "X", "Y"));
    let art_dir = fx.music.path().join("artwork");
    fs::create_dir_all(&art_dir).unwrap();
    fs::write(art_dir.join("cover.jpg"), b"jpg").unwrap();

    let counters = fx.scan().await;
    assert_eq!(counters.added, 1);

    // No catalog folder entry was ever created for the artwork directory
    let folders = chime_storage::tracks::known_folder_paths(
        fx.db.pool(),
        &fx.music.path().to_string_lossy(),
    )
    .await
    .unwrap();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].ends_with("A"));
}

//! Integration tests for album/artist aggregate recomputation
//!
//! Aggregates are pure functions of their constituent tracks at refresh
//! time; these tests pin the recompute semantics the scan engine relies on.


use chime_core::types::*;
use test_helpers::*;

#[tokio::test]
async fn album_refresh_aggregates_tracks() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let mut one = make_track("/music/A/1.mp3", "One", "Artist X", "Album Y");
    one.year = Some(1999);
    one.duration_seconds = 100.0;
    let mut two = make_track("/music/A/2.mp3", "Two", "Artist X", "Album Y");
    two.year = Some(2004);
    two.duration_seconds = 140.0;
    two.has_cover_art = true;

    chime_storage::tracks::put(pool, &one).await.unwrap();
    chime_storage::tracks::put(pool, &two).await.unwrap();

    chime_storage::albums::refresh(pool, &[one.album_id.clone()])
        .await
        .unwrap();

    let album = chime_storage::albums::get_by_id(pool, &one.album_id)
        .await
        .unwrap()
        .expect("album row");
    assert_eq!(album.name, "Album Y");
    assert_eq!(album.artist, "Artist X");
    assert_eq!(album.artist_id, one.album_artist_id);
    assert_eq!(album.song_count, 2);
    assert!((album.duration_seconds - 240.0).abs() < f64::EPSILON);
    assert_eq!(album.min_year, Some(1999));
    assert_eq!(album.max_year, Some(2004));
    assert!(album.has_cover_art);
}

#[tokio::test]
async fn album_refresh_is_idempotent() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let track = make_track("/music/A/1.mp3", "One", "Artist X", "Album Y");
    chime_storage::tracks::put(pool, &track).await.unwrap();

    chime_storage::albums::refresh(pool, &[track.album_id.clone()])
        .await
        .unwrap();
    let first = chime_storage::albums::get_by_id(pool, &track.album_id)
        .await
        .unwrap()
        .unwrap();

    chime_storage::albums::refresh(pool, &[track.album_id.clone()])
        .await
        .unwrap();
    let second = chime_storage::albums::get_by_id(pool, &track.album_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.song_count, second.song_count);
    assert_eq!(first.duration_seconds, second.duration_seconds);
    assert_eq!(first.created_at, second.created_at);
}

#[tokio::test]
async fn album_refresh_follows_track_deletion() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let one = make_track("/music/A/1.mp3", "One", "Artist X", "Album Y");
    let two = make_track("/music/A/2.mp3", "Two", "Artist X", "Album Y");
    chime_storage::tracks::put(pool, &one).await.unwrap();
    chime_storage::tracks::put(pool, &two).await.unwrap();

    chime_storage::albums::refresh(pool, &[one.album_id.clone()])
        .await
        .unwrap();

    chime_storage::tracks::delete(pool, &two.id).await.unwrap();
    chime_storage::albums::refresh(pool, &[one.album_id.clone()])
        .await
        .unwrap();

    let album = chime_storage::albums::get_by_id(pool, &one.album_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(album.song_count, 1);
}

#[tokio::test]
async fn refresh_with_no_tracks_creates_nothing() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let missing = AlbumId::new("no-such-album");
    chime_storage::albums::refresh(pool, &[missing.clone()])
        .await
        .unwrap();

    let album = chime_storage::albums::get_by_id(pool, &missing)
        .await
        .unwrap();
    assert!(album.is_none());
}

#[tokio::test]
async fn artist_refresh_counts_both_roles_once() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    // Artist X appears as both track artist and album artist on each track
    let one = make_track("/music/A/1.mp3", "One", "Artist X", "Album Y");
    let two = make_track("/music/A/2.mp3", "Two", "Artist X", "Album Y");
    chime_storage::tracks::put(pool, &one).await.unwrap();
    chime_storage::tracks::put(pool, &two).await.unwrap();

    chime_storage::artists::refresh(pool, &[one.artist_id.clone()])
        .await
        .unwrap();

    let artist = chime_storage::artists::get_by_id(pool, &one.artist_id)
        .await
        .unwrap()
        .expect("artist row");
    assert_eq!(artist.name, "Artist X");
    assert_eq!(artist.song_count, 2);
    assert_eq!(artist.album_count, 1);
}

#[tokio::test]
async fn garbage_collect_removes_empty_aggregates() {
    use chime_core::traits::Catalog;

    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let track = make_track("/music/A/1.mp3", "One", "Artist X", "Album Y");
    chime_storage::tracks::put(pool, &track).await.unwrap();
    chime_storage::albums::refresh(pool, &[track.album_id.clone()])
        .await
        .unwrap();
    chime_storage::artists::refresh(pool, &[track.artist_id.clone()])
        .await
        .unwrap();

    chime_storage::tracks::delete(pool, &track.id).await.unwrap();

    let catalog = chime_storage::SqliteCatalog::new(pool.clone());
    catalog.garbage_collect("/music").await.unwrap();

    assert!(chime_storage::albums::get_by_id(pool, &track.album_id)
        .await
        .unwrap()
        .is_none());
    assert!(chime_storage::artists::get_by_id(pool, &track.artist_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn garbage_collect_keeps_referenced_aggregates() {
    use chime_core::traits::Catalog;

    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let track = make_track("/music/A/1.mp3", "One", "Artist X", "Album Y");
    chime_storage::tracks::put(pool, &track).await.unwrap();
    chime_storage::albums::refresh(pool, &[track.album_id.clone()])
        .await
        .unwrap();

    let catalog = chime_storage::SqliteCatalog::new(pool.clone());
    catalog.garbage_collect("/music").await.unwrap();

    assert!(chime_storage::albums::get_by_id(pool, &track.album_id)
        .await
        .unwrap()
        .is_some());
}

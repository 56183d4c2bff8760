use crate::{albums, artists, tracks, users};
use async_trait::async_trait;
use chime_core::error::Result;
use chime_core::traits::Catalog;
use chime_core::types::*;
use sqlx::SqlitePool;

/// `SQLite`-backed catalog repository
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn tracks_in_folder(&self, dir: &str) -> Result<Vec<Track>> {
        tracks::in_folder(&self.pool, dir).await
    }

    async fn tracks_under_path(&self, path: &str) -> Result<Vec<Track>> {
        tracks::under_path(&self.pool, path).await
    }

    async fn put_track(&self, track: &Track) -> Result<()> {
        tracks::put(&self.pool, track).await
    }

    async fn delete_track(&self, id: &TrackId) -> Result<()> {
        tracks::delete(&self.pool, id).await
    }

    async fn delete_tracks_under_path(&self, path: &str) -> Result<u64> {
        tracks::delete_under_path(&self.pool, path).await
    }

    async fn known_folder_paths(&self, root: &str) -> Result<Vec<String>> {
        tracks::known_folder_paths(&self.pool, root).await
    }

    async fn refresh_albums(&self, ids: &[AlbumId]) -> Result<()> {
        albums::refresh(&self.pool, ids).await
    }

    async fn refresh_artists(&self, ids: &[ArtistId]) -> Result<()> {
        artists::refresh(&self.pool, ids).await
    }

    async fn garbage_collect(&self, root: &str) -> Result<()> {
        let removed_albums = albums::purge_empty(&self.pool).await?;
        let removed_artists = artists::purge_empty(&self.pool).await?;

        if removed_albums + removed_artists > 0 {
            tracing::debug!(
                root,
                removed_albums,
                removed_artists,
                "Purged empty aggregates"
            );
        }

        Ok(())
    }

    async fn has_admin_user(&self) -> Result<bool> {
        users::has_admin(&self.pool).await
    }
}

//! Chime Storage
//!
//! `SQLite` catalog layer for the Chime media server.
//!
//! This crate persists tracks and their derived album/artist aggregates.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each entity owns its own queries (`tracks`,
//!   `albums`, `artists`, `users`, `scan_state`)
//! - **Recompute-only aggregates**: album and artist rows are only written
//!   by the refresh operations, and removed by the garbage-collection pass
//!   once no track references them
//! - **Durable leaf writes**: track writes are individual upserts; the scan
//!   engine relies on convergent reconciliation, not transactions
//!
//! # Example
//!
//! ```rust,no_run
//! use chime_storage::{create_pool, run_migrations, SqliteCatalog};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://chime.db").await?;
//! run_migrations(&pool).await?;
//!
//! let catalog = SqliteCatalog::new(pool);
//! # Ok(())
//! # }
//! ```

mod catalog;
mod error;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod tracks;
pub mod users;

// Scan bookkeeping
pub mod scan_state;

pub use catalog::SqliteCatalog;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into the binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://chime.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("Connected to {}", database_url);

    Ok(pool)
}

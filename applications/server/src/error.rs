//! Server error types

use thiserror::Error;

/// Result type alias using `ServerError`
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors surfaced by the scan service
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] chime_core::ChimeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Scan error: {0}")]
    Scan(#[from] chime_scanner::ScanError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

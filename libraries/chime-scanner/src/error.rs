//! Error types for the scan engine

use thiserror::Error;

/// Errors that abort an entire scan run.
///
/// Per-directory failures are not represented here; the orchestrator logs
/// them and continues with the next directory.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to load directory tree: {0}")]
    TreeLoad(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] chime_core::ChimeError),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

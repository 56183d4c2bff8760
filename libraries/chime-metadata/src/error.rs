//! Error types for metadata extraction

use thiserror::Error;

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to parse the audio file
    #[error("Parse error: {0}")]
    ParseError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MetadataError> for chime_core::ChimeError {
    fn from(err: MetadataError) -> Self {
        chime_core::ChimeError::metadata(err.to_string())
    }
}

//! Chime Metadata
//!
//! Tag and audio-property extraction for the Chime scan engine, backed by
//! the lofty library. Implements the `MetadataExtractor` collaborator trait
//! consumed by `chime-scanner`.

mod error;
mod extractor;

pub use error::MetadataError;
pub use extractor::LoftyExtractor;

//! Chime Core
//!
//! Platform-agnostic domain types, collaborator traits, and error handling
//! for the Chime media server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Album`, `Artist` and their identifiers
//! - **Collaborator Traits**: `Catalog`, `MetadataExtractor`, `CacheWarmer`,
//!   `PlaylistImporter`
//! - **Error Handling**: Unified `ChimeError` and `Result` types
//!
//! Albums and artists are aggregates: pure functions of their constituent
//! tracks, recomputed through the catalog's refresh operations and never
//! mutated directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ChimeError, Result};
pub use traits::{CacheWarmer, Catalog, MetadataExtractor, PlaylistImporter};

// Export all types
pub use types::{
    Album, AlbumId, Artist, ArtistId, AudioMetadata, Track, TrackAnnotations, TrackId,
};

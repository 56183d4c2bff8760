//! Chime Scanner
//!
//! The library synchronization engine: reconciles the authoritative on-disk
//! file tree of a root folder with the persisted catalog (tracks, albums,
//! artists) incrementally and idempotently, without global locks.
//!
//! # Architecture
//!
//! - `walker`: directory tree loading with aggregate mtimes and content flags
//! - `detector`: watermark-based diff into changed/deleted directory sets
//! - `mapping`: raw metadata into catalog tracks with derived identifiers
//! - `refresher`: batched album/artist aggregate-recompute buffer
//! - `scanner`: phase orchestration, folder reconciliation, orphan purge
//!
//! A scan run is triggered externally with a watermark timestamp; the
//! engine does not self-schedule. Consistency is convergent: per-record
//! writes are individually durable, and a partially failed or cancelled
//! run is corrected when a later scan re-observes the affected directories
//! as changed.

mod error;

// Core modules
pub mod detector;
pub mod mapping;
pub mod refresher;
pub mod scanner;
pub mod walker;

pub use detector::{detect_changes, ChangeSet};
pub use error::ScanError;
pub use mapping::TrackMapper;
pub use refresher::RefreshBuffer;
pub use scanner::{ScanCounters, Scanner};
pub use walker::{DirectoryInfo, DirectoryTree};

/// Re-export of the crate-wide result type
pub type Result<T> = std::result::Result<T, ScanError>;

//! Diff engine
//!
//! Compares the live directory tree against the catalog's known directory
//! set and a watermark timestamp, partitioning into changed and deleted
//! directories. Output order is sorted so downstream processing and test
//! assertions are reproducible.

use crate::walker::DirectoryInfo;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

/// Sorted, deduplicated result of a directory diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Directories that are new to the catalog or modified after the watermark
    pub changed: Vec<String>,

    /// Directories the catalog knows that no longer exist on disk
    pub deleted: Vec<String>,
}

impl ChangeSet {
    /// Whether the diff found nothing to do
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }
}

/// Partition the live tree against the catalog's directory set.
///
/// A directory is `changed` when it is new to the catalog or its aggregate
/// modification time is after the watermark. Directories with no audio
/// files and no catalog presence are never candidates, so folders holding
/// only images or playlists cause no churn. A directory is `deleted` when
/// the catalog references it but the live tree does not contain it.
pub fn detect_changes(
    tree: &BTreeMap<String, DirectoryInfo>,
    known_dirs: &[String],
    watermark: DateTime<Utc>,
) -> ChangeSet {
    let known: HashSet<&str> = known_dirs.iter().map(String::as_str).collect();

    let mut changed: Vec<String> = tree
        .values()
        .filter(|info| {
            let in_catalog = known.contains(info.path.as_str());
            if !in_catalog && !info.has_audio {
                return false;
            }
            !in_catalog || info.last_modified > watermark
        })
        .map(|info| info.path.clone())
        .collect();

    let mut deleted: Vec<String> = known_dirs
        .iter()
        .filter(|dir| !tree.contains_key(*dir))
        .cloned()
        .collect();

    // Set iteration order is incidental; sort before anything downstream
    // depends on it.
    changed.sort();
    changed.dedup();
    deleted.sort();
    deleted.dedup();

    ChangeSet { changed, deleted }
}

//! Directory tree loading
//!
//! Walks a root folder and produces, for every directory, an aggregate
//! modification time (the directory itself or its newest non-directory
//! child) plus flags for audio and playlist content. The diff engine
//! compares this snapshot against the catalog's known directory set.

use crate::{Result, ScanError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported audio file extensions
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac", "wma"];

/// Recognized playlist file extensions
pub const PLAYLIST_EXTENSIONS: &[&str] = &["m3u", "m3u8"];

/// Scan-scoped snapshot of one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryInfo {
    /// Normalized directory path
    pub path: String,

    /// The directory's own mtime or its newest non-directory child's,
    /// whichever is newer
    pub last_modified: DateTime<Utc>,

    /// Whether the directory directly contains audio files
    pub has_audio: bool,

    /// Whether the directory directly contains a playlist file
    pub has_playlist: bool,
}

/// Result of walking a root folder
#[derive(Debug, Default)]
pub struct DirectoryTree {
    /// Directory snapshots keyed by normalized path (sorted)
    pub directories: BTreeMap<String, DirectoryInfo>,

    /// Paths the walk could not descend into
    pub unreadable: Vec<String>,
}

/// Check if a file has a supported audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if a file has a recognized playlist extension
pub fn is_playlist_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PLAYLIST_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn modified_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Walk `root` and snapshot every directory in it.
///
/// Hidden entries are skipped and symbolic links are not followed.
/// Unreadable subdirectories are collected in the report rather than
/// failing the walk; an unreadable root is a fatal error.
pub fn load_directory_tree(root: &Path) -> Result<DirectoryTree> {
    let mut tree = DirectoryTree::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root.to_string_lossy().into_owned());
                tree.unreadable.push(path);
                continue;
            }
        };

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(_) => {
                tree.unreadable
                    .push(entry.path().to_string_lossy().into_owned());
                continue;
            }
        };
        let mtime = modified_time(&meta);

        if meta.is_dir() {
            let path = entry.path().to_string_lossy().into_owned();
            tree.directories
                .entry(path.clone())
                .and_modify(|info| info.last_modified = info.last_modified.max(mtime))
                .or_insert(DirectoryInfo {
                    path,
                    last_modified: mtime,
                    has_audio: false,
                    has_playlist: false,
                });
        } else {
            // Non-directory entries roll up into their parent's snapshot
            let Some(parent) = entry.path().parent() else {
                continue;
            };
            let parent_path = parent.to_string_lossy().into_owned();
            let info = tree
                .directories
                .entry(parent_path.clone())
                .or_insert(DirectoryInfo {
                    path: parent_path,
                    last_modified: mtime,
                    has_audio: false,
                    has_playlist: false,
                });
            info.last_modified = info.last_modified.max(mtime);
            info.has_audio |= is_audio_file(entry.path());
            info.has_playlist |= is_playlist_file(entry.path());
        }
    }

    let root_path = root.to_string_lossy().into_owned();
    if !tree.directories.contains_key(&root_path) {
        return Err(ScanError::TreeLoad(format!(
            "root folder {} is not readable",
            root.display()
        )));
    }

    Ok(tree)
}

/// List the audio files directly inside `dir` with their mtimes.
///
/// Hidden files and non-audio extensions are skipped; subdirectories are
/// not descended into (they have their own snapshot entries).
pub fn list_audio_files(dir: &Path) -> Result<Vec<(PathBuf, DateTime<Utc>)>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if is_hidden(&path) || !is_audio_file(&path) {
            continue;
        }
        let meta = entry.metadata()?;
        if meta.is_dir() {
            continue;
        }

        files.push((path, modified_time(&meta)));
    }

    files.sort();
    Ok(files)
}

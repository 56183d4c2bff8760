/// Metadata extractor implementation using lofty
use crate::error::MetadataError;
use async_trait::async_trait;
use chime_core::traits::MetadataExtractor;
use chime_core::types::AudioMetadata;
use chrono::{DateTime, Utc};
use lofty::{Accessor, AudioFile, ItemKey, Probe, TaggedFileExt};
use std::path::{Path, PathBuf};

/// Metadata extractor backed by the lofty library.
///
/// Extraction is batched by the scanner; within a batch, files that cannot
/// be parsed are logged and skipped so one corrupt file does not hide the
/// rest of its directory.
pub struct LoftyExtractor;

impl LoftyExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    fn extract_file(path: &Path) -> Result<AudioMetadata, MetadataError> {
        let fs_meta = std::fs::metadata(path)?;
        let file_mtime = fs_meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let tagged_file = Probe::open(path)
            .map_err(|e| MetadataError::ParseError(e.to_string()))?
            .read()
            .map_err(|e| MetadataError::ParseError(e.to_string()))?;

        let properties = tagged_file.properties();
        let duration_seconds = properties.duration().as_secs_f64();
        let bit_rate = properties.audio_bitrate();

        // Prefer the primary tag (ID3v2 for MP3, Vorbis for OGG/FLAC)
        let tag = tagged_file.primary_tag().or(tagged_file.first_tag());

        let mut metadata = AudioMetadata {
            path: path.to_path_buf(),
            size: fs_meta.len(),
            file_mtime,
            suffix: path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_lowercase())
                .unwrap_or_default(),
            duration_seconds,
            bit_rate,
            ..Default::default()
        };

        if let Some(tag) = tag {
            metadata.title = tag.title().map(|s| s.to_string());
            metadata.artist = tag.artist().map(|s| s.to_string());
            metadata.album = tag.album().map(|s| s.to_string());
            metadata.album_artist = tag
                .get_string(&ItemKey::AlbumArtist)
                .map(|s| s.to_string());
            metadata.compilation = tag
                .get_string(&ItemKey::FlagCompilation)
                .map(|v| v == "1")
                .unwrap_or(false);
            metadata.genre = tag.genre().map(|s| s.to_string());
            metadata.year = tag.year().map(|y| y as i32);
            metadata.track_number = tag.track();
            metadata.disc_number = tag.disk();
            metadata.has_cover_art = !tag.pictures().is_empty();
        }

        Ok(metadata)
    }
}

impl Default for LoftyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataExtractor for LoftyExtractor {
    async fn extract(&self, paths: &[PathBuf]) -> chime_core::Result<Vec<AudioMetadata>> {
        let mut extracted = Vec::with_capacity(paths.len());

        for path in paths {
            match Self::extract_file(path) {
                Ok(metadata) => extracted.push(metadata),
                Err(e) => {
                    tracing::warn!("Failed to extract metadata from {:?}: {}", path, e);
                }
            }
        }

        Ok(extracted)
    }
}

/// Scan service configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_scanner")]
    pub scanner: ScannerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerSettings {
    /// Root folder of the music library
    pub music_folder: PathBuf,

    /// Seconds between scheduled scan triggers
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Files per metadata-extraction batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl ServerConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        // Load from config file if it exists
        let config_path = PathBuf::from("chime.toml");
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        // Override with environment variables (prefixed with CHIME_)
        settings = settings.add_source(
            config::Environment::with_prefix("CHIME")
                .separator("_")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scanner.music_folder.as_os_str().is_empty() {
            return Err(ServerError::Config(
                "Music folder is required (set CHIME_SCANNER_MUSIC_FOLDER)".to_string(),
            ));
        }

        if self.scanner.batch_size == 0 {
            return Err(ServerError::Config(
                "Scanner batch size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/chime.db".to_string()
}

fn default_scanner() -> ScannerSettings {
    ScannerSettings {
        music_folder: PathBuf::new(),
        interval_seconds: default_interval_seconds(),
        batch_size: default_batch_size(),
    }
}

fn default_interval_seconds() -> u64 {
    300
}

fn default_batch_size() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            scanner: default_scanner(),
        }
    }
}

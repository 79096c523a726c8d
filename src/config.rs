//! Configuration for keytrace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration.
///
/// Holds the capture-machine defaults so plot and replay runs do not have to
/// repeat them on the command line. CLI flags override any of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// TSC frequency of the capturing machine, in GHz
    pub cpu_freq_ghz: f64,

    /// Width of one presence bucket, in milliseconds
    pub bucket_ms: u64,

    /// Number of buckets in the observation window
    pub bucket_count: usize,

    /// Directory for rendered charts
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keytrace");

        Self {
            cpu_freq_ghz: 3.4,
            bucket_ms: 10,
            bucket_count: 10_000,
            export_path: data_dir.join("exports"),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults if
    /// it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
            let config: Config =
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keytrace")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Ticks per presence bucket at the configured frequency and width.
    ///
    /// A GHz machine produces `freq * 1e6` ticks per millisecond.
    pub fn ticks_per_bucket(&self) -> f64 {
        self.cpu_freq_ghz * 1e6 * self.bucket_ms as f64
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}

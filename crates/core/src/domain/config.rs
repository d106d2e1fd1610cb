//! Configuration management for Neurofilt
//!
//! This module provides:
//! - [`PipelineConfig`], the settings of a filtering run
//! - TOML load/save of that configuration
//! - Resolution of the per-user default config file

use crate::domain::deadline::DEFAULT_BUDGET_US;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Settings of one filtering run
///
/// Every field has a default, so a partial TOML file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-frame processing budget in microseconds
    pub realtime_budget_us: u64,

    /// Raw recording read when no input path is given
    pub input_path: PathBuf,

    /// Filtered stream written when no output path is given
    pub output_path: PathBuf,

    /// Number of leading frames shown by the preview utility
    pub preview_frames: usize,

    /// Acquisition rate, used by frequency response analysis only
    pub sample_rate_hz: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            realtime_budget_us: DEFAULT_BUDGET_US,
            input_path: PathBuf::from("../data/neural_data_256ch_16b.dat"),
            output_path: PathBuf::from("../data/filtered_neural_data.dat"),
            preview_frames: 10,
            sample_rate_hz: 32_000.0,
        }
    }
}

impl PipelineConfig {
    /// Name of the config file inside the config directory
    pub const FILE_NAME: &'static str = "config.toml";

    pub fn realtime_budget(&self) -> Duration {
        Duration::from_micros(self.realtime_budget_us)
    }

    /// Reject values no run could use
    pub fn validate(&self) -> Result<()> {
        if self.realtime_budget_us == 0 {
            return Err(ConfigError::Invalid(
                "realtime_budget_us must be greater than zero".to_string(),
            ));
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sample_rate_hz must be a positive number, got {}",
                self.sample_rate_hz
            )));
        }
        Ok(())
    }

    /// Load configuration from TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        debug!(?config, "Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to TOML file
    #[instrument(skip(self, path))]
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving configuration");

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).await?;

        debug!("Configuration saved successfully");
        Ok(())
    }

    /// Per-user config file, e.g. `~/.config/neurofilt/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("neurofilt").join(Self::FILE_NAME))
    }

    /// Load `path` if given, else the per-user file if it exists, else
    /// defaults.
    #[instrument]
    pub async fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path).await;
        }

        match Self::default_config_path() {
            Ok(default_path) if default_path.exists() => Self::load_from_file(default_path).await,
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

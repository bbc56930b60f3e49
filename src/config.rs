//! Configuration file handling for frame-grabber.
//!
//! Loads configuration from `~/.config/frame-grabber/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::GrabberSettings;
use crate::snapshot::SnapshotPolicy;

/// Configuration file structure for frame-grabber.
/// Loaded from ~/.config/frame-grabber/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
}

#[derive(Debug, Deserialize, Default)]
pub struct SnapshotConfig {
    /// File that receives a copy of every frame handed out by `read()`
    #[serde(default)]
    pub recent_image: Option<PathBuf>,
    /// Minimum gap between two snapshot writes, in milliseconds
    #[serde(default)]
    pub min_interval_ms: Option<u64>,
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            config.validate(&path)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Reject settings that can only fail later, at snapshot time.
    fn validate(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(recent) = self.snapshot.recent_image.as_deref() {
            if recent.is_dir() {
                return Err(ConfigError::InvalidSnapshotPath {
                    path: config_path.to_path_buf(),
                    recent_image: recent.to_path_buf(),
                });
            }
            log::debug!("Debug snapshots go to {}", recent.display());
        }
        Ok(())
    }

    /// Snapshot policy described by the `[snapshot]` section.
    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        SnapshotPolicy {
            path: self.snapshot.recent_image.clone(),
            min_interval: self.snapshot.min_interval_ms.map(Duration::from_millis),
        }
    }

    /// Grabber settings for the configured device.
    pub fn grabber_settings(&self) -> GrabberSettings {
        GrabberSettings::new(self.camera.device).with_snapshot(self.snapshot_policy())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// `recent_image` names a directory, not a file
    InvalidSnapshotPath {
        path: PathBuf,
        recent_image: PathBuf,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidSnapshotPath { path, recent_image } => {
                write!(
                    f,
                    "Invalid config file '{}': recent_image '{}' is a directory",
                    path.display(),
                    recent_image.display()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidSnapshotPath { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("frame-grabber").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/frame-grabber/config.toml")
        })
}

//! Global configuration management
//!
//! Reads and manages settings from `config.toml` in the config directory:
//! where artifacts are stored and how the write-behind cache is paced.

use crate::core::write_behind::WriteBehindConfig;
use crate::infra::dirs::CacheDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to write config file
    #[error("Failed to write config file '{path}': {error}")]
    WriteError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for pkgcache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Write-behind pacing
    #[serde(default)]
    pub write_behind: WriteBehindSettings,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Artifact root override
    pub root: Option<PathBuf>,
}

/// Write-behind pacing overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteBehindSettings {
    /// Drain period in milliseconds
    pub drain_interval_ms: Option<u64>,

    /// Buffer poll interval in milliseconds
    pub poll_interval_ms: Option<u64>,

    /// Polls `stop()` waits for the buffer to drain
    pub stop_watchdog: Option<u32>,

    /// Polls a non-waiting `sync()` performs
    pub sync_watchdog: Option<u32>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GlobalConfigError::ParseError` if the config file exists but
    /// contains invalid TOML.
    pub fn load(dirs: &CacheDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        config.validate().map_err(|error| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error,
        })?;
        Ok(config)
    }

    /// Reject zero intervals, which would make the drain thread spin
    fn validate(&self) -> Result<(), String> {
        let settings = &self.write_behind;
        for (name, value) in [
            ("drain_interval_ms", settings.drain_interval_ms),
            ("poll_interval_ms", settings.poll_interval_ms),
        ] {
            if value == Some(0) {
                return Err(format!("write_behind.{name} must be greater than zero"));
            }
        }
        Ok(())
    }

    /// Save global configuration to the config directory
    pub fn save(&self, dirs: &CacheDirs) -> Result<(), GlobalConfigError> {
        self.save_to_path(&dirs.global_config_path())
    }

    /// Save global configuration to a specific path
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to_path(&self, path: &Path) -> Result<(), GlobalConfigError> {
        let write_err = |p: &Path, e: std::io::Error| GlobalConfigError::WriteError {
            path: p.display().to_string(),
            error: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| write_err(path, e))
    }

    /// Artifact root, falling back to the platform cache directory
    pub fn storage_root(&self, dirs: &CacheDirs) -> PathBuf {
        self.storage.root.clone().unwrap_or_else(|| dirs.dump_dir())
    }

    /// Write-behind timing with overrides applied
    pub fn write_behind_config(&self) -> WriteBehindConfig {
        let defaults = WriteBehindConfig::default();
        let settings = &self.write_behind;
        WriteBehindConfig {
            drain_period: settings
                .drain_interval_ms
                .map_or(defaults.drain_period, Duration::from_millis),
            poll_interval: settings
                .poll_interval_ms
                .map_or(defaults.poll_interval, Duration::from_millis),
            stop_watchdog: settings.stop_watchdog.unwrap_or(defaults.stop_watchdog),
            sync_watchdog: settings.sync_watchdog.unwrap_or(defaults.sync_watchdog),
        }
        .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_default_timing() {
        let config = GlobalConfig::default();
        assert_eq!(config.write_behind_config(), WriteBehindConfig::default());
    }

    #[test]
    fn test_partial_overrides() {
        let config: GlobalConfig = toml::from_str(
            r"
[write_behind]
drain_interval_ms = 250
stop_watchdog = 8
",
        )
        .unwrap();

        let timing = config.write_behind_config();
        assert_eq!(timing.drain_period, Duration::from_millis(250));
        assert_eq!(timing.poll_interval, WriteBehindConfig::default().poll_interval);
        assert_eq!(timing.stop_watchdog, 8);
        assert_eq!(timing.sync_watchdog, 40);
    }

    #[test]
    fn test_zero_intervals_are_clamped_when_built_in_code() {
        let mut config = GlobalConfig::default();
        config.write_behind.drain_interval_ms = Some(0);
        config.write_behind.poll_interval_ms = Some(0);

        let timing = config.write_behind_config();
        assert_eq!(timing.drain_period, Duration::from_millis(1));
        assert_eq!(timing.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_storage_root_falls_back_to_dump_dir() {
        let dirs = CacheDirs::with_paths(PathBuf::from("/c"), PathBuf::from("/cfg"));
        let mut config = GlobalConfig::default();
        assert_eq!(config.storage_root(&dirs), PathBuf::from("/c/dumps"));

        config.storage.root = Some(PathBuf::from("/srv/dumps"));
        assert_eq!(config.storage_root(&dirs), PathBuf::from("/srv/dumps"));
    }
}

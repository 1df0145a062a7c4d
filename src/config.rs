//! Application configuration
//!
//! Provides centralized configuration for drafts, capture and playback.

use crate::{ProseError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the whole application
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How often tracked drafts are saved, in milliseconds
    pub autosave_interval_ms: u64,

    /// Save drafts when the window loses focus
    pub save_on_blur: bool,

    /// Save drafts right before the application exits
    pub save_before_unload: bool,

    /// Number of past drafts kept per key (0 disables history)
    pub draft_history_limit: usize,

    /// Maximum number of recorded sessions kept
    pub recordings_limit: usize,

    /// Seconds moved by the arrow-key seek shortcuts
    pub seek_step_secs: f64,

    /// Volume for a freshly created player (0.0 to 1.0)
    pub default_volume: f32,

    /// Maximum number of notices kept on screen
    pub notice_limit: usize,

    /// Directory holding the durable store. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: 30_000,
            save_on_blur: true,
            save_before_unload: true,
            draft_history_limit: 5,
            recordings_limit: 20,
            seek_step_secs: 5.0,
            default_volume: 0.8,
            notice_limit: 20,
            data_dir: dirs::data_dir().map(|dir| dir.join("prose-pause")),
        }
    }
}

impl AppConfig {
    /// Load a configuration from a TOML file. Missing fields use defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProseError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            ProseError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Where the desktop app looks for its configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prose-pause").join("config.toml"))
    }

    /// Keep all state in memory
    pub fn in_memory(mut self) -> Self {
        self.data_dir = None;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_recordings_limit(mut self, limit: usize) -> Self {
        self.recordings_limit = limit;
        self
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.autosave_interval_ms == 0 {
            return Err(ProseError::ConfigError(
                "autosave_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.recordings_limit == 0 {
            return Err(ProseError::ConfigError(
                "recordings_limit must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(ProseError::ConfigError(format!(
                "default_volume must be between 0 and 1, got {}",
                self.default_volume
            )));
        }

        if !(self.seek_step_secs > 0.0) {
            return Err(ProseError::ConfigError(
                "seek_step_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

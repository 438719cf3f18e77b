//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{ClaimError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(ClaimError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ClaimError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| ClaimError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ClaimError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_file_name` must be a plain, non-empty file name
    /// - `lock_stale_minutes`, when set, must be positive
    /// - `lock_poll_max_ms` must be positive
    /// - `event_log`, when set, must be non-empty
    pub fn validate(&self) -> Result<()> {
        let name = self.lock_file_name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(ClaimError::UserError(format!(
                "config validation failed: lock_file_name must be a plain file name (found '{}')",
                name
            )));
        }

        if name.ends_with(".status") {
            return Err(ClaimError::UserError(format!(
                "config validation failed: lock_file_name must not end in '.status' (found '{}')",
                name
            )));
        }

        if self.lock_stale_minutes == Some(0) {
            return Err(ClaimError::UserError(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        if self.lock_poll_max_ms == 0 {
            return Err(ClaimError::UserError(
                "config validation failed: lock_poll_max_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(log) = &self.event_log
            && log.trim().is_empty()
        {
            return Err(ClaimError::UserError(
                "config validation failed: event_log must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Lock acquisition timeout as a `Duration`.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }

    /// Backoff cap as a `Duration`.
    pub fn lock_poll_max(&self) -> Duration {
        Duration::from_millis(self.lock_poll_max_ms)
    }

    /// Resolve the event log path against the shared directory.
    pub fn event_log_path(&self, dir: &Path) -> Option<PathBuf> {
        self.event_log.as_ref().map(|log| {
            let log = Path::new(log);
            if log.is_absolute() {
                log.to_path_buf()
            } else {
                dir.join(log)
            }
        })
    }
}

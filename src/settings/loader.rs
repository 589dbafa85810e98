use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::settings::types::Settings;

/// Errors that can occur when loading server settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Settings validation failed: {message}")]
    ValidationError { message: String },
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Uses `~/.config/listing-cms/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("listing-cms").join("config.toml")
    }

    /// Loads settings from the default settings file.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::settings_path())
    }

    /// Loads settings from `path`.
    ///
    /// - If the file doesn't exist, returns `Settings::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.server
            .bind_addr
            .parse()
            .map_err(|e| SettingsError::ValidationError {
                message: format!("Invalid bind address '{}': {}", self.server.bind_addr, e),
            })
    }

    /// Validates the settings.
    ///
    /// Checks:
    /// - The bind address parses
    /// - The module path is not empty
    /// - Timeouts, queue capacity and the concurrency limit are positive
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.bind_addr()?;

        if self.store.module_path.as_os_str().is_empty() {
            return Err(SettingsError::ValidationError {
                message: "store.module_path must not be empty".to_string(),
            });
        }

        if self.notify.timeout_seconds == 0 || self.leads.timeout_seconds == 0 {
            return Err(SettingsError::ValidationError {
                message: "timeouts must be greater than zero".to_string(),
            });
        }

        if self.notify.queue_capacity == 0 {
            return Err(SettingsError::ValidationError {
                message: "notify.queue_capacity must be greater than zero".to_string(),
            });
        }

        if self.server.max_concurrent_requests == 0 {
            return Err(SettingsError::ValidationError {
                message: "server.max_concurrent_requests must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

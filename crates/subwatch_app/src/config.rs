//! Application settings, read from a RON file next to the binary's working
//! directory. A missing or unreadable file falls back to defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use subwatch_core::DEFAULT_POLL_INTERVAL;
use subwatch_engine::BackendSettings;

use crate::cli::{Cli, LogTarget};

/// Shortest delay allowed between two status polls.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogDestination {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
    pub log_destination: LogDestination,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            base_url: backend.base_url,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            connect_timeout_ms: backend.connect_timeout.as_millis() as u64,
            request_timeout_ms: backend.request_timeout.as_millis() as u64,
            max_bytes: backend.max_bytes,
            log_destination: LogDestination::File,
            log_file: "./subwatch.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Command-line flags win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(interval) = cli.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(target) = cli.log {
            self.log_destination = target.into();
        }
    }

    /// Configured interval, raised to [`MIN_POLL_INTERVAL_MS`] so the backend
    /// is never polled back-to-back.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_bytes: self.max_bytes,
        }
    }
}

/// Problems found while reading the config file. Reported once logging is
/// up; never fatal, the caller falls back to defaults.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: ron::error::SpannedError,
    },
}

/// Reads the config file. `Ok(None)` when the file does not exist.
pub fn read_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
}

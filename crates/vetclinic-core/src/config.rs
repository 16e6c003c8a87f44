//! Clinic core configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::navigation::RoutePattern;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Core configuration, read from a JSON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// SQLite file for the embedded document store; `None` keeps it in memory
    pub database_path: Option<PathBuf>,
    /// Route template of the medical-appointment page
    pub patient_route: RoutePattern,
    /// Refresh period of the clock display, in seconds
    pub clock_refresh_secs: u64,
    /// UTC offset used for displayed dates and times, in minutes
    pub display_utc_offset_minutes: i32,
    /// Default `tracing` filter; `RUST_LOG` takes precedence
    pub log_filter: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            patient_route: RoutePattern::default(),
            clock_refresh_secs: 60,
            display_utc_offset_minutes: -180,
            log_filter: "info".to_string(),
        }
    }
}

impl ClinicConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate config JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "clock_refresh_secs must be greater than zero".into(),
            ));
        }
        self.display_offset()?;
        Ok(())
    }

    pub fn clock_refresh(&self) -> Duration {
        Duration::from_secs(self.clock_refresh_secs)
    }

    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.display_utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "display_utc_offset_minutes out of range: {}",
                self.display_utc_offset_minutes
            ))
        })
    }
}

//! Logging configuration
//!
//! Configuration is assembled from:
//! - Default values
//! - A JSON document handed over by a binding
//! - Environment variables (`FOO_LOG`, `FOO_LOG_FORMAT`)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the level filter
pub const ENV_LOG: &str = "FOO_LOG";

/// Environment variable overriding the output format
pub const ENV_LOG_FORMAT: &str = "FOO_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter, in `tracing-subscriber` env-filter syntax
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line output
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration {
            message: format!("invalid logging configuration: {}", e),
            source: Some(e.into()),
        })
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        if let Ok(level) = std::env::var(ENV_LOG) {
            self.level = level;
        }

        if let Ok(format) = std::env::var(ENV_LOG_FORMAT) {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(_) => tracing::warn!("Invalid log format: {}, using {:?}", format, self.format),
            }
        }
    }

    /// Check that the level filter parses
    pub fn validate(&self) -> Result<()> {
        if self.level.trim().is_empty() {
            return Err(Error::config("log level must not be empty"));
        }

        tracing_subscriber::EnvFilter::try_new(&self.level).map_err(|e| Error::Configuration {
            message: format!("invalid log level '{}'", self.level),
            source: Some(e.into()),
        })?;

        Ok(())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!("unknown log format '{}'", other))),
        }
    }
}

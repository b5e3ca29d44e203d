//! Installation of the global `tracing` subscriber
//!
//! Bindings call [`init`] once on behalf of their host; repeated calls are
//! harmless and report that a subscriber was already present.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};

/// Install a global subscriber built from `config`
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init(config: &LoggingConfig) -> Result<bool> {
    config.validate()?;
    let filter = EnvFilter::try_new(&config.level).map_err(|e| Error::Configuration {
        message: format!("invalid log level '{}'", config.level),
        source: Some(e.into()),
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_writer(std::io::stderr);

    // Each format yields a different subscriber type
    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Full => builder.try_init().is_ok(),
        LogFormat::Json => builder.with_ansi(false).json().try_init().is_ok(),
    };

    if installed {
        tracing::info!(config = ?config, "Logging system initialized");
    }
    Ok(installed)
}

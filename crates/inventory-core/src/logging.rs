//! Logging bootstrap
//!
//! Diagnostics go to stderr so the seed summary on stdout stays clean.
//! `RUST_LOG` wins over the configured level when set.

use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ConfigError, LogFormat, LoggingConfig};

/// Install the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging {
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(io::stderr).json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(io::stderr).pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().with_writer(io::stderr).compact().with_target(false))
            .try_init(),
    };

    installed.map_err(|e| ConfigError::Logging {
        message: e.to_string(),
    })?;

    tracing::debug!(
        target: "inventory::logging",
        level = %config.level,
        format = ?config.format,
        "Logging initialized"
    );
    Ok(())
}

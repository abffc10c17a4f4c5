//! `tracing` subscriber initialisation.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{CoreError, Result};

/// Install the global fmt subscriber described by `config`.
///
/// `RUST_LOG` directives take precedence over `config.level`.
///
/// # Errors
/// Returns `CoreError::Config` for an unknown level and `CoreError::Logging`
/// if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    installed.map_err(|e| CoreError::Logging(e.to_string()))
}

/// Parse a level name, case-insensitively.
///
/// # Errors
/// Returns `CoreError::Config` for anything other than trace, debug, info,
/// warn or error.
pub fn parse_level(level: &str) -> Result<Level> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(CoreError::Config(format!("unknown log level: '{other}'"))),
    }
}

//! Error types for the shared core crate.

use thiserror::Error;

/// Top-level error type for settings and logging setup.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings could not be parsed or layered.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tracing subscriber could not be installed.
    #[error("Logging initialisation failed: {0}")]
    Logging(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<::config::ConfigError> for CoreError {
    fn from(err: ::config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;

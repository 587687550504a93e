//! Error types for configuration loading.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file was not valid JSON.
    #[error("could not parse settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

//! Error types for email handling.

use thiserror::Error;

/// Email-specific errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// The address is not of the form `user@domain`.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),
}

/// Result type alias for email operations.
pub type Result<T> = std::result::Result<T, EmailError>;

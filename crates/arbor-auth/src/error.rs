//! Error types for authentication.

use thiserror::Error;

/// Authentication-specific errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// A user with this email already exists.
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),

    /// Session not found or expired.
    #[error("session not found or expired")]
    SessionNotFound,

    /// Token not found or expired.
    #[error("token not found or expired")]
    TokenNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

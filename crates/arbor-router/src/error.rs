//! Error types for routing.

use thiserror::Error;

/// Errors reported when a route cannot be registered.
///
/// All of these are programming mistakes in the route table, so they are
/// surfaced at registration time rather than during request handling.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Route patterns must begin with a slash.
    #[error("path must begin with '/': {path}")]
    MissingLeadingSlash {
        /// The offending pattern.
        path: String,
    },

    /// A handler is already registered for this pattern and method.
    #[error("a handler is already registered for path {path}")]
    DuplicateRoute {
        /// The offending pattern.
        path: String,
    },

    /// A wildcard segment cannot share its position with other routes.
    #[error("wildcard conflicts with {existing} in path {path}")]
    WildcardConflict {
        /// The offending pattern.
        path: String,
        /// Description of the conflicting registration.
        existing: String,
    },

    /// Catch-all wildcards may only appear as the final segment.
    #[error("catch-all routes are only allowed at the end of the path: {path}")]
    CatchAllNotTerminal {
        /// The offending pattern.
        path: String,
    },

    /// A catch-all must be preceded by a slash of its own.
    #[error("no '/' before catch-all in path {path}")]
    CatchAllNoSlash {
        /// The offending pattern.
        path: String,
    },

    /// Wildcards must carry a non-empty name.
    #[error("wildcards must be named with a non-empty name in path {path}")]
    UnnamedWildcard {
        /// The offending pattern.
        path: String,
    },

    /// At most one wildcard is allowed per path segment.
    #[error("only one wildcard per path segment is allowed: {segment} in path {path}")]
    TooManyWildcards {
        /// The segment with multiple wildcards.
        segment: String,
        /// The offending pattern.
        path: String,
    },

    /// Static file patterns must end in a `filepath` catch-all.
    #[error("static file path must end with /*filepath: {path}")]
    BadStaticPattern {
        /// The offending pattern.
        path: String,
    },
}

/// Result type alias for route registration.
pub type Result<T> = std::result::Result<T, RouterError>;

/// An error returned from a request handler.
///
/// Handler errors are client mistakes (bad input, missing resources the
/// handler chose not to 404 itself) and map to a 400 response.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    /// Creates a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

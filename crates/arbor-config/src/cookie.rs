//! Session cookie configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// The fields needed to set and retrieve session cookies.
///
/// Cookie names must be valid tokens as defined by RFC 2616 section 2.2:
/// any non-control, non-separator character.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie lifetime in seconds.
    pub age_seconds: i64,
    /// Domain attribute, blank for host-only cookies.
    pub domain: String,
    /// Whether the cookie is hidden from client-side scripts.
    pub http_only: bool,
    /// Cookie name.
    pub name: String,
    /// Path attribute.
    pub path: String,
    /// Whether the cookie requires HTTPS.
    pub secure: bool,
}

impl CookieConfig {
    /// Returns the cookie lifetime as a duration.
    pub fn age(&self) -> Duration {
        Duration::seconds(self.age_seconds)
    }
}

/// The default cookie expires after two weeks and is not very secure.
impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            age_seconds: 14 * 24 * 60 * 60,
            domain: String::new(),
            http_only: false,
            name: "sessionid".to_string(),
            path: "/".to_string(),
            secure: false,
        }
    }
}

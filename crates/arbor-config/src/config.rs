//! The parent configuration struct.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cookie::CookieConfig;
use crate::database::DatabaseConfig;
use crate::error::Result;
use crate::metadata::Metadata;
use crate::smtp::SmtpConfig;

/// The parent configuration struct, with fields for a single database,
/// cookie, and SMTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether the site is served over HTTPS.
    pub https: bool,
    /// Domain the server binds to.
    pub domain: String,
    /// Publicly visible domain when behind a reverse proxy.
    pub proxy_domain: String,
    /// Port the server binds to.
    pub port: u16,
    /// Publicly visible port when behind a reverse proxy.
    pub proxy_port: u16,
    /// Directory of HTML templates.
    pub templates: String,
    /// Absolute path of the project root.
    pub abs_path: String,
    /// Directory of user-uploaded media.
    pub media: String,
    /// URL prefix for media files.
    pub media_url: String,
    /// Directory of static assets.
    pub static_dir: String,
    /// URL prefix for static assets.
    pub static_url: String,
    /// Secret key for signing.
    pub secret_key: String,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Session cookie settings.
    pub cookie: CookieConfig,
    /// Outbound mail settings.
    pub smtp: SmtpConfig,
    /// Arbitrary site metadata.
    pub metadata: Metadata,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            https: false,
            domain: String::new(),
            proxy_domain: String::new(),
            port: 8080,
            proxy_port: 0,
            templates: String::new(),
            abs_path: String::new(),
            media: String::new(),
            media_url: String::new(),
            static_dir: String::new(),
            static_url: "/static/".to_string(),
            secret_key: String::new(),
            database: DatabaseConfig::default(),
            cookie: CookieConfig::default(),
            smtp: SmtpConfig::default(),
            metadata: Metadata::default(),
        }
    }
}

impl Config {
    /// Returns the `domain:port` pair the server should bind to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.domain, self.port)
    }

    /// Returns the publicly visible base URL.
    ///
    /// Proxy values take precedence over the bind values, and the port is
    /// omitted when it is 80.
    pub fn url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        let domain = if self.proxy_domain.is_empty() {
            &self.domain
        } else {
            &self.proxy_domain
        };
        let port = if self.proxy_port == 0 {
            self.port
        } else {
            self.proxy_port
        };
        if port == 80 {
            format!("{scheme}://{domain}")
        } else {
            format!("{scheme}://{domain}:{port}")
        }
    }

    /// Returns the scheme, domain, and port as a single string.
    pub fn full_address(&self) -> String {
        self.url()
    }

    /// Creates a `Config` with default values and the given secret key.
    pub fn with_secret_key(key: impl Into<String>) -> Self {
        Self {
            secret_key: key.into(),
            ..Self::default()
        }
    }

    /// Parses the file `settings.json` in the current directory.
    pub fn parse() -> Result<Self> {
        Self::parse_file("./settings.json")
    }

    /// Parses a `Config` from the file at the given path.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse_reader(File::open(path)?)
    }

    /// Parses a `Config` from the given reader.
    pub fn parse_reader(mut reader: impl Read) -> Result<Self> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_url, "/static/");
        assert_eq!(config.cookie.name, "sessionid");
        assert_eq!(config.address(), ":8080");
    }

    #[test]
    fn test_parse_reader() {
        let settings = r#"{
            "domain": "example.com",
            "port": 9001,
            "cookie": {"name": "session", "age_seconds": 3600},
            "metadata": {"title": "Example"}
        }"#;
        let config = Config::parse_reader(settings.as_bytes()).unwrap();
        assert_eq!(config.address(), "example.com:9001");
        assert_eq!(config.cookie.name, "session");
        assert_eq!(config.cookie.age_seconds, 3600);
        assert_eq!(config.metadata.get("title"), "Example");

        // Unset fields keep their defaults
        assert_eq!(config.static_url, "/static/");
    }

    #[test]
    fn test_url() {
        let mut config = Config {
            domain: "example.com".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.url(), "http://example.com:8080");

        config.https = true;
        config.proxy_domain = "www.example.com".to_string();
        config.proxy_port = 80;
        assert_eq!(config.url(), "https://www.example.com");
    }

    #[test]
    fn test_parse_missing_file() {
        assert!(Config::parse_file("/nonexistent/settings.json").is_err());
    }
}

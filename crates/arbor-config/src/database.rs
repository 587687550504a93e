//! Database connection configuration.

use serde::{Deserialize, Serialize};

/// The fields needed to connect to a database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Driver name, e.g. `postgres`.
    pub driver: String,
    /// Database host.
    pub host: String,
    /// Database port, 0 for the driver default.
    pub port: u16,
    /// Database name.
    pub name: String,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// SSL mode, blank for the driver default.
    pub ssl_mode: String,
}

impl DatabaseConfig {
    /// Returns a `key=value` credentials string suitable for a connection
    /// function. Blank fields are omitted.
    pub fn credentials(&self) -> String {
        let mut values = Vec::new();
        if !self.host.is_empty() {
            values.push(format!("host={}", self.host));
        }
        if self.port != 0 {
            values.push(format!("port={}", self.port));
        }
        if !self.name.is_empty() {
            values.push(format!("dbname={}", self.name));
        }
        if !self.user.is_empty() {
            values.push(format!("user={}", self.user));
        }
        if !self.password.is_empty() {
            values.push(format!("password={}", self.password));
        }
        if !self.ssl_mode.is_empty() {
            values.push(format!("sslmode={}", self.ssl_mode));
        }
        values.join(" ")
    }
}

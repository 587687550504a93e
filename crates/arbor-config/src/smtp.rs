//! SMTP server configuration.

use serde::{Deserialize, Serialize};

/// The fields needed to connect to an SMTP server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP port.
    pub port: u16,
    /// SMTP user.
    pub user: String,
    /// SMTP password.
    pub password: String,
    /// SMTP host.
    pub host: String,
    /// From address for outbound mail.
    pub from: String,
    /// Display alias for the from address.
    pub alias: String,
}

impl SmtpConfig {
    /// Creates a string suitable for use in an email's `From` header.
    pub fn from_address(&self) -> String {
        if self.alias.is_empty() {
            format!("<{}>", self.from)
        } else {
            format!(r#""{}" <{}>"#, self.alias, self.from)
        }
    }

    /// Returns the host and port separated by a colon.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_address() {
        let mut smtp = SmtpConfig {
            from: "noreply@example.com".to_string(),
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.from_address(), "<noreply@example.com>");

        smtp.alias = "Example".to_string();
        assert_eq!(smtp.from_address(), r#""Example" <noreply@example.com>"#);
    }

    #[test]
    fn test_address() {
        let smtp = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.address(), "smtp.example.com:587");
    }
}

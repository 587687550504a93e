//! The outbound transport seam.

use std::sync::Mutex;

use arbor_config::SmtpConfig;

use crate::error::Result;
use crate::message::Email;

/// A common interface for sending emails.
pub trait Sender: Send + Sync {
    /// Sends the given body to the `to` address with the given subject.
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// A sender that composes messages from an SMTP configuration and keeps
/// them in memory instead of delivering them.
///
/// Useful in tests and development, or as the template for a real
/// transport implementation.
pub struct Outbox {
    config: SmtpConfig,
    sent: Mutex<Vec<Email>>,
}

impl Outbox {
    /// Creates an empty outbox using the given SMTP configuration.
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Returns copies of every message sent so far.
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().expect("outbox lock poisoned").clone()
    }
}

impl Sender for Outbox {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        // HTML and UTF-8 please
        let email = Email::new(self.config.from_address(), to, subject, body)
            .header("Content-Type", "text/html; charset=UTF-8");
        self.sent.lock().expect("outbox lock poisoned").push(email);
        Ok(())
    }
}

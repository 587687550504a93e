//! Email message composition.

use std::collections::BTreeMap;
use std::fmt;

/// The structure of an email.
///
/// Extra headers are kept in a sorted map so rendering is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Email {
    /// From header, e.g. `"Alias" <from@example.com>`.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Additional headers.
    pub headers: BTreeMap<String, String>,
    /// Message body.
    pub body: String,
}

impl Email {
    /// Creates a new email with no extra headers.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Sets an extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Email {
    /// Renders the message ready to be handed to a [`crate::Sender`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "From: {}", self.from)?;
        writeln!(f, "To: {}", self.to)?;
        writeln!(f, "Subject: {}", self.subject)?;
        for (key, value) in &self.headers {
            writeln!(f, "{key}: {value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let email = Email::new(
            "<noreply@example.com>",
            "alice@example.com",
            "Welcome",
            "Hello, Alice",
        )
        .header("Content-Type", "text/html; charset=UTF-8");

        let rendered = email.to_string();
        assert_eq!(
            rendered,
            "From: <noreply@example.com>\n\
             To: alice@example.com\n\
             Subject: Welcome\n\
             Content-Type: text/html; charset=UTF-8\n\
             \n\
             Hello, Alice\n"
        );
    }

    #[test]
    fn test_headers_sorted() {
        let email = Email::new("<a@b.c>", "d@e.f", "s", "body")
            .header("X-Zed", "1")
            .header("X-Alpha", "2");

        let rendered = email.to_string();
        let zed = rendered.find("X-Zed").unwrap();
        let alpha = rendered.find("X-Alpha").unwrap();
        assert!(alpha < zed);
    }
}

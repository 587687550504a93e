//! Email address normalization.

use crate::error::{EmailError, Result};

/// Normalizes an email address: trims whitespace, requires exactly one
/// `@` with non-empty parts on both sides, and lowercases the result.
pub fn normalize(email: &str) -> Result<String> {
    let trimmed = email.trim();
    let mut parts = trimmed.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(EmailError::InvalidAddress(email.to_string()));
    };
    if local.is_empty() || domain.is_empty() {
        return Err(EmailError::InvalidAddress(email.to_string()));
    }
    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(" Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert_eq!(normalize("a@b").unwrap(), "a@b");
    }

    #[test]
    fn test_invalid_addresses() {
        for bad in ["", "alice", "alice@", "@example.com", "a@b@c"] {
            assert!(normalize(bad).is_err(), "expected {bad:?} to be invalid");
        }
    }
}

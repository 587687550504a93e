//! Password hashing and verification.
//!
//! The [`Hasher`] trait keeps the hash algorithm pluggable; the default
//! implementation is Argon2id, a memory-hard algorithm resistant to GPU
//! and ASIC attacks.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;

use crate::error::{AuthError, Result};

/// A pluggable password hashing algorithm.
pub trait Hasher: Send + Sync {
    /// Hashes a cleartext password, returning an encoded string that
    /// includes the salt and algorithm parameters.
    fn hash(&self, cleartext: &str) -> Result<String>;

    /// Verifies a cleartext password against a stored encoded string.
    fn verify(&self, cleartext: &str, encoded: &str) -> bool;

    /// Returns the name of the algorithm.
    fn algorithm(&self) -> &str;
}

/// The default hasher, backed by Argon2id.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Hasher for Argon2Hasher {
    fn hash(&self, cleartext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(cleartext.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHash)?;
        Ok(hash.to_string())
    }

    fn verify(&self, cleartext: &str, encoded: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        Argon2::default()
            .verify_password(cleartext.as_bytes(), &parsed)
            .is_ok()
    }

    fn algorithm(&self) -> &str {
        "argon2id"
    }
}

/// Checks if a password meets minimum security requirements.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter {
        return Err(AuthError::Validation(
            "Password must contain at least one letter".to_string(),
        ));
    }

    if !has_digit {
        return Err(AuthError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("securepassword123").unwrap();

        assert!(hasher.verify("securepassword123", &hash));
        assert!(!hasher.verify("wrongpassword", &hash));
        assert!(!hasher.verify("securepassword123", "not a phc string"));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = Argon2Hasher;
        let hash1 = hasher.hash("securepassword123").unwrap();
        let hash2 = hasher.hash("securepassword123").unwrap();

        // Hashes differ because of different salts
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("securepassword123", &hash1));
        assert!(hasher.verify("securepassword123", &hash2));
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("Pass1234").is_ok());

        // Too short
        assert!(validate_password("pass1").is_err());

        // No digit
        assert!(validate_password("password").is_err());

        // No letter
        assert!(validate_password("12345678").is_err());
    }
}

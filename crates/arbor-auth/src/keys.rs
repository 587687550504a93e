//! Random key generation and constant-time comparison.

use rand::RngCore;

/// Generates a cryptographically secure random key.
///
/// The key is 32 random bytes encoded as a 64 character hex string.
pub fn random_key() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(&bytes)
}

/// Compares two strings in constant time with respect to their contents.
///
/// Strings of unequal length return false immediately; key lengths are
/// not secret.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Helper module for hex encoding (avoiding an external dependency).
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

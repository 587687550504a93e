//! Arbitrary site metadata.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Arbitrary strings held as key-value pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(HashMap<String, String>);

impl Metadata {
    /// Returns the value of the given key, or a blank string if the key
    /// does not exist.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map_or("", String::as_str)
    }

    /// Returns true if the metadata contains the key. Keys with blank
    /// values still return true.
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns all keys of the metadata.
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Sets the value of the given key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

//! API tokens and storage.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::keys::random_key;
use crate::user::User;

/// An API token. `expires` is `None` if the token never expires.
#[derive(Debug, Clone)]
pub struct Token {
    /// Random token key.
    pub key: String,
    /// The user this token authenticates.
    pub user_id: i64,
    /// Optional expiration timestamp.
    pub expires: Option<DateTime<Utc>>,
    /// Token creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Token {
    /// Returns whether this token has expired. Tokens without an expiry
    /// never expire.
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|expires| expires <= Utc::now())
    }
}

/// Storage backend for API tokens.
pub trait TokenStore: Send + Sync {
    /// Creates a non-expiring token for the given user.
    fn create(&self, user: &User) -> Result<Token>;

    /// Returns the token with the given key.
    fn get(&self, key: &str) -> Option<Token>;

    /// Returns all tokens for the given user id.
    fn all_for_user(&self, user_id: i64) -> Vec<Token>;

    /// Deletes the token with the given key. Deleting a missing key is
    /// not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// An in-memory token store.
#[derive(Default)]
pub struct MemoryTokens {
    by_key: RwLock<HashMap<String, Token>>,
}

impl MemoryTokens {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokens {
    fn create(&self, user: &User) -> Result<Token> {
        let mut by_key = self.by_key.write().expect("token store lock poisoned");

        let mut key = random_key();
        while by_key.contains_key(&key) {
            key = random_key();
        }

        let token = Token {
            key: key.clone(),
            user_id: user.id,
            expires: None,
            created_at: Utc::now(),
        };
        by_key.insert(key, token.clone());
        Ok(token)
    }

    fn get(&self, key: &str) -> Option<Token> {
        let by_key = self.by_key.read().expect("token store lock poisoned");
        by_key.get(key).cloned()
    }

    fn all_for_user(&self, user_id: i64) -> Vec<Token> {
        let by_key = self.by_key.read().expect("token store lock poisoned");
        by_key
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut by_key = self.by_key.write().expect("token store lock poisoned");
        by_key.remove(key);
        Ok(())
    }
}

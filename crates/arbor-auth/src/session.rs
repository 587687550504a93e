//! Session records and storage.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use arbor_config::CookieConfig;

use crate::error::{AuthError, Result};
use crate::keys::random_key;
use crate::user::User;

/// A session tying a random key to a user until it expires.
#[derive(Debug, Clone)]
pub struct Session {
    /// Random session key, as stored in the session cookie.
    pub key: String,
    /// The authenticated user.
    pub user_id: i64,
    /// Session expiration timestamp.
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Returns whether this session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires <= Utc::now()
    }
}

/// Storage backend for sessions.
pub trait SessionStore: Send + Sync {
    /// Creates a new session for the given user.
    fn create(&self, user: &User) -> Result<Session>;

    /// Returns the session with the given key, expired or not.
    fn get(&self, key: &str) -> Option<Session>;

    /// Deletes the session with the given key. Deleting a missing key is
    /// not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// An in-memory session store.
pub struct MemorySessions {
    by_key: RwLock<HashMap<String, Session>>,
    age: Duration,
}

impl MemorySessions {
    /// Creates an empty store whose sessions expire after the cookie age.
    pub fn new(cookie: &CookieConfig) -> Self {
        Self {
            by_key: RwLock::new(HashMap::new()),
            age: cookie.age(),
        }
    }
}

impl SessionStore for MemorySessions {
    fn create(&self, user: &User) -> Result<Session> {
        let mut by_key = self.by_key.write().expect("session store lock poisoned");

        // Regenerate on the off chance of a key collision
        let mut key = random_key();
        while by_key.contains_key(&key) {
            key = random_key();
        }

        let session = Session {
            key: key.clone(),
            user_id: user.id,
            expires: Utc::now() + self.age,
        };
        by_key.insert(key, session.clone());
        Ok(session)
    }

    fn get(&self, key: &str) -> Option<Session> {
        let by_key = self.by_key.read().expect("session store lock poisoned");
        by_key.get(key).cloned()
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut by_key = self.by_key.write().expect("session store lock poisoned");
        by_key.remove(key);
        Ok(())
    }
}

//! User records and storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::error::{AuthError, Result};
use crate::keys::random_key;
use crate::password::{validate_password, Argon2Hasher, Hasher};

/// A user account.
#[derive(Debug, Clone)]
pub struct User {
    /// Primary key.
    pub id: i64,
    /// Unique, normalized email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Whether the user can log in.
    pub is_active: bool,
    /// Whether the user has all permissions.
    pub is_superuser: bool,
    /// Account token used for password resets and account confirmation.
    pub token: String,
    /// When the account token was last set.
    pub token_set_at: DateTime<Utc>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Encoded password hash.
    password: String,
}

impl User {
    /// Builds a user record from an already-encoded password hash.
    ///
    /// Storage backends use this constructor; application code should go
    /// through [`UserStore::create`] instead.
    pub fn with_hash(id: i64, email: &str, first: &str, last: &str, password: &str) -> Self {
        Self {
            id,
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            is_active: true,
            is_superuser: false,
            token: random_key(),
            token_set_at: Utc::now(),
            created_at: Utc::now(),
            password: password.to_string(),
        }
    }

    /// Returns the encoded password hash.
    pub fn password_hash(&self) -> &str {
        &self.password
    }

    /// Replaces the encoded password hash.
    pub fn set_password_hash(&mut self, encoded: String) {
        self.password = encoded;
    }

    /// Returns the concatenated first and last name.
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.email)
    }
}

/// Storage backend for users.
///
/// Backends own the password hasher so every stored hash goes through the
/// same algorithm.
pub trait UserStore: Send + Sync {
    /// Creates a new user with the given email and cleartext password.
    /// The email must already be normalized and must be unique.
    fn create(&self, email: &str, first: &str, last: &str, cleartext: &str) -> Result<User>;

    /// Creates a new superuser.
    fn create_superuser(&self, email: &str, first: &str, last: &str, cleartext: &str)
        -> Result<User>;

    /// Returns the user with the given id.
    fn by_id(&self, id: i64) -> Option<User>;

    /// Returns the user with the given email.
    fn by_email(&self, email: &str) -> Option<User>;

    /// Replaces the password of the user with the given id.
    fn set_password(&self, id: i64, cleartext: &str) -> Result<()>;

    /// Replaces the account token of the user with the given id.
    fn update_token(&self, id: i64, token: &str, set_at: DateTime<Utc>) -> Result<()>;

    /// Removes the user with the given id.
    fn delete(&self, id: i64) -> Result<()>;

    /// Returns the hasher used by this store.
    fn hasher(&self) -> &dyn Hasher;
}

/// An in-memory user store.
pub struct MemoryUsers {
    inner: RwLock<Inner>,
    hasher: Arc<dyn Hasher>,
}

struct Inner {
    next_id: i64,
    by_id: HashMap<i64, User>,
}

impl MemoryUsers {
    /// Creates an empty store with the default Argon2 hasher.
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(Argon2Hasher))
    }

    /// Creates an empty store with the given hasher.
    pub fn with_hasher(hasher: Arc<dyn Hasher>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                by_id: HashMap::new(),
            }),
            hasher,
        }
    }

    fn create_user(
        &self,
        email: &str,
        first: &str,
        last: &str,
        cleartext: &str,
        is_superuser: bool,
    ) -> Result<User> {
        validate_password(cleartext)?;
        let encoded = self.hasher.hash(cleartext)?;

        let mut inner = self.inner.write().expect("user store lock poisoned");
        if inner.by_id.values().any(|u| u.email == email) {
            return Err(AuthError::DuplicateEmail(email.to_string()));
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let mut user = User::with_hash(id, email, first, last, &encoded);
        user.is_superuser = is_superuser;
        inner.by_id.insert(id, user.clone());
        Ok(user)
    }
}

impl Default for MemoryUsers {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryUsers {
    fn create(&self, email: &str, first: &str, last: &str, cleartext: &str) -> Result<User> {
        self.create_user(email, first, last, cleartext, false)
    }

    fn create_superuser(
        &self,
        email: &str,
        first: &str,
        last: &str,
        cleartext: &str,
    ) -> Result<User> {
        self.create_user(email, first, last, cleartext, true)
    }

    fn by_id(&self, id: i64) -> Option<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner.by_id.get(&id).cloned()
    }

    fn by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner.by_id.values().find(|u| u.email == email).cloned()
    }

    fn set_password(&self, id: i64, cleartext: &str) -> Result<()> {
        validate_password(cleartext)?;
        let encoded = self.hasher.hash(cleartext)?;
        let mut inner = self.inner.write().expect("user store lock poisoned");
        let user = inner.by_id.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        user.set_password_hash(encoded);
        Ok(())
    }

    fn update_token(&self, id: i64, token: &str, set_at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        let user = inner.by_id.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        user.token = token.to_string();
        user.token_set_at = set_at;
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        inner
            .by_id
            .remove(&id)
            .map(|_| ())
            .ok_or(AuthError::UserNotFound)
    }

    fn hasher(&self) -> &dyn Hasher {
        self.hasher.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let users = MemoryUsers::new();
        let user = users
            .create("alice@example.com", "Alice", "Example", "password123")
            .unwrap();

        assert_eq!(user.id, 1);
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_eq!(user.name(), "Alice Example");

        let fetched = users.by_email("alice@example.com").unwrap();
        assert_eq!(fetched.id, user.id);
        assert!(users.by_id(user.id).is_some());
        assert!(users.by_id(999).is_none());
    }

    #[test]
    fn test_duplicate_email() {
        let users = MemoryUsers::new();
        users
            .create("alice@example.com", "Alice", "Example", "password123")
            .unwrap();
        let err = users
            .create("alice@example.com", "Alice", "Imposter", "password456")
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail(_)));
    }

    #[test]
    fn test_superuser() {
        let users = MemoryUsers::new();
        let admin = users
            .create_superuser("root@example.com", "Root", "User", "password123")
            .unwrap();
        assert!(admin.is_superuser);
    }

    #[test]
    fn test_weak_password_rejected() {
        let users = MemoryUsers::new();
        assert!(users
            .create("bob@example.com", "Bob", "Example", "short")
            .is_err());
    }

    #[test]
    fn test_delete() {
        let users = MemoryUsers::new();
        let user = users
            .create("alice@example.com", "Alice", "Example", "password123")
            .unwrap();
        users.delete(user.id).unwrap();
        assert!(users.by_id(user.id).is_none());
        assert!(matches!(users.delete(user.id), Err(AuthError::UserNotFound)));
    }
}

//! The authentication facade.

use std::sync::Arc;

use chrono::Utc;

use arbor_config::CookieConfig;
use arbor_email::normalize;

use crate::cookie::session_cookie;
use crate::error::{AuthError, Result};
use crate::keys::{constant_time_eq, random_key};
use crate::session::{MemorySessions, Session, SessionStore};
use crate::token::{MemoryTokens, TokenStore};
use crate::user::{MemoryUsers, User, UserStore};

/// Resolves a user from a session cookie.
///
/// This is the narrow contract the router consumes: it only needs to know
/// which cookie to read and how to turn its value into a user.
pub trait SessionAuth: Send + Sync {
    /// Returns the name of the session cookie.
    fn cookie_name(&self) -> &str;

    /// Returns the user for the given session key, if the session exists
    /// and has not expired.
    fn user_by_session(&self, key: &str) -> Option<User>;
}

/// Authentication built from a user store, session store, token store,
/// and cookie configuration.
pub struct Auth {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenStore>,
    cookie: CookieConfig,
}

impl Auth {
    /// Creates an `Auth` from explicit storage backends.
    pub fn new(
        cookie: CookieConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            cookie,
        }
    }

    /// Creates an `Auth` with in-memory backends and the default hasher.
    pub fn in_memory(cookie: CookieConfig) -> Self {
        let sessions = MemorySessions::new(&cookie);
        Self::new(
            cookie,
            Arc::new(MemoryUsers::new()),
            Arc::new(sessions),
            Arc::new(MemoryTokens::new()),
        )
    }

    /// Attempts to authenticate the given email with a cleartext password.
    ///
    /// The same error is returned whether the user is missing or the
    /// password is wrong, so callers cannot tell which failed.
    pub fn by_password(&self, email: &str, cleartext: &str) -> Result<User> {
        let email = normalize(email).map_err(|e| AuthError::Validation(e.to_string()))?;
        let user = self
            .users
            .by_email(&email)
            .ok_or(AuthError::InvalidCredentials)?;
        if !self
            .users
            .hasher()
            .verify(cleartext, user.password_hash())
        {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Returns the authenticated user if the given session key is valid
    /// and unexpired.
    pub fn by_session(&self, key: &str) -> Option<User> {
        let session = self.sessions.get(key)?;
        if session.is_expired() {
            return None;
        }
        self.users.by_id(session.user_id)
    }

    /// Returns the authenticated user if the given token key is valid for
    /// the given user id. Tokens are used for API access.
    ///
    /// Every token for the user is compared in constant time so the check
    /// does not leak which keys exist.
    pub fn by_token(&self, user_id: i64, key: &str) -> Option<User> {
        let mut matched = false;
        for token in self.tokens.all_for_user(user_id) {
            if token.is_expired() {
                continue;
            }
            if constant_time_eq(key, &token.key) {
                matched = true;
            }
        }
        if matched {
            self.users.by_id(user_id)
        } else {
            None
        }
    }

    /// Returns the authenticated user if the given account token matches.
    /// Account tokens are only used for password resets and initial
    /// account creation.
    pub fn by_user_token(&self, user_id: i64, key: &str) -> Result<User> {
        let user = self.users.by_id(user_id).ok_or(AuthError::TokenNotFound)?;
        if !constant_time_eq(key, &user.token) {
            return Err(AuthError::TokenNotFound);
        }
        Ok(user)
    }

    /// Creates a new user. The email is normalized first.
    pub fn create_user(&self, email: &str, first: &str, last: &str, cleartext: &str) -> Result<User> {
        let email = normalize(email).map_err(|e| AuthError::Validation(e.to_string()))?;
        self.users.create(&email, first, last, cleartext)
    }

    /// Creates a new session for the given user, returning the session
    /// and the `Set-Cookie` header value that transmits it.
    pub fn login(&self, user: &User) -> Result<(Session, String)> {
        let session = self.sessions.create(user)?;
        let cookie = session_cookie(&self.cookie, &session);
        Ok((session, cookie))
    }

    /// Removes the session with the given key.
    pub fn logout(&self, key: &str) -> Result<()> {
        self.sessions.delete(key)
    }

    /// Generates a new account token for the user and resets its
    /// timestamp, returning the updated user.
    pub fn reset_user_token(&self, user: &User) -> Result<User> {
        let token = random_key();
        self.users.update_token(user.id, &token, Utc::now())?;
        self.users.by_id(user.id).ok_or(AuthError::UserNotFound)
    }

    /// Hashes the given cleartext password with the user store's hasher.
    pub fn make_password(&self, cleartext: &str) -> Result<String> {
        self.users.hasher().hash(cleartext)
    }

    /// Returns the cookie configuration.
    pub fn cookie(&self) -> &CookieConfig {
        &self.cookie
    }

    /// Returns the user store.
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Returns the token store.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }
}

impl SessionAuth for Auth {
    fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    fn user_by_session(&self, key: &str) -> Option<User> {
        self.by_session(key)
    }
}

//! # arbor-auth
//!
//! Cookie-based session and token authentication with pluggable storage.
//!
//! This crate provides:
//! - A [`User`] record and [`UserStore`] trait with an in-memory backend
//! - [`Session`] management keyed by random session keys
//! - API [`Token`]s with optional expiry
//! - A [`Hasher`] trait with an Argon2id default implementation
//! - The [`Auth`] facade that wires the above together
//!
//! Storage backends and the password hasher are constructor parameters,
//! never process-wide registries: build an [`Auth`] from whatever
//! implementations the application provides.
//!
//! ## Quick Start
//!
//! ```
//! use arbor_auth::Auth;
//! use arbor_config::CookieConfig;
//!
//! let auth = Auth::in_memory(CookieConfig::default());
//! let user = auth
//!     .create_user("alice@example.com", "Alice", "Example", "password123")
//!     .expect("valid user");
//!
//! let authed = auth.by_password("alice@example.com", "password123").unwrap();
//! assert_eq!(authed.id, user.id);
//! assert!(auth.by_password("alice@example.com", "nope").is_err());
//! ```

mod auth;
mod cookie;
mod error;
mod keys;
mod password;
mod session;
mod token;
mod user;

pub use auth::{Auth, SessionAuth};
pub use cookie::session_cookie;
pub use error::{AuthError, Result};
pub use keys::{constant_time_eq, random_key};
pub use password::{validate_password, Argon2Hasher, Hasher};
pub use session::{MemorySessions, Session, SessionStore};
pub use token::{MemoryTokens, Token, TokenStore};
pub use user::{MemoryUsers, User, UserStore};

//! # arbor-config
//!
//! Typed application configuration loaded from a JSON settings file.
//!
//! This crate provides:
//! - A parent [`Config`] with domain, port, and asset directory settings
//! - [`CookieConfig`] for session cookies
//! - [`DatabaseConfig`] for database credentials
//! - [`SmtpConfig`] for outbound mail
//! - [`Metadata`] for arbitrary string key-value pairs
//!
//! ## Quick Start
//!
//! ```no_run
//! use arbor_config::Config;
//!
//! let config = Config::parse_file("settings.json").expect("valid settings");
//! println!("listening on {}", config.address());
//! ```

mod config;
mod cookie;
mod database;
mod error;
mod metadata;
mod smtp;

pub use config::Config;
pub use cookie::CookieConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, Result};
pub use metadata::Metadata;
pub use smtp::SmtpConfig;

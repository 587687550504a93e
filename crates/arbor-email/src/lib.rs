//! # arbor-email
//!
//! Outbound email composition and address normalization.
//!
//! This crate provides:
//! - An [`Email`] message with deterministic header rendering
//! - [`normalize`] for canonicalizing addresses before storage
//! - A [`Sender`] seam with a recording [`Outbox`] implementation
//!
//! Actual transport (SMTP and friends) is intentionally out of scope:
//! applications plug a transport in behind [`Sender`].

mod error;
mod message;
mod normalize;
mod sender;

pub use error::{EmailError, Result};
pub use message::Email;
pub use normalize::normalize;
pub use sender::{Outbox, Sender};

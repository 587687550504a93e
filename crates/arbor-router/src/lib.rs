//! # arbor-router
//!
//! A radix-tree URL router with per-method trees and path repair.
//!
//! This crate provides:
//! - Compressed prefix-tree matching with `:param` and `*catchall` wildcards
//! - Priority-ordered children, so busy branches are tried first
//! - Registration-time conflict detection instead of silent shadowing
//! - Trailing-slash and case-corrected redirects for near-miss paths
//! - Panic supervision around handlers
//! - Static file serving as an ordinary catch-all route
//!
//! ## Quick Start
//!
//! ```
//! use arbor_router::{Request, Response, Router};
//!
//! let mut router = Router::new();
//! router
//!     .get("/users/:id", |response, request| {
//!         let id = request.params.as_id("id");
//!         *response = Response::json(&serde_json::json!({ "id": id }));
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let response = router.dispatch(Request::get("/users/123"));
//! assert_eq!(response.status, 200);
//! ```
//!
//! ## Path Parameters
//!
//! A `:name` segment matches exactly one path segment; a trailing
//! `*name` catch-all matches everything from its preceding slash on:
//!
//! ```
//! # use arbor_router::Router;
//! # let mut router = Router::new();
//! router.get("/posts/:post_id/comments/:comment_id", |_, _| Ok(())).unwrap();
//! router.get("/files/*filepath", |_, _| Ok(())).unwrap();
//! ```
//!
//! Matched values are available in `request.params`, in match order.
//!
//! ## Near-miss requests
//!
//! A request that misses every route is answered with a redirect when
//! adding or removing a trailing slash, cleaning `.`/`..` elements, or
//! fixing ASCII case produces a registered path: 301 for GET, 307 for
//! other methods so the body is replayed. CONNECT requests and the root
//! path are never redirected.

mod error;
mod params;
mod path;
mod request;
mod response;
mod router;
mod tree;

pub use error::{HandlerError, Result, RouterError};
pub use params::{Param, Params};
pub use path::clean_path;
pub use request::{Method, Request};
pub use response::Response;
pub use router::{Handler, HandlerResult, Router};

//! HTTP API layer for yomu.
//!
//! This crate exposes the engine's query and command operations:
//!
//! - **Endpoints**: users, comments, reports, submissions, suspensions,
//!   notifications, favorites
//! - **Extractors**: authenticated actor
//! - **Middleware**: actor resolution, shared application state
//!
//! Built on Axum 0.8. Expected business-rule failures surface as
//! `{ "success": false }`, never as 5xx responses.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, actor_middleware};

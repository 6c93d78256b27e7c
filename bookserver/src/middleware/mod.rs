//! HTTP middleware stack: session authentication, CORS and per-request
//! trace ids.

pub mod auth;
pub mod cors;
pub mod trace;

pub use auth::{CurrentUser, Identity, SessionKeys};

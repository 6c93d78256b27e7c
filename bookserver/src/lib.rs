//! bookserver: results API for interactive textbook assessments.
//!
//! The binary in `main.rs` wires these modules together; integration tests
//! drive [`routes::build`] directly.

pub mod config;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod schemas;
pub mod state;

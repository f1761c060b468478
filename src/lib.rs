//! Money Manager Backend Library
//!
//! Exposes the application modules for use by the binary and the
//! integration tests in `tests/`.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod models;
pub mod store;

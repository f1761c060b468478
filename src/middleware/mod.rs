//! HTTP middleware shared across route groups.

pub mod logging;

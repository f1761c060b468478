//! HTTP Boundary
//! Mission: Route requests through the gates and render JSON envelopes

pub mod admin;
pub mod comments;
pub mod error;
pub mod records;
pub mod routes;
pub mod users;
pub mod validation;

pub use error::ApiError;
pub use routes::{build_router, AppState};

//! Authentication Module
//! Mission: Secure API access with signed tokens and role-based guards

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::TokenCodec;
pub use middleware::{authenticate, require_role};
pub use models::{Identity, Role};

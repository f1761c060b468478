//! Domain entities.
//!
//! Every mutable row carries a `version` counter used by the optimistic
//! concurrency protocol in `store::versioned`. The version is read-only for
//! clients: it is handed out on reads and quoted back as the compare value
//! on updates, never set directly.

use serde::Serialize;

use crate::auth::models::Role;

/// User account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "username")]
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub activated: bool,
    pub created_at: String,
    pub version: i64,
}

/// A single monetary record, owned by exactly one user.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub id: i64,
    pub amount: i64,
    pub description: String,
    pub type_id: i64,
    pub currency_id: i64,
    pub user_id: i64,
    pub created_at: String,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Currency {
    pub id: i64,
    pub name: String,
    pub rate: f64,
    pub created_at: String,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordType {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub version: i64,
}

/// Comment attached to a record.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub record_id: i64,
    pub description: String,
    pub created_at: String,
    pub version: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            name: "testuser".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            email: "test@example.com".to_string(),
            role: Role::User,
            activated: false,
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
            version: 1,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains(r#""username":"testuser""#));
    }
}

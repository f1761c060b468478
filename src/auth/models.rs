//! Authentication Models
//! Mission: Define the authenticated subject and its role

use serde::{Deserialize, Serialize};

/// User roles for RBAC. A closed set: a role string outside this enum fails
/// deserialization, so an unrecognized role can never reach the guards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superuser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superuser => "superuser",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "superuser" => Some(Role::Superuser),
            _ => None,
        }
    }
}

/// The authenticated subject, reconstructed from a verified token.
///
/// This is a transient request-scoped copy carried as a request extension,
/// never a live handle into storage.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let admin = Role::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""admin""#);

        let superuser: Role = serde_json::from_str(r#""superuser""#).unwrap();
        assert_eq!(superuser, Role::Superuser);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: Result<Role, _> = serde_json::from_str(r#""root""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_role_string_conversion() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::from_str("user"), Some(Role::User));
        assert_eq!(Role::from_str("superuser"), Some(Role::Superuser));
        assert_eq!(Role::from_str("viewer"), None);
    }
}

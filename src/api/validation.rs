//! Field-level request validation, rendered as 422 envelopes.

use std::collections::BTreeMap;

use super::error::ApiError;

/// Collects field errors across checks so a response can report all of them
/// at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        // First failure per field wins.
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.trim().is_empty(), "email", "must be provided");
    let looks_like_email = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    v.check(looks_like_email, "email", "must be a valid email address");
}

pub fn validate_password(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= 8,
        "password",
        "must be at least 8 characters",
    );
    v.check(
        password.len() <= 63,
        "password",
        "must be at most 63 characters",
    );
}

pub fn validate_username(v: &mut Validator, username: &str) {
    v.check(!username.trim().is_empty(), "username", "must be provided");
    v.check(
        username.len() < 100,
        "username",
        "must be less than 100 characters",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_multiple_fields() {
        let mut v = Validator::new();
        validate_email(&mut v, "not-an-email");
        validate_password(&mut v, "short");
        assert!(!v.is_valid());

        match v.into_result() {
            Err(ApiError::Validation(errors)) => {
                assert!(errors.contains_key("email"));
                assert!(errors.contains_key("password"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let mut v = Validator::new();
        validate_email(&mut v, "alice@example.com");
        validate_password(&mut v, "a-long-enough-password");
        validate_username(&mut v, "alice");
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn test_email_shapes() {
        for bad in ["", "@example.com", "alice@", "alice@nodot"] {
            let mut v = Validator::new();
            validate_email(&mut v, bad);
            assert!(!v.is_valid(), "{bad:?} should fail");
        }
    }
}

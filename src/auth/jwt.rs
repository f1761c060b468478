//! Token Codec
//! Mission: Issue and verify signed, self-contained access/refresh tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::models::{Identity, Role};

/// The one signing algorithm this codec will ever accept. Tokens declaring
/// any other algorithm fail verification by construction.
const PINNED_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims payload embedded in every token. `role` deserializes into the
/// closed [`Role`] enum, so a missing or unknown role makes the whole token
/// invalid rather than defaulting to anything.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Why verification failed. Callers render all variants identically; the
/// distinction exists for server-side logs only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    Expired,
    #[error("signature or algorithm mismatch")]
    BadSignature,
    #[error("missing or unparseable claims")]
    BadClaims,
    #[error("malformed token")]
    Malformed,
}

/// Issues and verifies tokens for one lifetime class.
///
/// Two instances are used in practice, sharing the process secret: a
/// short-lived one for access tokens and a long-lived one for refresh
/// tokens. Verification logic is identical in both.
pub struct TokenCodec {
    secret: String,
    ttl: Duration,
}

impl TokenCodec {
    /// The secret is injected at construction, never read from a global, so
    /// tests can run with per-test secrets.
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for an identity. Callers are trusted internal code; the
    /// only input requirement is a real subject.
    pub fn issue(&self, identity: &Identity) -> anyhow::Result<String> {
        anyhow::ensure!(identity.id > 0, "token subject must be set");

        let now = Utc::now();
        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(
            &Header::new(PINNED_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| anyhow::anyhow!("failed to sign token: {err}"))
    }

    /// Verify a token and reconstruct the identity it asserts.
    ///
    /// Rejects non-pinned algorithms, bad signatures, expired tokens (zero
    /// leeway), and claims that do not parse. One success state, one caller
    /// visible failure class.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(PINNED_ALGORITHM);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::BadClaims,
            _ => AuthError::Malformed,
        })?;

        Ok(Identity {
            id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-signing-secret-key-0123456789abcdef";

    fn test_identity() -> Identity {
        Identity {
            id: 42,
            email: "test@example.com".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        let token = codec.issue(&test_identity()).unwrap();

        let identity = codec.verify(&token).unwrap();
        assert_eq!(identity.id, 42);
        assert_eq!(identity.email, "test@example.com");
        assert_eq!(identity.role, Role::User);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, Duration::seconds(-60));
        let token = codec.issue(&test_identity()).unwrap();

        assert!(matches!(codec.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_different_secret_rejected() {
        let issuer = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        let verifier = TokenCodec::new("another-secret-key-0123456789abcdef!", Duration::hours(1));

        let token = issuer.issue(&test_identity()).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        let token = codec.issue(&test_identity()).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        let target = sig_start + 4;
        bytes[target] = if bytes[target] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn test_non_pinned_algorithm_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        let now = Utc::now();
        let claims = Claims {
            sub: 42,
            email: "test@example.com".to_string(),
            role: Role::Admin,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        // Well-formed and signed with the right secret, but HS384.
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            codec.verify(&token),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn test_missing_role_claim_rejected() {
        #[derive(Serialize)]
        struct PartialClaims {
            sub: i64,
            email: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let claims = PartialClaims {
            sub: 42,
            email: "test@example.com".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(PINNED_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let codec = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        assert!(matches!(codec.verify(&token), Err(AuthError::BadClaims)));
    }

    #[test]
    fn test_unknown_role_claim_rejected() {
        #[derive(Serialize)]
        struct RogueClaims {
            sub: i64,
            email: String,
            role: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let claims = RogueClaims {
            sub: 42,
            email: "test@example.com".to_string(),
            role: "root".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(PINNED_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let codec = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        assert!(matches!(codec.verify(&token), Err(AuthError::BadClaims)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let codec = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        assert!(codec.verify("not.a.token").is_err());
        assert!(codec.verify("").is_err());
    }

    #[test]
    fn test_subject_required_at_issue() {
        let codec = TokenCodec::new(TEST_SECRET, Duration::hours(1));
        let identity = Identity {
            id: 0,
            email: "test@example.com".to_string(),
            role: Role::User,
        };
        assert!(codec.issue(&identity).is_err());
    }
}

//! Authentication & Authorization Gates
//! Mission: Fail closed before any handler logic runs

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::{
    api::error::ApiError,
    auth::{jwt::TokenCodec, models::Identity, models::Role},
};

/// Authentication gate. Extracts the bearer token from the Authorization
/// header, verifies it, and attaches the resulting [`Identity`] to the
/// request extensions for downstream handlers.
///
/// Every failure renders the same 401 body regardless of cause (expired vs
/// forged vs malformed), so the gate cannot be used as an oracle. The cause
/// is logged server-side.
pub async fn authenticate(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::Unauthenticated)?;

    let identity = codec.verify(&token).map_err(|err| {
        warn!(reason = %err, "rejected bearer token");
        ApiError::Unauthenticated
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Authorization gate, composed strictly after [`authenticate`]. Admits the
/// request only if the attached identity's role is in the allow-set.
///
/// A missing identity means the gates were composed out of order; that is
/// treated as unauthenticated rather than panicking or admitting.
pub async fn require_role(
    State(allowed): State<&'static [Role]>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or(ApiError::Unauthenticated)?;

    if !allowed.contains(&identity.role) {
        warn!(
            user = identity.id,
            role = identity.role.as_str(),
            "role not permitted"
        );
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};

    #[test]
    fn test_identity_extension_roundtrip() {
        let mut req = HttpRequest::new(Body::empty());
        assert!(req.extensions().get::<Identity>().is_none());

        let identity = Identity {
            id: 7,
            email: "test@example.com".to_string(),
            role: Role::Admin,
        };
        req.extensions_mut().insert(identity);

        let attached = req.extensions().get::<Identity>().unwrap();
        assert_eq!(attached.id, 7);
        assert_eq!(attached.role, Role::Admin);
    }

    #[test]
    fn test_allow_set_membership() {
        const ADMIN_ONLY: &[Role] = &[Role::Admin];
        const MANAGERS: &[Role] = &[Role::Admin, Role::Superuser];

        assert!(ADMIN_ONLY.contains(&Role::Admin));
        assert!(!ADMIN_ONLY.contains(&Role::Superuser));
        assert!(MANAGERS.contains(&Role::Superuser));
        assert!(!MANAGERS.contains(&Role::User));
    }
}

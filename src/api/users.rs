//! Account Endpoints
//! Mission: Signup, login, signout, and access-token refresh
//!
//! Access tokens travel in the JSON envelope and come back on the
//! Authorization header; refresh tokens live exclusively in an HttpOnly,
//! Secure cookie. The two transports are never interchangeable.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{
    error::{ApiError, ApiJson},
    routes::AppState,
    validation::{validate_email, validate_password, validate_username, Validator},
};
use crate::{auth::models::Identity, auth::password, store::StoreError};

pub const REFRESH_COOKIE: &str = "refreshtoken";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /users/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut v = Validator::new();
    validate_username(&mut v, &input.username);
    validate_email(&mut v, &input.email);
    validate_password(&mut v, &input.password);
    v.into_result()?;

    // The plaintext lives only on this stack frame; it is hashed before any
    // storage call and never logged.
    let password_hash = password::hash_password(&input.password).map_err(ApiError::internal)?;

    let user = state
        .store
        .create_user(&input.username, &input.email, &password_hash, false)
        .map_err(|err| match err {
            StoreError::Duplicate(_) => {
                ApiError::field("email", "a user with this email address already exists")
            }
            other => other.into(),
        })?;

    info!(user = %user.name, "user signed up");
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// POST /users/login
///
/// On success: access token in the body, refresh token set as an
/// HttpOnly/Secure cookie scoped to `/`.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let mut v = Validator::new();
    validate_email(&mut v, &input.email);
    validate_password(&mut v, &input.password);
    v.into_result()?;

    let user = state
        .store
        .get_user_by_email(&input.email)
        .map_err(|err| match err {
            // An unknown email renders the same as a wrong password.
            StoreError::NotFound => ApiError::InvalidCredentials,
            other => other.into(),
        })?;

    let matched = password::verify_password(&input.password, &user.password_hash)
        .map_err(ApiError::internal)?;
    if !matched {
        warn!(user = user.id, "failed login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    let identity = Identity {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };

    let access_token = state
        .access_tokens
        .issue(&identity)
        .map_err(ApiError::internal)?;
    let refresh_token = state
        .refresh_tokens
        .issue(&identity)
        .map_err(ApiError::internal)?;

    let refresh_secs = state.refresh_tokens.ttl().num_seconds();
    let cookie = Cookie::build((REFRESH_COOKIE, refresh_token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(refresh_secs))
        .build();

    info!(user = user.id, role = user.role.as_str(), "login successful");

    Ok((
        jar.add(cookie),
        Json(json!({ "accesstoken": access_token })),
    ))
}

/// POST /users/signout — expires the refresh cookie.
///
/// The expired cookie is always set, whether or not the request carried
/// one, so a client that lost its jar still ends up signed out.
pub async fn signout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let expired = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build();

    (
        jar.add(expired),
        Json(json!({ "message": "user signed out" })),
    )
}

/// POST /users/refresh
///
/// Reads the refresh token from its cookie only; a refresh token presented
/// on the Authorization header is never accepted here, and vice versa.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let cookie = jar.get(REFRESH_COOKIE).ok_or(ApiError::Unauthenticated)?;

    let identity = state.refresh_tokens.verify(cookie.value()).map_err(|err| {
        warn!(reason = %err, "rejected refresh token");
        ApiError::Unauthenticated
    })?;

    let access_token = state
        .access_tokens
        .issue(&identity)
        .map_err(ApiError::internal)?;

    Ok(Json(json!({
        "user": identity,
        "accesstoken": access_token,
    })))
}

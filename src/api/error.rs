//! API Error Responses
//! Mission: Map every domain failure to one stable JSON envelope

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

/// Caller-visible failure taxonomy.
///
/// `Unauthenticated` renders one uniform body no matter why the token was
/// rejected; `InvalidCredentials` (login) and `Forbidden` (role check) are
/// deliberately distinct so clients can tell "log in" from "not allowed".
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Validation(BTreeMap<String, String>),
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    NotFound,
    EditConflict,
    Timeout,
    Internal,
}

impl ApiError {
    /// Single field-level validation failure.
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.to_string());
        ApiError::Validation(errors)
    }

    /// Log the real cause, hand the caller a generic 500.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        error!("internal error: {err}");
        ApiError::Internal
    }
}

/// JSON body extractor whose rejection is the standard error envelope.
///
/// A body that is missing, malformed, or has the wrong shape renders as a
/// 400 with the parser's message instead of axum's plain-text default.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::EditConflict => ApiError::EditConflict,
            StoreError::Timeout => ApiError::Timeout,
            StoreError::Duplicate(column) => ApiError::field(
                &column,
                &format!("a row with this {column} already exists"),
            ),
            StoreError::ForeignKey => {
                ApiError::field("reference", "referenced row does not exist")
            }
            StoreError::Sqlite(source) => ApiError::internal(source),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            ApiError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, json!(errors)),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!("invalid authentication credentials"),
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!("invalid or missing authentication token"),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!("your user account doesn't have the necessary permissions to access this resource"),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                json!("the requested resource could not be found"),
            ),
            ApiError::EditConflict => (
                StatusCode::CONFLICT,
                json!("unable to update the record due to an edit conflict, please try again"),
            ),
            ApiError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!("the server could not complete your request in time, please try again"),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!("the server encountered a problem and could not process your request"),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::EditConflict.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Timeout.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_duplicate_maps_to_field_validation() {
        let err: ApiError = StoreError::Duplicate("email".to_string()).into();
        match err {
            ApiError::Validation(errors) => {
                assert!(errors.get("email").unwrap().contains("already exists"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_edit_conflict_distinct_from_duplicate() {
        let conflict: ApiError = StoreError::EditConflict.into();
        assert_eq!(
            conflict.into_response().status(),
            StatusCode::CONFLICT
        );

        let duplicate: ApiError = StoreError::Duplicate("name".to_string()).into();
        assert_eq!(
            duplicate.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

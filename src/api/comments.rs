//! Comment Endpoints
//! Mission: Comments on records, guarded by record ownership

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error::{ApiError, ApiJson}, routes::AppState, validation::Validator};
use crate::auth::models::{Identity, Role};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub description: Option<String>,
    pub expected_version: Option<i64>,
}

/// A comment is visible and editable to whoever can see its record.
fn authorize_parent_record(
    state: &AppState,
    record_id: i64,
    identity: &Identity,
) -> Result<(), ApiError> {
    let record = state.store.get_record(record_id)?;
    if record.user_id == identity.id || identity.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.check(
        !description.trim().is_empty(),
        "description",
        "must be provided",
    );
    v.check(
        description.len() <= 500,
        "description",
        "must be at most 500 characters",
    );
    v.into_result()
}

/// GET /records/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(record_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    authorize_parent_record(&state, record_id, &identity)?;
    let comments = state.store.list_comments_for_record(record_id)?;

    Ok(Json(json!({ "comments": comments })))
}

/// POST /records/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(record_id): Path<i64>,
    ApiJson(input): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_description(&input.description)?;
    authorize_parent_record(&state, record_id, &identity)?;

    let comment = state.store.create_comment(record_id, &input.description)?;

    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}

/// PATCH /comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<UpdateCommentRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut comment = state.store.get_comment(id)?;
    authorize_parent_record(&state, comment.record_id, &identity)?;

    if let Some(description) = input.description {
        validate_description(&description)?;
        comment.description = description;
    }

    let expected = input.expected_version.unwrap_or(comment.version);
    comment.version = state.store.update_comment(&comment, expected)?;

    Ok(Json(json!({ "comment": comment })))
}

/// DELETE /comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let comment = state.store.get_comment(id)?;
    authorize_parent_record(&state, comment.record_id, &identity)?;

    state.store.delete_comment(id)?;

    Ok(Json(json!({ "message": "comment deleted successfully" })))
}

//! Admin Endpoints
//! Mission: Role management plus currency and record-type administration

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{error::{ApiError, ApiJson}, routes::AppState, validation::Validator};
use crate::{auth::models::Role, store::StoreError};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub email: String,
    /// Deserializes into the closed role enum: an unknown role string is
    /// rejected before this handler ever runs.
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct CreateCurrencyRequest {
    pub name: String,
    pub rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCurrencyRequest {
    pub name: Option<String>,
    pub rate: Option<f64>,
    pub expected_version: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordTypeRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordTypeRequest {
    pub name: Option<String>,
    pub expected_version: Option<i64>,
}

/// PATCH /admin/role
pub async fn update_user_role(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpdateRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut user = state
        .store
        .get_user_by_email(&input.email)
        .map_err(|err| match err {
            StoreError::NotFound => {
                ApiError::field("email", "user with this email address was not found")
            }
            other => other.into(),
        })?;

    user.role = input.role;
    user.version = state.store.update_user(&user, user.version)?;

    info!(user = user.id, role = user.role.as_str(), "role updated");

    Ok(Json(json!({
        "message": "user role updated successfully",
        "user": user,
    })))
}

fn validate_currency_name(name: &str) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.check(!name.trim().is_empty(), "name", "must be provided");
    v.check(name.len() <= 10, "name", "must be at most 10 characters");
    v.into_result()
}

/// GET /admin/currencies
pub async fn list_currencies(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let currencies = state.store.list_currencies()?;
    Ok(Json(json!({ "currencies": currencies })))
}

/// POST /admin/currencies
pub async fn create_currency(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCurrencyRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_currency_name(&input.name)?;
    let mut v = Validator::new();
    v.check(input.rate > 0.0, "rate", "must be greater than 0");
    v.into_result()?;

    let currency = state.store.create_currency(&input.name, input.rate)?;

    Ok((StatusCode::CREATED, Json(json!({ "currency": currency }))))
}

/// GET /admin/currencies/:id
pub async fn get_currency(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let currency = state.store.get_currency(id)?;
    Ok(Json(json!({ "currency": currency })))
}

/// PATCH /admin/currencies/:id
pub async fn update_currency(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<UpdateCurrencyRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut currency = state.store.get_currency(id)?;

    if let Some(name) = input.name {
        validate_currency_name(&name)?;
        currency.name = name;
    }
    if let Some(rate) = input.rate {
        let mut v = Validator::new();
        v.check(rate > 0.0, "rate", "must be greater than 0");
        v.into_result()?;
        currency.rate = rate;
    }

    let expected = input.expected_version.unwrap_or(currency.version);
    currency.version = state.store.update_currency(&currency, expected)?;

    Ok(Json(json!({ "currency": currency })))
}

/// DELETE /admin/currencies/:id
pub async fn delete_currency(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_currency(id)?;
    Ok(Json(json!({ "message": "currency deleted successfully" })))
}

/// GET /admin/recordtypes
pub async fn list_record_types(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let record_types = state.store.list_record_types()?;
    Ok(Json(json!({ "recordtypes": record_types })))
}

/// POST /admin/recordtypes
pub async fn create_record_type(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateRecordTypeRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut v = Validator::new();
    v.check(!input.name.trim().is_empty(), "name", "must be provided");
    v.check(
        input.name.len() <= 50,
        "name",
        "must be at most 50 characters",
    );
    v.into_result()?;

    let record_type = state.store.create_record_type(&input.name)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "recordtype": record_type })),
    ))
}

/// GET /admin/recordtypes/:id
pub async fn get_record_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let record_type = state.store.get_record_type(id)?;
    Ok(Json(json!({ "recordtype": record_type })))
}

/// PATCH /admin/recordtypes/:id
pub async fn update_record_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<UpdateRecordTypeRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut record_type = state.store.get_record_type(id)?;

    if let Some(name) = input.name {
        let mut v = Validator::new();
        v.check(!name.trim().is_empty(), "name", "must be provided");
        v.into_result()?;
        record_type.name = name;
    }

    let expected = input.expected_version.unwrap_or(record_type.version);
    record_type.version = state.store.update_record_type(&record_type, expected)?;

    Ok(Json(json!({ "recordtype": record_type })))
}

/// DELETE /admin/recordtypes/:id
pub async fn delete_record_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_record_type(id)?;
    Ok(Json(
        json!({ "message": "record type deleted successfully" }),
    ))
}

//! Record Endpoints
//! Mission: CRUD over a user's own monetary records

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error::{ApiError, ApiJson}, routes::AppState, validation::Validator};
use crate::{
    auth::models::{Identity, Role},
    models::Record,
    store::RecordFilters,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    pub type_id: i64,
    pub currency_id: i64,
}

/// Partial patch: provided fields overwrite, omitted fields are untouched.
/// `expected_version` is the optimistic-concurrency compare value from a
/// prior read; when omitted it defaults to the version this handler reads,
/// which still guards against races inside the request window.
#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub amount: Option<i64>,
    pub description: Option<String>,
    pub type_id: Option<i64>,
    pub currency_id: Option<i64>,
    pub expected_version: Option<i64>,
}

fn parse_date(v: &mut Validator, field: &str, raw: &Option<String>) -> Option<String> {
    let raw = raw.as_deref()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc).to_rfc3339()),
        Err(_) => {
            v.add_error(field, "must be an RFC 3339 timestamp");
            None
        }
    }
}

fn build_filters(params: &ListParams) -> Result<RecordFilters, ApiError> {
    let mut v = Validator::new();

    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(20);
    v.check(page >= 1, "page", "must be at least 1");
    v.check(
        (1..=100).contains(&page_size),
        "page_size",
        "must be between 1 and 100",
    );

    let sort = params.sort.clone().unwrap_or_else(|| "id".to_string());
    v.check(
        RecordFilters::SORT_KEYS.contains(&sort.as_str()),
        "sort",
        "invalid sort value",
    );

    let start_date = parse_date(&mut v, "start_date", &params.start_date);
    let end_date = parse_date(&mut v, "end_date", &params.end_date)
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    v.into_result()?;

    Ok(RecordFilters {
        start_date,
        end_date,
        page,
        page_size,
        sort,
    })
}

/// Owner or admin; anyone else sees the same response as a missing row.
fn authorize_record(record: &Record, identity: &Identity) -> Result<(), ApiError> {
    if record.user_id == identity.id || identity.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

/// GET /records
pub async fn list_records(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let filters = build_filters(&params)?;
    let records = state.store.list_records_for_user(identity.id, &filters)?;

    Ok(Json(json!({
        "metadata": {
            "page": filters.page,
            "page_size": filters.page_size,
            "count": records.len(),
        },
        "records": records,
    })))
}

/// POST /records
pub async fn create_record(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(input): ApiJson<CreateRecordRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut v = Validator::new();
    v.check(input.amount > 0, "amount", "must be greater than 0");
    v.check(input.type_id > 0, "type_id", "must be provided");
    v.check(input.currency_id > 0, "currency_id", "must be provided");
    v.into_result()?;

    let record = state.store.create_record(
        input.amount,
        &input.description,
        input.type_id,
        input.currency_id,
        identity.id,
    )?;

    Ok((StatusCode::CREATED, Json(json!({ "record": record }))))
}

/// GET /records/:id
pub async fn get_record(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let record = state.store.get_record(id)?;
    authorize_record(&record, &identity)?;

    Ok(Json(json!({ "record": record })))
}

/// PATCH /records/:id
pub async fn update_record(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<UpdateRecordRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut v = Validator::new();
    if let Some(amount) = input.amount {
        v.check(amount > 0, "amount", "must be greater than 0");
    }
    if let Some(type_id) = input.type_id {
        v.check(type_id > 0, "type_id", "must be provided");
    }
    if let Some(currency_id) = input.currency_id {
        v.check(currency_id > 0, "currency_id", "must be provided");
    }
    v.into_result()?;

    let mut record = state.store.get_record(id)?;
    authorize_record(&record, &identity)?;

    if let Some(amount) = input.amount {
        record.amount = amount;
    }
    if let Some(description) = input.description {
        record.description = description;
    }
    if let Some(type_id) = input.type_id {
        record.type_id = type_id;
    }
    if let Some(currency_id) = input.currency_id {
        record.currency_id = currency_id;
    }

    let expected = input.expected_version.unwrap_or(record.version);
    record.version = state.store.update_record(&record, expected)?;

    Ok(Json(json!({ "record": record })))
}

/// DELETE /records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let record = state.store.get_record(id)?;
    authorize_record(&record, &identity)?;

    state.store.delete_record(id)?;

    Ok(Json(json!({ "message": "record deleted successfully" })))
}

//! Router assembly.
//!
//! Gate composition per route group:
//!   public     → /health, /users/*
//!   records    → authenticate
//!   admin      → authenticate, then a role allow-set

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use super::{admin, comments, records, users};
use crate::{
    auth::{authenticate, jwt::TokenCodec, models::Role, require_role},
    middleware::logging::request_logging,
    store::Store,
};

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const ROLE_MANAGERS: &[Role] = &[Role::Admin, Role::Superuser];

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub access_tokens: Arc<TokenCodec>,
    pub refresh_tokens: Arc<TokenCodec>,
    pub environment: String,
}

/// GET /health
async fn healthcheck(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "available",
        "environment": state.environment,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(healthcheck))
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/users/signout", post(users::signout))
        .route("/users/refresh", post(users::refresh))
        .with_state(state.clone());

    let record_routes = Router::new()
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route(
            "/records/:id",
            get(records::get_record)
                .patch(records::update_record)
                .delete(records::delete_record),
        )
        .route(
            "/records/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/comments/:id",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.access_tokens.clone(),
            authenticate,
        ))
        .with_state(state.clone());

    // Currencies and record types are admin-only; role changes are also open
    // to superusers.
    let admin_catalog = Router::new()
        .route(
            "/admin/currencies",
            get(admin::list_currencies).post(admin::create_currency),
        )
        .route(
            "/admin/currencies/:id",
            get(admin::get_currency)
                .patch(admin::update_currency)
                .delete(admin::delete_currency),
        )
        .route(
            "/admin/recordtypes",
            get(admin::list_record_types).post(admin::create_record_type),
        )
        .route(
            "/admin/recordtypes/:id",
            get(admin::get_record_type)
                .patch(admin::update_record_type)
                .delete(admin::delete_record_type),
        )
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, require_role));

    let admin_roles = Router::new()
        .route("/admin/role", patch(admin::update_user_role))
        .route_layer(middleware::from_fn_with_state(ROLE_MANAGERS, require_role));

    let admin_routes = admin_catalog
        .merge(admin_roles)
        .route_layer(middleware::from_fn_with_state(
            state.access_tokens.clone(),
            authenticate,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(record_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

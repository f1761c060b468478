//! Money Manager API Server
//! Mission: Personal finance record keeping behind an authenticated REST API

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moneymanager_backend::{
    api::{build_router, AppState},
    auth::TokenCodec,
    config::Config,
    store::Store,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let config = Config::parse();
    init_tracing();

    // Misconfiguration aborts here, never at first-request time.
    config.validate()?;

    let store = Arc::new(Store::new(&config.db_path).context("failed to open database")?);

    // Two token codecs sharing the process secret: short-lived access,
    // long-lived refresh. The secret is injected once and never mutated.
    let access_tokens = Arc::new(TokenCodec::new(
        config.secret_key.clone(),
        Duration::minutes(config.access_ttl_mins),
    ));
    let refresh_tokens = Arc::new(TokenCodec::new(
        config.secret_key.clone(),
        Duration::days(config.refresh_ttl_days),
    ));

    info!("🔐 Token codecs initialized (access {}m, refresh {}d)", config.access_ttl_mins, config.refresh_ttl_days);
    info!("📊 Database ready at {}", config.db_path);

    let state = AppState {
        store,
        access_tokens,
        refresh_tokens,
        environment: config.environment.clone(),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("🎯 API server listening on {addr} ({})", config.environment);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moneymanager_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zettel-Sync API Server
//!
//! Signs users in with GitHub and keeps their notes backup in a private
//! `zettel-backup` repository.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zettel_sync::{config::Config, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        frontend_url = %config.frontend_url,
        github_api_url = %config.github_api_url,
        "Starting Zettel-Sync API"
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(config));
    let app = zettel_sync::routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::from_default_env()
        .add_directive("zettel_sync=debug".parse()?)
        .add_directive("info".parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()?;
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trailine API Server
//!
//! Serves trekking course search and detail, interval assembly and
//! mountain weather from PostgreSQL/PostGIS.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use trailine_api::{
    config::Config,
    db::PgDb,
    services::{CourseService, KmaClient, WeatherService},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Trailine API");

    // Connect and make sure the schema exists
    let db = Arc::new(
        PgDb::connect(&config.database_url, config.db_pool_size)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    db.init_schema()
        .await
        .context("Failed to apply database schema")?;

    let course_service = CourseService::new(db.clone(), db.clone());

    if config.kma_auth_key.is_none() {
        tracing::warn!("KMA_API_AUTH_KEY not set, weather responses will be empty");
    }
    let kma = KmaClient::new(&config.kma_api_url, config.kma_auth_key.clone());
    let weather_service = WeatherService::new(
        db.clone(),
        kma,
        Duration::from_secs(config.weather_cache_ttl_secs),
    );
    tracing::info!(
        ttl_secs = config.weather_cache_ttl_secs,
        "Weather service initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        course_service,
        weather_service,
    });

    // Build router
    let app = trailine_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trailine_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}

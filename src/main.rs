// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hoc Tu Thien API Server
//!
//! Books mentoring sessions and confirms their charity donations against
//! the Thien Nguyen bank transaction feed.

use hoctuthien::{config::Config, db::seed::seed_demo_data, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Hoc Tu Thien API");

    let state = AppState::new(config.clone()).expect("Failed to initialize services");
    tracing::info!(
        feed = %config.feed_base_url,
        demo_fallback = config.feed_demo_fallback,
        "Transaction feed client initialized"
    );

    if config.seed_demo_data {
        seed_demo_data(state.db.as_ref(), chrono::Utc::now()).expect("Failed to seed demo data");
    }

    // Build router
    let app = hoctuthien::routes::create_router(Arc::new(state));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hoctuthien=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

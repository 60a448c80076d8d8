// SPDX-License-Identifier: MIT

//! Skycast API Server
//!
//! Proxies city/coordinate weather queries to OpenWeather and persists
//! search history and favorite cities in Firestore.

use skycast::{config::Config, db::WeatherDb, services::OpenWeatherClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Skycast API");

    // Initialize Firestore database
    let db = WeatherDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize the upstream weather client
    let weather = OpenWeatherClient::new(config.openweather_api_key.clone());
    tracing::info!("OpenWeather client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        weather,
    });

    // Build router
    let app = skycast::routes::create_router(state);

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
                .add_directive("skycast=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

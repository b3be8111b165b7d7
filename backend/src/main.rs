//! Hazard Watch Platform - Backend Server
//!
//! Continuous multi-hazard risk monitoring: satellite and weather data
//! fused into per-location risk assessments, matched against alert zones,
//! dispatched over configured notification channels.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hazard_watch_backend::external::notify::NotificationGateway;
use hazard_watch_backend::external::satellite::SceneServiceClient;
use hazard_watch_backend::external::weather::OpenMeteoClient;
use hazard_watch_backend::services::alerts::AlertDispatcher;
use hazard_watch_backend::services::assessment::AssessmentService;
use hazard_watch_backend::services::fusion::RiskFusionEngine;
use hazard_watch_backend::services::history::WeatherHistoryTracker;
use hazard_watch_backend::services::monitor::RealtimeMonitor;
use hazard_watch_backend::services::zones::ZoneRegistry;
use hazard_watch_backend::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hwp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Hazard Watch Server");
    tracing::info!("Environment: {}", config.environment);

    // Wire up services
    let history = WeatherHistoryTracker::new(config.history.retention_days)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let fusion = RiskFusionEngine::new(config.fusion.clone());
    let zones = ZoneRegistry::new();
    let gateway = Arc::new(NotificationGateway::new(config.notify.gateway_url.clone()));
    let alerts = AlertDispatcher::new(gateway);
    let assessments = AssessmentService::new(history, fusion, zones, alerts);

    // Providers for the realtime monitor
    let weather_provider = Arc::new(OpenMeteoClient::new(config.weather.api_endpoint.clone()));
    let satellite_provider = Arc::new(SceneServiceClient::new(
        config.satellite.api_key.clone(),
        config.satellite.api_endpoint.clone(),
    ));
    let monitor = RealtimeMonitor::new(
        config.monitor.clone(),
        weather_provider,
        satellite_provider,
        assessments.clone(),
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tokio::spawn(monitor.run());

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        assessments,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

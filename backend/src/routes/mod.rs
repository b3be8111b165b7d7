//! Route definitions for the Hazard Watch Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Risk assessments
        .nest("/assessments", assessment_routes())
        // Alert zone management
        .nest("/zones", zone_routes())
        // Alert lifecycle
        .nest("/alerts", alert_routes())
}

/// Assessment routes
fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::run_assessment))
        .route("/:location_key", get(handlers::get_recent_assessments))
}

/// Zone management routes
fn zone_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_zones).post(handlers::create_zone))
        .route(
            "/:zone_id",
            get(handlers::get_zone)
                .put(handlers::update_zone)
                .delete(handlers::delete_zone),
        )
}

/// Alert lifecycle routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/active", get(handlers::list_active_alerts))
        .route("/history", get(handlers::list_alert_history))
        .route("/:alert_id/acknowledge", post(handlers::acknowledge_alert))
        .route("/clear-old", post(handlers::clear_old_alerts))
}

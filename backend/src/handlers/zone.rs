//! HTTP handlers for alert zone management

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use shared::{AlertZone, VerificationSummary, ZoneInput};

use crate::error::AppResult;
use crate::AppState;

/// A created zone plus the confirmation delivery summary
#[derive(Debug, Serialize)]
pub struct CreateZoneResponse {
    pub zone: AlertZone,
    pub verification: VerificationSummary,
}

/// Create a zone and send recipients a registration confirmation
pub async fn create_zone(
    State(state): State<AppState>,
    Json(input): Json<ZoneInput>,
) -> AppResult<Json<CreateZoneResponse>> {
    let zone = state.assessments.zone_registry().create(input).await?;
    let verification = state
        .assessments
        .alert_dispatcher()
        .verify_zone(&zone)
        .await;
    Ok(Json(CreateZoneResponse { zone, verification }))
}

/// List all zones
pub async fn list_zones(State(state): State<AppState>) -> AppResult<Json<Vec<AlertZone>>> {
    Ok(Json(state.assessments.zone_registry().list().await))
}

/// Get a zone by ID
pub async fn get_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Json<AlertZone>> {
    Ok(Json(state.assessments.zone_registry().get(zone_id).await?))
}

/// Replace a zone's configuration
pub async fn update_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
    Json(input): Json<ZoneInput>,
) -> AppResult<Json<AlertZone>> {
    Ok(Json(
        state
            .assessments
            .zone_registry()
            .update(zone_id, input)
            .await?,
    ))
}

/// Deactivate a zone
pub async fn delete_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Json<AlertZone>> {
    Ok(Json(
        state.assessments.zone_registry().deactivate(zone_id).await?,
    ))
}

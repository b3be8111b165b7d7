//! HTTP handlers for on-demand assessments

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use shared::{GeoPoint, RiskAssessment, SatelliteScene, WeatherObservation};

use crate::error::AppResult;
use crate::services::assessment::AssessmentOutcome;
use crate::AppState;

/// Request body for an on-demand assessment. Both inputs are optional;
/// scoring degrades over whatever is present plus recorded history.
#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub location_key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub scene: Option<SatelliteScene>,
    pub weather: Option<WeatherObservation>,
}

/// Run one assessment for a location
pub async fn run_assessment(
    State(state): State<AppState>,
    Json(request): Json<AssessRequest>,
) -> AppResult<Json<AssessmentOutcome>> {
    let point = GeoPoint::new(request.latitude, request.longitude);
    let outcome = state
        .assessments
        .assess(
            &request.location_key,
            point,
            request.scene.as_ref(),
            request.weather,
        )
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// Recent assessments for a location, newest first
pub async fn get_recent_assessments(
    State(state): State<AppState>,
    Path(location_key): Path<String>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<RiskAssessment>>> {
    let limit = query.limit.unwrap_or(10);
    let assessments = state.assessments.recent(&location_key, limit).await;
    Ok(Json(assessments))
}

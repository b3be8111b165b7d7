//! HTTP handlers for alert lifecycle management

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use shared::Alert;

use crate::error::AppResult;
use crate::AppState;

/// List active alerts, newest first
pub async fn list_active_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<Alert>>> {
    Ok(Json(state.assessments.alert_dispatcher().active().await))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// List historical alerts, newest first
pub async fn list_alert_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    let limit = query.limit.unwrap_or(50);
    Ok(Json(
        state.assessments.alert_dispatcher().history(limit).await,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeInput {
    pub user: String,
}

/// Acknowledge an active alert
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
    Json(input): Json<AcknowledgeInput>,
) -> AppResult<Json<Alert>> {
    Ok(Json(
        state
            .assessments
            .alert_dispatcher()
            .acknowledge(&alert_id, &input.user)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ClearOldQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ClearOldResponse {
    pub removed: usize,
}

/// Purge historical alerts older than the given number of days
pub async fn clear_old_alerts(
    State(state): State<AppState>,
    Query(query): Query<ClearOldQuery>,
) -> AppResult<Json<ClearOldResponse>> {
    let days = query.days.unwrap_or(30);
    let removed = state.assessments.alert_dispatcher().clear_old(days).await;
    Ok(Json(ClearOldResponse { removed }))
}

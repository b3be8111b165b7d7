//! Assessment orchestration
//!
//! Glue between extraction, history, fusion, zone matching, and alert
//! dispatch. Both the on-demand endpoint and the realtime monitor run
//! their cycles through this service.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use shared::{
    Alert, GeoPoint, RiskAssessment, RiskLevel, SatelliteScene, VerificationSummary,
    WeatherObservation,
};

use crate::error::{AppError, AppResult};
use crate::services::alerts::{AlertCandidate, AlertDispatcher};
use crate::services::features::extract_features;
use crate::services::fusion::RiskFusionEngine;
use crate::services::history::WeatherHistoryTracker;
use crate::services::zones::ZoneRegistry;

/// Recent assessments kept per location for the history endpoint
const RECENT_CAP: usize = 50;

/// Zoneless alerts are raised only at this level or above
const GLOBAL_ALERT_FLOOR: RiskLevel = RiskLevel::High;

/// An alert raised during one assessment, with its delivery summary
#[derive(Debug, Clone, serde::Serialize)]
pub struct RaisedAlert {
    pub alert: Alert,
    pub delivery: VerificationSummary,
}

/// Outcome of one assessment run
#[derive(Debug, Clone, serde::Serialize)]
pub struct AssessmentOutcome {
    pub assessment: RiskAssessment,
    pub raised: Vec<RaisedAlert>,
}

/// Orchestrates one full scoring pass per location
#[derive(Clone)]
pub struct AssessmentService {
    history: WeatherHistoryTracker,
    fusion: RiskFusionEngine,
    zones: ZoneRegistry,
    alerts: AlertDispatcher,
    recent: Arc<Mutex<HashMap<String, VecDeque<RiskAssessment>>>>,
}

impl AssessmentService {
    pub fn new(
        history: WeatherHistoryTracker,
        fusion: RiskFusionEngine,
        zones: ZoneRegistry,
        alerts: AlertDispatcher,
    ) -> Self {
        Self {
            history,
            fusion,
            zones,
            alerts,
            recent: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run one assessment for a location.
    ///
    /// Either input may be absent; fusion degrades accordingly. A weather
    /// observation is folded into the history first so deltas include it.
    pub async fn assess(
        &self,
        location_key: &str,
        point: GeoPoint,
        scene: Option<&SatelliteScene>,
        weather: Option<WeatherObservation>,
    ) -> AppResult<AssessmentOutcome> {
        shared::validate_location_key(location_key).map_err(|msg| AppError::Validation {
            field: "location_key".to_string(),
            message: msg.to_string(),
        })?;
        shared::validate_point(&point).map_err(|msg| AppError::Validation {
            field: "point".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(ref observation) = weather {
            match self.history.record(location_key, observation.clone()).await {
                Ok(()) => {}
                // A re-fetched observation is not a reason to fail the run
                Err(AppError::Conflict { .. }) => {
                    tracing::debug!(location = location_key, "observation already recorded");
                }
                Err(e) => return Err(e),
            }
        }

        let features = match scene {
            Some(scene) => match extract_features(scene) {
                Ok(features) => Some(features),
                Err(AppError::DataUnavailable(msg)) => {
                    tracing::warn!(location = location_key, "satellite degraded: {}", msg);
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let latest = match weather {
            Some(observation) => Some(observation),
            None => self.history.latest(location_key).await,
        };
        let deltas = self.history.deltas(location_key).await;

        let assessment = self.fusion.assess(
            location_key,
            point,
            features.as_ref(),
            latest.as_ref(),
            &deltas,
        );

        let raised = self.dispatch(&assessment).await?;

        let mut recent = self.recent.lock().await;
        let entry = recent.entry(location_key.to_string()).or_default();
        entry.push_back(assessment.clone());
        while entry.len() > RECENT_CAP {
            entry.pop_front();
        }

        Ok(AssessmentOutcome { assessment, raised })
    }

    /// Match zones and raise alerts for every hazard that warrants one
    async fn dispatch(&self, assessment: &RiskAssessment) -> AppResult<Vec<RaisedAlert>> {
        let mut raised = Vec::new();
        for score in &assessment.scores {
            let zones = self.zones.matching(assessment.point, score.level).await;
            for zone in zones {
                let candidate = AlertCandidate {
                    zone: Some(zone),
                    hazard: score.hazard,
                    severity: score.level,
                    confidence: score.confidence,
                    location_key: assessment.location_key.clone(),
                    point: assessment.point,
                    reasons: score.reasons.clone(),
                };
                if let Some((alert, delivery)) = self.alerts.raise(candidate).await? {
                    raised.push(RaisedAlert { alert, delivery });
                }
            }

            // High-and-above risk raises a zoneless alert even when no
            // configured zone covers the point.
            if score.level >= GLOBAL_ALERT_FLOOR {
                let candidate = AlertCandidate {
                    zone: None,
                    hazard: score.hazard,
                    severity: score.level,
                    confidence: score.confidence,
                    location_key: assessment.location_key.clone(),
                    point: assessment.point,
                    reasons: score.reasons.clone(),
                };
                if let Some((alert, delivery)) = self.alerts.raise(candidate).await? {
                    raised.push(RaisedAlert { alert, delivery });
                }
            }
        }
        Ok(raised)
    }

    /// Recent assessments for a location, newest first
    pub async fn recent(&self, location_key: &str, limit: usize) -> Vec<RiskAssessment> {
        let recent = self.recent.lock().await;
        recent
            .get(location_key)
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn history(&self) -> &WeatherHistoryTracker {
        &self.history
    }

    pub fn alert_dispatcher(&self) -> &AlertDispatcher {
        &self.alerts
    }

    pub fn zone_registry(&self) -> &ZoneRegistry {
        &self.zones
    }
}

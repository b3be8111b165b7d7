//! Risk assessment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::WeatherObservation;
use crate::types::{GeoPoint, HazardKind, RiskLevel};

/// Score for one hazard produced by the fusion engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HazardScore {
    pub hazard: HazardKind,
    /// Satisfied weight over maximum attainable weight, clamped to [0, 1]
    pub confidence: f64,
    pub level: RiskLevel,
    /// Human-readable reasons for each satisfied rule, in rule order
    pub reasons: Vec<String>,
    /// Share of satisfied weight contributed per source. Sums to ~1 when
    /// any rule fired; both zero otherwise.
    pub satellite_share: f64,
    pub weather_share: f64,
    /// True when every rule for this hazard had unavailable inputs
    pub no_usable_data: bool,
}

/// A full multi-hazard assessment for one location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub location_key: String,
    pub point: GeoPoint,
    pub generated_at: DateTime<Utc>,
    /// The weather snapshot the scores were computed from, if any
    pub current_weather: Option<WeatherObservation>,
    /// One score per hazard, in evaluation order
    pub scores: Vec<HazardScore>,
    pub primary_threat: HazardKind,
    pub primary_confidence: f64,
    pub primary_level: RiskLevel,
}

impl RiskAssessment {
    pub fn score(&self, hazard: HazardKind) -> Option<&HazardScore> {
        self.scores.iter().find(|s| s.hazard == hazard)
    }
}

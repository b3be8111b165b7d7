//! Alert zone models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::AlertChannel;
use crate::types::{GeoPoint, RiskLevel};

/// A named polygon with alerting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertZone {
    pub id: Uuid,
    pub name: String,
    /// Polygon vertices in order; the edge from the last vertex back to
    /// the first closes the ring. Boundary points count as inside.
    pub polygon: Vec<GeoPoint>,
    /// Minimum assessment severity that triggers this zone
    pub severity_threshold: RiskLevel,
    pub channels: Vec<AlertChannel>,
    pub recipients: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneInput {
    pub name: String,
    pub polygon: Vec<GeoPoint>,
    pub severity_threshold: RiskLevel,
    #[serde(default)]
    pub channels: Vec<AlertChannel>,
    #[serde(default)]
    pub recipients: Vec<String>,
}

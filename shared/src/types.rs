//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Hazard categories the platform scores
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Fire,
    Flood,
    Cyclone,
}

impl HazardKind {
    /// Evaluation order. Also the tie-break order for the primary threat:
    /// when two hazards score equally, the earlier entry wins.
    pub const ALL: [HazardKind; 3] = [HazardKind::Fire, HazardKind::Flood, HazardKind::Cyclone];

    /// Three-letter tag used in alert identifiers
    pub fn tag(&self) -> &'static str {
        match self {
            HazardKind::Fire => "FIR",
            HazardKind::Flood => "FLD",
            HazardKind::Cyclone => "CYC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HazardKind::Fire => "Fire",
            HazardKind::Flood => "Flood",
            HazardKind::Cyclone => "Cyclone",
        }
    }
}

/// Risk severity scale. Ordinal: Low < Medium < High < Critical. Low is
/// the floor; an assessment with no supporting evidence is still LOW.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// Which data source a fusion rule draws on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Satellite,
    Weather,
}

//! Satellite scene and feature models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// Raw band grids for one captured scene.
///
/// Bands are flattened row-major pixel arrays. All present bands are
/// expected to have the same length; thermal values are in Celsius,
/// reflectance bands are unitless.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SatelliteScene {
    pub captured_at: Option<DateTime<Utc>>,
    pub center: Option<GeoPoint>,
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub nir: Vec<f64>,
    pub thermal: Vec<f64>,
}

impl SatelliteScene {
    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.green.is_empty() && self.nir.is_empty() && self.thermal.is_empty()
    }
}

/// Features extracted from one scene, consumed by the fusion engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SatelliteFeatureVector {
    pub thermal_mean: Option<f64>,
    pub thermal_max: Option<f64>,
    pub thermal_std: Option<f64>,
    /// Fraction (0..1) of thermal pixels above mean + 2 standard deviations
    pub hotspot_pct: Option<f64>,
    pub ndvi_mean: Option<f64>,
    pub ndvi_min: Option<f64>,
    pub ndvi_max: Option<f64>,
    pub ndwi_mean: Option<f64>,
    pub ndwi_max: Option<f64>,
}

//! Weather observation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// A single weather observation at a point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    pub timestamp: DateTime<Utc>,
    pub location: GeoPoint,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub wind_speed_kmh: f64,
    pub rainfall_mm: f64,
}

impl WeatherObservation {
    pub fn field(&self, field: WeatherField) -> f64 {
        match field {
            WeatherField::Temperature => self.temperature_c,
            WeatherField::Humidity => self.humidity_pct,
            WeatherField::Pressure => self.pressure_hpa,
            WeatherField::WindSpeed => self.wind_speed_kmh,
            WeatherField::Rainfall => self.rainfall_mm,
        }
    }
}

/// Observed weather quantities the history tracker can query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WeatherField {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    Rainfall,
}

/// Change in an observed quantity over a lookback offset.
///
/// `Unavailable` means no observation fell within tolerance of the
/// requested offset. Callers must treat it as missing data, never as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum Delta {
    Available(f64),
    Unavailable,
}

impl Delta {
    pub fn value(&self) -> Option<f64> {
        match self {
            Delta::Available(v) => Some(*v),
            Delta::Unavailable => None,
        }
    }
}

/// Deltas for the standard lookback offsets of one field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldDeltas {
    pub over_1h: Delta,
    pub over_3h: Delta,
    pub over_6h: Delta,
    pub over_12h: Delta,
}

impl FieldDeltas {
    pub fn unavailable() -> Self {
        Self {
            over_1h: Delta::Unavailable,
            over_3h: Delta::Unavailable,
            over_6h: Delta::Unavailable,
            over_12h: Delta::Unavailable,
        }
    }

    /// Largest available rise across the offsets, if any resolved. A big
    /// drop over a long offset must not mask a sharp short-offset rise,
    /// so this compares signed values, not magnitudes.
    pub fn max_rise(&self) -> Option<f64> {
        [self.over_1h, self.over_3h, self.over_6h, self.over_12h]
            .iter()
            .filter_map(|d| d.value())
            .max_by(|a, b| a.total_cmp(b))
    }
}

/// Recent-change summary the fusion engine consumes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherDeltas {
    pub temperature: FieldDeltas,
    pub humidity: FieldDeltas,
    pub pressure: FieldDeltas,
}

impl WeatherDeltas {
    pub fn unavailable() -> Self {
        Self {
            temperature: FieldDeltas::unavailable(),
            humidity: FieldDeltas::unavailable(),
            pressure: FieldDeltas::unavailable(),
        }
    }
}

/// Mean and standard deviation of a field over a window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldStats {
    pub mean: f64,
    pub std_dev: f64,
    pub sample_count: usize,
}

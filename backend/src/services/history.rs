//! Rolling weather history per monitored location
//!
//! Keeps a bounded in-memory window of observations keyed by location and
//! answers change-over-time, trend, and summary-statistic queries against
//! it. Each location has its own lock, so writers for different locations
//! never contend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use shared::{Delta, FieldDeltas, FieldStats, WeatherDeltas, WeatherField, WeatherObservation};

use crate::error::{AppError, AppResult};

/// Lookback offsets supported by change queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
}

impl Lookback {
    pub const ALL: [Lookback; 4] = [
        Lookback::OneHour,
        Lookback::ThreeHours,
        Lookback::SixHours,
        Lookback::TwelveHours,
    ];

    pub fn duration(&self) -> Duration {
        match self {
            Lookback::OneHour => Duration::hours(1),
            Lookback::ThreeHours => Duration::hours(3),
            Lookback::SixHours => Duration::hours(6),
            Lookback::TwelveHours => Duration::hours(12),
        }
    }

    /// Matching tolerance: 20% of the offset on either side
    fn tolerance(&self) -> Duration {
        self.duration() / 5
    }
}

#[derive(Debug, Default)]
struct LocationHistory {
    /// Observations in ascending timestamp order
    observations: Vec<WeatherObservation>,
}

/// Tracker over per-location observation windows
#[derive(Clone)]
pub struct WeatherHistoryTracker {
    locations: Arc<RwLock<HashMap<String, Arc<Mutex<LocationHistory>>>>>,
    retention: Duration,
}

impl WeatherHistoryTracker {
    /// Create a tracker retaining `retention_days` of observations (3-7)
    pub fn new(retention_days: u32) -> AppResult<Self> {
        shared::validate_retention_days(retention_days)
            .map_err(|msg| AppError::Configuration(msg.to_string()))?;
        Ok(Self {
            locations: Arc::new(RwLock::new(HashMap::new())),
            retention: Duration::days(retention_days as i64),
        })
    }

    async fn location(&self, key: &str) -> Arc<Mutex<LocationHistory>> {
        {
            let map = self.locations.read().await;
            if let Some(entry) = map.get(key) {
                return Arc::clone(entry);
            }
        }
        let mut map = self.locations.write().await;
        Arc::clone(map.entry(key.to_string()).or_default())
    }

    /// Record an observation for a location.
    ///
    /// Inserts in timestamp order, rejects duplicate timestamps for the
    /// same location, and purges observations past the retention horizon.
    pub async fn record(&self, key: &str, observation: WeatherObservation) -> AppResult<()> {
        shared::validate_location_key(key).map_err(|msg| AppError::Validation {
            field: "location_key".to_string(),
            message: msg.to_string(),
        })?;

        let entry = self.location(key).await;
        let mut history = entry.lock().await;

        let position = match history
            .observations
            .binary_search_by_key(&observation.timestamp, |o| o.timestamp)
        {
            Ok(_) => {
                return Err(AppError::Conflict {
                    resource: "observation".to_string(),
                    message: format!(
                        "observation at {} already recorded for {}",
                        observation.timestamp, key
                    ),
                });
            }
            Err(position) => position,
        };
        history.observations.insert(position, observation);

        // Purge relative to the newest observation, not wall clock, so
        // replayed historical data ages out consistently.
        let newest = history
            .observations
            .last()
            .map(|o| o.timestamp)
            .unwrap_or_else(Utc::now);
        let horizon = newest - self.retention;
        history.observations.retain(|o| o.timestamp >= horizon);
        Ok(())
    }

    /// Most recent observation for a location
    pub async fn latest(&self, key: &str) -> Option<WeatherObservation> {
        let entry = self.location(key).await;
        let history = entry.lock().await;
        history.observations.last().cloned()
    }

    /// Number of retained observations for a location
    pub async fn len(&self, key: &str) -> usize {
        let entry = self.location(key).await;
        let history = entry.lock().await;
        history.observations.len()
    }

    /// Change in a field between now and `lookback` ago.
    ///
    /// "Now" is the newest observation. The historical sample must land
    /// within the lookback's tolerance of the target time; if none does,
    /// the answer is `Unavailable` rather than an interpolated value.
    pub async fn change_over(&self, key: &str, field: WeatherField, lookback: Lookback) -> Delta {
        let entry = self.location(key).await;
        let history = entry.lock().await;

        let Some(latest) = history.observations.last() else {
            return Delta::Unavailable;
        };
        let target = latest.timestamp - lookback.duration();
        let tolerance = lookback.tolerance();

        let candidate = history
            .observations
            .iter()
            .filter(|o| (o.timestamp - target).abs() <= tolerance)
            .min_by_key(|o| (o.timestamp - target).abs());

        match candidate {
            Some(historical) => Delta::Available(latest.field(field) - historical.field(field)),
            None => Delta::Unavailable,
        }
    }

    /// Deltas for one field across every standard lookback
    pub async fn field_deltas(&self, key: &str, field: WeatherField) -> FieldDeltas {
        FieldDeltas {
            over_1h: self.change_over(key, field, Lookback::OneHour).await,
            over_3h: self.change_over(key, field, Lookback::ThreeHours).await,
            over_6h: self.change_over(key, field, Lookback::SixHours).await,
            over_12h: self.change_over(key, field, Lookback::TwelveHours).await,
        }
    }

    /// The delta summary the fusion engine consumes
    pub async fn deltas(&self, key: &str) -> WeatherDeltas {
        WeatherDeltas {
            temperature: self.field_deltas(key, WeatherField::Temperature).await,
            humidity: self.field_deltas(key, WeatherField::Humidity).await,
            pressure: self.field_deltas(key, WeatherField::Pressure).await,
        }
    }

    /// Least-squares slope of a field in units per hour over `window`,
    /// measured back from the newest observation. Needs at least 2 points.
    pub async fn trend(&self, key: &str, field: WeatherField, window: Duration) -> Delta {
        let entry = self.location(key).await;
        let history = entry.lock().await;

        let Some(latest) = history.observations.last() else {
            return Delta::Unavailable;
        };
        let start = latest.timestamp - window;
        let points: Vec<(f64, f64)> = history
            .observations
            .iter()
            .filter(|o| o.timestamp >= start)
            .map(|o| {
                let hours = (o.timestamp - start).num_seconds() as f64 / 3600.0;
                (hours, o.field(field))
            })
            .collect();

        if points.len() < 2 {
            return Delta::Unavailable;
        }

        let n = points.len() as f64;
        let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
        let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
        let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
        let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

        let denom = n * sum_xx - sum_x * sum_x;
        if denom == 0.0 {
            return Delta::Unavailable;
        }
        Delta::Available((n * sum_xy - sum_x * sum_y) / denom)
    }

    /// Mean and population standard deviation of a field over `window`
    pub async fn stats(&self, key: &str, field: WeatherField, window: Duration) -> Option<FieldStats> {
        let entry = self.location(key).await;
        let history = entry.lock().await;

        let latest = history.observations.last()?;
        let start = latest.timestamp - window;
        let values: Vec<f64> = history
            .observations
            .iter()
            .filter(|o| o.timestamp >= start)
            .map(|o| o.field(field))
            .collect();

        if values.is_empty() {
            return None;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        Some(FieldStats {
            mean,
            std_dev: variance.sqrt(),
            sample_count: values.len(),
        })
    }
}

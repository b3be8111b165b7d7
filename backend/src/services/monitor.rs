//! Realtime monitoring loop
//!
//! Reassesses every watched location on a fixed interval with a bounded
//! worker fan-out. Locations are isolated: a provider failure or panic
//! for one never disturbs another's cycle or the scheduler itself.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, timeout, MissedTickBehavior};

use shared::{GeoPoint, SatelliteScene, WeatherObservation};

use crate::config::MonitorConfig;
use crate::error::{AppError, AppResult};
use crate::external::satellite::SatelliteProvider;
use crate::external::weather::WeatherProvider;
use crate::services::assessment::AssessmentService;

/// A location under continuous watch
#[derive(Debug, Clone)]
pub struct WatchLocation {
    pub key: String,
    pub point: GeoPoint,
}

/// Parse configured `key:lat:lon` entries
pub fn parse_locations(entries: &[String]) -> AppResult<Vec<WatchLocation>> {
    entries
        .iter()
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').collect();
            let [key, lat, lon] = parts.as_slice() else {
                return Err(AppError::Configuration(format!(
                    "bad monitor location '{}', expected key:lat:lon",
                    entry
                )));
            };
            let latitude: f64 = lat.parse().map_err(|_| {
                AppError::Configuration(format!("bad latitude in monitor location '{}'", entry))
            })?;
            let longitude: f64 = lon.parse().map_err(|_| {
                AppError::Configuration(format!("bad longitude in monitor location '{}'", entry))
            })?;
            let point = GeoPoint::new(latitude, longitude);
            shared::validate_location_key(key)
                .and(shared::validate_point(&point))
                .map_err(|msg| AppError::Configuration(format!("'{}': {}", entry, msg)))?;
            Ok(WatchLocation {
                key: key.to_string(),
                point,
            })
        })
        .collect()
}

/// Fixed-interval scheduler over the watch list
#[derive(Clone)]
pub struct RealtimeMonitor {
    config: MonitorConfig,
    locations: Vec<WatchLocation>,
    weather: Arc<dyn WeatherProvider>,
    satellite: Arc<dyn SatelliteProvider>,
    assessments: AssessmentService,
}

impl RealtimeMonitor {
    pub fn new(
        config: MonitorConfig,
        weather: Arc<dyn WeatherProvider>,
        satellite: Arc<dyn SatelliteProvider>,
        assessments: AssessmentService,
    ) -> AppResult<Self> {
        let locations = parse_locations(&config.locations)?;
        Ok(Self {
            config,
            locations,
            weather,
            satellite,
            assessments,
        })
    }

    /// Run forever. Intended to be spawned next to the HTTP server.
    pub async fn run(self) {
        if self.locations.is_empty() {
            tracing::info!("no monitor locations configured, monitor idle");
            return;
        }

        let mut ticker = interval(Duration::from_secs(self.config.interval_seconds));
        // A cycle that overruns the interval must not cause a burst of
        // catch-up cycles afterwards.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One pass over every watched location with bounded concurrency
    pub async fn run_cycle(&self) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut workers = JoinSet::new();

        for location in self.locations.clone() {
            let semaphore = Arc::clone(&semaphore);
            let monitor = self.clone();
            workers.spawn(async move {
                // Semaphore closes only on drop, so acquire cannot fail here
                let Ok(_permit) = semaphore.acquire().await else {
                    return;
                };
                monitor.assess_location(&location).await;
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                // A panicking worker is contained to its location
                tracing::error!("monitor worker failed: {}", e);
            }
        }
    }

    async fn fetch_weather(&self, location: &WatchLocation) -> Option<WeatherObservation> {
        let limit = Duration::from_secs(self.config.provider_timeout_seconds);
        match timeout(limit, self.weather.current(location.point)).await {
            Ok(Ok(observation)) => Some(observation),
            Ok(Err(e)) => {
                tracing::warn!(location = %location.key, "weather provider failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(location = %location.key, "weather provider timed out");
                None
            }
        }
    }

    async fn fetch_scene(&self, location: &WatchLocation) -> Option<SatelliteScene> {
        let limit = Duration::from_secs(self.config.provider_timeout_seconds);
        match timeout(limit, self.satellite.scene(location.point)).await {
            Ok(Ok(scene)) => Some(scene),
            Ok(Err(e)) => {
                tracing::warn!(location = %location.key, "satellite provider failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(location = %location.key, "satellite provider timed out");
                None
            }
        }
    }

    /// Fetch both sources and assess. Provider problems degrade the
    /// inputs to unavailable; only the assessment itself can error, and
    /// that too stays contained to this location.
    async fn assess_location(&self, location: &WatchLocation) {
        let weather = self.fetch_weather(location).await;
        let scene = self.fetch_scene(location).await;

        match self
            .assessments
            .assess(&location.key, location.point, scene.as_ref(), weather)
            .await
        {
            Ok(outcome) => {
                tracing::info!(
                    location = %location.key,
                    primary = outcome.assessment.primary_threat.label(),
                    level = outcome.assessment.primary_level.label(),
                    confidence = outcome.assessment.primary_confidence,
                    alerts = outcome.raised.len(),
                    "assessment cycle complete"
                );
            }
            Err(e) => {
                tracing::error!(location = %location.key, "assessment failed: {}", e);
            }
        }
    }
}

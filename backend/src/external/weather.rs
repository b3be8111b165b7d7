//! Weather provider client
//!
//! Fetches current conditions from the Open-Meteo forecast API. The
//! provider trait is the seam the monitor depends on; tests substitute
//! canned implementations.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use shared::{GeoPoint, WeatherObservation};

use crate::error::{AppError, AppResult};

/// Source of current weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, point: GeoPoint) -> AppResult<WeatherObservation>;
}

/// Open-Meteo API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

/// Open-Meteo current-conditions response
#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    surface_pressure: f64,
    wind_speed_10m: f64,
    rain: Option<f64>,
}

impl OpenMeteoClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Client against a custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self::new(base_url)
    }

    fn convert(&self, point: GeoPoint, data: OmResponse) -> WeatherObservation {
        WeatherObservation {
            timestamp: Utc::now(),
            location: point,
            temperature_c: data.current.temperature_2m,
            humidity_pct: data.current.relative_humidity_2m,
            pressure_hpa: data.current.surface_pressure,
            wind_speed_kmh: data.current.wind_speed_10m,
            rainfall_mm: data.current.rain.unwrap_or(0.0),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current(&self, point: GeoPoint) -> AppResult<WeatherObservation> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,surface_pressure,wind_speed_10m,rain&wind_speed_unit=kmh",
            self.base_url, point.latitude, point.longitude
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("weather request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "weather API error: {} - {}",
                status, body
            )));
        }

        let data: OmResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("bad weather response: {}", e)))?;

        Ok(self.convert(point, data))
    }
}

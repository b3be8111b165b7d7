//! Satellite imagery provider client
//!
//! Pulls band grids for a point from the configured scene service. The
//! wire format is the service's JSON scene export: per-band pixel arrays
//! plus capture metadata.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use shared::{GeoPoint, SatelliteScene};

use crate::error::{AppError, AppResult};

/// Source of satellite scenes
#[async_trait]
pub trait SatelliteProvider: Send + Sync {
    async fn scene(&self, point: GeoPoint) -> AppResult<SatelliteScene>;
}

/// Scene service API client
#[derive(Clone)]
pub struct SceneServiceClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SceneResponse {
    captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    red: Vec<f64>,
    #[serde(default)]
    green: Vec<f64>,
    #[serde(default)]
    nir: Vec<f64>,
    #[serde(default)]
    thermal: Vec<f64>,
}

impl SceneServiceClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Client against a custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self::new(api_key, base_url)
    }
}

#[async_trait]
impl SatelliteProvider for SceneServiceClient {
    async fn scene(&self, point: GeoPoint) -> AppResult<SatelliteScene> {
        if self.base_url.is_empty() {
            return Err(AppError::Configuration(
                "satellite.api_endpoint not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/scenes/latest?lat={}&lon={}",
            self.base_url, point.latitude, point.longitude
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("satellite request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "satellite API error: {} - {}",
                status, body
            )));
        }

        let data: SceneResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("bad scene response: {}", e)))?;

        Ok(SatelliteScene {
            captured_at: data.captured_at,
            center: Some(point),
            red: data.red,
            green: data.green,
            nir: data.nir,
            thermal: data.thermal,
        })
    }
}

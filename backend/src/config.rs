//! Configuration management for the Hazard Watch Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with HWP_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather history tracker configuration
    pub history: HistoryConfig,

    /// Risk fusion configuration
    pub fusion: FusionConfig,

    /// Realtime monitor configuration
    pub monitor: MonitorConfig,

    /// Weather provider configuration
    pub weather: WeatherProviderConfig,

    /// Satellite provider configuration
    pub satellite: SatelliteProviderConfig,

    /// Notification gateway configuration
    pub notify: NotifyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Observation retention in days (3-7)
    pub retention_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FusionConfig {
    /// Confidence cut point for HIGH fire risk
    pub fire_high: f64,

    /// Confidence cut point for HIGH flood risk
    pub flood_high: f64,

    /// Confidence cut point for HIGH cyclone risk
    pub cyclone_high: f64,

    /// Confidence cut point for CRITICAL, shared by all hazards
    pub critical: f64,
}

impl FusionConfig {
    pub fn high_cut(&self, hazard: shared::HazardKind) -> f64 {
        match hazard {
            shared::HazardKind::Fire => self.fire_high,
            shared::HazardKind::Flood => self.flood_high,
            shared::HazardKind::Cyclone => self.cyclone_high,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Seconds between monitoring cycles
    pub interval_seconds: u64,

    /// Maximum locations assessed concurrently per cycle
    pub max_concurrent: usize,

    /// Per-provider call timeout in seconds
    pub provider_timeout_seconds: u64,

    /// Location keys to watch, as "key:lat:lon" entries
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherProviderConfig {
    /// Weather API endpoint
    pub api_endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SatelliteProviderConfig {
    /// Satellite imagery API endpoint
    pub api_endpoint: String,

    /// Satellite imagery API key
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Gateway URL for email/sms/push delivery; empty disables those channels
    pub gateway_url: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("HWP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("history.retention_days", 7)?
            .set_default("fusion.fire_high", 0.75)?
            .set_default("fusion.flood_high", 0.70)?
            .set_default("fusion.cyclone_high", 0.65)?
            .set_default("fusion.critical", 0.90)?
            .set_default("monitor.interval_seconds", 300)?
            .set_default("monitor.max_concurrent", 4)?
            .set_default("monitor.provider_timeout_seconds", 10)?
            .set_default("weather.api_endpoint", "https://api.open-meteo.com/v1")?
            .set_default("satellite.api_endpoint", "")?
            .set_default("satellite.api_key", "")?
            .set_default("notify.gateway_url", "")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (HWP_ prefix)
            .add_source(
                Environment::with_prefix("HWP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

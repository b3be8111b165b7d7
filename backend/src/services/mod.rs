//! Business logic services for the Hazard Watch Platform

pub mod alerts;
pub mod assessment;
pub mod features;
pub mod fusion;
pub mod history;
pub mod monitor;
pub mod zones;

pub use alerts::AlertDispatcher;
pub use assessment::AssessmentService;
pub use fusion::RiskFusionEngine;
pub use history::WeatherHistoryTracker;
pub use monitor::RealtimeMonitor;
pub use zones::ZoneRegistry;

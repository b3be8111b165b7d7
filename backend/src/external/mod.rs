//! External API integrations

pub mod notify;
pub mod satellite;
pub mod weather;

pub use notify::{ChannelSender, NotificationGateway};
pub use satellite::{SatelliteProvider, SceneServiceClient};
pub use weather::{OpenMeteoClient, WeatherProvider};

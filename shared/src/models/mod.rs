//! Domain models for the Hazard Watch Platform

mod alert;
mod assessment;
mod satellite;
mod weather;
mod zone;

pub use alert::*;
pub use assessment::*;
pub use satellite::*;
pub use weather::*;
pub use zone::*;

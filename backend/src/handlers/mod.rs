//! HTTP handlers for the Hazard Watch Platform

mod alert;
mod assessment;
mod health;
mod zone;

pub use alert::*;
pub use assessment::*;
pub use health::*;
pub use zone::*;

//! Shared types and models for the Hazard Watch Platform
//!
//! This crate contains types shared between the backend services,
//! the request layer, and the test suites.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

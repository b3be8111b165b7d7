//! Validation utilities for the Hazard Watch Platform

use crate::models::{AlertChannel, ZoneInput};
use crate::types::GeoPoint;

// ============================================================================
// Geographic Validations
// ============================================================================

/// Validate latitude is a finite value in [-90, 90]
pub fn validate_latitude(latitude: f64) -> Result<(), &'static str> {
    if !latitude.is_finite() {
        return Err("Latitude must be a finite number");
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude is a finite value in [-180, 180]
pub fn validate_longitude(longitude: f64) -> Result<(), &'static str> {
    if !longitude.is_finite() {
        return Err("Longitude must be a finite number");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a point has usable coordinates
pub fn validate_point(point: &GeoPoint) -> Result<(), &'static str> {
    validate_latitude(point.latitude)?;
    validate_longitude(point.longitude)?;
    Ok(())
}

/// Validate a polygon ring: at least 3 vertices, all finite and in range
pub fn validate_polygon(polygon: &[GeoPoint]) -> Result<(), &'static str> {
    if polygon.len() < 3 {
        return Err("Polygon must have at least 3 vertices");
    }
    for vertex in polygon {
        validate_point(vertex)?;
    }
    Ok(())
}

// ============================================================================
// Zone and Alert Validations
// ============================================================================

/// Validate zone name (1-100 characters, not blank)
pub fn validate_zone_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Zone name cannot be empty");
    }
    if trimmed.len() > 100 {
        return Err("Zone name must be at most 100 characters");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a full zone input. Recipients are checked as email addresses
/// only when the email channel is configured; other channels accept any
/// non-empty recipient address.
pub fn validate_zone_input(input: &ZoneInput) -> Result<(), &'static str> {
    validate_zone_name(&input.name)?;
    validate_polygon(&input.polygon)?;
    for recipient in &input.recipients {
        if recipient.trim().is_empty() {
            return Err("Recipient address cannot be empty");
        }
        if input.channels.contains(&AlertChannel::Email) {
            validate_email(recipient)?;
        }
    }
    Ok(())
}

/// Validate a location key (1-64 characters, no whitespace)
pub fn validate_location_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("Location key cannot be empty");
    }
    if key.len() > 64 {
        return Err("Location key must be at most 64 characters");
    }
    if key.chars().any(|c| c.is_whitespace()) {
        return Err("Location key cannot contain whitespace");
    }
    Ok(())
}

/// Validate history retention in days (3-7 per the tracker contract)
pub fn validate_retention_days(days: u32) -> Result<(), &'static str> {
    if !(3..=7).contains(&days) {
        return Err("Retention must be between 3 and 7 days");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;

    #[test]
    fn test_latitude_bounds() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
        assert!(validate_latitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_longitude_bounds() {
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(180.5).is_err());
        assert!(validate_longitude(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_polygon_needs_three_vertices() {
        let two = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
        assert!(validate_polygon(&two).is_err());

        let three = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(0.0, 1.0),
        ];
        assert!(validate_polygon(&three).is_ok());
    }

    #[test]
    fn test_polygon_rejects_non_finite_vertex() {
        let bad = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(f64::NAN, 0.0),
            GeoPoint::new(0.0, 1.0),
        ];
        assert!(validate_polygon(&bad).is_err());
    }

    #[test]
    fn test_zone_name() {
        assert!(validate_zone_name("Northern Ridge").is_ok());
        assert!(validate_zone_name("  ").is_err());
        assert!(validate_zone_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ops@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_zone_input_email_recipients() {
        let mut input = ZoneInput {
            name: "Test Zone".to_string(),
            polygon: vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(1.0, 0.0),
                GeoPoint::new(0.0, 1.0),
            ],
            severity_threshold: RiskLevel::Medium,
            channels: vec![AlertChannel::Email],
            recipients: vec!["ops@example.com".to_string()],
        };
        assert!(validate_zone_input(&input).is_ok());

        input.recipients.push("bogus".to_string());
        assert!(validate_zone_input(&input).is_err());

        // Non-email channels accept opaque addresses
        input.channels = vec![AlertChannel::Webhook];
        assert!(validate_zone_input(&input).is_ok());
    }

    #[test]
    fn test_location_key() {
        assert!(validate_location_key("station-7").is_ok());
        assert!(validate_location_key("").is_err());
        assert!(validate_location_key("has space").is_err());
        assert!(validate_location_key(&"k".repeat(65)).is_err());
    }

    #[test]
    fn test_retention_days_range() {
        assert!(validate_retention_days(3).is_ok());
        assert!(validate_retention_days(7).is_ok());
        assert!(validate_retention_days(2).is_err());
        assert!(validate_retention_days(8).is_err());
    }
}

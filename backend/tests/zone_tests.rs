//! Zone registry and geographic matching tests

use proptest::prelude::*;
use uuid::Uuid;

use hazard_watch_backend::services::zones::{point_in_polygon, ZoneRegistry};
use shared::{AlertChannel, GeoPoint, RiskLevel, ZoneInput};

fn square(side: f64) -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, side),
        GeoPoint::new(side, side),
        GeoPoint::new(side, 0.0),
    ]
}

fn input(name: &str, threshold: RiskLevel) -> ZoneInput {
    ZoneInput {
        name: name.to_string(),
        polygon: square(10.0),
        severity_threshold: threshold,
        channels: vec![AlertChannel::System],
        recipients: vec!["control-room".to_string()],
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn create_get_list_roundtrip() {
        let registry = ZoneRegistry::new();
        let zone = registry.create(input("North Basin", RiskLevel::Medium)).await.unwrap();
        assert!(zone.active);

        let fetched = registry.get(zone.id).await.unwrap();
        assert_eq!(fetched.name, "North Basin");

        let listed = registry.list().await;
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_zone_is_not_found() {
        let registry = ZoneRegistry::new();
        assert!(registry.get(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let registry = ZoneRegistry::new();
        let mut bad = input("  ", RiskLevel::Low);
        bad.name = "   ".to_string();
        assert!(registry.create(bad).await.is_err());
    }

    #[tokio::test]
    async fn email_channel_requires_email_recipients() {
        let registry = ZoneRegistry::new();
        let mut zone = input("Mail Zone", RiskLevel::Low);
        zone.channels = vec![AlertChannel::Email];
        zone.recipients = vec!["not-an-address".to_string()];
        assert!(registry.create(zone).await.is_err());
    }

    #[tokio::test]
    async fn matching_respects_ordinal_threshold() {
        let registry = ZoneRegistry::new();
        registry.create(input("High Gate", RiskLevel::High)).await.unwrap();
        let inside = GeoPoint::new(5.0, 5.0);

        assert!(registry.matching(inside, RiskLevel::Low).await.is_empty());
        assert!(registry.matching(inside, RiskLevel::Medium).await.is_empty());
        assert_eq!(registry.matching(inside, RiskLevel::High).await.len(), 1);
        assert_eq!(registry.matching(inside, RiskLevel::Critical).await.len(), 1);
    }

    #[tokio::test]
    async fn matching_requires_containment() {
        let registry = ZoneRegistry::new();
        registry.create(input("Box", RiskLevel::Low)).await.unwrap();
        assert!(registry
            .matching(GeoPoint::new(11.0, 5.0), RiskLevel::Critical)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn deactivated_zones_are_listed_but_never_match() {
        let registry = ZoneRegistry::new();
        let zone = registry.create(input("Old Zone", RiskLevel::Low)).await.unwrap();
        registry.deactivate(zone.id).await.unwrap();

        assert_eq!(registry.list().await.len(), 1);
        assert!(registry
            .matching(GeoPoint::new(5.0, 5.0), RiskLevel::Critical)
            .await
            .is_empty());
    }

    #[test]
    fn boundary_point_matches() {
        let polygon = square(10.0);
        assert!(point_in_polygon(GeoPoint::new(10.0, 5.0), &polygon));
        assert!(point_in_polygon(GeoPoint::new(0.0, 0.0), &polygon));
    }

    #[test]
    fn triangle_containment() {
        let triangle = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(4.0, 0.0),
            GeoPoint::new(0.0, 4.0),
        ];
        assert!(point_in_polygon(GeoPoint::new(1.0, 1.0), &triangle));
        assert!(!point_in_polygon(GeoPoint::new(3.0, 3.0), &triangle));
        // Hypotenuse midpoint is on the boundary
        assert!(point_in_polygon(GeoPoint::new(2.0, 2.0), &triangle));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For an axis-aligned square, ray casting must agree with the
        /// coordinate-range definition of containment.
        #[test]
        fn square_containment_matches_bounds(lat in -5.0..15.0f64, lon in -5.0..15.0f64) {
            let polygon = square(10.0);
            let expected = (0.0..=10.0).contains(&lat) && (0.0..=10.0).contains(&lon);
            prop_assert_eq!(point_in_polygon(GeoPoint::new(lat, lon), &polygon), expected);
        }

        /// Points strictly outside the polygon's bounding box are never inside
        #[test]
        fn outside_bounding_box_is_outside(lat in 10.1..100.0f64, lon in -100.0..100.0f64) {
            let polygon = square(10.0);
            prop_assert!(!point_in_polygon(GeoPoint::new(lat, lon), &polygon));
        }
    }
}

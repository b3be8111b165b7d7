//! Alert zone registry and geographic matching
//!
//! Zones are named polygons with a severity threshold and notification
//! targets. Matching is ray-cast point-in-polygon; boundary points count
//! as inside, so an assessment exactly on a zone edge still triggers it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::{validate_zone_input, AlertZone, GeoPoint, RiskLevel, ZoneInput};

use crate::error::{AppError, AppResult};

const BOUNDARY_EPSILON: f64 = 1e-9;

/// True when `point` lies on the segment from `a` to `b`
fn on_segment(point: GeoPoint, a: GeoPoint, b: GeoPoint) -> bool {
    let cross = (b.longitude - a.longitude) * (point.latitude - a.latitude)
        - (b.latitude - a.latitude) * (point.longitude - a.longitude);
    if cross.abs() > BOUNDARY_EPSILON {
        return false;
    }
    let within_lon = point.longitude >= a.longitude.min(b.longitude) - BOUNDARY_EPSILON
        && point.longitude <= a.longitude.max(b.longitude) + BOUNDARY_EPSILON;
    let within_lat = point.latitude >= a.latitude.min(b.latitude) - BOUNDARY_EPSILON
        && point.latitude <= a.latitude.max(b.latitude) + BOUNDARY_EPSILON;
    within_lon && within_lat
}

/// Ray-cast point-in-polygon. Boundary points are inside.
pub fn point_in_polygon(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let n = polygon.len();
    for i in 0..n {
        if on_segment(point, polygon[i], polygon[(i + 1) % n]) {
            return true;
        }
    }

    // Horizontal ray toward +longitude, counting edge crossings
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a.latitude > point.latitude) != (b.latitude > point.latitude) {
            let intersect_lon = (b.longitude - a.longitude) * (point.latitude - a.latitude)
                / (b.latitude - a.latitude)
                + a.longitude;
            if point.longitude < intersect_lon {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// In-memory registry of alert zones
#[derive(Clone, Default)]
pub struct ZoneRegistry {
    zones: Arc<RwLock<HashMap<Uuid, AlertZone>>>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zone from validated input
    pub async fn create(&self, input: ZoneInput) -> AppResult<AlertZone> {
        validate_zone_input(&input).map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let zone = AlertZone {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            polygon: input.polygon,
            severity_threshold: input.severity_threshold,
            channels: input.channels,
            recipients: input.recipients,
            active: true,
            created_at: Utc::now(),
        };
        self.zones.write().await.insert(zone.id, zone.clone());
        Ok(zone)
    }

    pub async fn get(&self, zone_id: Uuid) -> AppResult<AlertZone> {
        self.zones
            .read()
            .await
            .get(&zone_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("zone {}", zone_id)))
    }

    /// All zones, inactive ones included, newest first
    pub async fn list(&self) -> Vec<AlertZone> {
        let mut zones: Vec<AlertZone> = self.zones.read().await.values().cloned().collect();
        zones.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        zones
    }

    /// Replace a zone's configuration. Last writer wins on concurrent
    /// updates; the zone keeps its id, created_at, and active flag.
    pub async fn update(&self, zone_id: Uuid, input: ZoneInput) -> AppResult<AlertZone> {
        validate_zone_input(&input).map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let mut zones = self.zones.write().await;
        let zone = zones
            .get_mut(&zone_id)
            .ok_or_else(|| AppError::NotFound(format!("zone {}", zone_id)))?;
        zone.name = input.name.trim().to_string();
        zone.polygon = input.polygon;
        zone.severity_threshold = input.severity_threshold;
        zone.channels = input.channels;
        zone.recipients = input.recipients;
        Ok(zone.clone())
    }

    /// Deactivate a zone. The record is retained for history; inactive
    /// zones never match.
    pub async fn deactivate(&self, zone_id: Uuid) -> AppResult<AlertZone> {
        let mut zones = self.zones.write().await;
        let zone = zones
            .get_mut(&zone_id)
            .ok_or_else(|| AppError::NotFound(format!("zone {}", zone_id)))?;
        zone.active = false;
        Ok(zone.clone())
    }

    /// Active zones containing `point` whose threshold the severity meets
    pub async fn matching(&self, point: GeoPoint, severity: RiskLevel) -> Vec<AlertZone> {
        self.zones
            .read()
            .await
            .values()
            .filter(|zone| {
                zone.active
                    && severity >= zone.severity_threshold
                    && point_in_polygon(point, &zone.polygon)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::AlertChannel;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ]
    }

    fn zone_input(threshold: RiskLevel) -> ZoneInput {
        ZoneInput {
            name: "Test Zone".to_string(),
            polygon: square(),
            severity_threshold: threshold,
            channels: vec![AlertChannel::System],
            recipients: vec![],
        }
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(point_in_polygon(GeoPoint::new(5.0, 5.0), &square()));
    }

    #[test]
    fn exterior_point_is_outside() {
        assert!(!point_in_polygon(GeoPoint::new(15.0, 5.0), &square()));
        assert!(!point_in_polygon(GeoPoint::new(-0.1, 5.0), &square()));
    }

    #[test]
    fn boundary_points_are_inside() {
        // Edge midpoint and a vertex
        assert!(point_in_polygon(GeoPoint::new(0.0, 5.0), &square()));
        assert!(point_in_polygon(GeoPoint::new(10.0, 10.0), &square()));
    }

    #[test]
    fn concave_polygon_pocket_is_outside() {
        // U shape opening upward; the pocket between the arms is outside
        let u_shape = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 9.0),
            GeoPoint::new(6.0, 9.0),
            GeoPoint::new(6.0, 6.0),
            GeoPoint::new(2.0, 6.0),
            GeoPoint::new(2.0, 3.0),
            GeoPoint::new(6.0, 3.0),
            GeoPoint::new(6.0, 0.0),
        ];
        assert!(point_in_polygon(GeoPoint::new(4.0, 1.5), &u_shape));
        assert!(!point_in_polygon(GeoPoint::new(4.5, 4.5), &u_shape));
    }

    #[tokio::test]
    async fn create_and_match_by_threshold() {
        let registry = ZoneRegistry::new();
        registry.create(zone_input(RiskLevel::High)).await.unwrap();

        let point = GeoPoint::new(5.0, 5.0);
        assert!(registry.matching(point, RiskLevel::Medium).await.is_empty());
        assert_eq!(registry.matching(point, RiskLevel::High).await.len(), 1);
        assert_eq!(registry.matching(point, RiskLevel::Critical).await.len(), 1);
    }

    #[tokio::test]
    async fn deactivated_zone_never_matches() {
        let registry = ZoneRegistry::new();
        let zone = registry.create(zone_input(RiskLevel::Low)).await.unwrap();
        assert_eq!(
            registry
                .matching(GeoPoint::new(5.0, 5.0), RiskLevel::Critical)
                .await
                .len(),
            1
        );

        registry.deactivate(zone.id).await.unwrap();
        assert!(registry
            .matching(GeoPoint::new(5.0, 5.0), RiskLevel::Critical)
            .await
            .is_empty());
        // Still listed and fetchable
        assert!(!registry.get(zone.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn update_replaces_configuration() {
        let registry = ZoneRegistry::new();
        let zone = registry.create(zone_input(RiskLevel::Low)).await.unwrap();

        let mut input = zone_input(RiskLevel::Critical);
        input.name = "Renamed".to_string();
        let updated = registry.update(zone.id, input).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.severity_threshold, RiskLevel::Critical);
        assert_eq!(updated.id, zone.id);
    }

    #[tokio::test]
    async fn invalid_polygon_is_rejected() {
        let registry = ZoneRegistry::new();
        let mut input = zone_input(RiskLevel::Low);
        input.polygon.truncate(2);
        assert!(matches!(
            registry.create(input).await,
            Err(AppError::ValidationError(_))
        ));
    }
}

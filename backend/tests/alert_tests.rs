//! Alert lifecycle and delivery tests
//!
//! Covers dedup of active alerts, acknowledge idempotency, delivery
//! aggregation across recipients and channels, and history retention.

use std::sync::Arc;

use hazard_watch_backend::external::notify::RecordingSender;
use hazard_watch_backend::services::alerts::{alert_title, AlertCandidate, AlertDispatcher};
use shared::{
    AlertChannel, AlertStatus, AlertZone, GeoPoint, HazardKind, RiskLevel, VerificationStatus,
};

fn zone(channels: Vec<AlertChannel>, recipients: Vec<&str>) -> AlertZone {
    AlertZone {
        id: uuid::Uuid::new_v4(),
        name: "Test Zone".to_string(),
        polygon: vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ],
        severity_threshold: RiskLevel::Medium,
        channels,
        recipients: recipients.into_iter().map(String::from).collect(),
        active: true,
        created_at: chrono::Utc::now(),
    }
}

fn candidate(zone: Option<AlertZone>, hazard: HazardKind) -> AlertCandidate {
    AlertCandidate {
        zone,
        hazard,
        severity: RiskLevel::High,
        confidence: 0.82,
        location_key: "ridge-7".to_string(),
        point: GeoPoint::new(5.0, 5.0),
        reasons: vec!["Weather: hot and dry (36C, 18% humidity)".to_string()],
    }
}

fn dispatcher_with(sender: RecordingSender) -> AlertDispatcher {
    AlertDispatcher::new(Arc::new(sender))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn raise_delivers_per_recipient_per_channel() {
        let sender = RecordingSender::default();
        let sent = Arc::clone(&sender.sent);
        let dispatcher = dispatcher_with(sender);

        let zone = zone(
            vec![AlertChannel::System, AlertChannel::Email],
            vec!["a@example.com", "b@example.com"],
        );
        let (alert, summary) = dispatcher
            .raise(candidate(Some(zone), HazardKind::Fire))
            .await
            .unwrap()
            .expect("first raise should create an alert");

        // 2 channels x 2 recipients
        assert_eq!(summary.status, VerificationStatus::Success);
        assert_eq!(summary.success_count, 4);
        assert_eq!(summary.failure_count, 0);
        assert_eq!(sent.lock().await.len(), 4);
        assert_eq!(alert.status, AlertStatus::Active);
        assert!(alert.id.starts_with("ALERT-"));
        assert!(alert.id.contains("-FIR-"));
    }

    #[tokio::test]
    async fn alerts_raised_in_the_same_second_get_distinct_ids() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        let zone = zone(vec![AlertChannel::System], vec!["control-room"]);

        // Zone-matched and zoneless alerts for the same hazard, raised
        // back-to-back as one dispatch pass does
        let (zoned, _) = dispatcher
            .raise(candidate(Some(zone), HazardKind::Fire))
            .await
            .unwrap()
            .unwrap();
        let (zoneless, _) = dispatcher
            .raise(candidate(None, HazardKind::Fire))
            .await
            .unwrap()
            .unwrap();

        assert_ne!(zoned.id, zoneless.id);
        assert_eq!(dispatcher.active().await.len(), 2);

        // Each resolves independently by its own id
        let acked = dispatcher.acknowledge(&zoned.id, "officer").await.unwrap();
        assert_eq!(acked.id, zoned.id);
        let remaining = dispatcher.active().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, zoneless.id);
    }

    #[tokio::test]
    async fn failed_channel_is_counted_not_fatal() {
        let sender = RecordingSender {
            fail_channel: Some(AlertChannel::Email),
            ..Default::default()
        };
        let dispatcher = dispatcher_with(sender);

        let zone = zone(
            vec![AlertChannel::System, AlertChannel::Email],
            vec!["ops@example.com"],
        );
        let (_, summary) = dispatcher
            .raise(candidate(Some(zone), HazardKind::Flood))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.status, VerificationStatus::Success);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failure_count, 1);
    }

    #[tokio::test]
    async fn bounced_recipients_do_not_escalate_status() {
        // Every attempt bounced, but the channel itself is healthy
        let sender = RecordingSender {
            fail_channel: Some(AlertChannel::Email),
            ..Default::default()
        };
        let dispatcher = dispatcher_with(sender);
        let zone = zone(vec![AlertChannel::Email], vec!["ops@example.com"]);
        let (_, summary) = dispatcher
            .raise(candidate(Some(zone), HazardKind::Flood))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.status, VerificationStatus::Success);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failure_count, 1);
    }

    #[tokio::test]
    async fn misconfigured_channel_reports_error_status() {
        let sender = RecordingSender {
            fail_channel: Some(AlertChannel::Email),
            fail_systemically: true,
            ..Default::default()
        };
        let dispatcher = dispatcher_with(sender);
        let zone = zone(vec![AlertChannel::Email], vec!["ops@example.com"]);
        let (_, summary) = dispatcher
            .raise(candidate(Some(zone), HazardKind::Flood))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.status, VerificationStatus::Error);
    }

    #[tokio::test]
    async fn zoneless_raise_is_skipped_delivery() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        let (_, summary) = dispatcher
            .raise(candidate(None, HazardKind::Cyclone))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.status, VerificationStatus::Skipped);
        assert_eq!(summary.success_count, 0);
    }

    #[tokio::test]
    async fn active_alert_dedups_same_key() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        let zone = zone(vec![AlertChannel::System], vec!["control-room"]);

        let first = dispatcher
            .raise(candidate(Some(zone.clone()), HazardKind::Fire))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = dispatcher
            .raise(candidate(Some(zone.clone()), HazardKind::Fire))
            .await
            .unwrap();
        assert!(second.is_none(), "duplicate raise must be a no-op");

        // A different hazard in the same zone is a different key
        let other = dispatcher
            .raise(candidate(Some(zone), HazardKind::Flood))
            .await
            .unwrap();
        assert!(other.is_some());
        assert_eq!(dispatcher.active().await.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_raises_for_one_key_create_one_alert() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        let zone = zone(vec![AlertChannel::System], vec!["control-room"]);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let dispatcher = dispatcher.clone();
            let zone = zone.clone();
            tasks.spawn(async move {
                dispatcher
                    .raise(candidate(Some(zone), HazardKind::Fire))
                    .await
                    .unwrap()
            });
        }

        let mut created = 0;
        while let Some(joined) = tasks.join_next().await {
            if joined.unwrap().is_some() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(dispatcher.active().await.len(), 1);
    }

    #[tokio::test]
    async fn acknowledge_moves_to_history_and_allows_re_raise() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        let zone = zone(vec![AlertChannel::System], vec!["control-room"]);

        let (alert, _) = dispatcher
            .raise(candidate(Some(zone.clone()), HazardKind::Fire))
            .await
            .unwrap()
            .unwrap();

        let acked = dispatcher.acknowledge(&alert.id, "duty-officer").await.unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert_eq!(acked.acknowledged_by.as_deref(), Some("duty-officer"));
        assert!(acked.acknowledged_at.is_some());

        assert!(dispatcher.active().await.is_empty());
        assert_eq!(dispatcher.history(10).await.len(), 1);

        // The key is free again
        let again = dispatcher
            .raise(candidate(Some(zone), HazardKind::Fire))
            .await
            .unwrap();
        assert!(again.is_some());
    }

    #[tokio::test]
    async fn acknowledge_is_idempotent() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        let (alert, _) = dispatcher
            .raise(candidate(None, HazardKind::Fire))
            .await
            .unwrap()
            .unwrap();

        let first = dispatcher.acknowledge(&alert.id, "officer-a").await.unwrap();
        let second = dispatcher.acknowledge(&alert.id, "officer-b").await.unwrap();
        // Second acknowledge returns the original record unchanged
        assert_eq!(second.acknowledged_by, first.acknowledged_by);
        assert_eq!(dispatcher.history(10).await.len(), 1);
    }

    #[tokio::test]
    async fn acknowledge_unknown_alert_is_not_found() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        assert!(dispatcher.acknowledge("ALERT-MISSING", "x").await.is_err());
    }

    #[tokio::test]
    async fn archive_frees_the_key_without_acknowledgement() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        let (alert, _) = dispatcher
            .raise(candidate(None, HazardKind::Cyclone))
            .await
            .unwrap()
            .unwrap();

        let archived = dispatcher.archive(&alert.id).await.unwrap();
        assert_eq!(archived.status, AlertStatus::Archived);
        assert!(archived.acknowledged_by.is_none());
        assert!(dispatcher.active().await.is_empty());
    }

    #[tokio::test]
    async fn history_limit_and_clear_old() {
        let dispatcher = dispatcher_with(RecordingSender::default());
        for hazard in [HazardKind::Fire, HazardKind::Flood, HazardKind::Cyclone] {
            let (alert, _) = dispatcher
                .raise(candidate(None, hazard))
                .await
                .unwrap()
                .unwrap();
            dispatcher.acknowledge(&alert.id, "officer").await.unwrap();
        }

        assert_eq!(dispatcher.history(2).await.len(), 2);
        assert_eq!(dispatcher.history(10).await.len(), 3);

        // Everything just happened, so a 30-day sweep removes nothing
        assert_eq!(dispatcher.clear_old(30).await, 0);
        // A zero-day horizon sweeps it all
        assert_eq!(dispatcher.clear_old(0).await, 3);
        assert!(dispatcher.history(10).await.is_empty());
    }

    #[test]
    fn titles_name_severity_and_hazard() {
        let title = alert_title(HazardKind::Fire, RiskLevel::Critical);
        assert_eq!(title, "CRITICAL Fire risk alert");
    }
}

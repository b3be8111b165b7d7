//! Alert lifecycle and delivery
//!
//! One alert may be ACTIVE per (zone, hazard) key at a time. Raising is
//! an atomic check-then-create under a single lock, so concurrent
//! assessments of the same area cannot double-alert. Acknowledging moves
//! the alert to history and is idempotent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::{
    Alert, AlertStatus, AlertZone, DeliveryOutcome, GeoPoint, HazardKind, RiskLevel,
    VerificationSummary,
};

use crate::error::{AppError, AppResult};
use crate::external::notify::ChannelSender;

/// Dedup key: one active alert per zone (or the zoneless area) per hazard
type AlertKey = (Option<Uuid>, HazardKind);

#[derive(Default)]
struct AlertBook {
    active: HashMap<AlertKey, Alert>,
    history: Vec<Alert>,
}

/// Candidate produced by an assessment, before lifecycle checks
#[derive(Debug, Clone)]
pub struct AlertCandidate {
    pub zone: Option<AlertZone>,
    pub hazard: HazardKind,
    pub severity: RiskLevel,
    pub confidence: f64,
    pub location_key: String,
    pub point: GeoPoint,
    pub reasons: Vec<String>,
}

/// Title line for an outbound alert
pub fn alert_title(hazard: HazardKind, severity: RiskLevel) -> String {
    format!("{} {} risk alert", severity.label(), hazard.label())
}

/// Body text for an outbound alert
pub fn alert_message(candidate: &AlertCandidate) -> String {
    let area = candidate
        .zone
        .as_ref()
        .map(|z| z.name.clone())
        .unwrap_or_else(|| candidate.location_key.clone());
    let mut message = format!(
        "{} risk is {} near {} ({:.4}, {:.4}). Confidence {:.0}%.",
        candidate.hazard.label(),
        candidate.severity.label(),
        area,
        candidate.point.latitude,
        candidate.point.longitude,
        candidate.confidence * 100.0,
    );
    if !candidate.reasons.is_empty() {
        message.push_str(" Indicators: ");
        message.push_str(&candidate.reasons.join("; "));
        message.push('.');
    }
    message
}

/// The sequence keeps IDs unique when several alerts are raised within
/// the same second, e.g. a zone-matched and a zoneless alert for the
/// same hazard in one dispatch pass.
fn alert_id(created_at: DateTime<Utc>, hazard: HazardKind, sequence: u64) -> String {
    format!(
        "ALERT-{}-{}-{}",
        created_at.format("%Y%m%d-%H%M%S"),
        hazard.tag(),
        sequence
    )
}

/// Alert state machine plus delivery fan-out
#[derive(Clone)]
pub struct AlertDispatcher {
    book: Arc<Mutex<AlertBook>>,
    sender: Arc<dyn ChannelSender>,
    sequence: Arc<AtomicU64>,
}

impl AlertDispatcher {
    pub fn new(sender: Arc<dyn ChannelSender>) -> Self {
        Self {
            book: Arc::new(Mutex::new(AlertBook::default())),
            sender,
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Raise an alert for a candidate unless one is already active for
    /// the same (zone, hazard). Returns `None` on dedup, otherwise the
    /// created alert and its delivery summary.
    pub async fn raise(
        &self,
        candidate: AlertCandidate,
    ) -> AppResult<Option<(Alert, VerificationSummary)>> {
        let key = (candidate.zone.as_ref().map(|z| z.id), candidate.hazard);
        let created_at = Utc::now();
        let title = alert_title(candidate.hazard, candidate.severity);
        let message = alert_message(&candidate);

        // Check-then-create stays under one lock so two concurrent
        // assessments cannot both pass the check.
        let alert = {
            let mut book = self.book.lock().await;
            if book.active.contains_key(&key) {
                tracing::debug!(
                    hazard = candidate.hazard.label(),
                    zone = ?key.0,
                    "alert already active, skipping"
                );
                return Ok(None);
            }
            let alert = Alert {
                id: alert_id(
                    created_at,
                    candidate.hazard,
                    self.sequence.fetch_add(1, Ordering::Relaxed),
                ),
                zone_id: key.0,
                hazard: candidate.hazard,
                severity: candidate.severity,
                confidence: candidate.confidence,
                location_key: candidate.location_key.clone(),
                point: candidate.point,
                title: title.clone(),
                message: message.clone(),
                reasons: candidate.reasons.clone(),
                status: AlertStatus::Active,
                created_at,
                acknowledged_at: None,
                acknowledged_by: None,
            };
            book.active.insert(key, alert.clone());
            alert
        };

        // Delivery happens outside the lock; a slow channel must not
        // block other raises.
        let summary = self
            .deliver(candidate.zone.as_ref(), &title, &message)
            .await;

        tracing::info!(
            alert_id = %alert.id,
            severity = alert.severity.label(),
            delivered = summary.success_count,
            failed = summary.failure_count,
            "alert raised"
        );
        Ok(Some((alert, summary)))
    }

    /// Fan out to every recipient over every configured channel
    async fn deliver(
        &self,
        zone: Option<&AlertZone>,
        title: &str,
        message: &str,
    ) -> VerificationSummary {
        let mut outcomes = Vec::new();
        if let Some(zone) = zone {
            for channel in &zone.channels {
                for recipient in &zone.recipients {
                    let result = self.sender.send(*channel, recipient, title, message).await;
                    if let Err(ref e) = result {
                        tracing::error!(
                            channel = ?channel,
                            recipient = %recipient,
                            error = %e,
                            "notification delivery failed"
                        );
                    }
                    // A misconfigured or unreachable gateway is systemic;
                    // anything else counts as a per-recipient bounce.
                    let systemic = matches!(result, Err(AppError::Configuration(_)));
                    outcomes.push(DeliveryOutcome {
                        recipient: recipient.clone(),
                        channel: *channel,
                        delivered: result.is_ok(),
                        systemic,
                        detail: result.err().map(|e| e.to_string()),
                    });
                }
            }
        }
        VerificationSummary::from_outcomes(&outcomes)
    }

    /// Send a zone's recipients a confirmation that the zone is armed.
    /// Used at zone creation so misconfigured channels surface early.
    pub async fn verify_zone(&self, zone: &AlertZone) -> VerificationSummary {
        let title = format!("Alert zone '{}' registered", zone.name);
        let message = format!(
            "You will be notified when {} or higher risk is detected in '{}'.",
            zone.severity_threshold.label(),
            zone.name
        );
        self.deliver(Some(zone), &title, &message).await
    }

    /// Acknowledge an alert. Idempotent: acknowledging an alert that has
    /// already been acknowledged returns it unchanged.
    pub async fn acknowledge(&self, alert_id: &str, user: &str) -> AppResult<Alert> {
        let mut book = self.book.lock().await;

        let active_key = book
            .active
            .iter()
            .find(|(_, a)| a.id == alert_id)
            .map(|(k, _)| *k);
        if let Some(mut alert) = active_key.and_then(|key| book.active.remove(&key)) {
            alert.status = AlertStatus::Acknowledged;
            alert.acknowledged_at = Some(Utc::now());
            alert.acknowledged_by = Some(user.to_string());
            book.history.push(alert.clone());
            return Ok(alert);
        }

        if let Some(alert) = book
            .history
            .iter()
            .find(|a| a.id == alert_id && a.status == AlertStatus::Acknowledged)
        {
            return Ok(alert.clone());
        }

        Err(AppError::NotFound(format!("alert {}", alert_id)))
    }

    /// Archive an active alert without acknowledgement (e.g. superseded)
    pub async fn archive(&self, alert_id: &str) -> AppResult<Alert> {
        let mut book = self.book.lock().await;
        let key = book
            .active
            .iter()
            .find(|(_, a)| a.id == alert_id)
            .map(|(k, _)| *k);
        match key.and_then(|key| book.active.remove(&key)) {
            Some(mut alert) => {
                alert.status = AlertStatus::Archived;
                book.history.push(alert.clone());
                Ok(alert)
            }
            None => Err(AppError::NotFound(format!("active alert {}", alert_id))),
        }
    }

    /// All active alerts, newest first
    pub async fn active(&self) -> Vec<Alert> {
        let book = self.book.lock().await;
        let mut alerts: Vec<Alert> = book.active.values().cloned().collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts
    }

    /// Most recent `limit` historical alerts, newest first
    pub async fn history(&self, limit: usize) -> Vec<Alert> {
        let book = self.book.lock().await;
        book.history.iter().rev().take(limit).cloned().collect()
    }

    /// Drop historical alerts older than `days`. Returns how many were
    /// removed.
    pub async fn clear_old(&self, days: u32) -> usize {
        let horizon = Utc::now() - Duration::days(days as i64);
        let mut book = self.book.lock().await;
        let before = book.history.len();
        book.history.retain(|a| a.created_at >= horizon);
        before - book.history.len()
    }
}

//! Alert lifecycle and delivery models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{GeoPoint, HazardKind, RiskLevel};

/// Delivery channels for outbound notifications
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    System,
    Email,
    Sms,
    Push,
    Webhook,
}

/// Alert lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Archived,
}

/// A raised alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Formatted `ALERT-YYYYMMDD-HHMMSS-<hazard tag>`
    pub id: String,
    /// Zone the alert was matched to, if any
    pub zone_id: Option<Uuid>,
    pub hazard: HazardKind,
    pub severity: RiskLevel,
    pub confidence: f64,
    pub location_key: String,
    pub point: GeoPoint,
    pub title: String,
    pub message: String,
    pub reasons: Vec<String>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,
}

/// Outcome of one send attempt to one recipient over one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub recipient: String,
    pub channel: AlertChannel,
    pub delivered: bool,
    /// True when the failure is systemic (gateway misconfigured or
    /// unreachable) rather than a per-recipient bounce
    pub systemic: bool,
    pub detail: Option<String>,
}

/// Aggregate result of a delivery fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub status: VerificationStatus,
    pub success_count: usize,
    pub failure_count: usize,
    pub message: String,
}

/// Overall delivery status: `Skipped` when there was nothing to send,
/// `Error` only for systemic failure. Per-recipient bounces stay under
/// `Success` with the failures reported in the counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Success,
    Skipped,
    Error,
}

impl VerificationSummary {
    pub fn from_outcomes(outcomes: &[DeliveryOutcome]) -> Self {
        let success_count = outcomes.iter().filter(|o| o.delivered).count();
        let failure_count = outcomes.len() - success_count;
        let systemic = outcomes.iter().any(|o| !o.delivered && o.systemic);
        let (status, message) = if outcomes.is_empty() {
            (VerificationStatus::Skipped, "no recipients configured".to_string())
        } else if systemic {
            (
                VerificationStatus::Error,
                format!(
                    "delivery channel failure: {} delivered, {} failed",
                    success_count, failure_count
                ),
            )
        } else {
            (
                VerificationStatus::Success,
                format!("{} delivered, {} failed", success_count, failure_count),
            )
        };
        Self {
            status,
            success_count,
            failure_count,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(delivered: bool) -> DeliveryOutcome {
        DeliveryOutcome {
            recipient: "ops@example.com".to_string(),
            channel: AlertChannel::Email,
            delivered,
            systemic: false,
            detail: None,
        }
    }

    fn systemic_failure() -> DeliveryOutcome {
        DeliveryOutcome {
            systemic: true,
            detail: Some("gateway not configured".to_string()),
            ..outcome(false)
        }
    }

    #[test]
    fn empty_outcomes_are_skipped() {
        let summary = VerificationSummary::from_outcomes(&[]);
        assert_eq!(summary.status, VerificationStatus::Skipped);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failure_count, 0);
    }

    #[test]
    fn mixed_outcomes_count_successes_and_failures() {
        let summary =
            VerificationSummary::from_outcomes(&[outcome(true), outcome(false), outcome(true)]);
        assert_eq!(summary.status, VerificationStatus::Success);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 1);
    }

    #[test]
    fn bounces_alone_do_not_escalate_to_error() {
        // Every attempt bounced, but nothing is systemically wrong
        let summary = VerificationSummary::from_outcomes(&[outcome(false), outcome(false)]);
        assert_eq!(summary.status, VerificationStatus::Success);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failure_count, 2);
    }

    #[test]
    fn systemic_failure_reports_error() {
        let summary = VerificationSummary::from_outcomes(&[outcome(true), systemic_failure()]);
        assert_eq!(summary.status, VerificationStatus::Error);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failure_count, 1);
    }
}

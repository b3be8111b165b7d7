//! Outbound notification delivery
//!
//! One sender routes every channel. System notices land in an in-process
//! feed; webhook posts go straight to the recipient URL; email, SMS, and
//! push are relayed through the configured gateway.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use shared::AlertChannel;

use crate::error::{AppError, AppResult};

/// Delivery seam used by the alert dispatcher. Tests substitute an
/// in-memory recorder.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(
        &self,
        channel: AlertChannel,
        recipient: &str,
        title: &str,
        message: &str,
    ) -> AppResult<()>;
}

/// A notice recorded on the in-process system feed
#[derive(Debug, Clone, Serialize)]
pub struct SystemNotice {
    pub recipient: String,
    pub title: String,
    pub message: String,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
struct GatewayPayload<'a> {
    channel: &'a str,
    recipient: &'a str,
    title: &'a str,
    message: &'a str,
}

/// Production sender backed by reqwest
#[derive(Clone)]
pub struct NotificationGateway {
    client: reqwest::Client,
    gateway_url: String,
    system_feed: Arc<Mutex<Vec<SystemNotice>>>,
}

impl NotificationGateway {
    pub fn new(gateway_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            system_feed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drain the system feed, newest last
    pub async fn take_system_notices(&self) -> Vec<SystemNotice> {
        std::mem::take(&mut *self.system_feed.lock().await)
    }

    async fn post(&self, url: &str, payload: &GatewayPayload<'_>) -> AppResult<()> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::NotificationDelivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::NotificationDelivery(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }
}

fn channel_name(channel: AlertChannel) -> &'static str {
    match channel {
        AlertChannel::System => "system",
        AlertChannel::Email => "email",
        AlertChannel::Sms => "sms",
        AlertChannel::Push => "push",
        AlertChannel::Webhook => "webhook",
    }
}

#[async_trait]
impl ChannelSender for NotificationGateway {
    async fn send(
        &self,
        channel: AlertChannel,
        recipient: &str,
        title: &str,
        message: &str,
    ) -> AppResult<()> {
        match channel {
            AlertChannel::System => {
                self.system_feed.lock().await.push(SystemNotice {
                    recipient: recipient.to_string(),
                    title: title.to_string(),
                    message: message.to_string(),
                    recorded_at: chrono::Utc::now(),
                });
                Ok(())
            }
            AlertChannel::Webhook => {
                // The recipient address is the webhook URL itself
                let payload = GatewayPayload {
                    channel: channel_name(channel),
                    recipient,
                    title,
                    message,
                };
                self.post(recipient, &payload).await
            }
            AlertChannel::Email | AlertChannel::Sms | AlertChannel::Push => {
                if self.gateway_url.is_empty() {
                    return Err(AppError::Configuration(format!(
                        "{} channel requires notify.gateway_url",
                        channel_name(channel)
                    )));
                }
                let payload = GatewayPayload {
                    channel: channel_name(channel),
                    recipient,
                    title,
                    message,
                };
                self.post(&self.gateway_url, &payload).await
            }
        }
    }
}

/// Test sender that records every attempt and can fail on demand
#[derive(Clone, Default)]
pub struct RecordingSender {
    pub sent: Arc<Mutex<Vec<(AlertChannel, String, String)>>>,
    pub fail_channel: Option<AlertChannel>,
    /// Fail the channel with a configuration error instead of a bounce
    pub fail_systemically: bool,
}

#[async_trait]
impl ChannelSender for RecordingSender {
    async fn send(
        &self,
        channel: AlertChannel,
        recipient: &str,
        title: &str,
        _message: &str,
    ) -> AppResult<()> {
        if self.fail_channel == Some(channel) {
            if self.fail_systemically {
                return Err(AppError::Configuration(format!(
                    "{} channel requires notify.gateway_url",
                    channel_name(channel)
                )));
            }
            return Err(AppError::NotificationDelivery(format!(
                "{} send rejected",
                channel_name(channel)
            )));
        }
        self.sent
            .lock()
            .await
            .push((channel, recipient.to_string(), title.to_string()));
        Ok(())
    }
}

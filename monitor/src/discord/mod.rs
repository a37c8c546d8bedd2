pub mod embed;

use crate::notifier::Notifier;
use anyhow::{Context, Result};
use async_trait::async_trait;
use presence_tracker::PresenceEvent;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use self::embed::{event_to_embed, WebhookPayload};

const DELIVERY_TIMEOUT_SECS: u64 = 10;

/// Discord webhook notifier. Posts one embed per presence event.
pub struct DiscordNotifier {
    webhook_url: String,
    http_client: Client,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DELIVERY_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            webhook_url,
            http_client,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn notify(&self, event: &PresenceEvent) -> Result<()> {
        let payload = WebhookPayload {
            embeds: vec![event_to_embed(event)],
        };

        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("Failed to send webhook request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            anyhow::bail!("Webhook returned error status {}: {}", status, body);
        }

        info!(
            username = %event.display_name,
            event = %event.label,
            event_id = %event.event_id,
            "Delivered presence event"
        );

        Ok(())
    }
}

//! Notification delivery.
//!
//! The scheduler talks to a [`Notifier`] trait so delivery transport stays
//! swappable and testable. The production implementation posts a JSON
//! payload to a configured mail-gateway webhook.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{ConfigError, NotifyError};
use crate::storage::NotifierConfig;

/// Sends one rendered notification to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Unique identifier (e.g. "webhook").
    fn name(&self) -> &str;

    /// Deliver an HTML message. A returned error affects only this
    /// recipient; callers must not abort a batch over it.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError>;
}

/// Notifier that posts messages to a mail-gateway webhook.
#[derive(Debug)]
pub struct WebhookNotifier {
    endpoint: String,
    from: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            from: from.into(),
            client: Client::new(),
        }
    }

    /// Build from configuration.
    ///
    /// # Errors
    /// Returns an error when no endpoint is configured.
    pub fn from_config(config: &NotifierConfig) -> Result<Self, ConfigError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| ConfigError::MissingKey("notifier.endpoint".into()))?;
        Ok(Self::new(endpoint, config.from.clone()))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": html_body,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NotifyError::Status {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

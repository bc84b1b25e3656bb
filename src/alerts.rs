//! Error-alert webhook dispatch.
//!
//! When the request handler renders an unhandled system error, an
//! alert payload is posted to the configured webhook. Delivery is
//! fire-and-forget: failures are logged and never affect the response.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AlertConfig;

/// Alert payload sent to the webhook endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload {
    /// Event type, always "system.error".
    pub event: &'static str,
    /// Unique event ID.
    pub event_id: String,
    /// Human-readable error summary.
    pub error: String,
    /// Where the error occurred (tool name, product id).
    pub context: String,
    /// When the error occurred.
    pub timestamp: DateTime<Utc>,
}

/// Dispatches error alerts to a configured webhook URL.
pub struct AlertNotifier {
    client: Client,
    url: String,
}

impl AlertNotifier {
    /// Build a notifier from configuration; `None` when alerts are
    /// disabled.
    pub fn from_config(config: &AlertConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .ok()?;
        Some(Self {
            client,
            url: config.webhook_url.clone(),
        })
    }

    /// Dispatch an error alert in the background.
    pub fn notify_error(&self, error: impl Into<String>, context: impl Into<String>) {
        let payload = AlertPayload {
            event: "system.error",
            event_id: uuid::Uuid::new_v4().to_string(),
            error: error.into(),
            context: context.into(),
            timestamp: Utc::now(),
        };

        let client = self.client.clone();
        let url = self.url.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(event_id = %payload.event_id, "error alert delivered");
                }
                Ok(response) => {
                    warn!(
                        event_id = %payload.event_id,
                        status = %response.status(),
                        "error alert rejected by webhook"
                    );
                }
                Err(e) => {
                    warn!(event_id = %payload.event_id, error = %e, "error alert delivery failed");
                }
            }
        });
    }
}

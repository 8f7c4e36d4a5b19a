//! Out-of-band notifications.
//!
//! Connect and kick events can be mirrored to a chat webhook. Delivery is
//! fire-and-forget: a slow or failing webhook never delays the supervisor.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tokio::runtime::Handle;

use crate::config::WebhookConfig;
use crate::error::{Result, TetherError};

/// Request timeout for webhook posts.
pub const WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Receives human-readable status updates.
pub trait Notifier {
    /// Deliver a message. Must not block.
    fn notify(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, message: &str) {
        tracing::trace!("Notification dropped: {message}");
    }
}

/// Webhook body.
#[derive(Debug, Clone, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
}

/// Posts `{content, username}` to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    username: String,
}

impl WebhookNotifier {
    /// Create a notifier for `url`.
    pub fn new(url: impl Into<String>, username: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()
            .map_err(|e| TetherError::Webhook(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            username: username.into(),
        })
    }

    /// Webhook URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(client: Client, url: String, username: String, content: String) -> Result<()> {
        let payload = WebhookPayload {
            content: &content,
            username: &username,
        };
        let response = client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(TetherError::Webhook(format!("HTTP {status}")));
        }
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, message: &str) {
        let Ok(handle) = Handle::try_current() else {
            tracing::debug!("No runtime; webhook notification dropped");
            return;
        };
        let fut = Self::post(
            self.client.clone(),
            self.url.clone(),
            self.username.clone(),
            message.to_string(),
        );
        handle.spawn(async move {
            if let Err(e) = fut.await {
                tracing::warn!("Webhook delivery failed: {e}");
            }
        });
    }
}

/// Notifier for a webhook configuration; no-op when no URL is set.
pub fn from_config(config: &WebhookConfig) -> Result<Box<dyn Notifier>> {
    match config.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(Box::new(WebhookNotifier::new(url, config.username.clone())?)),
        _ => Ok(Box::new(NoopNotifier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload {
            content: "Connected as Steve",
            username: "tether",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["content"], "Connected as Steve");
        assert_eq!(json["username"], "tether");
    }

    #[test]
    fn test_from_config_without_url() {
        let notifier = from_config(&WebhookConfig::default()).unwrap();
        notifier.notify("nothing happens");
    }

    #[test]
    fn test_notify_outside_runtime_is_dropped() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook", "tether").unwrap();
        assert_eq!(notifier.url(), "http://127.0.0.1:9/hook");
        notifier.notify("no runtime here");
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_swallowed() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook", "tether").unwrap();
        notifier.notify("Kicked: test");
        tokio::task::yield_now().await;
    }
}

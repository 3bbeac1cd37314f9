use crate::constants::sink;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Fire-and-forget destination for operator-facing diagnostics.
///
/// Implementations must return quickly and must never propagate a failure
/// into the caller; a lost message is acceptable, a blocked tick is not.
pub trait DebugSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Sink that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn emit(&self, message: &str) {
        debug!("{}", message);
    }
}

/// Sink that POSTs each message to a webhook, falling back to the log
pub struct WebhookSink {
    webhook_url: String,
    client: Client,
}

impl WebhookSink {
    pub fn new(webhook_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(sink::WEBHOOK_TIMEOUT_SECONDS))
            .build()
            .expect("Failed to create HTTP client for WebhookSink");

        Self {
            webhook_url,
            client,
        }
    }
}

impl DebugSink for WebhookSink {
    fn emit(&self, message: &str) {
        debug!("{}", message);

        if self.webhook_url.is_empty() {
            return;
        }

        let client = self.client.clone();
        let url = self.webhook_url.clone();
        let payload = json!({ "message": message });

        // Delivery happens off the caller's path; emit stays synchronous
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available, debug message stays log-only");
                return;
            }
        };

        handle.spawn(async move {
            match timeout(
                Duration::from_secs(sink::WEBHOOK_TIMEOUT_SECONDS),
                client.post(&url).json(&payload).send(),
            )
            .await
            {
                Ok(Ok(response)) => {
                    if !response.status().is_success() {
                        warn!("Debug webhook returned status: {}", response.status());
                    }
                }
                Ok(Err(e)) => {
                    warn!("Failed to deliver debug message: {}", e);
                }
                Err(_) => {
                    warn!("Debug webhook timeout");
                }
            }
        });
    }
}

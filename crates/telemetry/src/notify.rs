// Webhook notification channel: fire-and-forget delivery of named events to
// the external automation service. Failures here are logged and dropped; a
// broken notification channel must never block the primary telemetry path.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::credential::Credential;
use crate::transport::Transport;

pub const DEFAULT_NOTIFY_BASE_URL: &str = "https://maker.ifttt.com";

/// A named event with up to three string values, in the shape the webhook
/// service expects. Ephemeral: exists only for the duration of one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub name: String,
    pub value1: String,
    pub value2: String,
    pub value3: String,
}

impl NotificationEvent {
    pub fn new(
        name: impl Into<String>,
        value1: impl Into<String>,
        value2: impl Into<String>,
        value3: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value1: value1.into(),
            value2: value2.into(),
            value3: value3.into(),
        }
    }
}

/// Configuration for the notification channel.
#[derive(Clone)]
pub struct NotifyConfig {
    /// Base URL of the webhook service.
    pub base_url: Url,

    /// Webhook API key. Not validated: an empty key is accepted and will
    /// simply fail at send time.
    pub api_key: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_NOTIFY_BASE_URL).expect("default base URL is valid"),
            api_key: String::new(),
        }
    }
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &crate::credential::redact(&self.api_key))
            .finish()
    }
}

/// Seam between event producers and the notification channel.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event, best effort. Implementations never surface failures
    /// to the caller; the notification channel is secondary by contract.
    async fn trigger_event(&self, event: NotificationEvent);
}

/// Production webhook client.
pub struct Notifier {
    base_url: Url,
    api_key: Credential,
    transport: Arc<dyn Transport>,
}

impl Notifier {
    pub fn new(config: NotifyConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url,
            api_key: Credential::new(config.api_key),
            transport,
        }
    }

    /// Rotate the webhook credential.
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.api_key.rotate(api_key);
    }

    /// Endpoint URL for one event: `<base>/trigger/<event>/with/key/<key>`
    /// carrying `value1`..`value3` as query parameters, in that order. The
    /// receiving service depends on these parameter names and their ordering.
    fn event_url(&self, event: &NotificationEvent) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(&format!(
            "/trigger/{}/with/key/{}",
            event.name,
            self.api_key.reveal()
        ))?;
        url.query_pairs_mut()
            .append_pair("value1", &event.value1)
            .append_pair("value2", &event.value2)
            .append_pair("value3", &event.value3)
            .finish();
        Ok(url)
    }
}

#[async_trait]
impl EventSink for Notifier {
    async fn trigger_event(&self, event: NotificationEvent) {
        let url = match self.event_url(&event) {
            Ok(url) => url,
            Err(e) => {
                warn!(event = %event.name, error = %e, "Dropping notification with unbuildable URL");
                return;
            }
        };

        debug!(event = %event.name, "Triggering webhook event");
        match self.transport.get(&url).await {
            Ok(response) if response.status == 200 => {
                debug!(event = %event.name, "Webhook event delivered");
            }
            Ok(response) => {
                warn!(
                    event = %event.name,
                    status = response.status,
                    "Webhook service rejected event"
                );
            }
            Err(e) => {
                warn!(event = %event.name, error = %e, "Webhook delivery failed");
            }
        }
    }
}

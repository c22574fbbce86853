// Telemetry publisher: one measurement per call, one authenticated POST over
// the pinned trust anchor, one outcome classification, one notification.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::credential::{Credential, redact};
use crate::error::TelemetryError;
use crate::notify::{EventSink, NotificationEvent};
use crate::transport::Transport;

pub const DEFAULT_TELEMETRY_ENDPOINT: &str = "https://api.thingspeak.com/update";

/// Synthetic status recorded when the exchange failed below HTTP (connect,
/// handshake, timeout). Distinct from every real HTTP status code.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Configuration for the telemetry publisher.
#[derive(Clone)]
pub struct PublisherConfig {
    /// Update endpoint of the time-series service. Exactly one logical
    /// endpoint is active per publisher instance.
    pub endpoint: Url,

    /// Write API key for the channel.
    pub api_key: String,

    /// Webhook event fired with the outcome of each publish attempt.
    pub event_name: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_TELEMETRY_ENDPOINT).expect("default endpoint is valid"),
            api_key: String::new(),
            event_name: "telemetry_update".to_owned(),
        }
    }
}

impl fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &redact(&self.api_key))
            .field("event_name", &self.event_name)
            .finish()
    }
}

/// Outcome of one publish attempt. Produced exactly once per attempt and
/// consumed immediately to select the outcome notification; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    Failure { status: u16, body: String },
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Delivers one reading per call to the telemetry endpoint and reports the
/// outcome through the notification sink.
pub struct TelemetryPublisher {
    endpoint: Url,
    api_key: Credential,
    event_name: String,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn EventSink>,
}

impl TelemetryPublisher {
    /// The publisher does not own the sink's lifetime; the same sink is
    /// typically shared with the orchestrator for lifecycle events.
    pub fn new(
        config: PublisherConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            endpoint: config.endpoint,
            api_key: Credential::new(config.api_key),
            event_name: config.event_name,
            transport,
            sink,
        }
    }

    /// Rotate the channel credential without rebuilding the TLS context. An
    /// in-flight call keeps the body it already built; the next call picks up
    /// the new key.
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.api_key.rotate(api_key);
    }

    /// Deliver one reading and notify of the outcome.
    ///
    /// Exactly one [`DeliveryOutcome`] and at most one notification per call.
    /// Transport failures resolve to `Failure` with the synthetic status
    /// rather than propagating. The only `Err` is an empty credential, which
    /// skips the attempt entirely (no request, no notification). No internal
    /// retry: the caller's periodic cadence is the retry mechanism.
    pub async fn write_field(
        &self,
        field1: &str,
        field2: &str,
        status_message: &str,
    ) -> Result<DeliveryOutcome, TelemetryError> {
        if self.api_key.is_empty() {
            return Err(TelemetryError::configuration(
                "telemetry API key is empty, skipping publish",
            ));
        }

        // Fixed key order, no extra escaping: the receiving service expects
        // exactly this shape and values are assumed safe ASCII.
        let body = format!(
            "api_key={}&field1={field1}&field2={field2}&status={status_message}",
            self.api_key.reveal()
        );

        debug!(endpoint = %self.endpoint, field1, field2, "Publishing telemetry update");

        let outcome = match self.transport.post_form(&self.endpoint, body).await {
            Ok(response) if response.status == 200 => DeliveryOutcome::Success,
            Ok(response) => DeliveryOutcome::Failure {
                status: response.status,
                body: response.body,
            },
            Err(e) => DeliveryOutcome::Failure {
                status: TRANSPORT_FAILURE_STATUS,
                body: format!("transport failure: {e}"),
            },
        };

        match &outcome {
            DeliveryOutcome::Success => {
                info!("Telemetry update delivered");
                self.sink
                    .trigger_event(NotificationEvent::new(
                        self.event_name.as_str(),
                        "Telemetry update succeeded",
                        "Channel updated successfully.",
                        "",
                    ))
                    .await;
            }
            DeliveryOutcome::Failure { status, body } => {
                warn!(status = *status, body = %body, "Telemetry update failed");
                self.sink
                    .trigger_event(NotificationEvent::new(
                        self.event_name.as_str(),
                        "Telemetry update failed",
                        format!(
                            "Telemetry update failed. HTTP status code: {status}. Response body: {body}"
                        ),
                        "",
                    ))
                    .await;
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockTransport, RecordingSink, ScriptedReply};

    fn publisher(
        transport: Arc<MockTransport>,
        sink: Arc<RecordingSink>,
        api_key: &str,
    ) -> TelemetryPublisher {
        TelemetryPublisher::new(
            PublisherConfig {
                api_key: api_key.to_owned(),
                ..PublisherConfig::default()
            },
            transport,
            sink,
        )
    }

    #[tokio::test]
    async fn body_matches_the_wire_format_exactly() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::Status(200, "1")));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport.clone(), sink.clone(), "ABC123");

        let outcome = publisher.write_field("21.5", "47.0", "OK").await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Success);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].body.as_deref(),
            Some("api_key=ABC123&field1=21.5&field2=47.0&status=OK")
        );
    }

    #[tokio::test]
    async fn http_200_fires_exactly_one_success_notification() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::Status(200, "1")));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport, sink.clone(), "ABC123");

        publisher.write_field("21.5", "47.0", "OK").await.unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value1, "Telemetry update succeeded");
        assert!(!events[0].value2.contains("failed"));
    }

    #[tokio::test]
    async fn non_200_fires_one_failure_notification_with_status_and_body() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::Status(403, "invalid key")));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport, sink.clone(), "ABC123");

        let outcome = publisher.write_field("21.5", "47.0", "OK").await.unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Failure {
                status: 403,
                body: "invalid key".to_owned(),
            }
        );
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value1, "Telemetry update failed");
        assert!(events[0].value2.contains("403"));
        assert!(events[0].value2.contains("invalid key"));
    }

    #[tokio::test]
    async fn transport_failure_becomes_a_synthetic_failure_outcome() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::ConnectionRefused));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport, sink.clone(), "ABC123");

        let outcome = publisher.write_field("21.5", "47.0", "OK").await.unwrap();

        match outcome {
            DeliveryOutcome::Failure { status, body } => {
                assert_eq!(status, TRANSPORT_FAILURE_STATUS);
                assert!(body.contains("transport failure"));
            }
            DeliveryOutcome::Success => panic!("transport failure classified as success"),
        }
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].value2.contains("transport failure"));
    }

    #[tokio::test]
    async fn repeated_calls_produce_independent_identical_outcomes() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::Status(200, "1")));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport.clone(), sink.clone(), "ABC123");

        let first = publisher.write_field("21.5", "47.0", "OK").await.unwrap();
        let second = publisher.write_field("21.5", "47.0", "OK").await.unwrap();

        assert_eq!(first, second);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(sink.events().len(), 2);
    }

    #[tokio::test]
    async fn rotated_key_appears_in_the_next_body() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::Status(200, "1")));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport.clone(), sink, "OLDKEY");

        publisher.write_field("1.0", "2.0", "OK").await.unwrap();
        publisher.set_api_key("NEWKEY");
        publisher.write_field("1.0", "2.0", "OK").await.unwrap();

        let requests = transport.requests();
        assert!(requests[0].body.as_deref().unwrap().starts_with("api_key=OLDKEY&"));
        assert!(requests[1].body.as_deref().unwrap().starts_with("api_key=NEWKEY&"));
    }

    #[tokio::test]
    async fn empty_credential_skips_the_attempt_entirely() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::Status(200, "1")));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport.clone(), sink.clone(), "");

        let result = publisher.write_field("21.5", "47.0", "OK").await;

        assert!(matches!(
            result,
            Err(TelemetryError::Configuration { .. })
        ));
        assert_eq!(transport.requests().len(), 0);
        assert_eq!(sink.events().len(), 0);
        assert_eq!(transport.opened(), 0);
    }

    #[tokio::test]
    async fn connection_is_released_once_on_both_paths() {
        let transport = Arc::new(MockTransport::new(ScriptedReply::Status(200, "1")));
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(transport.clone(), sink, "ABC123");

        publisher.write_field("1.0", "2.0", "OK").await.unwrap();
        assert_eq!(transport.opened(), 1);
        assert_eq!(transport.closed(), 1);

        transport.script(ScriptedReply::Status(500, "boom"));
        publisher.write_field("1.0", "2.0", "OK").await.unwrap();
        assert_eq!(transport.opened(), 2);
        assert_eq!(transport.closed(), 2);

        transport.script(ScriptedReply::ConnectionRefused);
        publisher.write_field("1.0", "2.0", "OK").await.unwrap();
        assert_eq!(transport.opened(), 3);
        assert_eq!(transport.closed(), 3);
    }
}

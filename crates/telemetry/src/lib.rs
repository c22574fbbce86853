//! Thermolink engine: secure telemetry delivery and webhook notification for
//! a networked environmental-sensing device.
//!
//! The engine posts one measurement per cycle to the time-series service over
//! a TLS connection validated against a pinned trust anchor, classifies the
//! response, and fires exactly one fire-and-forget webhook notification per
//! attempt describing the outcome. Lifecycle events raised by other
//! subsystems (startup, firmware update start/end/error) ride the same
//! notification channel, bypassing the publisher.

pub mod credential;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod publish;
pub mod sensor;
pub mod status;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use credential::Credential;
pub use error::{SensorError, TelemetryError, TransportError};
pub use notify::{DEFAULT_NOTIFY_BASE_URL, EventSink, NotificationEvent, Notifier, NotifyConfig};
pub use orchestrator::{DeliveryOrchestrator, LifecycleEvent, OrchestratorConfig, UpdateError};
pub use publish::{
    DEFAULT_TELEMETRY_ENDPOINT, DeliveryOutcome, PublisherConfig, TRANSPORT_FAILURE_STATUS,
    TelemetryPublisher,
};
pub use sensor::{Measurement, Perception, SensorSource};
pub use status::{LogIndicator, StatusIndicator};
pub use transport::{
    DEFAULT_TRUST_ANCHOR_PEM, HttpTransport, Transport, TransportOptions, WireResponse,
};

// Delivery orchestrator: the periodic measure-publish-notify cadence, plus
// the relay for discrete lifecycle events raised by other subsystems.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::TelemetryError;
use crate::notify::{EventSink, NotificationEvent};
use crate::publish::{DeliveryOutcome, TelemetryPublisher};
use crate::sensor::SensorSource;
use crate::status::StatusIndicator;

/// Failure modes of the update collaborator. A closed set: one notification
/// per occurrence, nothing else to manage here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    Auth,
    Begin,
    Connect,
    Receive,
    End,
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auth => "authentication failed",
            Self::Begin => "begin failed",
            Self::Connect => "connect failed",
            Self::Receive => "receive failed",
            Self::End => "end failed",
        })
    }
}

/// Discrete lifecycle events other subsystems raise. These are not telemetry
/// and carry no numeric fields; they bypass the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The device came up and joined the network.
    Started,
    UpdateStarted,
    UpdateFinished,
    UpdateFailed(UpdateError),
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Device name embedded in lifecycle notification messages.
    pub device_name: String,

    /// Webhook event fired for startup notifications.
    pub event_name: String,

    /// Webhook event fired for update lifecycle notifications.
    pub update_event_name: String,

    /// Interval between measurement cycles.
    pub interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            device_name: "thermolink".to_owned(),
            event_name: "telemetry_update".to_owned(),
            update_event_name: "firmware_update".to_owned(),
            interval: Duration::from_secs(60),
        }
    }
}

/// Ties a measurement to a publish-and-notify cycle on a fixed cadence.
///
/// A single logical thread of control drives the whole chain: tick, measure,
/// publish, notify, idle. Each cycle is awaited to completion before the next
/// tick is observed, so publishes are strictly ordered and non-overlapping
/// per endpoint.
pub struct DeliveryOrchestrator<S: SensorSource> {
    config: OrchestratorConfig,
    sensor: S,
    publisher: Arc<TelemetryPublisher>,
    sink: Arc<dyn EventSink>,
    indicator: Option<Arc<dyn StatusIndicator>>,
}

impl<S: SensorSource> DeliveryOrchestrator<S> {
    pub fn new(
        config: OrchestratorConfig,
        sensor: S,
        publisher: Arc<TelemetryPublisher>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            sensor,
            publisher,
            sink,
            indicator: None,
        }
    }

    /// Attach a status indicator to reflect connectivity around each cycle.
    pub fn with_indicator(mut self, indicator: Arc<dyn StatusIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// One measurement cycle: read the sensor, publish, notify.
    ///
    /// Numeric fields are formatted with one decimal place, the shape the
    /// receiving channel stores. An unreadable sensor skips the cycle.
    pub async fn tick(&mut self) -> Result<DeliveryOutcome, TelemetryError> {
        let measurement = self.sensor.measure()?;
        debug!(
            temperature = measurement.temperature,
            humidity = measurement.humidity,
            status = %measurement.status,
            perception = measurement.perception.label(),
            "Measured environment data"
        );

        if let Some(indicator) = &self.indicator {
            indicator.turn_on();
        }
        let outcome = self
            .publisher
            .write_field(
                &format!("{:.1}", measurement.temperature),
                &format!("{:.1}", measurement.humidity),
                &measurement.status,
            )
            .await;
        if let Some(indicator) = &self.indicator {
            indicator.turn_off();
        }
        outcome
    }

    /// Relay one lifecycle event as a notification, bypassing the publisher.
    pub async fn relay(&self, event: LifecycleEvent) {
        info!(event = ?event, "Relaying lifecycle event");
        self.sink.trigger_event(self.notification_for(&event)).await;
    }

    fn notification_for(&self, event: &LifecycleEvent) -> NotificationEvent {
        let device = self.config.device_name.as_str();
        match event {
            LifecycleEvent::Started => NotificationEvent::new(
                self.config.event_name.as_str(),
                "Device started",
                format!("{device} is up and connected."),
                "",
            ),
            LifecycleEvent::UpdateStarted => NotificationEvent::new(
                self.config.update_event_name.as_str(),
                "Update started",
                format!("{device} began receiving a firmware update."),
                "",
            ),
            LifecycleEvent::UpdateFinished => NotificationEvent::new(
                self.config.update_event_name.as_str(),
                "Update finished",
                format!("{device} finished receiving a firmware update."),
                "",
            ),
            LifecycleEvent::UpdateFailed(reason) => NotificationEvent::new(
                self.config.update_event_name.as_str(),
                "Update failed",
                format!("{device} firmware update failed: {reason}."),
                "",
            ),
        }
    }

    /// Drive the cadence until shutdown.
    ///
    /// The tick loop, the lifecycle channel, and the cancellation token are
    /// multiplexed on one task, which serializes publishes and notifications.
    /// A failed cycle is logged and absorbed; the next tick proceeds
    /// regardless, which makes the cadence itself the retry mechanism.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<LifecycleEvent>,
        shutdown: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut events_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Orchestrator shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    match self.tick().await {
                        Ok(outcome) => {
                            debug!(success = outcome.is_success(), "Delivery cycle finished");
                        }
                        Err(e) => warn!(error = %e, "Delivery cycle skipped"),
                    }
                }
                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => self.relay(event).await,
                        // All producers dropped; keep ticking.
                        None => events_open = false,
                    }
                }
            }
        }
    }
}

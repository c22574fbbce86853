use thiserror::Error;

/// Failures at the wire level, below HTTP status semantics.
///
/// A non-2xx status from the remote end is not a `TransportError`; it is a
/// response, and classifying it is the publisher's job.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("connection failed: {reason}")]
    Connect { reason: String },

    #[error("operation timed out: {reason}")]
    Timeout { reason: String },

    #[error("TLS error: {reason}")]
    Tls { reason: String },
}

impl TransportError {
    pub fn connect(reason: impl Into<String>) -> Self {
        Self::Connect {
            reason: reason.into(),
        }
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::Timeout {
            reason: reason.into(),
        }
    }

    pub fn tls(reason: impl Into<String>) -> Self {
        Self::Tls {
            reason: reason.into(),
        }
    }
}

/// Errors that can cross the `write_field` / `tick` boundary.
///
/// Transport and protocol failures never appear here: the publisher absorbs
/// them into a `DeliveryOutcome::Failure` and completes the notify step.
/// Only a skipped attempt (bad configuration, unreadable sensor) is an `Err`.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("sensor error: {source}")]
    Sensor {
        #[from]
        source: SensorError,
    },
}

impl TelemetryError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

/// Failure reading the environmental sensor collaborator.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor read failed: {reason}")]
    Read { reason: String },
}

impl SensorError {
    pub fn read(reason: impl Into<String>) -> Self {
        Self::Read {
            reason: reason.into(),
        }
    }
}

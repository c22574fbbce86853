// TOML configuration for the agent, layered under the command-line flags.
// The shape mirrors the original device's build-time constant block: device
// identity, measurement cadence, and the two service credentials.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thermolink_engine::{DEFAULT_NOTIFY_BASE_URL, DEFAULT_TELEMETRY_ENDPOINT, DEFAULT_TRUST_ANCHOR_PEM};
use url::Url;

use crate::error::{AppError, Result};

/// Floor for the measurement interval; one transport round trip per cycle
/// has to fit inside it.
pub const MIN_INTERVAL_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub device: DeviceSection,
    pub telemetry: TelemetrySection,
    pub notify: NotifySection,
    pub sensor: SensorSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSection {
    /// Name reported in lifecycle notifications.
    pub name: String,

    /// Seconds between measurement cycles.
    pub interval_seconds: f64,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            name: "thermolink".to_owned(),
            interval_seconds: 60.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetrySection {
    /// Write API key for the time-series channel.
    pub api_key: String,

    /// Update endpoint of the time-series service.
    pub endpoint: String,

    /// PEM file overriding the compiled-in trust anchor.
    pub trust_anchor_path: Option<PathBuf>,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_TELEMETRY_ENDPOINT.to_owned(),
            trust_anchor_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifySection {
    /// Webhook API key.
    pub api_key: String,

    /// Base URL of the webhook service.
    pub base_url: String,

    /// Event fired for delivery outcomes and device startup.
    pub event_name: String,

    /// Event fired for firmware update lifecycle notifications.
    pub update_event_name: String,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_NOTIFY_BASE_URL.to_owned(),
            event_name: "telemetry_update".to_owned(),
            update_event_name: "firmware_update".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorSection {
    /// Baseline the simulated sensor drifts around, degrees Celsius.
    pub baseline_temperature: f32,

    /// Baseline relative humidity, percent.
    pub baseline_humidity: f32,
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            baseline_temperature: 21.0,
            baseline_humidity: 45.0,
        }
    }
}

impl AppConfig {
    /// Load from an optional file, apply flag overrides, and validate.
    pub fn load(path: Option<&Path>, interval_override: Option<f64>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)?;
                toml::from_str(&raw)
                    .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?
            }
            None => Self::default(),
        };

        if let Some(seconds) = interval_override {
            config.device.interval_seconds = seconds;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.device.interval_seconds < MIN_INTERVAL_SECONDS {
            return Err(AppError::config(format!(
                "interval_seconds must be at least {MIN_INTERVAL_SECONDS}, got {}",
                self.device.interval_seconds
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.device.interval_seconds)
    }

    pub fn telemetry_endpoint(&self) -> Result<Url> {
        Url::parse(&self.telemetry.endpoint)
            .map_err(|e| AppError::config(format!("invalid telemetry endpoint: {e}")))
    }

    pub fn notify_base_url(&self) -> Result<Url> {
        Url::parse(&self.notify.base_url)
            .map_err(|e| AppError::config(format!("invalid notify base URL: {e}")))
    }

    /// The trust anchor is configuration data: either the compiled-in root
    /// or a PEM file named in the config, to ease rotation when the
    /// authority is reissued.
    pub fn trust_anchor_pem(&self) -> Result<Vec<u8>> {
        match &self.telemetry.trust_anchor_path {
            Some(path) => Ok(fs::read(path)?),
            None => Ok(DEFAULT_TRUST_ANCHOR_PEM.as_bytes().to_vec()),
        }
    }
}

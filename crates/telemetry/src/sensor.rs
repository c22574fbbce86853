// Sensor collaborator interface and the measurement snapshot it produces,
// including the derived comfort metrics the device reports alongside the raw
// reading.

use crate::error::SensorError;

/// Human-perceived comfort band, derived from the dew point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perception {
    Dry,
    VeryComfortable,
    Comfortable,
    Ok,
    Uncomfortable,
    QuiteUncomfortable,
    VeryUncomfortable,
    SeverelyUncomfortable,
}

impl Perception {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dry => "Dry",
            Self::VeryComfortable => "Very comfy",
            Self::Comfortable => "Comfy",
            Self::Ok => "Ok",
            Self::Uncomfortable => "Uncomfy",
            Self::QuiteUncomfortable => "Quite uncomfy",
            Self::VeryUncomfortable => "Very uncomfy",
            Self::SeverelyUncomfortable => "Severe uncomfy",
        }
    }

    /// Classify a dew point (degrees Celsius) into a perception band.
    pub fn from_dew_point(dew_point: f32) -> Self {
        match dew_point {
            d if d < 10.0 => Self::Dry,
            d if d < 13.0 => Self::VeryComfortable,
            d if d < 16.0 => Self::Comfortable,
            d if d < 18.0 => Self::Ok,
            d if d < 21.0 => Self::Uncomfortable,
            d if d < 24.0 => Self::QuiteUncomfortable,
            d if d < 26.0 => Self::VeryUncomfortable,
            _ => Self::SeverelyUncomfortable,
        }
    }
}

/// One immutable snapshot from the environmental sensor.
#[derive(Debug, Clone)]
pub struct Measurement {
    /// Temperature in degrees Celsius.
    pub temperature: f32,

    /// Relative humidity in percent.
    pub humidity: f32,

    /// Sensor-reported status string ("OK" on a clean read).
    pub status: String,

    /// Dew point in degrees Celsius (Magnus approximation).
    pub dew_point: f32,

    /// Apparent temperature in degrees Celsius (Rothfusz regression).
    pub heat_index: f32,

    /// Comfort band derived from the dew point.
    pub perception: Perception,
}

impl Measurement {
    /// Build a snapshot from a raw reading, deriving the comfort metrics.
    pub fn from_reading(temperature: f32, humidity: f32, status: impl Into<String>) -> Self {
        let dew_point = dew_point(temperature, humidity);
        Self {
            temperature,
            humidity,
            status: status.into(),
            dew_point,
            heat_index: heat_index(temperature, humidity),
            perception: Perception::from_dew_point(dew_point),
        }
    }
}

/// Magnus-formula dew point approximation, degrees Celsius.
pub fn dew_point(temperature: f32, humidity: f32) -> f32 {
    const A: f32 = 17.62;
    const B: f32 = 243.12;
    let gamma = (A * temperature) / (B + temperature) + (humidity / 100.0).ln();
    (B * gamma) / (A - gamma)
}

/// Rothfusz heat-index regression, converted to Celsius. Below the
/// regression's validity range (80 F) the simple Steadman formula applies.
pub fn heat_index(temperature: f32, humidity: f32) -> f32 {
    let t = temperature * 9.0 / 5.0 + 32.0;
    let rh = humidity;

    if t < 80.0 {
        let hi = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
        return (hi - 32.0) * 5.0 / 9.0;
    }

    let hi = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 6.837_83e-3 * t * t
        - 5.481_717e-2 * rh * rh
        + 1.228_74e-3 * t * t * rh
        + 8.528_2e-4 * t * rh * rh
        - 1.99e-6 * t * t * rh * rh;
    (hi - 32.0) * 5.0 / 9.0
}

/// Source of fresh measurements. Hardware drivers and host-side stand-ins
/// implement this; the orchestrator only sees the trait.
pub trait SensorSource: Send {
    fn measure(&mut self) -> Result<Measurement, SensorError>;
}

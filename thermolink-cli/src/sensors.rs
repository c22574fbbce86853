// Host-side stand-in for the hardware humidity/temperature driver: a random
// walk around configurable baselines. The real DHT driver lives behind the
// same `SensorSource` trait on device builds.

use rand::RngExt;
use thermolink_engine::{Measurement, SensorError, SensorSource};

pub struct SimulatedSensor {
    temperature: f32,
    humidity: f32,
}

impl SimulatedSensor {
    pub fn new(baseline_temperature: f32, baseline_humidity: f32) -> Self {
        Self {
            temperature: baseline_temperature,
            humidity: baseline_humidity,
        }
    }
}

impl SensorSource for SimulatedSensor {
    fn measure(&mut self) -> Result<Measurement, SensorError> {
        let mut rng = rand::rng();
        self.temperature += rng.random_range(-0.3..0.3);
        self.humidity = (self.humidity + rng.random_range(-1.0..1.0)).clamp(0.0, 100.0);
        Ok(Measurement::from_reading(
            self.temperature,
            self.humidity,
            "OK",
        ))
    }
}

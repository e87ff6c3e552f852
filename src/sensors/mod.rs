//! Synthetic sensor models and the readings they produce.
//!
//! Three sensors are provided: a Gaussian temperature source, a humidity
//! bounded random walk, and a GPS position random walk. Each owns its state
//! and produces one [`ReadingRecord`] per [`Sensor::read`].

pub mod data;
pub mod gps;
pub mod humidity;
pub mod temperature;
pub mod traits;

// Re-export commonly used items
pub use data::{Payload, ReadingRecord, SensorKind};
pub use gps::GpsSensor;
pub use humidity::HumiditySensor;
pub use temperature::TemperatureSensor;
pub use traits::Sensor;

use crate::config::SimulatorConfig;
use crate::error::Result;

/// Build the three sensors in publish order: temperature, humidity, gps.
pub fn standard_suite(config: &SimulatorConfig) -> Result<Vec<Box<dyn Sensor>>> {
    let temperature = TemperatureSensor::new(config.temp_center, temperature::DEFAULT_SIGMA_C)?;

    Ok(vec![
        Box::new(temperature),
        Box::new(HumiditySensor::with_defaults()),
        Box::new(GpsSensor::with_defaults()),
    ])
}

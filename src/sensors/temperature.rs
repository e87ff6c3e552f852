//! Gaussian temperature sensor.

use crate::error::{Result, SimError};
use crate::sensors::{
    data::{round_to, ReadingRecord, SensorKind},
    traits::Sensor,
};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Default mean temperature in °C.
pub const DEFAULT_CENTER_C: f64 = 22.0;

/// Default standard deviation in °C.
pub const DEFAULT_SIGMA_C: f64 = 0.5;

/// Temperature sensor drawing independent samples from `N(center, sigma)`.
///
/// No state is carried between reads apart from the random source.
pub struct TemperatureSensor {
    center: f64,
    sigma: f64,
    distribution: Normal<f64>,
    rng: StdRng,
}

impl TemperatureSensor {
    /// Unit reported with every reading.
    pub const UNIT: &'static str = "C";

    /// Create a sensor seeded from OS entropy.
    pub fn new(center: f64, sigma: f64) -> Result<Self> {
        Self::with_rng(center, sigma, StdRng::from_entropy())
    }

    /// Create a sensor driven by the given random source.
    pub fn with_rng(center: f64, sigma: f64, rng: StdRng) -> Result<Self> {
        if !center.is_finite() {
            return Err(SimError::sensor_error(format!(
                "temperature center must be finite, got {}",
                center
            )));
        }
        let distribution = Normal::new(center, sigma).map_err(|e| {
            SimError::sensor_error(format!("invalid temperature sigma {}: {}", sigma, e))
        })?;

        Ok(Self {
            center,
            sigma,
            distribution,
            rng,
        })
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Sensor for TemperatureSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Temperature
    }

    fn read(&mut self) -> ReadingRecord {
        let value = self.distribution.sample(&mut self.rng);
        ReadingRecord::scalar(self.name(), round_to(value, 2), Self::UNIT)
    }
}

//! Humidity sensor modelled as a bounded random walk.

use crate::error::{Result, SimError};
use crate::sensors::{
    data::{round_to, ReadingRecord, SensorKind},
    traits::Sensor,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const DEFAULT_MIN_PCT: f64 = 20.0;
pub const DEFAULT_MAX_PCT: f64 = 80.0;
pub const DEFAULT_DRIFT_PCT: f64 = 0.5;
pub const DEFAULT_START_PCT: f64 = 50.0;

/// Half-width of the measurement noise added to reported values only.
pub const MEASUREMENT_NOISE_PCT: f64 = 0.2;

/// Relative humidity sensor.
///
/// Each read moves `current` by a uniform delta in `[-drift, drift]` and
/// clamps it into `[min, max]`. Measurement noise is added to the reported
/// value but never persisted.
pub struct HumiditySensor {
    min: f64,
    max: f64,
    drift: f64,
    current: f64,
    rng: StdRng,
}

impl HumiditySensor {
    pub const UNIT: &'static str = "%";

    /// Create a sensor seeded from OS entropy.
    pub fn new(min: f64, max: f64, drift: f64, current: f64) -> Result<Self> {
        Self::with_rng(min, max, drift, current, StdRng::from_entropy())
    }

    /// Create a sensor driven by the given random source.
    ///
    /// An initial `current` outside `[min, max]` is reset to the midpoint.
    pub fn with_rng(min: f64, max: f64, drift: f64, current: f64, rng: StdRng) -> Result<Self> {
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(SimError::sensor_error(format!(
                "humidity bounds must satisfy min <= max, got [{}, {}]",
                min, max
            )));
        }
        if !(drift.is_finite() && drift >= 0.0) {
            return Err(SimError::sensor_error(format!(
                "humidity drift must be non-negative, got {}",
                drift
            )));
        }

        let current = if (min..=max).contains(&current) {
            current
        } else {
            (min + max) / 2.0
        };

        Ok(Self {
            min,
            max,
            drift,
            current,
            rng,
        })
    }

    /// Sensor with the stock 20–80 % range starting at 50 %.
    pub fn with_defaults() -> Self {
        Self {
            min: DEFAULT_MIN_PCT,
            max: DEFAULT_MAX_PCT,
            drift: DEFAULT_DRIFT_PCT,
            current: DEFAULT_START_PCT,
            rng: StdRng::from_entropy(),
        }
    }

    /// Persisted walk position, always within `[min, max]`.
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    fn step(&mut self) -> f64 {
        let delta = self.rng.gen_range(-self.drift..=self.drift);
        self.current = (self.current + delta).clamp(self.min, self.max);
        self.current
    }
}

impl Sensor for HumiditySensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Humidity
    }

    fn read(&mut self) -> ReadingRecord {
        let walked = self.step();
        let noise = self
            .rng
            .gen_range(-MEASUREMENT_NOISE_PCT..=MEASUREMENT_NOISE_PCT);
        ReadingRecord::scalar(self.name(), round_to(walked + noise, 2), Self::UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(min: f64, max: f64, drift: f64, current: f64, seed: u64) -> HumiditySensor {
        HumiditySensor::with_rng(min, max, drift, current, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_out_of_range_start_resets_to_midpoint() {
        assert_eq!(seeded(20.0, 80.0, 0.5, 95.0, 1).current(), 50.0);
        assert_eq!(seeded(20.0, 80.0, 0.5, -3.0, 1).current(), 50.0);
        assert_eq!(seeded(30.0, 40.0, 0.5, 41.0, 1).current(), 35.0);
        assert_eq!(seeded(20.0, 80.0, 0.5, 80.0, 1).current(), 80.0);
    }

    #[test]
    fn test_single_read_window() {
        for seed in 0..200 {
            let mut sensor = seeded(20.0, 80.0, 0.5, 50.0, seed);
            let value = sensor.read().value().unwrap();
            assert!((49.3..=50.7).contains(&value), "seed {}: {}", seed, value);
        }
    }

    #[test]
    fn test_walk_stays_bounded() {
        let mut sensor = seeded(20.0, 80.0, 5.0, 78.0, 42);
        for _ in 0..10_000 {
            let value = sensor.read().value().unwrap();
            let current = sensor.current();
            assert!((20.0..=80.0).contains(&current), "current {} escaped", current);
            assert!((19.8..=80.2).contains(&value), "reported {} escaped", value);
        }
    }

    #[test]
    fn test_boundary_sticks() {
        let mut sensor = seeded(20.0, 20.0, 1.0, 20.0, 3);
        for _ in 0..50 {
            sensor.read();
            assert_eq!(sensor.current(), 20.0);
        }
    }

    #[test]
    fn test_noise_not_persisted() {
        let mut sensor = seeded(20.0, 80.0, 0.0, 50.0, 9);
        for _ in 0..100 {
            let value = sensor.read().value().unwrap();
            assert_eq!(sensor.current(), 50.0);
            assert!((value - 50.0).abs() <= 0.2 + 1e-9);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(HumiditySensor::new(80.0, 20.0, 0.5, 50.0).is_err());
        assert!(HumiditySensor::new(20.0, 80.0, -0.5, 50.0).is_err());
        assert!(HumiditySensor::new(f64::NAN, 80.0, 0.5, 50.0).is_err());
    }

    #[test]
    fn test_reading_shape() {
        let record = HumiditySensor::with_defaults().read();
        assert_eq!(record.sensor, "humidity");
        assert_eq!(record.unit.as_deref(), Some("%"));
    }
}

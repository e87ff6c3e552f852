//! GPS sensor performing an unbounded 2-D random walk.

use crate::error::{Result, SimError};
use crate::sensors::{
    data::{round_to, ReadingRecord, SensorKind},
    traits::Sensor,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::TAU;

/// Metres per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Default start position (Tunis).
pub const DEFAULT_LAT: f64 = 36.8065;
pub const DEFAULT_LON: f64 = 10.1815;

pub const DEFAULT_STEP_MIN_M: f64 = 2.0;
pub const DEFAULT_STEP_MAX_M: f64 = 6.0;

/// Position sensor.
///
/// Every read takes one step of `[step_min, step_max]` metres in a uniformly
/// random heading. Latitude is not clamped to ±90°.
pub struct GpsSensor {
    lat: f64,
    lon: f64,
    step_min: f64,
    step_max: f64,
    rng: StdRng,
}

impl GpsSensor {
    /// Create a sensor seeded from OS entropy.
    pub fn new(lat: f64, lon: f64, step_min: f64, step_max: f64) -> Result<Self> {
        Self::with_rng(lat, lon, step_min, step_max, StdRng::from_entropy())
    }

    /// Create a sensor driven by the given random source.
    pub fn with_rng(
        lat: f64,
        lon: f64,
        step_min: f64,
        step_max: f64,
        rng: StdRng,
    ) -> Result<Self> {
        if !(lat.is_finite() && lon.is_finite()) {
            return Err(SimError::sensor_error(format!(
                "start position must be finite, got ({}, {})",
                lat, lon
            )));
        }
        let valid_steps = step_min.is_finite() && step_max.is_finite();
        if !(valid_steps && 0.0 <= step_min && step_min <= step_max) {
            return Err(SimError::sensor_error(format!(
                "step range must satisfy 0 <= min <= max, got [{}, {}]",
                step_min, step_max
            )));
        }

        Ok(Self {
            lat,
            lon,
            step_min,
            step_max,
            rng,
        })
    }

    /// Sensor starting at the default position with 2–6 m steps.
    pub fn with_defaults() -> Self {
        Self {
            lat: DEFAULT_LAT,
            lon: DEFAULT_LON,
            step_min: DEFAULT_STEP_MIN_M,
            step_max: DEFAULT_STEP_MAX_M,
            rng: StdRng::from_entropy(),
        }
    }

    /// Unrounded internal position.
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    pub fn step_range(&self) -> (f64, f64) {
        (self.step_min, self.step_max)
    }

    fn step(&mut self) {
        let heading = self.rng.gen_range(0.0..TAU);
        let step_m = self.rng.gen_range(self.step_min..=self.step_max);
        let east_m = heading.cos() * step_m;
        let north_m = heading.sin() * step_m;

        let (dlat, dlon) = meters_to_degrees(north_m, east_m, self.lat);
        self.lat += dlat;
        self.lon += dlon;
    }
}

/// Convert a north/east metre offset to degree deltas at `lat`.
///
/// Longitude uses the latitude before the move.
pub fn meters_to_degrees(north_m: f64, east_m: f64, lat: f64) -> (f64, f64) {
    let dlat = north_m / METERS_PER_DEGREE;
    let dlon = east_m / (METERS_PER_DEGREE * lat.to_radians().cos());
    (dlat, dlon)
}

impl Sensor for GpsSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Gps
    }

    fn read(&mut self) -> ReadingRecord {
        self.step();
        ReadingRecord::position(self.name(), round_to(self.lat, 6), round_to(self.lon, 6))
    }
}

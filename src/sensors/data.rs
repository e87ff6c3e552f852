//! Data structures for sensor readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three simulated sensor types, in publish order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Gps,
}

impl SensorKind {
    /// All kinds in the fixed per-cycle order.
    pub const ALL: [SensorKind; 3] = [Self::Temperature, Self::Humidity, Self::Gps];

    /// Identifier carried in the `sensor` field of each record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Gps => "gps",
        }
    }

    /// Dedicated bus topic for this sensor.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Temperature => crate::bus::TEMPERATURE_TOPIC,
            Self::Humidity => crate::bus::HUMIDITY_TOPIC,
            Self::Gps => crate::bus::GPS_TOPIC,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensor-specific numeric payload of a reading.
///
/// Flattened into the record, so a scalar serializes as `"value": ..` and a
/// position as `"lat": .., "lon": ..`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Single measured value (temperature, humidity)
    Scalar { value: f64 },
    /// Geographic position in decimal degrees
    Position { lat: f64, lon: f64 },
}

/// One timestamped sensor observation.
///
/// This is the unit of both the durable log and bus publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Capture instant, serialized as RFC3339 UTC
    pub timestamp: DateTime<Utc>,
    /// Sensor identifier (e.g. "temperature")
    pub sensor: String,
    /// Measured payload
    #[serde(flatten)]
    pub fields: Payload,
    /// Measurement unit, absent for positions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ReadingRecord {
    /// Build a scalar reading stamped with the current time.
    pub fn scalar(sensor: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            sensor: sensor.into(),
            fields: Payload::Scalar { value },
            unit: Some(unit.into()),
        }
    }

    /// Build a position reading stamped with the current time.
    pub fn position(sensor: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            sensor: sensor.into(),
            fields: Payload::Position { lat, lon },
            unit: None,
        }
    }

    /// Scalar value, if this is a scalar reading.
    pub fn value(&self) -> Option<f64> {
        match self.fields {
            Payload::Scalar { value } => Some(value),
            Payload::Position { .. } => None,
        }
    }

    /// `(lat, lon)`, if this is a position reading.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self.fields {
            Payload::Position { lat, lon } => Some((lat, lon)),
            Payload::Scalar { .. } => None,
        }
    }

    /// Serialize to a single-line JSON object.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a record from its JSON form.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Round `value` to `digits` decimal places.
pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

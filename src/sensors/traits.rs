//! Traits for simulated sensors.

use crate::sensors::data::{ReadingRecord, SensorKind};

/// A synthetic sensor producing one reading per call.
///
/// Implementations own their state exclusively; `read` may mutate it (a
/// random walk) but never fails.
pub trait Sensor: Send {
    /// Which sensor this is.
    fn kind(&self) -> SensorKind;

    /// Produce the next reading.
    fn read(&mut self) -> ReadingRecord;

    /// Identifier used in the record's `sensor` field.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Topic the reading is published on.
    fn topic(&self) -> &'static str {
        self.kind().topic()
    }
}

impl<S: Sensor + ?Sized> Sensor for Box<S> {
    fn kind(&self) -> SensorKind {
        (**self).kind()
    }

    fn read(&mut self) -> ReadingRecord {
        (**self).read()
    }
}

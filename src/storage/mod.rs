//! Durable record storage.
//!
//! Records are appended, one JSON object per line, to a file that is opened
//! once, flushed after every record, and closed once at shutdown.

pub mod ndjson;

pub use ndjson::NdjsonLog;

use crate::error::Result;
use crate::sensors::ReadingRecord;

/// Append-only sink for reading records.
pub trait RecordLog: Send {
    /// Append one record and make it durable before returning.
    fn append(&mut self, record: &ReadingRecord) -> Result<()>;

    /// Release the underlying handle. Appends after `close` fail.
    fn close(&mut self) -> Result<()>;
}

/// In-memory log, handy for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Vec<String>,
    closed: bool,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized lines in append order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl RecordLog for MemoryLog {
    fn append(&mut self, record: &ReadingRecord) -> Result<()> {
        if self.closed {
            return Err(crate::SimError::storage_error("log already closed"));
        }
        self.lines.push(record.to_json()?);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

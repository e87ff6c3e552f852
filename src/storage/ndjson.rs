//! Newline-delimited JSON file log.

use crate::error::{Result, SimError};
use crate::sensors::ReadingRecord;
use crate::storage::RecordLog;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed record log in append mode.
pub struct NdjsonLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl NdjsonLog {
    /// Open (creating if needed) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                SimError::storage_error(format!("cannot open {}: {}", path.display(), e))
            })?;
        debug!("Opened record log {}", path.display());

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this handle.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl RecordLog for NdjsonLog {
    fn append(&mut self, record: &ReadingRecord) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SimError::storage_error("log already closed"))?;

        let line = record.to_json()?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.flush()?;
                debug!("Closed record log {} after {} records", self.path.display(), self.written);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for NdjsonLog {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

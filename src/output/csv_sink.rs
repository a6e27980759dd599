//! CSV file record sink

use crate::output::traits::{RecordSink, SinkError, SinkResult};
use crate::state::BusinessRecord;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

/// Appends records to a CSV file, one row per business
///
/// The header row is written only when the file is new or empty, so repeated
/// runs keep extending the same file.
pub struct CsvSink {
    writer: Mutex<csv::Writer<File>>,
}

impl CsvSink {
    pub fn open(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let write_header = file.metadata()?.len() == 0;

        let writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }
}

impl RecordSink for CsvSink {
    fn append(&self, records: &[BusinessRecord]) -> SinkResult<()> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

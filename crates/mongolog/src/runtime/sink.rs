//! Sink — record hand-off and JSON-lines serialization.

use std::io::Write;

use crate::parser::LogRecord;
use super::RunError;

/// Receives each finished record once parsing of its line completes.
pub trait RecordSink {
    fn emit(&mut self, record: &LogRecord) -> Result<(), RunError>;

    fn flush(&mut self) -> Result<(), RunError> {
        Ok(())
    }
}

/// Writes one JSON object per record, newline-terminated.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &LogRecord) -> Result<(), RunError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RunError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects records in memory.
impl RecordSink for Vec<LogRecord> {
    fn emit(&mut self, record: &LogRecord) -> Result<(), RunError> {
        self.push(record.clone());
        Ok(())
    }
}

//! CSV trace backend.
//!
//! Creates `trace.csv` in the configured output directory.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::writer::TraceWriter;
use crate::{OutputResult, TraceRow};

/// File name created by [`CsvTraceWriter::new`].
pub const TRACE_FILE: &str = "trace.csv";

/// Writes trace rows as CSV, one row per sampled port per step.
pub struct CsvTraceWriter<W: Write = File> {
    rows:     Writer<W>,
    finished: bool,
}

impl CsvTraceWriter<File> {
    /// Open (or create) `trace.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Self::from_writer(File::create(dir.join(TRACE_FILE))?)
    }
}

impl<W: Write> CsvTraceWriter<W> {
    /// Write CSV into any sink.  The header row is written immediately.
    pub fn from_writer(sink: W) -> OutputResult<Self> {
        let mut rows = WriterBuilder::new().has_headers(false).from_writer(sink);
        rows.write_record(TraceRow::HEADER)?;
        Ok(Self { rows, finished: false })
    }

    /// Finish and return the sink.
    pub fn into_inner(mut self) -> OutputResult<W> {
        self.finish()?;
        self.rows.into_inner().map_err(|e| e.into_error().into())
    }
}

impl<W: Write> TraceWriter for CsvTraceWriter<W> {
    fn write_rows(&mut self, rows: &[TraceRow]) -> OutputResult<()> {
        for row in rows {
            self.rows.serialize(row)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.rows.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rows.flush()?;
        Ok(())
    }
}

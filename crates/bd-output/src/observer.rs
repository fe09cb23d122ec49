//! `TraceObserver<W>` — bridges `SchemeObserver` to a `TraceWriter`.

use bd_scheme::{Scheme, SchemeObserver};

use crate::row::TraceRow;
use crate::writer::TraceWriter;
use crate::{OutputError, OutputResult};

/// A [`SchemeObserver`] that samples a fixed list of absolute output ports
/// after every `stride`-th step and hands the rows to a [`TraceWriter`].
///
/// Errors from the writer are stored because observer methods have no
/// return value.  Check them with [`take_error`][Self::take_error] once the
/// run is over.  Each `compute` call ends with a flush; call
/// [`finish`][Self::finish] after the last one.
pub struct TraceObserver<W: TraceWriter> {
    writer:     W,
    ports:      Vec<usize>,
    stride:     u64,
    rows:       Vec<TraceRow>,
    last_error: Option<OutputError>,
}

impl<W: TraceWriter> TraceObserver<W> {
    /// Sample `ports` (scheme-wide absolute output numbers) after every step.
    pub fn new(writer: W, ports: Vec<usize>) -> Self {
        Self {
            rows: Vec::with_capacity(ports.len()),
            writer,
            ports,
            stride: 1,
            last_error: None,
        }
    }

    /// Sample only after steps whose count is a multiple of `stride`.
    /// A stride of zero is treated as one.
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Close the writer.
    pub fn finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn sample(&mut self, scheme: &Scheme) -> OutputResult<()> {
        let step = scheme.step_count();
        let time_sec = scheme.time().as_secs();
        self.rows.clear();
        for &port in &self.ports {
            let out = scheme
                .absolute_output(port)
                .ok_or(OutputError::UnknownPort(port))?;
            self.rows.push(TraceRow {
                step,
                time_sec,
                port: port as u32,
                block: out.block.0,
                value: scheme.output_value(out.addr),
            });
        }
        self.writer.write_rows(&self.rows)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: TraceWriter> SchemeObserver for TraceObserver<W> {
    fn on_step_end(&mut self, scheme: &Scheme) {
        if self.last_error.is_some() || scheme.step_count() % self.stride != 0 {
            return;
        }
        let result = self.sample(scheme);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _scheme: &Scheme) {
        let result = self.writer.flush();
        self.store_err(result);
    }
}

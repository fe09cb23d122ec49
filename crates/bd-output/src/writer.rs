//! The `TraceWriter` trait implemented by backend writers.

use crate::{OutputResult, TraceRow};

/// Trait implemented by trace backends.
///
/// The observer never sees a return value; errors are stored and retrieved
/// with [`TraceObserver::take_error`][crate::TraceObserver::take_error].
pub trait TraceWriter {
    /// Append a batch of rows.
    fn write_rows(&mut self, rows: &[TraceRow]) -> OutputResult<()>;

    /// Push buffered rows to the underlying file without closing it.
    fn flush(&mut self) -> OutputResult<()>;

    /// Flush and close.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

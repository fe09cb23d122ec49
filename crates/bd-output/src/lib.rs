//! `bd-output` — per-step signal traces for block-diagram schemes.
//!
//! | Type               | Role                                                    |
//! |--------------------|---------------------------------------------------------|
//! | [`TraceRow`]       | one sampled output value at one step                    |
//! | [`TraceWriter`]    | backend trait; [`CsvTraceWriter`] writes `trace.csv`    |
//! | [`TraceObserver`]  | `SchemeObserver` sampling chosen absolute output ports  |
//!
//! # Usage
//!
//! ```rust,ignore
//! use bd_output::{CsvTraceWriter, TraceObserver};
//!
//! let writer = CsvTraceWriter::new(Path::new("./output"))?;
//! let mut obs = TraceObserver::new(writer, vec![1, 2]);
//! scheme.compute_observed(1000, &mut obs)?;
//! obs.finish();
//! if let Some(e) = obs.take_error() { eprintln!("trace error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvTraceWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TraceObserver;
pub use row::TraceRow;
pub use writer::TraceWriter;

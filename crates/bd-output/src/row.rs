//! Plain data rows written by trace backends.

use serde::Serialize;

/// One output value sampled after one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceRow {
    pub step:     u64,
    pub time_sec: f64,
    /// Scheme-wide absolute output number.
    pub port:     u32,
    /// Block owning the output.
    pub block:    u32,
    pub value:    f64,
}

impl TraceRow {
    /// Column names in serialization order.
    pub const HEADER: [&'static str; 5] = ["step", "time_sec", "port", "block", "value"];
}

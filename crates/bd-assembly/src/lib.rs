//! `bd-assembly` — the binary assembly stream.
//!
//! A host describes a whole diagram as one byte buffer: a run of blocks, each
//! a kind tag followed by its parameters, then a table of block links.  This
//! crate turns such a buffer into [`Assembly`] (plain [`BlockSpec`] values
//! and [`BlockLink`]s) and writes buffers back out.
//!
//! # Stream format
//!
//! All multi-byte values are little-endian.  The block count is supplied by
//! the caller alongside the buffer and is not part of the stream.
//!
//! ```text
//! block*count   := u8 kind_tag, payload
//! link_table    := u32 link_count, (u32 producer, u32 producer_port,
//!                                   u32 consumer, u32 consumer_port)*link_count
//! ```
//!
//! | Kind (tag)                          | Payload                                       |
//! |-------------------------------------|-----------------------------------------------|
//! | DelayOn (1), DelayOff (2)           | `u8 mode`, static: `f64 delay_s`              |
//! | DelayOnOff (3)                      | `u8 mode`, static: `f64 on_s`, `f64 off_s`    |
//! | Integrator (4)                      | `f64 k`, `f64 y0`                             |
//! | Inertial (5), InertialDifferential (6) | `f64 k`, `f64 t`, `f64 y0`                 |
//! | Oscillatory (7)                     | `f64 k`, `f64 t`, `f64 b`, `f64 y0`, `f64 dy0`|
//! | StepDelay (8)                       | `f64 y0`                                      |
//! | PiecewiseLinear (9)                 | `u16 n`, `f64 x * n`, `f64 y * n`, `u8 extrapolate` |
//! | Or, And, Xor (10-12)                | `u16 inputs`, `u8 inverted`                   |
//! | Not, comparisons (13-19)            | none                                          |
//! | Saturation (20)                     | `f64 x1`, `f64 x2`, `f64 y1`, `f64 y2`        |
//! | Deadband (21)                       | `f64 x1`, `f64 x2`, `f64 k`                   |
//! | SaturationDeadband (22)             | `f64 x1`, `f64 x2`, `f64 y1`, `f64 y2`, `f64 db_x1`, `f64 db_x2` |
//! | Hysteresis (23)                     | `u8 mode`, static: `f64 x1`, `f64 x2`; then `f64 y1`, `f64 y2`, `u8 start_high` |
//! | HysteresisDeadband (24)             | `f64 x1`, `f64 x2`, `f64 y1`, `f64 y2`, `f64 db_x1`, `f64 db_x2`, `i8 start` |
//! | LowThreshold, HighThreshold (25, 26)| `f64 level`, `f64 delta`                      |
//! | VariableHysteresis (27-29)          | none                                          |
//! | Summator (30)                       | `u16 n`, `f64 coeff * n`                      |
//! | Multiplier (31)                     | `u16 inputs`                                  |
//! | Divider (32)                        | `f64 value_if_zero`                           |
//! | Abs, Negate, Sign, edge pulses (33-38) | none                                       |
//! | Pulse, ShortPulse, LongPulse (39-41)| `u8 mode`, static: `f64 width_s`              |
//! | DebounceOn/Off/OnOff (42-44)        | `f64 hold_s`                                  |
//! | ExtInSignal (45)                    | `f64 initial`                                 |
//! | ExtOutSignal (46), IntOutSignal (48)| none                                          |
//! | IntInSignal (47)                    | `f64 initial`, `u16 source_block`             |
//! | Plot (49)                           | `u8 inputs`                                   |
//! | Constant (50)                       | `f64 value`                                   |
//! | Step (51)                           | `f64 at_s`, `f64 value`, `f64 initial`        |
//! | LinearSource (52)                   | `f64 k`, `f64 b`                              |
//! | SinusSource (53)                    | `f64 amplitude`, `f64 omega`, `f64 phase`     |
//! | ToggleSwitch (54)                   | none                                          |
//! | RsTrigger, SrTrigger (55, 56)       | `u8 initial`                                  |
//! | TTrigger, RtsTrigger, StrTrigger (57-59) | `u8 type`, `u8 initial`                  |
//!
//! Mode bytes: `0` is the static variant with its parameters inline, `1`
//! the dynamic variant, which takes those parameters from extra inputs.
//! Anything else is rejected.  Trigger types are `0..=3` or the letters
//! `r`, `f`, `b`, `l` (rising, falling, both, level).
//!
//! Decoding is strict: every read is bounds-checked, unknown tags and
//! trailing bytes are errors.  Parameter validation (e.g. a zero time
//! constant) happens later, when the host builds the blocks.

pub mod decoder;
pub mod error;
pub mod writer;

#[cfg(test)]
mod tests;

pub use decoder::decode;
pub use error::{AssemblyError, AssemblyResult};
pub use writer::{encode, AssemblyWriter};

use bd_blocks::BlockSpec;
use bd_core::BlockLink;

/// A decoded diagram: blocks in stream order and links whose block indices
/// refer to positions in `blocks`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub blocks: Vec<BlockSpec>,
    pub links:  Vec<BlockLink>,
}

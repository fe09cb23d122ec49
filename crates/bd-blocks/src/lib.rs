//! `bd-blocks` — the block catalog.
//!
//! Every block here works on real-valued ports; logical blocks treat zero as
//! false and write exactly 0 or 1.
//!
//! | Module          | Blocks                                                         |
//! |-----------------|----------------------------------------------------------------|
//! | [`sources`]     | `Constant`, `Step`, `LinearSource`, `SinusSource`              |
//! | [`operators`]   | `Summator`, `Multiplier`, `Divider`, `Unary` (abs/negate/sign) |
//! | [`logical`]     | `Gate` (or/and/xor, optionally inverted), `Not`, `Compare`     |
//! | [`dynamic`]     | `Integrator`, `Inertial`, `InertialDifferential`, `Oscillatory`, `StepDelay` |
//! | [`nonlinear`]   | `Saturation`, `Deadband`, `SaturationDeadband`, `Hysteresis`, `HysteresisDeadband`, `VariableHysteresis`, `Threshold`, `PiecewiseLinear` |
//! | [`timing`]      | `Delay` (on/off/both), `Debounce`, `Pulse` (single/short/long), `EdgePulse` |
//! | [`triggers`]    | `Latch` (RS/SR), `ToggleTrigger` (T/RTS/STR), `ToggleSwitch`   |
//! | [`signals`]     | `ExtInSignal`, `ExtOutSignal`, `IntInSignal`, `IntOutSignal`, `Plot` |
//!
//! [`BlockSpec`] names a kind with its parameters and builds the block;
//! [`BlockKind`] is the stable one-byte tag used on the wire.

pub mod dynamic;
pub mod kind;
pub mod logical;
pub mod nonlinear;
pub mod operators;
pub mod signals;
pub mod sources;
pub mod spec;
pub mod timing;
pub mod triggers;


pub use kind::BlockKind;
pub use logical::{CompareOp, GateOp};
pub use spec::{BlockSpec, MAX_PARAM_SECS};
pub use triggers::ToggleEdge;

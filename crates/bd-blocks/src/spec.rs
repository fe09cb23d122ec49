//! `BlockSpec` — a block kind plus its construction parameters.
//!
//! This is the value the assembly decoder produces and the host `add*`
//! builders create.  [`BlockSpec::build`] validates the parameters and
//! returns the runnable block.

use bd_block::Block;
use bd_core::{ConfigError, ConfigResult, SimTime, TICKS_PER_SEC};

use crate::dynamic::{Inertial, InertialDifferential, Integrator, Oscillatory, StepDelay};
use crate::logical::{Compare, CompareOp, Gate, GateOp, Not};
use crate::nonlinear::{
    Bias, Bounds, Deadband, Hysteresis, HysteresisDeadband, PiecewiseLinear, Saturation,
    SaturationDeadband, Threshold, ThresholdSide, VariableHysteresis,
};
use crate::operators::{Divider, Multiplier, Summator, Unary, UnaryOp};
use crate::signals::{ExtInSignal, ExtOutSignal, IntInSignal, IntOutSignal, Plot};
use crate::sources::{Constant, LinearSource, SinusSource, Step};
use crate::timing::{Debounce, Delay, Edge, EdgePulse, Hold, Pulse, PulseShape};
use crate::triggers::{Latch, Priority, ToggleEdge, ToggleSwitch, ToggleTrigger};
use crate::BlockKind;

/// Construction parameters of one block.  Times are in seconds.
///
/// `*Dynamic` variants share a kind tag with their static form and read the
/// parameter named in their doc from extra real inputs instead.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockSpec {
    // sources
    Constant { value: f64 },
    Step { at: f64, value: f64, initial: f64 },
    LinearSource { k: f64, b: f64 },
    SinusSource { amplitude: f64, omega: f64, phase: f64 },

    // operators
    Summator { coeffs: Vec<f64> },
    Multiplier { inputs: u16 },
    Divider { value_if_zero: f64 },
    AbsoluteValue,
    Negate,
    Sign,

    // logic
    Gate { op: GateOp, inputs: u16, inverted: bool },
    Not,
    Compare(CompareOp),

    // dynamics
    Integrator { k: f64, y0: f64 },
    Inertial { k: f64, t: f64, y0: f64 },
    InertialDifferential { k: f64, t: f64, y0: f64 },
    Oscillatory { k: f64, t: f64, b: f64, y0: f64, dy0: f64 },
    StepDelay { y0: f64 },

    // nonlinear
    PiecewiseLinear { xs: Vec<f64>, ys: Vec<f64>, extrapolate: bool },
    Saturation { x1: f64, x2: f64, y1: f64, y2: f64 },
    Deadband { x1: f64, x2: f64, k: f64 },
    SaturationDeadband { x1: f64, x2: f64, y1: f64, y2: f64, db_x1: f64, db_x2: f64 },
    Hysteresis { x1: f64, x2: f64, y1: f64, y2: f64, start_high: bool },
    /// Switching points on inputs 1 and 2.
    HysteresisDynamic { y1: f64, y2: f64, start_high: bool },
    /// `start`: `1` starts at `y2`, `-1` at `y1`, anything else at zero.
    HysteresisDeadband { x1: f64, x2: f64, y1: f64, y2: f64, db_x1: f64, db_x2: f64, start: i8 },
    LowThreshold { level: f64, delta: f64 },
    HighThreshold { level: f64, delta: f64 },
    VariableHysteresis,
    VariableHysteresisPlus,
    VariableHysteresisMinus,

    // timing
    DelayOn { delay: f64 },
    DelayOff { delay: f64 },
    DelayOnOff { on: f64, off: f64 },
    /// Delay on input 1.
    DelayOnDynamic,
    /// Delay on input 1.
    DelayOffDynamic,
    /// Turn-on delay on input 1, turn-off delay on input 2.
    DelayOnOffDynamic,
    RisingPulse,
    FallingPulse,
    ChangePulse,
    Pulse { width: f64 },
    ShortPulse { width: f64 },
    LongPulse { width: f64 },
    /// Width on input 1.
    PulseDynamic,
    /// Width on input 1.
    ShortPulseDynamic,
    /// Width on input 1.
    LongPulseDynamic,
    DebounceOn { hold: f64 },
    DebounceOff { hold: f64 },
    DebounceOnOff { hold: f64 },

    // triggers and switches
    RsTrigger { initial: bool },
    SrTrigger { initial: bool },
    TTrigger { edge: ToggleEdge, initial: bool },
    RtsTrigger { edge: ToggleEdge, initial: bool },
    StrTrigger { edge: ToggleEdge, initial: bool },
    ToggleSwitch,

    // signals
    ExtInSignal { initial: f64 },
    ExtOutSignal,
    /// Reads the first real output of block `source`.
    IntInSignal { initial: f64, source: u32 },
    IntOutSignal,
    Plot { inputs: u8 },
}

impl BlockSpec {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockSpec::Constant { .. } => BlockKind::Constant,
            BlockSpec::Step { .. } => BlockKind::Step,
            BlockSpec::LinearSource { .. } => BlockKind::LinearSource,
            BlockSpec::SinusSource { .. } => BlockKind::SinusSource,
            BlockSpec::Summator { .. } => BlockKind::Summator,
            BlockSpec::Multiplier { .. } => BlockKind::Multiplier,
            BlockSpec::Divider { .. } => BlockKind::Divider,
            BlockSpec::AbsoluteValue => BlockKind::AbsoluteValue,
            BlockSpec::Negate => BlockKind::Negate,
            BlockSpec::Sign => BlockKind::Sign,
            BlockSpec::Gate { op: GateOp::Or, .. } => BlockKind::Or,
            BlockSpec::Gate { op: GateOp::And, .. } => BlockKind::And,
            BlockSpec::Gate { op: GateOp::Xor, .. } => BlockKind::Xor,
            BlockSpec::Not => BlockKind::Not,
            BlockSpec::Compare(op) => match op {
                CompareOp::Equal => BlockKind::Equal,
                CompareOp::NotEqual => BlockKind::NotEqual,
                CompareOp::Less => BlockKind::Less,
                CompareOp::Greater => BlockKind::Greater,
                CompareOp::LessOrEqual => BlockKind::LessOrEqual,
                CompareOp::GreaterOrEqual => BlockKind::GreaterOrEqual,
            },
            BlockSpec::Integrator { .. } => BlockKind::Integrator,
            BlockSpec::Inertial { .. } => BlockKind::Inertial,
            BlockSpec::InertialDifferential { .. } => BlockKind::InertialDifferential,
            BlockSpec::Oscillatory { .. } => BlockKind::Oscillatory,
            BlockSpec::StepDelay { .. } => BlockKind::StepDelay,
            BlockSpec::PiecewiseLinear { .. } => BlockKind::PiecewiseLinear,
            BlockSpec::Saturation { .. } => BlockKind::Saturation,
            BlockSpec::Deadband { .. } => BlockKind::Deadband,
            BlockSpec::SaturationDeadband { .. } => BlockKind::SaturationDeadband,
            BlockSpec::Hysteresis { .. } | BlockSpec::HysteresisDynamic { .. } => BlockKind::Hysteresis,
            BlockSpec::HysteresisDeadband { .. } => BlockKind::HysteresisDeadband,
            BlockSpec::LowThreshold { .. } => BlockKind::LowThreshold,
            BlockSpec::HighThreshold { .. } => BlockKind::HighThreshold,
            BlockSpec::VariableHysteresis => BlockKind::VariableHysteresis,
            BlockSpec::VariableHysteresisPlus => BlockKind::VariableHysteresisPlus,
            BlockSpec::VariableHysteresisMinus => BlockKind::VariableHysteresisMinus,
            BlockSpec::DelayOn { .. } | BlockSpec::DelayOnDynamic => BlockKind::DelayOn,
            BlockSpec::DelayOff { .. } | BlockSpec::DelayOffDynamic => BlockKind::DelayOff,
            BlockSpec::DelayOnOff { .. } | BlockSpec::DelayOnOffDynamic => BlockKind::DelayOnOff,
            BlockSpec::RisingPulse => BlockKind::RisingPulse,
            BlockSpec::FallingPulse => BlockKind::FallingPulse,
            BlockSpec::ChangePulse => BlockKind::ChangePulse,
            BlockSpec::Pulse { .. } | BlockSpec::PulseDynamic => BlockKind::Pulse,
            BlockSpec::ShortPulse { .. } | BlockSpec::ShortPulseDynamic => BlockKind::ShortPulse,
            BlockSpec::LongPulse { .. } | BlockSpec::LongPulseDynamic => BlockKind::LongPulse,
            BlockSpec::DebounceOn { .. } => BlockKind::DebounceOn,
            BlockSpec::DebounceOff { .. } => BlockKind::DebounceOff,
            BlockSpec::DebounceOnOff { .. } => BlockKind::DebounceOnOff,
            BlockSpec::RsTrigger { .. } => BlockKind::RsTrigger,
            BlockSpec::SrTrigger { .. } => BlockKind::SrTrigger,
            BlockSpec::TTrigger { .. } => BlockKind::TTrigger,
            BlockSpec::RtsTrigger { .. } => BlockKind::RtsTrigger,
            BlockSpec::StrTrigger { .. } => BlockKind::StrTrigger,
            BlockSpec::ToggleSwitch => BlockKind::ToggleSwitch,
            BlockSpec::ExtInSignal { .. } => BlockKind::ExtInSignal,
            BlockSpec::ExtOutSignal => BlockKind::ExtOutSignal,
            BlockSpec::IntInSignal { .. } => BlockKind::IntInSignal,
            BlockSpec::IntOutSignal => BlockKind::IntOutSignal,
            BlockSpec::Plot { .. } => BlockKind::Plot,
        }
    }

    /// `true` for the variants that read a parameter from an input.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            BlockSpec::HysteresisDynamic { .. }
                | BlockSpec::DelayOnDynamic
                | BlockSpec::DelayOffDynamic
                | BlockSpec::DelayOnOffDynamic
                | BlockSpec::PulseDynamic
                | BlockSpec::ShortPulseDynamic
                | BlockSpec::LongPulseDynamic
        )
    }

    /// Validate parameters and construct the block.
    pub fn build(&self) -> ConfigResult<Box<dyn Block>> {
        let kind = self.kind().name();
        let invalid = |reason: String| ConfigError::InvalidParameters { kind, reason };
        let hold = |secs: f64, what: &str| {
            micros(secs)
                .map(Hold::Fixed)
                .ok_or_else(|| invalid(format!("{what} {secs} s is negative or out of range")))
        };

        let block: Box<dyn Block> = match self {
            BlockSpec::Constant { value } => Box::new(Constant { value: *value }),
            BlockSpec::Step { at, value, initial } => Box::new(Step {
                at: SimTime(
                    micros(*at)
                        .ok_or_else(|| invalid(format!("step time {at} s is negative or out of range")))?,
                ),
                value: *value,
                initial: *initial,
            }),
            BlockSpec::LinearSource { k, b } => Box::new(LinearSource { k: *k, b: *b }),
            BlockSpec::SinusSource { amplitude, omega, phase } => Box::new(SinusSource {
                amplitude: *amplitude,
                omega: *omega,
                phase: *phase,
            }),

            BlockSpec::Summator { coeffs } => {
                if coeffs.is_empty() {
                    return Err(invalid("needs at least one coefficient".into()));
                }
                Box::new(Summator { coeffs: coeffs.clone() })
            }
            BlockSpec::Multiplier { inputs } => {
                Box::new(Multiplier { inputs: at_least_one(*inputs).map_err(invalid)? })
            }
            BlockSpec::Divider { value_if_zero } => {
                Box::new(Divider { value_if_zero: *value_if_zero })
            }
            BlockSpec::AbsoluteValue => Box::new(Unary { op: UnaryOp::Abs }),
            BlockSpec::Negate => Box::new(Unary { op: UnaryOp::Negate }),
            BlockSpec::Sign => Box::new(Unary { op: UnaryOp::Sign }),

            BlockSpec::Gate { op, inputs, inverted } => Box::new(Gate {
                op: *op,
                inputs: at_least_one(*inputs).map_err(invalid)?,
                inverted: *inverted,
            }),
            BlockSpec::Not => Box::new(Not),
            BlockSpec::Compare(op) => Box::new(Compare { op: *op }),

            BlockSpec::Integrator { k, y0 } => Box::new(Integrator { k: *k, y0: *y0 }),
            BlockSpec::Inertial { k, t, y0 } => {
                time_constant(*t).map_err(invalid)?;
                Box::new(Inertial { k: *k, t: *t, y0: *y0 })
            }
            BlockSpec::InertialDifferential { k, t, y0 } => {
                time_constant(*t).map_err(invalid)?;
                Box::new(InertialDifferential::new(*k, *t, *y0))
            }
            BlockSpec::Oscillatory { k, t, b, y0, dy0 } => {
                time_constant(*t).map_err(invalid)?;
                Box::new(Oscillatory::new(*k, *t, *b, *y0, *dy0))
            }
            BlockSpec::StepDelay { y0 } => Box::new(StepDelay::new(*y0)),

            BlockSpec::PiecewiseLinear { xs, ys, extrapolate } => {
                breakpoints(xs, ys).map_err(invalid)?;
                Box::new(PiecewiseLinear {
                    xs: xs.clone(),
                    ys: ys.clone(),
                    extrapolate: *extrapolate,
                })
            }
            BlockSpec::Saturation { x1, x2, y1, y2 } => {
                ordered(*x1, *x2, true).map_err(invalid)?;
                Box::new(Saturation::new(*x1, *x2, *y1, *y2))
            }
            BlockSpec::Deadband { x1, x2, k } => {
                ordered(*x1, *x2, false).map_err(invalid)?;
                Box::new(Deadband { x1: *x1, x2: *x2, k: *k })
            }
            BlockSpec::SaturationDeadband { x1, x2, y1, y2, db_x1, db_x2 } => {
                ordered(*x1, *db_x1, true).map_err(invalid)?;
                ordered(*db_x1, *db_x2, false).map_err(invalid)?;
                ordered(*db_x2, *x2, true).map_err(invalid)?;
                Box::new(SaturationDeadband::new(*x1, *x2, *y1, *y2, *db_x1, *db_x2))
            }
            BlockSpec::Hysteresis { x1, x2, y1, y2, start_high } => {
                ordered(*x1, *x2, false).map_err(invalid)?;
                Box::new(Hysteresis {
                    bounds:     Bounds::Fixed { x1: *x1, x2: *x2 },
                    y1:         *y1,
                    y2:         *y2,
                    start_high: *start_high,
                })
            }
            BlockSpec::HysteresisDynamic { y1, y2, start_high } => Box::new(Hysteresis {
                bounds:     Bounds::Inputs,
                y1:         *y1,
                y2:         *y2,
                start_high: *start_high,
            }),
            BlockSpec::HysteresisDeadband { x1, x2, y1, y2, db_x1, db_x2, start } => {
                ordered(*x1, *db_x1, false).map_err(invalid)?;
                ordered(*db_x2, *x2, false).map_err(invalid)?;
                Box::new(HysteresisDeadband {
                    x1:    *x1,
                    x2:    *x2,
                    y1:    *y1,
                    y2:    *y2,
                    db_x1: *db_x1,
                    db_x2: *db_x2,
                    start: *start,
                })
            }
            BlockSpec::LowThreshold { level, delta } | BlockSpec::HighThreshold { level, delta } => {
                if !(*delta >= 0.0) {
                    return Err(invalid(format!("return band {delta} must be non-negative")));
                }
                let side = if matches!(self, BlockSpec::LowThreshold { .. }) {
                    ThresholdSide::Low
                } else {
                    ThresholdSide::High
                };
                Box::new(Threshold { side, level: *level, delta: *delta })
            }
            BlockSpec::VariableHysteresis => Box::new(VariableHysteresis::new(Bias::Centered)),
            BlockSpec::VariableHysteresisPlus => Box::new(VariableHysteresis::new(Bias::Plus)),
            BlockSpec::VariableHysteresisMinus => Box::new(VariableHysteresis::new(Bias::Minus)),

            BlockSpec::DelayOn { delay } => Box::new(Delay::on(hold(*delay, "delay")?)),
            BlockSpec::DelayOff { delay } => Box::new(Delay::off(hold(*delay, "delay")?)),
            BlockSpec::DelayOnOff { on, off } => {
                Box::new(Delay::on_off(hold(*on, "turn-on delay")?, hold(*off, "turn-off delay")?))
            }
            BlockSpec::DelayOnDynamic => Box::new(Delay::on(Hold::Input(1))),
            BlockSpec::DelayOffDynamic => Box::new(Delay::off(Hold::Input(1))),
            BlockSpec::DelayOnOffDynamic => Box::new(Delay::on_off(Hold::Input(1), Hold::Input(2))),
            BlockSpec::RisingPulse => Box::new(EdgePulse::new(Edge::Rising)),
            BlockSpec::FallingPulse => Box::new(EdgePulse::new(Edge::Falling)),
            BlockSpec::ChangePulse => Box::new(EdgePulse::new(Edge::Change)),
            BlockSpec::Pulse { width } => {
                Box::new(Pulse::new(PulseShape::Single, hold(*width, "pulse width")?))
            }
            BlockSpec::ShortPulse { width } => {
                Box::new(Pulse::new(PulseShape::Short, hold(*width, "pulse width")?))
            }
            BlockSpec::LongPulse { width } => {
                Box::new(Pulse::new(PulseShape::Long, hold(*width, "pulse width")?))
            }
            BlockSpec::PulseDynamic => Box::new(Pulse::new(PulseShape::Single, Hold::Input(1))),
            BlockSpec::ShortPulseDynamic => Box::new(Pulse::new(PulseShape::Short, Hold::Input(1))),
            BlockSpec::LongPulseDynamic => Box::new(Pulse::new(PulseShape::Long, Hold::Input(1))),
            BlockSpec::DebounceOn { hold: secs }
            | BlockSpec::DebounceOff { hold: secs }
            | BlockSpec::DebounceOnOff { hold: secs } => {
                let ticks = micros(*secs)
                    .ok_or_else(|| invalid(format!("hold {secs} s is negative or out of range")))?;
                Box::new(match self {
                    BlockSpec::DebounceOn { .. } => Debounce::on(ticks),
                    BlockSpec::DebounceOff { .. } => Debounce::off(ticks),
                    _ => Debounce::on_off(ticks),
                })
            }

            BlockSpec::RsTrigger { initial } => Box::new(Latch {
                priority: Priority::Reset,
                initial: *initial,
            }),
            BlockSpec::SrTrigger { initial } => Box::new(Latch {
                priority: Priority::Set,
                initial: *initial,
            }),
            BlockSpec::TTrigger { edge, initial } => {
                Box::new(ToggleTrigger::new(*edge, None, *initial))
            }
            BlockSpec::RtsTrigger { edge, initial } => {
                Box::new(ToggleTrigger::new(*edge, Some(Priority::Reset), *initial))
            }
            BlockSpec::StrTrigger { edge, initial } => {
                Box::new(ToggleTrigger::new(*edge, Some(Priority::Set), *initial))
            }
            BlockSpec::ToggleSwitch => Box::new(ToggleSwitch),

            BlockSpec::ExtInSignal { initial } => Box::new(ExtInSignal { initial: *initial }),
            BlockSpec::ExtOutSignal => Box::new(ExtOutSignal),
            BlockSpec::IntInSignal { initial, source } => {
                Box::new(IntInSignal { initial: *initial, source: *source })
            }
            BlockSpec::IntOutSignal => Box::new(IntOutSignal),
            BlockSpec::Plot { inputs } => Box::new(Plot { inputs: *inputs }),
        };
        Ok(block)
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

/// Longest accepted time parameter, about 142 years.  Keeps every
/// converted value exact and far from the end of [`SimTime`].
pub const MAX_PARAM_SECS: f64 = (1u64 << 52) as f64 / TICKS_PER_SEC as f64;

/// Seconds in `0..=MAX_PARAM_SECS` to whole microseconds.
fn micros(secs: f64) -> Option<u64> {
    (secs >= 0.0 && secs <= MAX_PARAM_SECS).then(|| (secs * TICKS_PER_SEC as f64).round() as u64)
}

fn at_least_one(n: u16) -> Result<usize, String> {
    if n == 0 {
        Err("needs at least one input".to_string())
    } else {
        Ok(n as usize)
    }
}

fn time_constant(t: f64) -> Result<(), String> {
    if t.is_finite() && t > 0.0 {
        Ok(())
    } else {
        Err(format!("time constant {t} must be positive"))
    }
}

fn ordered(x1: f64, x2: f64, strict: bool) -> Result<(), String> {
    let ok = if strict { x1 < x2 } else { x1 <= x2 };
    if ok {
        Ok(())
    } else {
        Err(format!("bounds {x1}..{x2} are not increasing"))
    }
}

fn breakpoints(xs: &[f64], ys: &[f64]) -> Result<(), String> {
    if xs.len() != ys.len() {
        return Err(format!("{} abscissas but {} ordinates", xs.len(), ys.len()));
    }
    if xs.len() < 2 {
        return Err("needs at least two breakpoints".to_string());
    }
    if !xs.windows(2).all(|w| w[0] < w[1]) {
        return Err("abscissas must be strictly increasing".to_string());
    }
    Ok(())
}

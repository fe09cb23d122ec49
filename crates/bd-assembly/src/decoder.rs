//! Strict stream decoder.

use bd_blocks::{BlockKind, BlockSpec, CompareOp, GateOp, ToggleEdge};
use bd_core::BlockLink;
use tracing::{debug, warn};

use crate::{Assembly, AssemblyError, AssemblyResult};

// ── Cursor ────────────────────────────────────────────────────────────────────

struct Cursor<'a> {
    bytes: &'a [u8],
    pos:   usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self, what: &'static str) -> AssemblyResult<[u8; N]> {
        let remaining = self.bytes.len() - self.pos;
        if remaining < N {
            return Err(AssemblyError::Truncated { offset: self.pos, needed: N - remaining, what });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn u8(&mut self, what: &'static str) -> AssemblyResult<u8> {
        Ok(self.take::<1>(what)?[0])
    }

    fn flag(&mut self, what: &'static str) -> AssemblyResult<bool> {
        Ok(self.u8(what)? != 0)
    }

    fn u16(&mut self, what: &'static str) -> AssemblyResult<u16> {
        Ok(u16::from_le_bytes(self.take(what)?))
    }

    fn u32(&mut self, what: &'static str) -> AssemblyResult<u32> {
        Ok(u32::from_le_bytes(self.take(what)?))
    }

    fn f64(&mut self, what: &'static str) -> AssemblyResult<f64> {
        Ok(f64::from_le_bytes(self.take(what)?))
    }

    fn reals(&mut self, n: usize, what: &'static str) -> AssemblyResult<Vec<f64>> {
        (0..n).map(|_| self.f64(what)).collect()
    }

    /// Mode byte: `0` static, `1` dynamic.  Returns `true` for dynamic.
    fn mode(&mut self, kind: BlockKind) -> AssemblyResult<bool> {
        let offset = self.pos;
        match self.u8("mode")? {
            0 => Ok(false),
            1 => Ok(true),
            mode => {
                warn!(%kind, mode, offset, "unsupported block mode");
                Err(AssemblyError::UnsupportedMode { kind, mode, offset })
            }
        }
    }

    /// T-trigger edge code followed by the initial state.
    fn toggle(&mut self, kind: BlockKind) -> AssemblyResult<(ToggleEdge, bool)> {
        let offset = self.pos;
        let code = self.u8("trigger type")?;
        let Some(edge) = ToggleEdge::from_code(code) else {
            warn!(%kind, code, offset, "unknown trigger type");
            return Err(AssemblyError::UnsupportedMode { kind, mode: code, offset });
        };
        Ok((edge, self.flag("initial")?))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decode `count` blocks followed by the link table.
///
/// The whole buffer must be consumed; links are not range-checked here
/// (the host binds them against the blocks it actually holds).
pub fn decode(count: usize, bytes: &[u8]) -> AssemblyResult<Assembly> {
    let mut cur = Cursor::new(bytes);

    let mut blocks = Vec::with_capacity(count);
    for index in 0..count {
        blocks.push(block(&mut cur, index)?);
    }

    let link_count = cur.u32("link count")? as usize;
    // Cap the pre-allocation by what the buffer could possibly hold.
    let mut links = Vec::with_capacity(link_count.min((bytes.len() - cur.pos) / 16));
    for _ in 0..link_count {
        links.push(BlockLink {
            producer:      cur.u32("link producer")?,
            producer_port: cur.u32("link producer port")?,
            consumer:      cur.u32("link consumer")?,
            consumer_port: cur.u32("link consumer port")?,
        });
    }

    if cur.pos != bytes.len() {
        return Err(AssemblyError::TrailingBytes {
            offset:    cur.pos,
            remaining: bytes.len() - cur.pos,
        });
    }

    debug!(blocks = blocks.len(), links = links.len(), bytes = bytes.len(), "assembly decoded");
    Ok(Assembly { blocks, links })
}

fn block(cur: &mut Cursor<'_>, index: usize) -> AssemblyResult<BlockSpec> {
    let offset = cur.pos;
    let tag = cur.u8("kind tag")?;
    let Some(kind) = BlockKind::from_tag(tag) else {
        warn!(tag, index, offset, "unknown block kind in assembly stream");
        return Err(AssemblyError::UnknownBlockKind { tag, index, offset });
    };

    let spec = match kind {
        BlockKind::DelayOn => match cur.mode(kind)? {
            true => BlockSpec::DelayOnDynamic,
            false => BlockSpec::DelayOn { delay: cur.f64("delay")? },
        },
        BlockKind::DelayOff => match cur.mode(kind)? {
            true => BlockSpec::DelayOffDynamic,
            false => BlockSpec::DelayOff { delay: cur.f64("delay")? },
        },
        BlockKind::DelayOnOff => match cur.mode(kind)? {
            true => BlockSpec::DelayOnOffDynamic,
            false => BlockSpec::DelayOnOff { on: cur.f64("turn-on delay")?, off: cur.f64("turn-off delay")? },
        },
        BlockKind::Integrator => BlockSpec::Integrator { k: cur.f64("k")?, y0: cur.f64("y0")? },
        BlockKind::Inertial => {
            BlockSpec::Inertial { k: cur.f64("k")?, t: cur.f64("t")?, y0: cur.f64("y0")? }
        }
        BlockKind::InertialDifferential => BlockSpec::InertialDifferential {
            k:  cur.f64("k")?,
            t:  cur.f64("t")?,
            y0: cur.f64("y0")?,
        },
        BlockKind::Oscillatory => BlockSpec::Oscillatory {
            k:   cur.f64("k")?,
            t:   cur.f64("t")?,
            b:   cur.f64("b")?,
            y0:  cur.f64("y0")?,
            dy0: cur.f64("dy0")?,
        },
        BlockKind::StepDelay => BlockSpec::StepDelay { y0: cur.f64("y0")? },
        BlockKind::PiecewiseLinear => {
            let n = cur.u16("breakpoint count")? as usize;
            let xs = cur.reals(n, "breakpoint x")?;
            let ys = cur.reals(n, "breakpoint y")?;
            BlockSpec::PiecewiseLinear { xs, ys, extrapolate: cur.flag("extrapolate")? }
        }
        BlockKind::Or | BlockKind::And | BlockKind::Xor => {
            let op = match kind {
                BlockKind::Or => GateOp::Or,
                BlockKind::And => GateOp::And,
                _ => GateOp::Xor,
            };
            BlockSpec::Gate { op, inputs: cur.u16("input count")?, inverted: cur.flag("inverted")? }
        }
        BlockKind::Not => BlockSpec::Not,
        BlockKind::Equal => BlockSpec::Compare(CompareOp::Equal),
        BlockKind::NotEqual => BlockSpec::Compare(CompareOp::NotEqual),
        BlockKind::Less => BlockSpec::Compare(CompareOp::Less),
        BlockKind::Greater => BlockSpec::Compare(CompareOp::Greater),
        BlockKind::LessOrEqual => BlockSpec::Compare(CompareOp::LessOrEqual),
        BlockKind::GreaterOrEqual => BlockSpec::Compare(CompareOp::GreaterOrEqual),
        BlockKind::Saturation => BlockSpec::Saturation {
            x1: cur.f64("x1")?,
            x2: cur.f64("x2")?,
            y1: cur.f64("y1")?,
            y2: cur.f64("y2")?,
        },
        BlockKind::Deadband => {
            BlockSpec::Deadband { x1: cur.f64("x1")?, x2: cur.f64("x2")?, k: cur.f64("k")? }
        }
        BlockKind::SaturationDeadband => BlockSpec::SaturationDeadband {
            x1:    cur.f64("x1")?,
            x2:    cur.f64("x2")?,
            y1:    cur.f64("y1")?,
            y2:    cur.f64("y2")?,
            db_x1: cur.f64("deadband x1")?,
            db_x2: cur.f64("deadband x2")?,
        },
        BlockKind::Hysteresis => match cur.mode(kind)? {
            true => BlockSpec::HysteresisDynamic {
                y1:         cur.f64("y1")?,
                y2:         cur.f64("y2")?,
                start_high: cur.flag("start state")?,
            },
            false => BlockSpec::Hysteresis {
                x1:         cur.f64("x1")?,
                x2:         cur.f64("x2")?,
                y1:         cur.f64("y1")?,
                y2:         cur.f64("y2")?,
                start_high: cur.flag("start state")?,
            },
        },
        BlockKind::HysteresisDeadband => BlockSpec::HysteresisDeadband {
            x1:    cur.f64("x1")?,
            x2:    cur.f64("x2")?,
            y1:    cur.f64("y1")?,
            y2:    cur.f64("y2")?,
            db_x1: cur.f64("deadband x1")?,
            db_x2: cur.f64("deadband x2")?,
            start: cur.u8("start state")? as i8,
        },
        BlockKind::LowThreshold => {
            BlockSpec::LowThreshold { level: cur.f64("level")?, delta: cur.f64("delta")? }
        }
        BlockKind::HighThreshold => {
            BlockSpec::HighThreshold { level: cur.f64("level")?, delta: cur.f64("delta")? }
        }
        BlockKind::VariableHysteresis => BlockSpec::VariableHysteresis,
        BlockKind::VariableHysteresisPlus => BlockSpec::VariableHysteresisPlus,
        BlockKind::VariableHysteresisMinus => BlockSpec::VariableHysteresisMinus,
        BlockKind::Summator => {
            let n = cur.u16("coefficient count")? as usize;
            BlockSpec::Summator { coeffs: cur.reals(n, "coefficient")? }
        }
        BlockKind::Multiplier => BlockSpec::Multiplier { inputs: cur.u16("input count")? },
        BlockKind::Divider => BlockSpec::Divider { value_if_zero: cur.f64("value if zero")? },
        BlockKind::AbsoluteValue => BlockSpec::AbsoluteValue,
        BlockKind::Negate => BlockSpec::Negate,
        BlockKind::Sign => BlockSpec::Sign,
        BlockKind::RisingPulse => BlockSpec::RisingPulse,
        BlockKind::FallingPulse => BlockSpec::FallingPulse,
        BlockKind::ChangePulse => BlockSpec::ChangePulse,
        BlockKind::Pulse => match cur.mode(kind)? {
            true => BlockSpec::PulseDynamic,
            false => BlockSpec::Pulse { width: cur.f64("pulse width")? },
        },
        BlockKind::ShortPulse => match cur.mode(kind)? {
            true => BlockSpec::ShortPulseDynamic,
            false => BlockSpec::ShortPulse { width: cur.f64("pulse width")? },
        },
        BlockKind::LongPulse => match cur.mode(kind)? {
            true => BlockSpec::LongPulseDynamic,
            false => BlockSpec::LongPulse { width: cur.f64("pulse width")? },
        },
        BlockKind::DebounceOn => BlockSpec::DebounceOn { hold: cur.f64("hold")? },
        BlockKind::DebounceOff => BlockSpec::DebounceOff { hold: cur.f64("hold")? },
        BlockKind::DebounceOnOff => BlockSpec::DebounceOnOff { hold: cur.f64("hold")? },
        BlockKind::ExtInSignal => BlockSpec::ExtInSignal { initial: cur.f64("initial")? },
        BlockKind::ExtOutSignal => BlockSpec::ExtOutSignal,
        BlockKind::IntInSignal => BlockSpec::IntInSignal {
            initial: cur.f64("initial")?,
            source:  u32::from(cur.u16("source block")?),
        },
        BlockKind::IntOutSignal => BlockSpec::IntOutSignal,
        BlockKind::Plot => BlockSpec::Plot { inputs: cur.u8("input count")? },
        BlockKind::Constant => BlockSpec::Constant { value: cur.f64("value")? },
        BlockKind::Step => BlockSpec::Step {
            at:      cur.f64("step time")?,
            value:   cur.f64("value")?,
            initial: cur.f64("initial")?,
        },
        BlockKind::LinearSource => BlockSpec::LinearSource { k: cur.f64("k")?, b: cur.f64("b")? },
        BlockKind::SinusSource => BlockSpec::SinusSource {
            amplitude: cur.f64("amplitude")?,
            omega:     cur.f64("omega")?,
            phase:     cur.f64("phase")?,
        },
        BlockKind::ToggleSwitch => BlockSpec::ToggleSwitch,
        BlockKind::RsTrigger => BlockSpec::RsTrigger { initial: cur.flag("initial")? },
        BlockKind::SrTrigger => BlockSpec::SrTrigger { initial: cur.flag("initial")? },
        BlockKind::TTrigger => {
            let (edge, initial) = cur.toggle(kind)?;
            BlockSpec::TTrigger { edge, initial }
        }
        BlockKind::RtsTrigger => {
            let (edge, initial) = cur.toggle(kind)?;
            BlockSpec::RtsTrigger { edge, initial }
        }
        BlockKind::StrTrigger => {
            let (edge, initial) = cur.toggle(kind)?;
            BlockSpec::StrTrigger { edge, initial }
        }
    };
    Ok(spec)
}

//! Stream encoder.  Produces exactly what [`decode`](crate::decode) reads.

use bd_blocks::BlockSpec;
use bd_core::BlockLink;

use crate::Assembly;

const STATIC: u8 = 0;
const DYNAMIC: u8 = 1;

/// Incremental writer.
///
/// ```
/// # use bd_assembly::AssemblyWriter;
/// # use bd_blocks::BlockSpec;
/// # use bd_core::BlockLink;
/// let mut w = AssemblyWriter::new();
/// w.block(&BlockSpec::Constant { value: 1.0 }).block(&BlockSpec::StepDelay { y0: 0.0 });
/// w.link(BlockLink::new(0, 0, 1, 0));
/// let (count, bytes) = w.finish();
/// assert_eq!(count, 2);
/// assert_eq!(bd_assembly::decode(count, &bytes).unwrap().blocks.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct AssemblyWriter {
    buf:    Vec<u8>,
    blocks: usize,
    links:  Vec<BlockLink>,
}

impl AssemblyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&mut self, spec: &BlockSpec) -> &mut Self {
        self.u8(spec.kind().tag());
        match spec {
            BlockSpec::DelayOn { delay } | BlockSpec::DelayOff { delay } => {
                self.u8(STATIC);
                self.f64(*delay);
            }
            BlockSpec::DelayOnOff { on, off } => {
                self.u8(STATIC);
                self.reals(&[*on, *off]);
            }
            BlockSpec::Pulse { width } | BlockSpec::ShortPulse { width } | BlockSpec::LongPulse { width } => {
                self.u8(STATIC);
                self.f64(*width);
            }
            BlockSpec::DelayOnDynamic
            | BlockSpec::DelayOffDynamic
            | BlockSpec::DelayOnOffDynamic
            | BlockSpec::PulseDynamic
            | BlockSpec::ShortPulseDynamic
            | BlockSpec::LongPulseDynamic => self.u8(DYNAMIC),
            BlockSpec::DebounceOn { hold } | BlockSpec::DebounceOff { hold } | BlockSpec::DebounceOnOff { hold } => {
                self.f64(*hold)
            }
            BlockSpec::Integrator { k, y0 } => self.reals(&[*k, *y0]),
            BlockSpec::Inertial { k, t, y0 } | BlockSpec::InertialDifferential { k, t, y0 } => {
                self.reals(&[*k, *t, *y0])
            }
            BlockSpec::Oscillatory { k, t, b, y0, dy0 } => self.reals(&[*k, *t, *b, *y0, *dy0]),
            BlockSpec::StepDelay { y0 } => self.f64(*y0),
            BlockSpec::PiecewiseLinear { xs, ys, extrapolate } => {
                self.u16(xs.len() as u16);
                self.reals(xs);
                self.reals(ys);
                self.u8(*extrapolate as u8);
            }
            BlockSpec::Gate { inputs, inverted, .. } => {
                self.u16(*inputs);
                self.u8(*inverted as u8);
            }
            BlockSpec::Saturation { x1, x2, y1, y2 } => self.reals(&[*x1, *x2, *y1, *y2]),
            BlockSpec::Deadband { x1, x2, k } => self.reals(&[*x1, *x2, *k]),
            BlockSpec::SaturationDeadband { x1, x2, y1, y2, db_x1, db_x2 } => {
                self.reals(&[*x1, *x2, *y1, *y2, *db_x1, *db_x2])
            }
            BlockSpec::Hysteresis { x1, x2, y1, y2, start_high } => {
                self.u8(STATIC);
                self.reals(&[*x1, *x2, *y1, *y2]);
                self.u8(*start_high as u8);
            }
            BlockSpec::HysteresisDynamic { y1, y2, start_high } => {
                self.u8(DYNAMIC);
                self.reals(&[*y1, *y2]);
                self.u8(*start_high as u8);
            }
            BlockSpec::HysteresisDeadband { x1, x2, y1, y2, db_x1, db_x2, start } => {
                self.reals(&[*x1, *x2, *y1, *y2, *db_x1, *db_x2]);
                self.u8(*start as u8);
            }
            BlockSpec::LowThreshold { level, delta } | BlockSpec::HighThreshold { level, delta } => {
                self.reals(&[*level, *delta])
            }
            BlockSpec::Summator { coeffs } => {
                self.u16(coeffs.len() as u16);
                self.reals(coeffs);
            }
            BlockSpec::Multiplier { inputs } => self.u16(*inputs),
            BlockSpec::Divider { value_if_zero } => self.f64(*value_if_zero),
            BlockSpec::ExtInSignal { initial } => self.f64(*initial),
            BlockSpec::IntInSignal { initial, source } => {
                self.f64(*initial);
                self.u16(*source as u16);
            }
            BlockSpec::Plot { inputs } => self.u8(*inputs),
            BlockSpec::Constant { value } => self.f64(*value),
            BlockSpec::Step { at, value, initial } => self.reals(&[*at, *value, *initial]),
            BlockSpec::LinearSource { k, b } => self.reals(&[*k, *b]),
            BlockSpec::SinusSource { amplitude, omega, phase } => {
                self.reals(&[*amplitude, *omega, *phase])
            }
            BlockSpec::RsTrigger { initial } | BlockSpec::SrTrigger { initial } => {
                self.u8(*initial as u8)
            }
            BlockSpec::TTrigger { edge, initial }
            | BlockSpec::RtsTrigger { edge, initial }
            | BlockSpec::StrTrigger { edge, initial } => {
                self.u8(edge.code());
                self.u8(*initial as u8);
            }
            BlockSpec::AbsoluteValue
            | BlockSpec::Negate
            | BlockSpec::Sign
            | BlockSpec::Not
            | BlockSpec::Compare(_)
            | BlockSpec::RisingPulse
            | BlockSpec::FallingPulse
            | BlockSpec::ChangePulse
            | BlockSpec::VariableHysteresis
            | BlockSpec::VariableHysteresisPlus
            | BlockSpec::VariableHysteresisMinus
            | BlockSpec::ToggleSwitch
            | BlockSpec::ExtOutSignal
            | BlockSpec::IntOutSignal => {}
        }
        self.blocks += 1;
        self
    }

    pub fn link(&mut self, link: BlockLink) -> &mut Self {
        self.links.push(link);
        self
    }

    /// Block count and the finished buffer.
    pub fn finish(mut self) -> (usize, Vec<u8>) {
        let links = std::mem::take(&mut self.links);
        self.buf.extend_from_slice(&(links.len() as u32).to_le_bytes());
        for l in links {
            for v in [l.producer, l.producer_port, l.consumer, l.consumer_port] {
                self.buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        (self.blocks, self.buf)
    }

    // ── Primitives ────────────────────────────────────────────────────────────

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn reals(&mut self, vs: &[f64]) {
        for &v in vs {
            self.f64(v);
        }
    }
}

/// Encode a whole [`Assembly`].
pub fn encode(assembly: &Assembly) -> (usize, Vec<u8>) {
    let mut w = AssemblyWriter::new();
    for spec in &assembly.blocks {
        w.block(spec);
    }
    for &link in &assembly.links {
        w.link(link);
    }
    w.finish()
}

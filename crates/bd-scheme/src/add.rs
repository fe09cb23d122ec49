//! Per-kind `add_*` shorthands over [`Scheme::add`].

use bd_blocks::{BlockSpec, CompareOp, GateOp, ToggleEdge};
use bd_core::BlockId;

use crate::{Scheme, SchemeResult};

impl Scheme {
    // ── Sources ───────────────────────────────────────────────────────────

    pub fn add_constant(&mut self, value: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Constant { value })
    }

    pub fn add_step(&mut self, at: f64, value: f64, initial: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Step { at, value, initial })
    }

    pub fn add_linear_source(&mut self, k: f64, b: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::LinearSource { k, b })
    }

    pub fn add_sinus_source(&mut self, amplitude: f64, omega: f64, phase: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::SinusSource { amplitude, omega, phase })
    }

    // ── Operators ─────────────────────────────────────────────────────────

    pub fn add_summator(&mut self, coeffs: &[f64]) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Summator { coeffs: coeffs.to_vec() })
    }

    pub fn add_multiplier(&mut self, inputs: u16) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Multiplier { inputs })
    }

    pub fn add_divider(&mut self, value_if_zero: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Divider { value_if_zero })
    }

    pub fn add_absolute_value(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::AbsoluteValue)
    }

    pub fn add_negate(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Negate)
    }

    pub fn add_sign(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Sign)
    }

    // ── Logic ─────────────────────────────────────────────────────────────

    pub fn add_or(&mut self, inputs: u16, inverted: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Gate { op: GateOp::Or, inputs, inverted })
    }

    pub fn add_and(&mut self, inputs: u16, inverted: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Gate { op: GateOp::And, inputs, inverted })
    }

    pub fn add_xor(&mut self, inputs: u16, inverted: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Gate { op: GateOp::Xor, inputs, inverted })
    }

    pub fn add_not(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Not)
    }

    pub fn add_compare(&mut self, op: CompareOp) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Compare(op))
    }

    // ── Dynamics ──────────────────────────────────────────────────────────

    pub fn add_integrator(&mut self, k: f64, y0: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Integrator { k, y0 })
    }

    pub fn add_inertial(&mut self, k: f64, t: f64, y0: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Inertial { k, t, y0 })
    }

    pub fn add_inertial_differential(&mut self, k: f64, t: f64, y0: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::InertialDifferential { k, t, y0 })
    }

    pub fn add_oscillatory(&mut self, k: f64, t: f64, b: f64, y0: f64, dy0: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Oscillatory { k, t, b, y0, dy0 })
    }

    pub fn add_step_delay(&mut self, y0: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::StepDelay { y0 })
    }

    // ── Nonlinear ─────────────────────────────────────────────────────────

    pub fn add_piecewise_linear(&mut self, xs: &[f64], ys: &[f64], extrapolate: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::PiecewiseLinear { xs: xs.to_vec(), ys: ys.to_vec(), extrapolate })
    }

    pub fn add_saturation(&mut self, x1: f64, x2: f64, y1: f64, y2: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Saturation { x1, x2, y1, y2 })
    }

    pub fn add_deadband(&mut self, x1: f64, x2: f64, k: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Deadband { x1, x2, k })
    }

    pub fn add_hysteresis(
        &mut self,
        x1: f64,
        x2: f64,
        y1: f64,
        y2: f64,
        start_high: bool,
    ) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Hysteresis { x1, x2, y1, y2, start_high })
    }

    /// Switching points come from inputs 1 and 2.
    pub fn add_hysteresis_dynamic(&mut self, y1: f64, y2: f64, start_high: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::HysteresisDynamic { y1, y2, start_high })
    }

    pub fn add_saturation_deadband(
        &mut self,
        x1: f64,
        x2: f64,
        y1: f64,
        y2: f64,
        db_x1: f64,
        db_x2: f64,
    ) -> SchemeResult<BlockId> {
        self.add(BlockSpec::SaturationDeadband { x1, x2, y1, y2, db_x1, db_x2 })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_hysteresis_deadband(
        &mut self,
        x1: f64,
        x2: f64,
        y1: f64,
        y2: f64,
        db_x1: f64,
        db_x2: f64,
        start: i8,
    ) -> SchemeResult<BlockId> {
        self.add(BlockSpec::HysteresisDeadband { x1, x2, y1, y2, db_x1, db_x2, start })
    }

    pub fn add_variable_hysteresis(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::VariableHysteresis)
    }

    pub fn add_variable_hysteresis_plus(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::VariableHysteresisPlus)
    }

    pub fn add_variable_hysteresis_minus(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::VariableHysteresisMinus)
    }

    pub fn add_low_threshold(&mut self, level: f64, delta: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::LowThreshold { level, delta })
    }

    pub fn add_high_threshold(&mut self, level: f64, delta: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::HighThreshold { level, delta })
    }

    // ── Timing ────────────────────────────────────────────────────────────

    pub fn add_delay_on(&mut self, delay: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DelayOn { delay })
    }

    pub fn add_delay_off(&mut self, delay: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DelayOff { delay })
    }

    pub fn add_delay_on_off(&mut self, on: f64, off: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DelayOnOff { on, off })
    }

    /// Delay read from input 1.
    pub fn add_delay_on_dynamic(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DelayOnDynamic)
    }

    /// Delay read from input 1.
    pub fn add_delay_off_dynamic(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DelayOffDynamic)
    }

    /// Delays read from inputs 1 (on) and 2 (off).
    pub fn add_delay_on_off_dynamic(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DelayOnOffDynamic)
    }

    pub fn add_pulse(&mut self, width: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Pulse { width })
    }

    pub fn add_short_pulse(&mut self, width: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::ShortPulse { width })
    }

    pub fn add_long_pulse(&mut self, width: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::LongPulse { width })
    }

    pub fn add_debounce_on(&mut self, hold: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DebounceOn { hold })
    }

    pub fn add_debounce_off(&mut self, hold: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DebounceOff { hold })
    }

    pub fn add_debounce_on_off(&mut self, hold: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::DebounceOnOff { hold })
    }

    pub fn add_change_pulse(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::ChangePulse)
    }

    pub fn add_rising_pulse(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::RisingPulse)
    }

    pub fn add_falling_pulse(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::FallingPulse)
    }

    // ── Triggers and signals ──────────────────────────────────────────────

    pub fn add_rs_trigger(&mut self, initial: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::RsTrigger { initial })
    }

    pub fn add_sr_trigger(&mut self, initial: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::SrTrigger { initial })
    }

    pub fn add_t_trigger(&mut self, edge: ToggleEdge, initial: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::TTrigger { edge, initial })
    }

    pub fn add_rts_trigger(&mut self, edge: ToggleEdge, initial: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::RtsTrigger { edge, initial })
    }

    pub fn add_str_trigger(&mut self, edge: ToggleEdge, initial: bool) -> SchemeResult<BlockId> {
        self.add(BlockSpec::StrTrigger { edge, initial })
    }

    pub fn add_toggle_switch(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::ToggleSwitch)
    }

    pub fn add_ext_in_signal(&mut self, initial: f64) -> SchemeResult<BlockId> {
        self.add(BlockSpec::ExtInSignal { initial })
    }

    pub fn add_ext_out_signal(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::ExtOutSignal)
    }

    /// Reads the first real output of `source`, which must already exist
    /// when the scheme is next prepared.
    pub fn add_int_in_signal(&mut self, initial: f64, source: BlockId) -> SchemeResult<BlockId> {
        self.add(BlockSpec::IntInSignal { initial, source: source.0 })
    }

    pub fn add_int_out_signal(&mut self) -> SchemeResult<BlockId> {
        self.add(BlockSpec::IntOutSignal)
    }

    pub fn add_plot(&mut self, inputs: u8) -> SchemeResult<BlockId> {
        self.add(BlockSpec::Plot { inputs })
    }
}

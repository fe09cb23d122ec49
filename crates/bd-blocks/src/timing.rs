//! Timers and edge detectors.  Inputs and outputs are logical.
//!
//! Timers measure their hold from the step an input edge is seen.  A hold
//! is either fixed when the block is built or read, in seconds, from an
//! extra real input on every step.  A changed hold input applies at once and
//! is still measured from the original edge, so lengthening a running timer
//! extends it and shortening it past the elapsed time fires it immediately.

use bd_block::codegen::TIME_VAR;
use bd_block::{Block, BlockIo, BlockPorts, CodeNames};
use bd_core::{PortType, SimTime, TICKS_PER_SEC};

/// Emitted marker for a timer that is not running.
const IDLE: &str = "-1";

// ── Hold times ────────────────────────────────────────────────────────────────

/// Where a timer takes its hold time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    /// Fixed length in microseconds.
    Fixed(u64),
    /// Seconds read from real input `n` on every step.
    Input(usize),
}

impl Hold {
    /// Current hold in microseconds.
    pub fn ticks(self, io: &BlockIo<'_>) -> u64 {
        match self {
            Hold::Fixed(ticks) => ticks,
            Hold::Input(rel) => secs_to_ticks(io.real(rel)),
        }
    }

    fn code(self, names: &CodeNames<'_>) -> String {
        match self {
            Hold::Fixed(ticks) => ticks.to_string(),
            Hold::Input(rel) => {
                let x = names.real_in(rel);
                format!("(long long)({x} > 0 ? {x} * 1e6 : 0)")
            }
        }
    }
}

/// Seconds to whole microseconds.  Negative and NaN read as zero; values
/// past the end of representable time saturate.
pub fn secs_to_ticks(secs: f64) -> u64 {
    if secs > 0.0 {
        (secs * TICKS_PER_SEC as f64) as u64
    } else {
        0
    }
}

/// Signal input plus one input per hold read from a port.
fn input_count(holds: &[Hold]) -> usize {
    1 + holds.iter().filter(|h| matches!(h, Hold::Input(_))).count()
}

fn running(start: Option<SimTime>, now: SimTime, hold: u64) -> bool {
    start.is_some_and(|t| now < t.offset(hold))
}

fn elapsed(start: Option<SimTime>, now: SimTime, hold: u64) -> bool {
    start.is_some_and(|t| now >= t.offset(hold))
}

// ── Delays ────────────────────────────────────────────────────────────────────

/// Turn-on / turn-off delay timer.
///
/// The output rises `on` after the input rises and falls `off` after the
/// input falls.  An input pulse shorter than `on` never reaches the output.
/// A rise while the turn-off timer runs does not cancel that timer: the
/// output drops when it expires and comes back `on` after the new rise.
#[derive(Debug, Clone)]
pub struct Delay {
    pub on:  Hold,
    pub off: Hold,
    kind:    &'static str,
    prev_x:  bool,
    y:       bool,
    /// Last rise, cleared by the next fall.
    rose:    Option<SimTime>,
    /// Start of the turn-off timer.
    fell:    Option<SimTime>,
}

impl Delay {
    pub fn on(hold: Hold) -> Self {
        Self::with_kind("DelayOn", hold, Hold::Fixed(0))
    }

    pub fn off(hold: Hold) -> Self {
        Self::with_kind("DelayOff", Hold::Fixed(0), hold)
    }

    pub fn on_off(on: Hold, off: Hold) -> Self {
        Self::with_kind("DelayOnOff", on, off)
    }

    fn with_kind(kind: &'static str, on: Hold, off: Hold) -> Self {
        Self { on, off, kind, prev_x: false, y: false, rose: None, fell: None }
    }
}

impl Block for Delay {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, input_count(&[self.on, self.off]), 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        self.prev_x = false;
        self.y = false;
        self.rose = None;
        self.fell = None;
        self.compute(io);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.flag(0);
        let now = io.time();
        let (on, off) = (self.on.ticks(io), self.off.ticks(io));
        if x != self.prev_x {
            if x {
                self.rose = Some(now);
            } else {
                if self.y && (elapsed(self.rose, now, on) || !running(self.fell, now, off)) {
                    self.fell = Some(now);
                }
                self.rose = None;
            }
            self.prev_x = x;
        }
        self.y = elapsed(self.rose, now, on) || running(self.fell, now, off);
        io.set_flag(0, self.y);
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!(
            "bool {} = false;\nbool {} = false;\nlong long {} = {IDLE};\nlong long {} = {IDLE};",
            names.var("prev_x"),
            names.var("y"),
            names.var("rose"),
            names.var("fell"),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, out) = (names.real_in(0), names.real_out(0));
        let (prev, y) = (names.var("prev_x"), names.var("y"));
        let (rose, fell) = (names.var("rose"), names.var("fell"));
        let fired = format!("{rose} >= 0 && {TIME_VAR} >= {rose} + {}", self.on.code(names));
        let holding = format!("{fell} >= 0 && {TIME_VAR} < {fell} + {}", self.off.code(names));
        format!(
            "if ({prev} != ({x} != 0)) {{\n    if ({x} != 0)\n        {rose} = {TIME_VAR};\n    \
             else {{\n        if ({y} && ({fired} || !({holding})))\n            {fell} = {TIME_VAR};\n        \
             {rose} = {IDLE};\n    }}\n    {prev} = {x} != 0;\n}}\n{y} = {fired} || {holding};\n{out} = {y};",
        )
    }
}

// ── Debounce ──────────────────────────────────────────────────────────────────

/// Debounce filter.  The output takes the input's value once the input has
/// differed from it for `rise` (going high) or `fall` (going low); a
/// shorter excursion is swallowed.
#[derive(Debug, Clone)]
pub struct Debounce {
    /// Microseconds.
    pub rise: u64,
    /// Microseconds.
    pub fall: u64,
    kind:     &'static str,
    y:        bool,
    since:    Option<SimTime>,
}

impl Debounce {
    pub fn on(hold: u64) -> Self {
        Self::with_kind("DebounceOn", hold, 0)
    }

    pub fn off(hold: u64) -> Self {
        Self::with_kind("DebounceOff", 0, hold)
    }

    pub fn on_off(hold: u64) -> Self {
        Self::with_kind("DebounceOnOff", hold, hold)
    }

    fn with_kind(kind: &'static str, rise: u64, fall: u64) -> Self {
        Self { rise, fall, kind, y: false, since: None }
    }
}

impl Block for Debounce {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        self.y = false;
        self.since = None;
        self.compute(io);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.flag(0);
        let now = io.time();
        if x == self.y {
            self.since = None;
        } else {
            let start = *self.since.get_or_insert(now);
            let hold = if x { self.rise } else { self.fall };
            if now >= start.offset(hold) {
                self.y = x;
                self.since = None;
            }
        }
        io.set_flag(0, self.y);
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!("bool {} = false;\nlong long {} = {IDLE};", names.var("y"), names.var("since"))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, out) = (names.real_in(0), names.real_out(0));
        let (y, since) = (names.var("y"), names.var("since"));
        format!(
            "if (({x} != 0) == {y})\n    {since} = {IDLE};\nelse {{\n    if ({since} < 0)\n        \
             {since} = {TIME_VAR};\n    if ({TIME_VAR} >= {since} + ({x} != 0 ? {} : {})) {{\n        \
             {y} = {x} != 0;\n        {since} = {IDLE};\n    }}\n}}\n{out} = {y};",
            self.rise,
            self.fall,
        )
    }
}

// ── Timed pulses ──────────────────────────────────────────────────────────────

/// How a [`Pulse`] reacts to its input after the rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseShape {
    /// Fixed width; rising edges during the pulse are ignored.
    Single,
    /// At most `width`; ends early when the input falls.
    Short,
    /// Fixed width, restarted by every rising edge.
    Long,
}

/// Pulse generator started by a rising input edge.
#[derive(Debug, Clone)]
pub struct Pulse {
    pub shape: PulseShape,
    pub width: Hold,
    prev_x:    bool,
    start:     Option<SimTime>,
}

impl Pulse {
    pub fn new(shape: PulseShape, width: Hold) -> Self {
        Self { shape, width, prev_x: false, start: None }
    }
}

impl Block for Pulse {
    fn kind(&self) -> &'static str {
        match self.shape {
            PulseShape::Single => "Pulse",
            PulseShape::Short => "ShortPulse",
            PulseShape::Long => "LongPulse",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, input_count(&[self.width]), 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        self.prev_x = false;
        self.start = None;
        self.compute(io);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.flag(0);
        let now = io.time();
        let width = self.width.ticks(io);
        let busy = self.shape == PulseShape::Single && running(self.start, now, width);
        if x && !self.prev_x && !busy {
            self.start = Some(now);
        }
        self.prev_x = x;
        let y = running(self.start, now, width) && (self.shape != PulseShape::Short || x);
        io.set_flag(0, y);
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!("bool {} = false;\nlong long {} = {IDLE};", names.var("prev_x"), names.var("start"))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y) = (names.real_in(0), names.real_out(0));
        let (prev, start) = (names.var("prev_x"), names.var("start"));
        let on = format!("{start} >= 0 && {TIME_VAR} < {start} + {}", self.width.code(names));
        let trigger = match self.shape {
            PulseShape::Single => format!("{x} != 0 && !{prev} && !({on})"),
            PulseShape::Short | PulseShape::Long => format!("{x} != 0 && !{prev}"),
        };
        let out = match self.shape {
            PulseShape::Short => format!("({on}) && {x} != 0"),
            PulseShape::Single | PulseShape::Long => on.clone(),
        };
        format!("if ({trigger})\n    {start} = {TIME_VAR};\n{prev} = {x} != 0;\n{y} = {out};")
    }
}

// ── Edge pulses ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    /// Either direction.
    Change,
}

/// One-step pulse on an input edge.
#[derive(Debug, Clone)]
pub struct EdgePulse {
    pub edge: Edge,
    prev_x:   bool,
}

impl EdgePulse {
    pub fn new(edge: Edge) -> Self {
        Self { edge, prev_x: false }
    }
}

impl Block for EdgePulse {
    fn kind(&self) -> &'static str {
        match self.edge {
            Edge::Rising => "RisingPulse",
            Edge::Falling => "FallingPulse",
            Edge::Change => "ChangePulse",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_flag(0, false);
        self.prev_x = io.flag(0);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.flag(0);
        let y = match self.edge {
            Edge::Rising => !self.prev_x && x,
            Edge::Falling => self.prev_x && !x,
            Edge::Change => self.prev_x != x,
        };
        io.set_flag(0, y);
        self.prev_x = x;
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!("bool {} = false;", names.var("prev_x"))
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = 0;\n{} = {} != 0;",
            names.real_out(0),
            names.var("prev_x"),
            names.real_in(0),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y, prev) = (names.real_in(0), names.real_out(0), names.var("prev_x"));
        let test = match self.edge {
            Edge::Rising => format!("!{prev} && {x} != 0"),
            Edge::Falling => format!("{prev} && {x} == 0"),
            Edge::Change => format!("{prev} != ({x} != 0)"),
        };
        format!("{y} = {test};\n{prev} = {x} != 0;")
    }
}

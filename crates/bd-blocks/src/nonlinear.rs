//! Static nonlinear maps and relays.

use bd_block::codegen::literal as lit;
use bd_block::{Block, BlockIo, BlockPorts, CodeNames};
use bd_core::PortType;

// ── Saturation ────────────────────────────────────────────────────────────────

/// `y1` below `x1`, `y2` above `x2`, linear in between.
#[derive(Debug, Clone)]
pub struct Saturation {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
    slope:  f64,
    offset: f64,
}

impl Saturation {
    /// Requires `x1 < x2` (checked by `BlockSpec::build`).
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        let slope = (y2 - y1) / (x2 - x1);
        Self { x1, x2, y1, y2, slope, offset: y1 - x1 * slope }
    }

    pub fn apply(&self, x: f64) -> f64 {
        if x < self.x1 {
            self.y1
        } else if x > self.x2 {
            self.y2
        } else {
            self.slope * x + self.offset
        }
    }
}

impl Block for Saturation {
    fn kind(&self) -> &'static str {
        "Saturation"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = self.apply(io.real(0));
        io.set_real(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let x = names.real_in(0);
        format!(
            "{} = {x} < {} ? {} : {x} > {} ? {} : {} * {x} + {};",
            names.real_out(0),
            lit(self.x1),
            lit(self.y1),
            lit(self.x2),
            lit(self.y2),
            lit(self.slope),
            lit(self.offset),
        )
    }
}

// ── Deadband ──────────────────────────────────────────────────────────────────

/// Zero inside `[x1, x2]`, slope `k` measured from the nearer edge outside.
#[derive(Debug, Clone)]
pub struct Deadband {
    pub x1: f64,
    pub x2: f64,
    pub k:  f64,
}

impl Deadband {
    pub fn apply(&self, x: f64) -> f64 {
        if x < self.x1 {
            self.k * (x - self.x1)
        } else if x > self.x2 {
            self.k * (x - self.x2)
        } else {
            0.0
        }
    }
}

impl Block for Deadband {
    fn kind(&self) -> &'static str {
        "Deadband"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = self.apply(io.real(0));
        io.set_real(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let x = names.real_in(0);
        let (x1, x2, k) = (lit(self.x1), lit(self.x2), lit(self.k));
        format!(
            "{} = {x} < {x1} ? {k} * ({x} - {x1}) : {x} > {x2} ? {k} * ({x} - {x2}) : 0;",
            names.real_out(0),
        )
    }
}

// ── Saturation with deadband ──────────────────────────────────────────────────

/// Saturation with a dead zone in the middle: zero on `[db_x1, db_x2]`,
/// linear from the dead zone edges out to `(x1, y1)` and `(x2, y2)`, and
/// clamped beyond.  Requires `x1 < db_x1 <= db_x2 < x2` (checked by
/// `BlockSpec::build`).
#[derive(Debug, Clone)]
pub struct SaturationDeadband {
    pub x1:    f64,
    pub x2:    f64,
    pub y1:    f64,
    pub y2:    f64,
    pub db_x1: f64,
    pub db_x2: f64,
    k1:        f64,
    k2:        f64,
}

impl SaturationDeadband {
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64, db_x1: f64, db_x2: f64) -> Self {
        let k1 = y1 / (x1 - db_x1);
        let k2 = y2 / (x2 - db_x2);
        Self { x1, x2, y1, y2, db_x1, db_x2, k1, k2 }
    }

    pub fn apply(&self, x: f64) -> f64 {
        if x < self.x1 {
            self.y1
        } else if x > self.x2 {
            self.y2
        } else if x < self.db_x1 {
            self.k1 * (x - self.db_x1)
        } else if x > self.db_x2 {
            self.k2 * (x - self.db_x2)
        } else {
            0.0
        }
    }
}

impl Block for SaturationDeadband {
    fn kind(&self) -> &'static str {
        "SaturationDeadband"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = self.apply(io.real(0));
        io.set_real(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let x = names.real_in(0);
        let (db1, db2) = (lit(self.db_x1), lit(self.db_x2));
        format!(
            "{} = {x} < {} ? {} : {x} > {} ? {} : {x} < {db1} ? {} * ({x} - {db1}) : \
             {x} > {db2} ? {} * ({x} - {db2}) : 0;",
            names.real_out(0),
            lit(self.x1),
            lit(self.y1),
            lit(self.x2),
            lit(self.y2),
            lit(self.k1),
            lit(self.k2),
        )
    }
}

// ── Hysteresis ────────────────────────────────────────────────────────────────

/// Switching points of a [`Hysteresis`] relay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Fixed { x1: f64, x2: f64 },
    /// Read from inputs 1 (`x1`) and 2 (`x2`) on every step.
    Inputs,
}

/// Relay: switches to `y1` at or below `x1`, to `y2` at or above `x2`, and
/// holds in between.  Starts at `y2` if `start_high`, else `y1`.
#[derive(Debug, Clone)]
pub struct Hysteresis {
    pub bounds:     Bounds,
    pub y1:         f64,
    pub y2:         f64,
    pub start_high: bool,
}

impl Block for Hysteresis {
    fn kind(&self) -> &'static str {
        "Hysteresis"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        let inputs = match self.bounds {
            Bounds::Fixed { .. } => 1,
            Bounds::Inputs => 3,
        };
        ports.declare(PortType::Real, inputs, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, if self.start_high { self.y2 } else { self.y1 });
        self.compute(io);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.real(0);
        let (x1, x2) = match self.bounds {
            Bounds::Fixed { x1, x2 } => (x1, x2),
            Bounds::Inputs => (io.real(1), io.real(2)),
        };
        if x <= x1 {
            io.set_real(0, self.y1);
        } else if x >= x2 {
            io.set_real(0, self.y2);
        }
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        let y0 = if self.start_high { self.y2 } else { self.y1 };
        format!("{} = {};\n{}", names.real_out(0), lit(y0), self.print_source(names))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y) = (names.real_in(0), names.real_out(0));
        let (x1, x2) = match self.bounds {
            Bounds::Fixed { x1, x2 } => (lit(x1), lit(x2)),
            Bounds::Inputs => (names.real_in(1), names.real_in(2)),
        };
        format!(
            "if ({x} <= {x1}) {y} = {};\nelse if ({x} >= {x2}) {y} = {};",
            lit(self.y1),
            lit(self.y2),
        )
    }
}

/// Three-level relay.  Goes to `y1` at or below `x1` and to `y2` at or above
/// `x2`; from `y1` it drops to zero once the input climbs to `db_x1`, and
/// from `y2` once it falls to `db_x2`.
///
/// `start` picks the level before the first step: `1` for `y2`, `-1` for
/// `y1`, anything else for zero.
#[derive(Debug, Clone)]
pub struct HysteresisDeadband {
    pub x1:    f64,
    pub x2:    f64,
    pub y1:    f64,
    pub y2:    f64,
    pub db_x1: f64,
    pub db_x2: f64,
    pub start: i8,
}

impl HysteresisDeadband {
    fn initial(&self) -> f64 {
        match self.start {
            1 => self.y2,
            -1 => self.y1,
            _ => 0.0,
        }
    }
}

impl Block for HysteresisDeadband {
    fn kind(&self) -> &'static str {
        "HysteresisDeadband"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.initial());
        self.compute(io);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let (x, y) = (io.real(0), io.output_real(0));
        if x <= self.x1 {
            io.set_real(0, self.y1);
        } else if x >= self.x2 {
            io.set_real(0, self.y2);
        } else if (y == self.y1 && x >= self.db_x1) || (y == self.y2 && x <= self.db_x2) {
            io.set_real(0, 0.0);
        }
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};\n{}", names.real_out(0), lit(self.initial()), self.print_source(names))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y) = (names.real_in(0), names.real_out(0));
        let (y1, y2) = (lit(self.y1), lit(self.y2));
        format!(
            "if ({x} <= {}) {y} = {y1};\nelse if ({x} >= {}) {y} = {y2};\n\
             else if (({y} == {y1} && {x} >= {}) || ({y} == {y2} && {x} <= {})) {y} = 0;",
            lit(self.x1),
            lit(self.x2),
            lit(self.db_x1),
            lit(self.db_x2),
        )
    }
}

// ── Variable hysteresis ───────────────────────────────────────────────────────

/// Where a [`VariableHysteresis`] centres its switching band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Band around zero.
    Centered,
    /// Band shifted up to the `+100` end of the scale.
    Plus,
    /// Band shifted down to the `-100` end, input inverted.
    Minus,
}

/// Three-state relay (`-1`, `0`, `1`) whose dead zone and hysteresis come
/// from inputs.  Input 0 is the signal, input 1 the dead zone `d`, input 2
/// the hysteresis gain `r` applied to the previous output.
#[derive(Debug, Clone)]
pub struct VariableHysteresis {
    pub bias: Bias,
    prev_y:   f64,
}

impl VariableHysteresis {
    pub fn new(bias: Bias) -> Self {
        Self { bias, prev_y: 0.0 }
    }

    /// Next output for signal `x`, dead zone `d`, gain `r`.
    pub fn apply(&self, x: f64, d: f64, r: f64) -> f64 {
        let feedback = r * self.prev_y;
        let (z, limit) = match self.bias {
            Bias::Centered => (x + feedback, d),
            Bias::Plus => (x - 100.0 + d + feedback, 100.0),
            Bias::Minus => (100.0 - d + feedback - x, 100.0),
        };
        if z >= limit {
            1.0
        } else if z <= -limit {
            -1.0
        } else {
            0.0
        }
    }
}

impl Block for VariableHysteresis {
    fn kind(&self) -> &'static str {
        match self.bias {
            Bias::Centered => "VariableHysteresis",
            Bias::Plus => "VariableHysteresisPlus",
            Bias::Minus => "VariableHysteresisMinus",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 3, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        self.prev_y = 0.0;
        io.set_real(0, 0.0);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = self.apply(io.real(0), io.real(1), io.real(2));
        self.prev_y = y;
        io.set_real(0, y);
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        format!("double {} = 0;", names.var("prev_y"))
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!("{} = 0;\n{} = 0;", names.real_out(0), names.var("prev_y"))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, d, r) = (names.real_in(0), names.real_in(1), names.real_in(2));
        let (y, prev) = (names.real_out(0), names.var("prev_y"));
        let (z, limit) = match self.bias {
            Bias::Centered => (format!("{x} + {r} * {prev}"), d.clone()),
            Bias::Plus => (format!("{x} - 100 + {d} + {r} * {prev}"), "100".to_string()),
            Bias::Minus => (format!("100 - {d} + {r} * {prev} - {x}"), "100".to_string()),
        };
        format!(
            "{{\n    double z = {z};\n    {y} = z >= {limit} ? 1 : z <= -({limit}) ? -1 : 0;\n}}\n{prev} = {y};"
        )
    }
}

// ── Thresholds ────────────────────────────────────────────────────────────────

/// Which side of the threshold activates the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSide {
    /// Active below `level`; released above `level + delta`.
    Low,
    /// Active above `level`; released below `level - delta`.
    High,
}

/// Logical threshold relay with a return band of width `delta`.
#[derive(Debug, Clone)]
pub struct Threshold {
    pub side:  ThresholdSide,
    pub level: f64,
    pub delta: f64,
}

impl Threshold {
    fn release(&self) -> f64 {
        match self.side {
            ThresholdSide::Low => self.level + self.delta,
            ThresholdSide::High => self.level - self.delta,
        }
    }

    fn activated(&self, x: f64) -> bool {
        match self.side {
            ThresholdSide::Low => x < self.level,
            ThresholdSide::High => x > self.level,
        }
    }

    fn released(&self, x: f64) -> bool {
        match self.side {
            ThresholdSide::Low => x > self.release(),
            ThresholdSide::High => x < self.release(),
        }
    }
}

impl Block for Threshold {
    fn kind(&self) -> &'static str {
        match self.side {
            ThresholdSide::Low => "LowThreshold",
            ThresholdSide::High => "HighThreshold",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        let on = self.activated(io.real(0));
        io.set_flag(0, on);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.real(0);
        if self.released(x) {
            io.set_flag(0, false);
        } else if self.activated(x) {
            io.set_flag(0, true);
        }
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        let op = if self.side == ThresholdSide::Low { "<" } else { ">" };
        format!("{} = {} {op} {};", names.real_out(0), names.real_in(0), lit(self.level))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y) = (names.real_in(0), names.real_out(0));
        let (on, off) = match self.side {
            ThresholdSide::Low => ("<", ">"),
            ThresholdSide::High => (">", "<"),
        };
        format!(
            "if ({x} {off} {}) {y} = 0;\nelse if ({x} {on} {}) {y} = 1;",
            lit(self.release()),
            lit(self.level),
        )
    }
}

// ── Piecewise-linear ──────────────────────────────────────────────────────────

/// Table lookup with linear interpolation between breakpoints.
///
/// Outside the table the output is held at the end value, or extrapolated
/// along the end segment when `extrapolate` is set.  Breakpoints must be
/// strictly increasing (checked by `BlockSpec::build`).
#[derive(Debug, Clone)]
pub struct PiecewiseLinear {
    pub xs:          Vec<f64>,
    pub ys:          Vec<f64>,
    pub extrapolate: bool,
}

impl PiecewiseLinear {
    pub fn apply(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let last = n - 1;
        if !self.extrapolate {
            if x <= self.xs[0] {
                return self.ys[0];
            }
            if x >= self.xs[last] {
                return self.ys[last];
            }
        }
        // Segment i spans xs[i]..xs[i + 1]; ends extend the outer segments.
        let i = match self.xs.partition_point(|&b| b <= x) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };
        let (x0, x1, y0, y1) = (self.xs[i], self.xs[i + 1], self.ys[i], self.ys[i + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

impl Block for PiecewiseLinear {
    fn kind(&self) -> &'static str {
        "PiecewiseLinear"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = self.apply(io.real(0));
        io.set_real(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_memory(&self, names: &CodeNames<'_>) -> String {
        let join = |v: &[f64]| v.iter().map(|f| lit(*f)).collect::<Vec<_>>().join(", ");
        let n = self.xs.len();
        format!(
            "const double {}[{n}] = {{{}}};\nconst double {}[{n}] = {{{}}};",
            names.var("xs"),
            join(&self.xs),
            names.var("ys"),
            join(&self.ys),
        )
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x, y, xs, ys) = (names.real_in(0), names.real_out(0), names.var("xs"), names.var("ys"));
        let n = self.xs.len();
        let clamp = if self.extrapolate {
            String::new()
        } else {
            format!(
                "if ({x} <= {xs}[0]) {y} = {ys}[0];\nelse if ({x} >= {xs}[{last}]) {y} = {ys}[{last}];\nelse ",
                last = n - 1,
            )
        };
        format!(
            "{clamp}{{\n    int i = 0;\n    while (i < {seg} && {xs}[i + 1] <= {x}) ++i;\n    \
             {y} = {ys}[i] + ({ys}[i + 1] - {ys}[i]) * ({x} - {xs}[i]) / ({xs}[i + 1] - {xs}[i]);\n}}",
            seg = n - 2,
        )
    }
}

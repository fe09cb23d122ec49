//! Logic gates and comparators.  Logical values are reals: 0 is false and
//! anything else is true; outputs are exactly 0 or 1.

use bd_block::{Block, BlockIo, BlockPorts, CodeNames};
use bd_core::PortType;

// ── Gates ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOp {
    Or,
    And,
    Xor,
}

/// N-input OR/AND/XOR, optionally inverted (NOR/NAND/XNOR).
#[derive(Debug, Clone)]
pub struct Gate {
    pub op:       GateOp,
    pub inputs:   usize,
    pub inverted: bool,
}

impl Gate {
    fn evaluate(&self, io: &BlockIo<'_>) -> bool {
        let mut bits = (0..self.inputs).map(|i| io.flag(i));
        let raw = match self.op {
            GateOp::Or => bits.any(|b| b),
            GateOp::And => bits.all(|b| b),
            GateOp::Xor => bits.fold(false, |acc, b| acc ^ b),
        };
        raw != self.inverted
    }
}

impl Block for Gate {
    fn kind(&self) -> &'static str {
        match (self.op, self.inverted) {
            (GateOp::Or, false) => "Or",
            (GateOp::Or, true) => "OrNot",
            (GateOp::And, false) => "And",
            (GateOp::And, true) => "AndNot",
            (GateOp::Xor, false) => "Xor",
            (GateOp::Xor, true) => "XorNot",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, self.inputs, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = self.evaluate(io);
        io.set_flag(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let sep = match self.op {
            GateOp::Or => " || ",
            GateOp::And => " && ",
            GateOp::Xor => " ^ ",
        };
        let terms: Vec<String> = (0..self.inputs)
            .map(|i| format!("({} != 0)", names.real_in(i)))
            .collect();
        let bang = if self.inverted { "!" } else { "" };
        format!("{} = {bang}({});", names.real_out(0), terms.join(sep))
    }
}

/// Logical negation.
#[derive(Debug, Clone)]
pub struct Not;

impl Block for Not {
    fn kind(&self) -> &'static str {
        "Not"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = !io.flag(0);
        io.set_flag(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {} == 0;", names.real_out(0), names.real_in(0))
    }
}

// ── Comparators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl CompareOp {
    /// Equality is tolerance-based: `|a - b| < f64::EPSILON`.
    pub fn holds(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Equal => (a - b).abs() < f64::EPSILON,
            CompareOp::NotEqual => (a - b).abs() >= f64::EPSILON,
            CompareOp::Less => a < b,
            CompareOp::Greater => a > b,
            CompareOp::LessOrEqual => a <= b,
            CompareOp::GreaterOrEqual => a >= b,
        }
    }
}

/// Two-input comparison `x₀ op x₁`.
#[derive(Debug, Clone)]
pub struct Compare {
    pub op: CompareOp,
}

impl Block for Compare {
    fn kind(&self) -> &'static str {
        match self.op {
            CompareOp::Equal => "Equal",
            CompareOp::NotEqual => "NotEqual",
            CompareOp::Less => "Less",
            CompareOp::Greater => "Greater",
            CompareOp::LessOrEqual => "LessOrEqual",
            CompareOp::GreaterOrEqual => "GreaterOrEqual",
        }
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 2, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = self.op.holds(io.real(0), io.real(1));
        io.set_flag(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (a, b, y) = (names.real_in(0), names.real_in(1), names.real_out(0));
        match self.op {
            CompareOp::Equal => format!("{y} = fabs({a} - {b}) < DBL_EPSILON;"),
            CompareOp::NotEqual => format!("{y} = fabs({a} - {b}) >= DBL_EPSILON;"),
            CompareOp::Less => format!("{y} = {a} < {b};"),
            CompareOp::Greater => format!("{y} = {a} > {b};"),
            CompareOp::LessOrEqual => format!("{y} = {a} <= {b};"),
            CompareOp::GreaterOrEqual => format!("{y} = {a} >= {b};"),
        }
    }
}

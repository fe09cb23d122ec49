//! Arithmetic operators.  All fold when every input is constant.

use bd_block::codegen::literal as lit;
use bd_block::{Block, BlockIo, BlockPorts, CodeNames};
use bd_core::PortType;

/// Weighted sum `Σ cᵢ·xᵢ`; one input per coefficient.
#[derive(Debug, Clone)]
pub struct Summator {
    pub coeffs: Vec<f64>,
}

impl Block for Summator {
    fn kind(&self) -> &'static str {
        "Summator"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, self.coeffs.len(), 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let sum = self
            .coeffs
            .iter()
            .enumerate()
            .map(|(i, c)| c * io.real(i))
            .sum();
        io.set_real(0, sum);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let terms: Vec<String> = self
            .coeffs
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} * {}", lit(*c), names.real_in(i)))
            .collect();
        format!("{} = {};", names.real_out(0), terms.join(" + "))
    }
}

/// Product of `n` inputs.
#[derive(Debug, Clone)]
pub struct Multiplier {
    pub inputs: usize,
}

impl Block for Multiplier {
    fn kind(&self) -> &'static str {
        "Multiplier"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, self.inputs, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let product = (0..self.inputs).map(|i| io.real(i)).product();
        io.set_real(0, product);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let factors: Vec<String> = (0..self.inputs).map(|i| names.real_in(i)).collect();
        format!("{} = {};", names.real_out(0), factors.join(" * "))
    }
}

/// `x₀ / x₁`, or `value_if_zero` when the divisor is exactly zero.
#[derive(Debug, Clone)]
pub struct Divider {
    pub value_if_zero: f64,
}

impl Block for Divider {
    fn kind(&self) -> &'static str {
        "Divider"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 2, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let divisor = io.real(1);
        let y = if divisor == 0.0 { self.value_if_zero } else { io.real(0) / divisor };
        io.set_real(0, y);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let (x1, x2) = (names.real_in(0), names.real_in(1));
        format!(
            "{} = {x2} == 0 ? {} : {x1} / {x2};",
            names.real_out(0),
            lit(self.value_if_zero),
        )
    }
}

/// Single-input maps without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Abs,
    Negate,
    Sign,
}

/// `|x|`, `-x`, or `sign(x)` (with `sign(0) = 0`).
#[derive(Debug, Clone)]
pub struct Unary {
    pub op: UnaryOp,
}

impl Unary {
    fn apply(&self, x: f64) -> f64 {
        match self.op {
            UnaryOp::Abs => x.abs(),
            UnaryOp::Negate => -x,
            UnaryOp::Sign if x > 0.0 => 1.0,
            UnaryOp::Sign if x < 0.0 => -1.0,
            UnaryOp::Sign => 0.0,
        }
    }
}

impl Block for Unary {
    fn kind(&self) -> &'static str {
        match self.op {
            UnaryOp::Abs => "AbsoluteValue",
            UnaryOp::Negate => "Negate",
            UnaryOp::Sign => "Sign",
        }
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
        let (x, y) = (names.real_in(0), names.real_out(0));
        match self.op {
            UnaryOp::Abs => format!("{y} = fabs({x});"),
            UnaryOp::Negate => format!("{y} = -{x};"),
            UnaryOp::Sign => format!("{y} = ({x} > 0) - ({x} < 0);"),
        }
    }
}

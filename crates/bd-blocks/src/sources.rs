//! Signal sources: blocks with no inputs.

use bd_block::codegen::{TIME_SECS, literal as lit};
use bd_block::{Block, BlockIo, BlockPorts, Capabilities, CodeNames};
use bd_core::{PortType, SimTime};

/// Fixed value.  Folds unconditionally.
#[derive(Debug, Clone)]
pub struct Constant {
    pub value: f64,
}

impl Block for Constant {
    fn kind(&self) -> &'static str {
        "Constant"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 0, 1);
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::CONSTANT
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.value);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.mark_outputs_constant();
        true
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), lit(self.value))
    }
}

/// `initial` before `at`, `value` from `at` on.
#[derive(Debug, Clone)]
pub struct Step {
    pub at:      SimTime,
    pub value:   f64,
    pub initial: f64,
}

impl Block for Step {
    fn kind(&self) -> &'static str {
        "Step"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 0, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let y = if io.time() < self.at { self.initial } else { self.value };
        io.set_real(0, y);
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = time < {} ? {} : {};",
            names.real_out(0),
            self.at.0,
            lit(self.initial),
            lit(self.value),
        )
    }
}

/// `y = k * t + b`, `t` in seconds.
#[derive(Debug, Clone)]
pub struct LinearSource {
    pub k: f64,
    pub b: f64,
}

impl Block for LinearSource {
    fn kind(&self) -> &'static str {
        "LinearSource"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 0, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.b + self.k * io.secs());
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {} + {} * {TIME_SECS};", names.real_out(0), lit(self.b), lit(self.k))
    }
}

/// `y = a * sin(w * t + f)`, `t` in seconds.
#[derive(Debug, Clone)]
pub struct SinusSource {
    pub amplitude: f64,
    pub omega:     f64,
    pub phase:     f64,
}

impl Block for SinusSource {
    fn kind(&self) -> &'static str {
        "SinusSource"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 0, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.amplitude * (self.omega * io.secs() + self.phase).sin());
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!(
            "{} = {} * sin({} * {TIME_SECS} + {});",
            names.real_out(0),
            lit(self.amplitude),
            lit(self.omega),
            lit(self.phase),
        )
    }
}

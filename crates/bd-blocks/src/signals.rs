//! Bridges between the diagram and the scheme's external signal vectors.

use bd_block::codegen::literal as lit;
use bd_block::{Block, BlockIo, BlockPorts, Capabilities, CodeNames};
use bd_core::PortType;

/// Publishes one slot of the external input vector as an output.
/// Outputs `initial` until the first step.
#[derive(Debug, Clone)]
pub struct ExtInSignal {
    pub initial: f64,
}

impl Block for ExtInSignal {
    fn kind(&self) -> &'static str {
        "ExtInSignal"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 0, 1).declare_signals(1, 0);
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.initial);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.signal_in(0);
        io.set_real(0, x);
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), lit(self.initial))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), names.signal_in(0))
    }
}

/// Copies its input to one slot of the external output vector (and passes
/// it through as an output).
#[derive(Debug, Clone)]
pub struct ExtOutSignal;

impl Block for ExtOutSignal {
    fn kind(&self) -> &'static str {
        "ExtOutSignal"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1).declare_signals(0, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.real(0);
        io.set_real(0, x);
        io.set_signal_out(0, x);
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        let x = names.real_in(0);
        format!("{} = {x};\n{} = {x};", names.real_out(0), names.signal_out(0))
    }
}

/// Reads the first real output of another block directly, without a link
/// or a scheduling dependency.  Outputs `initial` until the first step.
#[derive(Debug, Clone)]
pub struct IntInSignal {
    pub initial: f64,
    /// Id of the block read.
    pub source:  u32,
}

impl Block for IntInSignal {
    fn kind(&self) -> &'static str {
        "IntInSignal"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 0, 1);
    }

    fn tap(&self) -> Option<u32> {
        Some(self.source)
    }

    fn init(&mut self, io: &mut BlockIo<'_>) {
        io.set_real(0, self.initial);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.tapped();
        io.set_real(0, x);
    }

    fn print_init(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), lit(self.initial))
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), names.tapped())
    }
}

/// Publishes its input for [`IntInSignal`] readers; passes it through.
#[derive(Debug, Clone)]
pub struct IntOutSignal;

impl Block for IntOutSignal {
    fn kind(&self) -> &'static str {
        "IntOutSignal"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, 1, 1);
    }

    fn compute(&mut self, io: &mut BlockIo<'_>) {
        let x = io.real(0);
        io.set_real(0, x);
    }

    fn try_make_constant(&mut self, io: &mut BlockIo<'_>) -> bool {
        io.fold_when_inputs_constant()
    }

    fn print_source(&self, names: &CodeNames<'_>) -> String {
        format!("{} = {};", names.real_out(0), names.real_in(0))
    }
}

/// Display sink: `inputs` real inputs, no outputs, never computed.  The
/// host reads the wired values itself.
#[derive(Debug, Clone)]
pub struct Plot {
    pub inputs: u8,
}

impl Block for Plot {
    fn kind(&self) -> &'static str {
        "Plot"
    }

    fn declare_ports(&self, ports: &mut BlockPorts) {
        ports.declare(PortType::Real, usize::from(self.inputs), 0);
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::CONSTANT
    }

    fn init(&mut self, _io: &mut BlockIo<'_>) {}

    fn compute(&mut self, _io: &mut BlockIo<'_>) {}

    fn try_make_constant(&mut self, _io: &mut BlockIo<'_>) -> bool {
        true
    }
}

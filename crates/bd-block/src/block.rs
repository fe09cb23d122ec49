//! The `Block` trait: the contract every diagram element implements.

use crate::{BlockIo, BlockPorts, CodeNames};

/// Scheduling-relevant properties of a block.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Capabilities {
    /// Output never changes after `init`.
    pub constant:         bool,
    /// Output may lag its input by one step, so the block can cut a
    /// feedback loop during scheduling.
    pub can_untie_loop:   bool,
    /// Integrates across the step; computed before explicit blocks, in
    /// reverse topological order.
    pub implicit_compute: bool,
}

impl Capabilities {
    pub const EXPLICIT: Capabilities = Capabilities {
        constant:         false,
        can_untie_loop:   false,
        implicit_compute: false,
    };

    pub const CONSTANT: Capabilities = Capabilities {
        constant: true,
        ..Capabilities::EXPLICIT
    };

    /// Loop-breaking integrator-like block.
    pub const INTEGRATING: Capabilities = Capabilities {
        can_untie_loop:   true,
        implicit_compute: true,
        ..Capabilities::EXPLICIT
    };
}

/// One stateful computational unit of a diagram.
///
/// A block owns its private state and mutates it only inside `init` and
/// `compute`.  It never owns output storage: outputs live in the scheme's
/// arenas and are reached through [`BlockIo`].
///
/// # Call order
///
/// 1. [`declare_ports`][Self::declare_ports] once, when the block is added.
/// 2. [`init`][Self::init] once per scheduling pass, in topological order at
///    time zero.  Upstream outputs are already initialized.
/// 3. [`try_make_constant`][Self::try_make_constant] once per scheduling pass.
/// 4. [`compute`][Self::compute] every step unless the block was folded.
///
/// # Example
///
/// ```rust,ignore
/// struct Gain(f64);
///
/// impl Block for Gain {
///     fn kind(&self) -> &'static str { "Gain" }
///     fn declare_ports(&self, ports: &mut BlockPorts) {
///         ports.declare(PortType::Real, 1, 1);
///     }
///     fn compute(&mut self, io: &mut BlockIo<'_>) {
///         io.set_real(0, self.0 * io.real(0));
///     }
/// }
/// ```
pub trait Block {
    /// Short kind name used in logs and diagnostics.
    fn kind(&self) -> &'static str;

    /// Register port sets (and external signal slots) on `ports`.
    fn declare_ports(&self, ports: &mut BlockPorts);

    fn capabilities(&self) -> Capabilities {
        Capabilities::EXPLICIT
    }

    /// Block whose first real output this block reads directly, outside
    /// the link graph.  The scheme binds it on every scheduling pass and
    /// adds no dependency edge, so the value read may be one step old.
    fn tap(&self) -> Option<u32> {
        None
    }

    /// Establish initial outputs.  Defaults to one `compute`.
    fn init(&mut self, io: &mut BlockIo<'_>) {
        self.compute(io);
    }

    /// Advance one step.
    fn compute(&mut self, io: &mut BlockIo<'_>);

    /// Mark own outputs constant and return `true` if the output can never
    /// change again.  Most combinational blocks answer
    /// `io.fold_when_inputs_constant()`.
    fn try_make_constant(&mut self, _io: &mut BlockIo<'_>) -> bool {
        false
    }

    // ── Source emission hooks ─────────────────────────────────────────────

    /// Persistent state declarations.
    fn print_memory(&self, _names: &CodeNames<'_>) -> String {
        String::new()
    }

    /// One-time setup statements.  Defaults to the per-step source.
    fn print_init(&self, names: &CodeNames<'_>) -> String {
        self.print_source(names)
    }

    /// Per-step update statements.
    fn print_source(&self, _names: &CodeNames<'_>) -> String {
        String::new()
    }
}

//! Memory allocator: lays out one output arena per port type.
//!
//! Blocks are visited in creation order and each receives, per declared
//! type, the next contiguous run of that type's arena.  Since blocks are
//! append-only, a re-run only appends: every offset assigned in an earlier
//! generation keeps naming the same output.  The external signal vectors
//! are laid out the same way.

use bd_block::{Memory, SignalBus};
use bd_core::{ConfigResult, PortType, TypeRegistry};
use tracing::debug;

use crate::node::Node;

/// Port totals of one allocation, per type in [`PortType::ALL`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortCounts {
    pub generation:     u64,
    pub inputs:         [usize; 5],
    pub outputs:        [usize; 5],
    /// Arena bytes over all types.
    pub bytes:          usize,
    pub signal_inputs:  usize,
    pub signal_outputs: usize,
}

impl PortCounts {
    #[inline]
    pub fn inputs_of(&self, ty: PortType) -> usize {
        self.inputs[ty.ordinal()]
    }

    #[inline]
    pub fn outputs_of(&self, ty: PortType) -> usize {
        self.outputs[ty.ordinal()]
    }

    pub fn total_inputs(&self) -> usize {
        self.inputs.iter().sum()
    }

    pub fn total_outputs(&self) -> usize {
        self.outputs.iter().sum()
    }
}

/// Assign output bases and signal bases to every node and size the arenas.
pub(crate) fn allocate(
    nodes:   &mut [Node],
    memory:  &mut Memory,
    signals: &mut SignalBus,
) -> ConfigResult<PortCounts> {
    let registry = TypeRegistry::global();
    let mut counts = PortCounts::default();

    for ty in PortType::ALL {
        let mut offset = 0usize;
        for node in nodes.iter_mut() {
            let (inputs, outputs) = match node.ports.set(ty) {
                Some(set) => (set.input_count(), set.output_count()),
                None => continue,
            };
            node.ports.set_output_base(ty, offset);
            offset += outputs;
            counts.inputs[ty.ordinal()] += inputs;
        }
        counts.outputs[ty.ordinal()] = offset;
        counts.bytes += offset * registry.size_of(ty.key())?;
        memory.arena_mut(ty).resize(offset);
    }

    let (mut sig_in, mut sig_out) = (0, 0);
    for node in nodes.iter_mut() {
        node.ports.set_signal_bases(sig_in, sig_out);
        sig_in += node.ports.signal_inputs();
        sig_out += node.ports.signal_outputs();
    }
    signals.resize(sig_in, sig_out);
    counts.signal_inputs = sig_in;
    counts.signal_outputs = sig_out;

    counts.generation = memory.bump_generation();
    debug!(
        generation = counts.generation,
        blocks = nodes.len(),
        outputs = counts.total_outputs(),
        bytes = counts.bytes,
        signals_in = sig_in,
        signals_out = sig_out,
        "arenas allocated"
    );
    Ok(counts)
}

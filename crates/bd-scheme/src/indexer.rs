//! Indexer: absolute and relative port tables over the allocated arenas.
//!
//! # Tables
//!
//! | Table               | Key                                  | Value              |
//! |---------------------|--------------------------------------|--------------------|
//! | absolute outputs    | scheme-wide output number            | `OutputRef`        |
//! | absolute inputs     | scheme-wide input number             | `InputRef`         |
//! | relative outputs    | `(type, n)`: n-th output of the type | `OutputRef`        |
//! | relative inputs     | `(type, n)`: n-th input of the type  | `InputRef`         |
//!
//! Absolute numbering is block-major (creation order) and, inside a block,
//! follows the block's own absolute port order.  Relative output `n` of a
//! type is the output at arena offset `n`.
//!
//! Indexing also rewrites every [`PortInfo`](bd_block::PortInfo) from
//! scratch, so it clears constant flags left by an earlier fold.

use bd_block::{Memory, OutputAddr, PortInfo};
use bd_core::{BlockId, PortType};
use tracing::debug;

use crate::node::Node;

/// An output together with its owning block.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OutputRef {
    pub block: BlockId,
    pub addr:  OutputAddr,
}

/// One input of one block, by relative position.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct InputRef {
    pub block: BlockId,
    pub ty:    PortType,
    pub rel:   u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortIndex {
    outputs:          Vec<OutputRef>,
    inputs:           Vec<InputRef>,
    outputs_by_type:  [Vec<OutputRef>; 5],
    inputs_by_type:   [Vec<InputRef>; 5],
}

impl PortIndex {
    pub fn absolute_output(&self, index: usize) -> Option<OutputRef> {
        self.outputs.get(index).copied()
    }

    pub fn absolute_input(&self, index: usize) -> Option<InputRef> {
        self.inputs.get(index).copied()
    }

    pub fn relative_output(&self, ty: PortType, index: usize) -> Option<OutputRef> {
        self.outputs_by_type[ty.ordinal()].get(index).copied()
    }

    pub fn relative_input(&self, ty: PortType, index: usize) -> Option<InputRef> {
        self.inputs_by_type[ty.ordinal()].get(index).copied()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count_of(&self, ty: PortType) -> usize {
        self.outputs_by_type[ty.ordinal()].len()
    }

    pub fn input_count_of(&self, ty: PortType) -> usize {
        self.inputs_by_type[ty.ordinal()].len()
    }
}

/// Rebuild the tables and every `PortInfo` from the current allocation.
pub(crate) fn index(nodes: &[Node], memory: &mut Memory) -> PortIndex {
    let mut idx = PortIndex::default();

    for (i, node) in nodes.iter().enumerate() {
        let block = BlockId(i as u32);
        for set in node.ports.sets() {
            let ty = set.ty;
            for rel in 0..set.output_count() {
                let Some(addr) = set.output_addr(rel) else { continue };
                let out = OutputRef { block, addr };
                idx.outputs.push(out);
                idx.outputs_by_type[ty.ordinal()].push(out);
                memory.arena_mut(ty).infos_mut()[addr.index()] = PortInfo {
                    is_constant:    false,
                    block,
                    port:           rel as u32,
                    relative_index: addr.offset,
                };
            }
        }
        for set in node.ports.sets() {
            for rel in 0..set.input_count() {
                let input = InputRef { block, ty: set.ty, rel: rel as u32 };
                idx.inputs.push(input);
                idx.inputs_by_type[set.ty.ordinal()].push(input);
            }
        }
    }

    debug!(outputs = idx.outputs.len(), inputs = idx.inputs.len(), "port index rebuilt");
    idx
}

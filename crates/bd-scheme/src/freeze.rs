//! Port freeze: pin a consumer input to a fixed value without touching the
//! wiring or the schedule.
//!
//! The override lives in a pinned slot of the input's type arena and the
//! input's source is swapped to point at it.  The table remembers the
//! source it displaced, which unfreeze restores verbatim.

use std::collections::BTreeMap;

use bd_block::InputSource;
use bd_core::{BlockId, ConfigError, PortType, SlotId};
use tracing::trace;

use crate::{Scheme, SchemeError, SchemeResult};

/// One frozen input.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FrozenPort {
    pub ty:       PortType,
    pub rel:      u32,
    /// Source to restore on unfreeze.
    pub original: InputSource,
    pub slot:     SlotId,
}

/// Frozen inputs keyed by `(block, absolute input port)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FreezeTable {
    ports: BTreeMap<(BlockId, u32), FrozenPort>,
}

impl FreezeTable {
    pub fn get(&self, block: BlockId, port: u32) -> Option<&FrozenPort> {
        self.ports.get(&(block, port))
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, u32, &FrozenPort)> {
        self.ports.iter().map(|(&(b, p), f)| (b, p, f))
    }

    /// If `(block, port)` is frozen, replace the source it will restore.
    pub(crate) fn redirect(&mut self, block: BlockId, port: u32, source: InputSource) -> bool {
        match self.ports.get_mut(&(block, port)) {
            Some(f) => {
                f.original = source;
                true
            }
            None => false,
        }
    }
}

impl Scheme {
    /// Force input `port` (absolute) of `block` to read `value`.
    ///
    /// Freezing an already frozen input only updates the value.  A block
    /// that was folded to a constant stays folded; freeze its consumers
    /// instead, or freeze before scheduling.
    pub fn freeze_port(&mut self, block: BlockId, port: u32, value: f64) -> SchemeResult<()> {
        let node = self
            .nodes
            .get_mut(block.index())
            .ok_or(ConfigError::BlockOutOfRange(block))?;
        let (ty, rel) = node.ports.input_location(port as usize).ok_or(
            SchemeError::PortOutOfRange { block, port, inputs: node.ports.input_count() },
        )?;

        if let Some(frozen) = self.frozen.get(block, port) {
            self.memory.arena_mut(frozen.ty).repin_f64(frozen.slot, value);
            trace!(%block, port, value, "frozen port updated");
            return Ok(());
        }

        let slot = self.memory.arena_mut(ty).pin_f64(value);
        let original = node
            .ports
            .set_input_source(ty, rel, InputSource::Pinned(slot))
            .unwrap_or_default();
        self.frozen.ports.insert(
            (block, port),
            FrozenPort { ty, rel: rel as u32, original, slot },
        );
        trace!(%block, port, value, %ty, "port frozen");
        Ok(())
    }

    /// Restore the source input `port` had before it was frozen.
    ///
    /// Returns `false` if the input was not frozen.
    pub fn unfreeze_port(&mut self, block: BlockId, port: u32) -> SchemeResult<bool> {
        let node = self
            .nodes
            .get_mut(block.index())
            .ok_or(ConfigError::BlockOutOfRange(block))?;
        if port as usize >= node.ports.input_count() {
            return Err(SchemeError::PortOutOfRange {
                block,
                port,
                inputs: node.ports.input_count(),
            });
        }
        let Some(frozen) = self.frozen.ports.remove(&(block, port)) else {
            return Ok(false);
        };
        node.ports.set_input_source(frozen.ty, frozen.rel as usize, frozen.original);
        self.memory.arena_mut(frozen.ty).unpin(frozen.slot);
        trace!(%block, port, "port unfrozen");
        Ok(true)
    }

    /// Unfreeze every frozen input.  Returns how many were restored.
    pub fn unfreeze_all_ports(&mut self) -> usize {
        let frozen = std::mem::take(&mut self.frozen.ports);
        let n = frozen.len();
        for ((block, _), f) in frozen {
            self.nodes[block.index()]
                .ports
                .set_input_source(f.ty, f.rel as usize, f.original);
            self.memory.arena_mut(f.ty).unpin(f.slot);
        }
        trace!(restored = n, "all ports unfrozen");
        n
    }

    pub fn frozen_ports(&self) -> &FreezeTable {
        &self.frozen
    }
}

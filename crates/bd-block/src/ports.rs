//! Port sets: how a block declares its typed inputs and outputs.
//!
//! A block registers at most one [`PortSet`] per [`PortType`] through
//! [`BlockPorts::declare`].  Ports are addressed two ways:
//!
//! - **relative**: `(type, n)`, the n-th input/output of that type;
//! - **absolute**: one flat number per block, walking the sets in ascending
//!   type-key order.  Absolute `i` always decomposes to exactly one
//!   `(type, relative)` pair.

use bd_core::PortType;

use crate::{InputSource, OutputAddr};

// ── PortSet ───────────────────────────────────────────────────────────────────

/// Inputs and outputs of one type for one block.
#[derive(Clone, Debug, PartialEq)]
pub struct PortSet {
    pub ty:       PortType,
    inputs:       Vec<InputSource>,
    output_count: usize,
    /// Offset of output 0 in the type arena; assigned by the allocator.
    output_base:  Option<usize>,
}

impl PortSet {
    fn new(ty: PortType) -> Self {
        Self {
            ty,
            inputs: Vec::new(),
            output_count: 0,
            output_base: None,
        }
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn inputs(&self) -> &[InputSource] {
        &self.inputs
    }

    #[inline(always)]
    pub fn input(&self, rel: usize) -> InputSource {
        self.inputs[rel]
    }

    pub fn output_base(&self) -> Option<usize> {
        self.output_base
    }

    /// Arena address of output `rel`, once allocated.
    #[inline]
    pub fn output_addr(&self, rel: usize) -> Option<OutputAddr> {
        if rel >= self.output_count {
            return None;
        }
        self.output_base.map(|base| OutputAddr::new(self.ty, base + rel))
    }
}

// ── BlockPorts ────────────────────────────────────────────────────────────────

/// All port sets of one block, ordered by type key, plus its external
/// signal requirements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockPorts {
    sets:        Vec<PortSet>,
    signals_in:  usize,
    signals_out: usize,
    signal_in_base:  usize,
    signal_out_base: usize,
    /// Output read directly through [`Block::tap`](crate::Block::tap).
    tap:             Option<OutputAddr>,
}

impl BlockPorts {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Declaration ───────────────────────────────────────────────────────

    /// Add `inputs` inputs and `outputs` outputs of type `ty`.
    ///
    /// Declaring the same type twice extends its set.
    pub fn declare(&mut self, ty: PortType, inputs: usize, outputs: usize) -> &mut Self {
        let pos = match self.sets.binary_search_by_key(&ty, |s| s.ty) {
            Ok(pos) => pos,
            Err(pos) => {
                self.sets.insert(pos, PortSet::new(ty));
                pos
            }
        };
        let set = &mut self.sets[pos];
        set.inputs.resize(set.inputs.len() + inputs, InputSource::Unbound);
        set.output_count += outputs;
        self
    }

    /// Claim slots in the external signal vectors.
    pub fn declare_signals(&mut self, inputs: usize, outputs: usize) -> &mut Self {
        self.signals_in += inputs;
        self.signals_out += outputs;
        self
    }

    // ── Set access ────────────────────────────────────────────────────────

    pub fn sets(&self) -> &[PortSet] {
        &self.sets
    }

    pub fn set(&self, ty: PortType) -> Option<&PortSet> {
        self.sets.iter().find(|s| s.ty == ty)
    }

    fn set_mut(&mut self, ty: PortType) -> Option<&mut PortSet> {
        self.sets.iter_mut().find(|s| s.ty == ty)
    }

    pub fn input_count(&self) -> usize {
        self.sets.iter().map(PortSet::input_count).sum()
    }

    pub fn output_count(&self) -> usize {
        self.sets.iter().map(PortSet::output_count).sum()
    }

    pub fn input_count_of(&self, ty: PortType) -> usize {
        self.set(ty).map_or(0, PortSet::input_count)
    }

    pub fn output_count_of(&self, ty: PortType) -> usize {
        self.set(ty).map_or(0, PortSet::output_count)
    }

    // ── Absolute ↔ relative ───────────────────────────────────────────────

    /// Decompose an absolute input number into `(type, relative)`.
    pub fn input_location(&self, abs: usize) -> Option<(PortType, usize)> {
        locate(&self.sets, abs, PortSet::input_count)
    }

    /// Decompose an absolute output number into `(type, relative)`.
    pub fn output_location(&self, abs: usize) -> Option<(PortType, usize)> {
        locate(&self.sets, abs, PortSet::output_count)
    }

    /// Absolute number of relative input `(ty, rel)`.
    pub fn input_absolute(&self, ty: PortType, rel: usize) -> Option<usize> {
        absolute(&self.sets, ty, rel, PortSet::input_count)
    }

    /// Absolute number of relative output `(ty, rel)`.
    pub fn output_absolute(&self, ty: PortType, rel: usize) -> Option<usize> {
        absolute(&self.sets, ty, rel, PortSet::output_count)
    }

    // ── Wiring ────────────────────────────────────────────────────────────

    pub fn input_source(&self, ty: PortType, rel: usize) -> Option<InputSource> {
        self.set(ty).and_then(|s| s.inputs.get(rel).copied())
    }

    /// Replace the source of input `(ty, rel)`; returns the previous source.
    pub fn set_input_source(
        &mut self,
        ty: PortType,
        rel: usize,
        source: InputSource,
    ) -> Option<InputSource> {
        let slot = self.set_mut(ty)?.inputs.get_mut(rel)?;
        Some(std::mem::replace(slot, source))
    }

    pub fn output_addr(&self, ty: PortType, rel: usize) -> Option<OutputAddr> {
        self.set(ty).and_then(|s| s.output_addr(rel))
    }

    /// Record where this block's outputs of type `ty` start in the arena.
    pub fn set_output_base(&mut self, ty: PortType, base: usize) {
        if let Some(set) = self.set_mut(ty) {
            set.output_base = Some(base);
        }
    }

    // ── External signals ──────────────────────────────────────────────────

    pub fn signal_inputs(&self) -> usize {
        self.signals_in
    }

    pub fn signal_outputs(&self) -> usize {
        self.signals_out
    }

    pub fn signal_in_base(&self) -> usize {
        self.signal_in_base
    }

    pub fn signal_out_base(&self) -> usize {
        self.signal_out_base
    }

    pub fn set_signal_bases(&mut self, in_base: usize, out_base: usize) {
        self.signal_in_base = in_base;
        self.signal_out_base = out_base;
    }

    // ── Tap ───────────────────────────────────────────────────────────────

    pub fn tap(&self) -> Option<OutputAddr> {
        self.tap
    }

    pub fn set_tap(&mut self, addr: Option<OutputAddr>) {
        self.tap = addr;
    }
}

fn locate(
    sets: &[PortSet],
    mut abs: usize,
    count: fn(&PortSet) -> usize,
) -> Option<(PortType, usize)> {
    for set in sets {
        let n = count(set);
        if abs < n {
            return Some((set.ty, abs));
        }
        abs -= n;
    }
    None
}

fn absolute(
    sets: &[PortSet],
    ty: PortType,
    rel: usize,
    count: fn(&PortSet) -> usize,
) -> Option<usize> {
    let mut base = 0;
    for set in sets {
        if set.ty == ty {
            return (rel < count(set)).then_some(base + rel);
        }
        base += count(set);
    }
    None
}

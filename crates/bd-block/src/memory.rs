//! Per-type output arenas.
//!
//! # Design
//!
//! Every output of one [`PortType`] lives in one contiguous `Vec<T>`
//! ([`TypedArena`]).  A block never owns output storage; it is handed a base
//! offset into the arena of each type it declares.  Inputs do not hold
//! addresses either: they hold an [`OutputAddr`] (type + offset) that is
//! resolved against the arena at the moment it is read.  Offsets are assigned
//! in block creation order and blocks are append-only, so an address recorded
//! in one allocation generation still names the same output in the next.
//!
//! Each arena also owns a small pool of *pinned* values.  Port freeze parks
//! its override value there and points the frozen input at the slot.
//!
//! [`Memory`] holds one arena per type and exposes them either statically
//! (`PortValue::arena`) or through the object-safe [`ErasedArena`] table
//! keyed by `PortType`, which is what the allocator and indexer walk.

use bd_core::{BlockId, PortType, SlotId};

// ── Addresses ─────────────────────────────────────────────────────────────────

/// Location of one output: its type arena and the offset inside it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct OutputAddr {
    pub ty:     PortType,
    pub offset: u32,
}

impl OutputAddr {
    pub fn new(ty: PortType, offset: usize) -> Self {
        Self { ty, offset: offset as u32 }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.offset as usize
    }
}

/// What an input currently reads from.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum InputSource {
    /// Never wired.  Reads the type's default value and is never constant.
    #[default]
    Unbound,
    /// Reads a producer's output.
    Wired(OutputAddr),
    /// Reads an override value pinned in the arena of the input's type.
    Pinned(SlotId),
}

/// Per-output metadata rebuilt by the indexer on every allocation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PortInfo {
    /// Set once the owning block has been folded to a constant.
    pub is_constant:    bool,
    pub block:          BlockId,
    /// Output port number within the owning block's set of this type.
    pub port:           u32,
    /// Ordinal of this output within the type arena.
    pub relative_index: u32,
}

impl Default for PortInfo {
    fn default() -> Self {
        Self {
            is_constant:    false,
            block:          BlockId::INVALID,
            port:           u32::MAX,
            relative_index: u32::MAX,
        }
    }
}

// ── PortValue ─────────────────────────────────────────────────────────────────

/// An element type that can live in an arena.
pub trait PortValue: Copy + Default + PartialEq + std::fmt::Debug + 'static {
    const TYPE: PortType;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;

    fn arena(memory: &Memory) -> &TypedArena<Self>;
    fn arena_mut(memory: &mut Memory) -> &mut TypedArena<Self>;
}

macro_rules! port_value {
    ($t:ty, $variant:ident, $field:ident, |$v:ident| $from:expr, |$s:ident| $to:expr) => {
        impl PortValue for $t {
            const TYPE: PortType = PortType::$variant;

            #[inline]
            fn from_f64($v: f64) -> Self {
                $from
            }

            #[inline]
            fn to_f64(self) -> f64 {
                let $s = self;
                $to
            }

            #[inline(always)]
            fn arena(memory: &Memory) -> &TypedArena<Self> {
                &memory.$field
            }

            #[inline(always)]
            fn arena_mut(memory: &mut Memory) -> &mut TypedArena<Self> {
                &mut memory.$field
            }
        }
    };
}

port_value!(bool, Bool, bools, |v| v != 0.0, |s| if s { 1.0 } else { 0.0 });
port_value!(u8, Byte, bytes, |v| v as u8, |s| s as f64);
port_value!(i32, Int, ints, |v| v as i32, |s| s as f64);
port_value!(f64, Real, reals, |v| v, |s| s);
port_value!(i64, Time, times, |v| v as i64, |s| s as f64);

// ── TypedArena ────────────────────────────────────────────────────────────────

/// Outputs and pinned override values of one element type.
#[derive(Clone, Debug, Default)]
pub struct TypedArena<T: PortValue> {
    values: Vec<T>,
    infos:  Vec<PortInfo>,
    pinned: Vec<T>,
    free:   Vec<SlotId>,
}

impl<T: PortValue> TypedArena<T> {
    /// Output values, indexed by arena offset.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline(always)]
    pub fn get(&self, offset: usize) -> T {
        self.values[offset]
    }

    #[inline(always)]
    pub fn set(&mut self, offset: usize, value: T) {
        self.values[offset] = value;
    }

    #[inline(always)]
    pub fn pinned(&self, slot: SlotId) -> T {
        self.pinned[slot.index()]
    }

    /// Store `value` in a free pinned slot (reusing released ones first).
    pub fn pin(&mut self, value: T) -> SlotId {
        match self.free.pop() {
            Some(slot) => {
                self.pinned[slot.index()] = value;
                slot
            }
            None => {
                self.pinned.push(value);
                SlotId(self.pinned.len() as u32 - 1)
            }
        }
    }

    pub fn repin(&mut self, slot: SlotId, value: T) {
        self.pinned[slot.index()] = value;
    }

    /// Release a slot.  Its value is reset so stale overrides never leak.
    pub fn unpin(&mut self, slot: SlotId) {
        self.pinned[slot.index()] = T::default();
        self.free.push(slot);
    }
}

// ── ErasedArena ───────────────────────────────────────────────────────────────

/// Type-erased view of one arena, selected at runtime by [`PortType`].
pub trait ErasedArena {
    fn ty(&self) -> PortType;

    /// Number of outputs.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow or shrink to `len` outputs.  Existing values keep their offsets.
    fn resize(&mut self, len: usize);

    /// Reset every output to the type's default.  Pinned values are kept.
    fn clear_values(&mut self);

    fn infos(&self) -> &[PortInfo];
    fn infos_mut(&mut self) -> &mut [PortInfo];

    fn read_f64(&self, offset: usize) -> f64;
    fn write_f64(&mut self, offset: usize, value: f64);

    fn pin_f64(&mut self, value: f64) -> SlotId;
    fn repin_f64(&mut self, slot: SlotId, value: f64);
    fn pinned_f64(&self, slot: SlotId) -> f64;
    fn unpin(&mut self, slot: SlotId);

    /// Pinned slots currently in use.
    fn live_pins(&self) -> usize;
}

impl<T: PortValue> ErasedArena for TypedArena<T> {
    fn ty(&self) -> PortType {
        T::TYPE
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn resize(&mut self, len: usize) {
        self.values.resize(len, T::default());
        self.infos.resize(len, PortInfo::default());
    }

    fn clear_values(&mut self) {
        self.values.fill(T::default());
    }

    fn infos(&self) -> &[PortInfo] {
        &self.infos
    }

    fn infos_mut(&mut self) -> &mut [PortInfo] {
        &mut self.infos
    }

    fn read_f64(&self, offset: usize) -> f64 {
        self.values[offset].to_f64()
    }

    fn write_f64(&mut self, offset: usize, value: f64) {
        self.values[offset] = T::from_f64(value);
    }

    fn pin_f64(&mut self, value: f64) -> SlotId {
        self.pin(T::from_f64(value))
    }

    fn repin_f64(&mut self, slot: SlotId, value: f64) {
        self.repin(slot, T::from_f64(value));
    }

    fn pinned_f64(&self, slot: SlotId) -> f64 {
        self.pinned(slot).to_f64()
    }

    fn unpin(&mut self, slot: SlotId) {
        TypedArena::unpin(self, slot);
    }

    fn live_pins(&self) -> usize {
        self.pinned.len() - self.free.len()
    }
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// One arena per port type, plus the allocation generation counter.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    pub bools: TypedArena<bool>,
    pub bytes: TypedArena<u8>,
    pub ints:  TypedArena<i32>,
    pub reals: TypedArena<f64>,
    pub times: TypedArena<i64>,
    generation: u64,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(&self, ty: PortType) -> &dyn ErasedArena {
        match ty {
            PortType::Bool => &self.bools,
            PortType::Byte => &self.bytes,
            PortType::Int  => &self.ints,
            PortType::Real => &self.reals,
            PortType::Time => &self.times,
        }
    }

    pub fn arena_mut(&mut self, ty: PortType) -> &mut dyn ErasedArena {
        match ty {
            PortType::Bool => &mut self.bools,
            PortType::Byte => &mut self.bytes,
            PortType::Int  => &mut self.ints,
            PortType::Real => &mut self.reals,
            PortType::Time => &mut self.times,
        }
    }

    /// Reset all outputs of every type (see [`ErasedArena::clear_values`]).
    pub fn clear_values(&mut self) {
        for ty in PortType::ALL {
            self.arena_mut(ty).clear_values();
        }
    }

    /// Typed read of an output.
    #[inline(always)]
    pub fn get<T: PortValue>(&self, addr: OutputAddr) -> T {
        T::arena(self).get(addr.index())
    }

    /// Metadata of an output, if the address is inside its arena.
    pub fn info(&self, addr: OutputAddr) -> Option<&PortInfo> {
        self.arena(addr.ty).infos().get(addr.index())
    }

    /// Value read by an input with the given source, as `f64`.
    pub fn read_source_f64(&self, ty: PortType, source: InputSource) -> f64 {
        match source {
            InputSource::Unbound => 0.0,
            InputSource::Wired(addr) => self.arena(addr.ty).read_f64(addr.index()),
            InputSource::Pinned(slot) => self.arena(ty).pinned_f64(slot),
        }
    }

    /// Allocation generation: bumped every time the allocator lays out arenas.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

//! `BlockIo` — the view a block gets while it runs.
//!
//! A block's `init`/`compute` receive a `BlockIo` bundling its own port
//! table, the shared arenas, the external signal bus, and the clock.  All
//! port numbers taken here are *relative* (per type); inputs resolve their
//! [`InputSource`] against the arenas on every read, so rewiring or freezing
//! between steps is observed on the next read without any pointer fix-up.

use bd_core::{SimClock, SimTime};

use crate::{BlockPorts, InputSource, Memory, PortValue, SignalBus};

/// Read/write access for one block during one call.
pub struct BlockIo<'a> {
    ports:   &'a BlockPorts,
    memory:  &'a mut Memory,
    signals: &'a mut SignalBus,
    clock:   &'a SimClock,
}

impl<'a> BlockIo<'a> {
    pub fn new(
        ports:   &'a BlockPorts,
        memory:  &'a mut Memory,
        signals: &'a mut SignalBus,
        clock:   &'a SimClock,
    ) -> Self {
        Self { ports, memory, signals, clock }
    }

    pub fn ports(&self) -> &BlockPorts {
        self.ports
    }

    // ── Typed ports ───────────────────────────────────────────────────────

    /// Current value of input `rel` of type `T`.
    #[inline]
    pub fn input<T: PortValue>(&self, rel: usize) -> T {
        match self.source::<T>(rel) {
            InputSource::Unbound => T::default(),
            InputSource::Wired(addr) => T::arena(&*self.memory).get(addr.index()),
            InputSource::Pinned(slot) => T::arena(&*self.memory).pinned(slot),
        }
    }

    /// Current value of this block's own output `rel`.  An output the
    /// allocator has not placed reads as the type's default.
    #[inline]
    pub fn output<T: PortValue>(&self, rel: usize) -> T {
        match self.offset::<T>(rel) {
            Some(offset) => T::arena(&*self.memory).get(offset),
            None => T::default(),
        }
    }

    /// Write output `rel`.  Writes to an unplaced output are dropped.
    #[inline]
    pub fn set_output<T: PortValue>(&mut self, rel: usize, value: T) {
        if let Some(offset) = self.offset::<T>(rel) {
            T::arena_mut(&mut *self.memory).set(offset, value);
        }
    }

    // ── Real shorthands (most blocks use a single real set) ──────────────

    #[inline]
    pub fn real(&self, rel: usize) -> f64 {
        self.input::<f64>(rel)
    }

    #[inline]
    pub fn output_real(&self, rel: usize) -> f64 {
        self.output::<f64>(rel)
    }

    #[inline]
    pub fn set_real(&mut self, rel: usize, value: f64) {
        self.set_output::<f64>(rel, value);
    }

    /// Logical view of a real input: anything non-zero is true.
    #[inline]
    pub fn flag(&self, rel: usize) -> bool {
        self.real(rel) != 0.0
    }

    #[inline]
    pub fn set_flag(&mut self, rel: usize, value: bool) {
        self.set_real(rel, if value { 1.0 } else { 0.0 });
    }

    // ── Constant folding ──────────────────────────────────────────────────

    /// `true` if input `rel` of type `T` reads a folded constant.
    pub fn input_is_constant<T: PortValue>(&self, rel: usize) -> bool {
        match self.source::<T>(rel) {
            InputSource::Wired(addr) => self
                .memory
                .info(addr)
                .is_some_and(|info| info.is_constant),
            InputSource::Unbound | InputSource::Pinned(_) => false,
        }
    }

    /// `true` if every input of every type reads a folded constant.
    pub fn all_inputs_constant(&self) -> bool {
        self.ports.sets().iter().all(|set| {
            set.inputs().iter().all(|source| match source {
                InputSource::Wired(addr) => {
                    self.memory.info(*addr).is_some_and(|info| info.is_constant)
                }
                InputSource::Unbound | InputSource::Pinned(_) => false,
            })
        })
    }

    /// Flag every output of this block as constant.
    pub fn mark_outputs_constant(&mut self) {
        let ports = self.ports;
        for set in ports.sets() {
            let Some(base) = set.output_base() else { continue };
            let infos = self.memory.arena_mut(set.ty).infos_mut();
            for info in &mut infos[base..base + set.output_count()] {
                info.is_constant = true;
            }
        }
    }

    /// The usual folding rule: fold iff all inputs are constant.
    pub fn fold_when_inputs_constant(&mut self) -> bool {
        if self.all_inputs_constant() {
            self.mark_outputs_constant();
            true
        } else {
            false
        }
    }

    // ── Time ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn time(&self) -> SimTime {
        self.clock.now
    }

    /// Current time in seconds.
    #[inline]
    pub fn secs(&self) -> f64 {
        self.clock.secs()
    }

    /// Step length in seconds.
    #[inline]
    pub fn dt_sec(&self) -> f64 {
        self.clock.dt_sec
    }

    // ── Tap ───────────────────────────────────────────────────────────────

    /// Current value of the tapped output; `0` while no tap is bound.
    pub fn tapped(&self) -> f64 {
        self.ports
            .tap()
            .map_or(0.0, |addr| self.memory.arena(addr.ty).read_f64(addr.index()))
    }

    // ── External signals ──────────────────────────────────────────────────

    #[inline]
    pub fn signal_in(&self, rel: usize) -> f64 {
        self.signals.input(self.ports.signal_in_base() + rel)
    }

    #[inline]
    pub fn set_signal_out(&mut self, rel: usize, value: f64) {
        self.signals.set_output(self.ports.signal_out_base() + rel, value);
    }

    // ── Internals ─────────────────────────────────────────────────────────

    #[inline(always)]
    fn source<T: PortValue>(&self, rel: usize) -> InputSource {
        self.ports
            .input_source(T::TYPE, rel)
            .unwrap_or(InputSource::Unbound)
    }

    /// Arena offset of own output `rel`; `None` before allocation or past
    /// the declared count.
    #[inline(always)]
    fn offset<T: PortValue>(&self, rel: usize) -> Option<usize> {
        self.ports.output_addr(T::TYPE, rel).map(|addr| addr.index())
    }
}

//! Names used by the per-block source emission hooks.
//!
//! Generated code addresses ports the same way the runtime does: every
//! output of type `T` is `<codename>[offset]` in that type's arena, and every
//! input is spelled as the output it is wired to.  Per-instance state
//! variables carry the block id as a suffix so two blocks of the same kind
//! never collide.

use bd_core::{BlockId, PortType};

use crate::{BlockPorts, InputSource, Memory};

/// Name of the emitted time variable (microseconds, `long long`).
pub const TIME_VAR: &str = "time";
/// Emitted expression for the current time in seconds.
pub const TIME_SECS: &str = "(time * 1e-6)";
/// Name of the emitted step-length variable (seconds, `double`).
pub const DT_VAR: &str = "dt_sec";
/// Names of the emitted external signal arrays.
pub const SIGNALS_IN: &str = "input_signals";
pub const SIGNALS_OUT: &str = "output_signals";

/// Naming context for one block.
pub struct CodeNames<'a> {
    id:     BlockId,
    ports:  &'a BlockPorts,
    memory: &'a Memory,
}

impl<'a> CodeNames<'a> {
    pub fn new(id: BlockId, ports: &'a BlockPorts, memory: &'a Memory) -> Self {
        Self { id, ports, memory }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Expression reading input `rel` of type `ty`.
    ///
    /// Frozen inputs are spelled as their pinned literal; unbound ones as `0`.
    pub fn input(&self, ty: PortType, rel: usize) -> String {
        match self.ports.input_source(ty, rel) {
            Some(InputSource::Wired(addr)) => {
                format!("{}[{}]", addr.ty.descriptor().codename, addr.offset)
            }
            Some(source @ InputSource::Pinned(_)) => {
                literal(self.memory.read_source_f64(ty, source))
            }
            Some(InputSource::Unbound) | None => "0".to_string(),
        }
    }

    /// Lvalue of output `rel` of type `ty`.
    pub fn output(&self, ty: PortType, rel: usize) -> String {
        match self.ports.output_addr(ty, rel) {
            Some(addr) => format!("{}[{}]", ty.descriptor().codename, addr.offset),
            None => format!("/* unallocated {ty} output {rel} */"),
        }
    }

    pub fn real_in(&self, rel: usize) -> String {
        self.input(PortType::Real, rel)
    }

    pub fn real_out(&self, rel: usize) -> String {
        self.output(PortType::Real, rel)
    }

    /// Per-instance variable name: `name_<id>`.
    pub fn var(&self, name: &str) -> String {
        format!("{name}_{}", self.id.0)
    }

    /// Expression reading the tapped output, `0` while unbound.
    pub fn tapped(&self) -> String {
        match self.ports.tap() {
            Some(addr) => format!("{}[{}]", addr.ty.descriptor().codename, addr.offset),
            None => "0".to_string(),
        }
    }

    pub fn signal_in(&self, rel: usize) -> String {
        format!("{SIGNALS_IN}[{}]", self.ports.signal_in_base() + rel)
    }

    pub fn signal_out(&self, rel: usize) -> String {
        format!("{SIGNALS_OUT}[{}]", self.ports.signal_out_base() + rel)
    }
}

/// Spell an `f64` so the emitted code parses it back bit-exactly.
pub fn literal(value: f64) -> String {
    if value.is_nan() {
        "NAN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INFINITY".to_string() } else { "-INFINITY".to_string() }
    } else {
        format!("{value:?}")
    }
}

//! `bd-block` — the block contract and the typed memory it runs against.
//!
//! # What lives here
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`block`]     | `Block` trait, `Capabilities`                               |
//! | [`ports`]     | `PortSet`, `BlockPorts` (absolute/relative addressing)      |
//! | [`memory`]    | `Memory`, `TypedArena<T>`, `ErasedArena`, `PortInfo`, `OutputAddr`, `InputSource`, `PortValue` |
//! | [`io`]        | `BlockIo` — per-call view handed to `init`/`compute`        |
//! | [`signals`]   | `SignalBus` — external signal vectors                       |
//! | [`codegen`]   | `CodeNames` — naming helpers for the emission hooks         |

pub mod block;
pub mod codegen;
pub mod io;
pub mod memory;
pub mod ports;
pub mod signals;


pub use block::{Block, Capabilities};
pub use codegen::CodeNames;
pub use io::BlockIo;
pub use memory::{ErasedArena, InputSource, Memory, OutputAddr, PortInfo, PortValue, TypedArena};
pub use ports::{BlockPorts, PortSet};
pub use signals::SignalBus;

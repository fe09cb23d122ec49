//! `bd-core` — foundational types for the block-diagram simulation engine.
//!
//! This crate is a dependency of every other `bd-*` crate.  It has no `bd-*`
//! dependencies and only `thiserror` externally (plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `BlockId`, `SlotId`                                   |
//! | [`links`]       | `AbsoluteLink`, `RelativeLink`, `BlockLink`, `RelativeBlockLink` |
//! | [`time`]        | `SimTime`, `SimClock`, `TICKS_PER_SEC`                |
//! | [`types`]       | `PortType`, `TypeDescriptor`, `TypeRegistry`          |
//! | [`config`]      | `EngineConfig`                                        |
//! | [`error`]       | `ConfigError`, `ConfigResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, time and config.    |

pub mod config;
pub mod error;
pub mod ids;
pub mod links;
pub mod time;
pub mod types;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use error::{ConfigError, ConfigResult};
pub use ids::{BlockId, SlotId};
pub use links::{AbsoluteLink, BlockLink, RelativeBlockLink, RelativeLink};
pub use time::{SimClock, SimTime, TICKS_PER_SEC};
pub use types::{PortType, TypeDescriptor, TypeRegistry};

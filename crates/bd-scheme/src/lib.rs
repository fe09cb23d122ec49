//! `bd-scheme` — the scheme host: build, wire, schedule, and run a block
//! diagram.
//!
//! # Pipeline
//!
//! ```text
//! add* / assign        append blocks (ids = creation order)
//!   │
//!   ▼  every link batch and every schedule() call
//! allocate             one arena per port type, offsets in creation order
//! index                absolute / relative port tables, PortInfo
//! bind                 inputs → producer outputs, producer → consumer edges
//! schedule             loop-tolerant topological order, init, fold,
//!                      compute order = implicit reversed ++ explicit
//!   │
//!   ▼
//! compute / compute_sync   fixed-step loop over the compute order
//! freeze / unfreeze        input overrides between steps
//! ```
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`allocator`]   | arena layout, `PortCounts`                            |
//! | [`indexer`]     | `PortIndex`, `OutputRef`, `InputRef`                  |
//! | [`binder`]      | `Link` (four addressing modes), `Wire`                |
//! | [`graph`]       | `DependencyGraph`                                     |
//! | [`scheduler`]   | `topological_order`, `ExecutionPlan`                  |
//! | [`executor`]    | `compute`, `compute_sync`                             |
//! | [`freeze`]      | `freeze_port`, `unfreeze_port`, `FreezeTable`         |
//! | [`scheme`]      | `Scheme`, `Phase`                                     |
//! | [`builder`]     | `SchemeBuilder`                                       |
//! | [`observer`]    | `SchemeObserver`, `NoopObserver`                      |
//! | [`emit`]        | `emit_source`, `GeneratedSource`                      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut scheme = Scheme::new(&EngineConfig::with_step(0.001))?;
//! let r = scheme.add_constant(1.0)?;
//! let s = scheme.add_summator(&[1.0, -1.0])?;
//! let i = scheme.add_integrator(1.0, 0.0)?;
//! scheme.set_block_links(&[
//!     BlockLink::new(r.0, 0, s.0, 0),
//!     BlockLink::new(i.0, 0, s.0, 1),
//!     BlockLink::new(s.0, 0, i.0, 0),
//! ])?;
//! scheme.compute(1000)?;
//! ```

pub mod add;
pub mod allocator;
pub mod binder;
pub mod builder;
pub mod emit;
pub mod error;
pub mod executor;
pub mod freeze;
pub mod graph;
pub mod indexer;
pub mod observer;
pub mod scheduler;
pub mod scheme;

mod node;

#[cfg(test)]
mod tests;

pub use allocator::PortCounts;
pub use binder::{BindContext, Link, Wire};
pub use builder::SchemeBuilder;
pub use emit::GeneratedSource;
pub use error::{SchemeError, SchemeResult};
pub use freeze::{FreezeTable, FrozenPort};
pub use graph::DependencyGraph;
pub use indexer::{InputRef, OutputRef, PortIndex};
pub use observer::{NoopObserver, SchemeObserver};
pub use scheduler::{topological_order, ExecutionPlan};
pub use scheme::{Phase, Scheme};

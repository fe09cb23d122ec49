//! Link binder: turns link descriptions into wired inputs and graph edges.
//!
//! Every addressing mode resolves to the same [`Wire`]: a producer output
//! address and a consumer input `(type, relative)`.  A batch is resolved
//! completely before anything is applied, so a bad link leaves the scheme
//! untouched.

use bd_block::{InputSource, OutputAddr};
use bd_core::{
    AbsoluteLink, BlockId, BlockLink, ConfigError, ConfigResult, PortType, RelativeBlockLink,
    RelativeLink, TypeRegistry,
};

use crate::freeze::FreezeTable;
use crate::graph::DependencyGraph;
use crate::indexer::{InputRef, OutputRef, PortIndex};
use crate::node::Node;

/// A resolved link.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Wire {
    pub producer: BlockId,
    pub from:     OutputAddr,
    pub consumer: BlockId,
    pub ty:       PortType,
    pub rel:      u32,
}

/// What a link description can be resolved against.
pub struct BindContext<'a> {
    pub(crate) nodes: &'a [Node],
    pub(crate) index: &'a PortIndex,
}

/// A link description in one of the four addressing modes.
pub trait Link {
    fn resolve(&self, ctx: &BindContext<'_>) -> ConfigResult<Wire>;
}

impl Link for AbsoluteLink {
    fn resolve(&self, ctx: &BindContext<'_>) -> ConfigResult<Wire> {
        let out = ctx.index.absolute_output(self.output as usize).ok_or(
            ConfigError::LinkOutOfRange {
                what:  "absolute output",
                index: self.output as usize,
                len:   ctx.index.output_count(),
            },
        )?;
        let input = ctx.index.absolute_input(self.input as usize).ok_or(
            ConfigError::LinkOutOfRange {
                what:  "absolute input",
                index: self.input as usize,
                len:   ctx.index.input_count(),
            },
        )?;
        wire(out, input)
    }
}

impl Link for RelativeLink {
    fn resolve(&self, ctx: &BindContext<'_>) -> ConfigResult<Wire> {
        let ty = TypeRegistry::global().resolve(self.type_key)?;
        let out = ctx.index.relative_output(ty, self.output as usize).ok_or(
            ConfigError::LinkOutOfRange {
                what:  "relative output",
                index: self.output as usize,
                len:   ctx.index.output_count_of(ty),
            },
        )?;
        let input = ctx.index.relative_input(ty, self.input as usize).ok_or(
            ConfigError::LinkOutOfRange {
                what:  "relative input",
                index: self.input as usize,
                len:   ctx.index.input_count_of(ty),
            },
        )?;
        wire(out, input)
    }
}

impl Link for BlockLink {
    fn resolve(&self, ctx: &BindContext<'_>) -> ConfigResult<Wire> {
        let producer = node(ctx, self.producer)?;
        let (out_ty, out_rel) = producer
            .ports
            .output_location(self.producer_port as usize)
            .ok_or(ConfigError::LinkOutOfRange {
                what:  "producer port",
                index: self.producer_port as usize,
                len:   producer.ports.output_count(),
            })?;
        let consumer = node(ctx, self.consumer)?;
        let (in_ty, in_rel) = consumer
            .ports
            .input_location(self.consumer_port as usize)
            .ok_or(ConfigError::LinkOutOfRange {
                what:  "consumer port",
                index: self.consumer_port as usize,
                len:   consumer.ports.input_count(),
            })?;
        block_wire(ctx, self.producer, out_ty, out_rel, self.consumer, in_ty, in_rel)
    }
}

impl Link for RelativeBlockLink {
    fn resolve(&self, ctx: &BindContext<'_>) -> ConfigResult<Wire> {
        let ty = TypeRegistry::global().resolve(self.type_key)?;
        let producer = node(ctx, self.producer)?;
        let out_rel = self.producer_port as usize;
        if out_rel >= producer.ports.output_count_of(ty) {
            return Err(ConfigError::LinkOutOfRange {
                what:  "producer port",
                index: out_rel,
                len:   producer.ports.output_count_of(ty),
            });
        }
        let consumer = node(ctx, self.consumer)?;
        let in_rel = self.consumer_port as usize;
        if in_rel >= consumer.ports.input_count_of(ty) {
            return Err(ConfigError::LinkOutOfRange {
                what:  "consumer port",
                index: in_rel,
                len:   consumer.ports.input_count_of(ty),
            });
        }
        block_wire(ctx, self.producer, ty, out_rel, self.consumer, ty, in_rel)
    }
}

// ── Resolution helpers ────────────────────────────────────────────────────────

fn node<'a>(ctx: &BindContext<'a>, id: u32) -> ConfigResult<&'a Node> {
    ctx.nodes.get(id as usize).ok_or(ConfigError::BlockOutOfRange(BlockId(id)))
}

fn wire(out: OutputRef, input: InputRef) -> ConfigResult<Wire> {
    if out.addr.ty != input.ty {
        return Err(ConfigError::TypeMismatch { output: out.addr.ty, input: input.ty });
    }
    Ok(Wire {
        producer: out.block,
        from:     out.addr,
        consumer: input.block,
        ty:       input.ty,
        rel:      input.rel,
    })
}

fn block_wire(
    ctx:      &BindContext<'_>,
    producer: u32,
    out_ty:   PortType,
    out_rel:  usize,
    consumer: u32,
    in_ty:    PortType,
    in_rel:   usize,
) -> ConfigResult<Wire> {
    if out_ty != in_ty {
        return Err(ConfigError::TypeMismatch { output: out_ty, input: in_ty });
    }
    let from = ctx.nodes[producer as usize]
        .ports
        .output_addr(out_ty, out_rel)
        .ok_or(ConfigError::LinkOutOfRange { what: "producer port", index: out_rel, len: 0 })?;
    Ok(Wire {
        producer: BlockId(producer),
        from,
        consumer: BlockId(consumer),
        ty:       in_ty,
        rel:      in_rel as u32,
    })
}

// ── Apply ─────────────────────────────────────────────────────────────────────

/// Point each consumer input at its producer and add the edges.
///
/// A frozen input keeps reading its pinned value; the new source becomes
/// the one restored on unfreeze.
pub(crate) fn apply(
    wires:  &[Wire],
    nodes:  &mut [Node],
    graph:  &mut DependencyGraph,
    frozen: &mut FreezeTable,
) {
    for w in wires {
        let ports = &mut nodes[w.consumer.index()].ports;
        let source = InputSource::Wired(w.from);
        let redirected = ports
            .input_absolute(w.ty, w.rel as usize)
            .is_some_and(|abs| frozen.redirect(w.consumer, abs as u32, source));
        if !redirected {
            ports.set_input_source(w.ty, w.rel as usize, source);
        }
        graph.add_edge(w.producer, w.consumer);
    }
}

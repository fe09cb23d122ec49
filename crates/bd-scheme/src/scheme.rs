//! The `Scheme` struct: block table, arenas, wiring, and lifecycle.

use bd_assembly::decode;
use bd_block::{Block, InputSource, Memory, OutputAddr, PortInfo, SignalBus};
use bd_blocks::BlockSpec;
use bd_core::{
    AbsoluteLink, BlockId, BlockLink, ConfigError, ConfigResult, EngineConfig, PortType,
    RelativeBlockLink, RelativeLink, SimClock, SimTime,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::allocator::{allocate, PortCounts};
use crate::binder::{apply, BindContext, Link, Wire};
use crate::freeze::FreezeTable;
use crate::graph::DependencyGraph;
use crate::indexer::{index, OutputRef, PortIndex};
use crate::node::Node;
use crate::scheduler::{schedule, topological_order, ExecutionPlan};
use crate::{SchemeError, SchemeResult};

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Build phase / run phase.
///
/// Adding a block moves the scheme back to `Assembly`; a successful link
/// batch or [`Scheme::schedule`] moves it to `Ready`.  Only a `Ready`
/// scheme can be computed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    Assembly,
    Ready,
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Everything a failed [`Scheme::assign`] may have touched.  Nodes are
/// only appended, so truncating to `nodes` undoes them.
struct Snapshot {
    nodes:   usize,
    memory:  Memory,
    signals: SignalBus,
    graph:   DependencyGraph,
    index:   PortIndex,
    counts:  PortCounts,
    phase:   Phase,
}

impl Snapshot {
    fn take(scheme: &Scheme) -> Self {
        Self {
            nodes:   scheme.nodes.len(),
            memory:  scheme.memory.clone(),
            signals: scheme.signals.clone(),
            graph:   scheme.graph.clone(),
            index:   scheme.index.clone(),
            counts:  scheme.counts.clone(),
            phase:   scheme.phase,
        }
    }

    fn restore(self, scheme: &mut Scheme) {
        scheme.nodes.truncate(self.nodes);
        scheme.memory = self.memory;
        scheme.signals = self.signals;
        scheme.graph = self.graph;
        scheme.index = self.index;
        scheme.counts = self.counts;
        scheme.phase = self.phase;
    }
}

// ── Scheme ────────────────────────────────────────────────────────────────────

/// A block diagram and everything needed to run it.
///
/// ```text
/// add*/assign ──► set_*_links ──► compute / compute_sync
///                 (allocate → index → bind → schedule)
/// ```
///
/// Create directly with [`Scheme::new`] or through
/// [`SchemeBuilder`][crate::SchemeBuilder].
pub struct Scheme {
    pub(crate) clock:      SimClock,
    pub(crate) nodes:      Vec<Node>,
    pub(crate) memory:     Memory,
    pub(crate) signals:    SignalBus,
    pub(crate) graph:      DependencyGraph,
    pub(crate) index:      PortIndex,
    pub(crate) counts:     PortCounts,
    pub(crate) plan:       ExecutionPlan,
    pub(crate) phase:      Phase,
    pub(crate) frozen:     FreezeTable,
    pub(crate) parameters: FxHashMap<String, f64>,
}

impl Scheme {
    /// Empty scheme with the config's step sizes and parameters.
    pub fn new(config: &EngineConfig) -> ConfigResult<Self> {
        let clock = config.make_clock()?;
        Ok(Self {
            clock,
            nodes:      Vec::new(),
            memory:     Memory::new(),
            signals:    SignalBus::default(),
            graph:      DependencyGraph::new(),
            index:      PortIndex::default(),
            counts:     PortCounts::default(),
            plan:       ExecutionPlan::default(),
            phase:      Phase::Assembly,
            frozen:     FreezeTable::default(),
            parameters: config.parameters.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        })
    }

    // ── Assembly ──────────────────────────────────────────────────────────

    /// Append a block; its id is its position in creation order.
    pub fn add_block(&mut self, block: Box<dyn Block>) -> BlockId {
        let node = Node::new(block);
        let id = self.graph.add_node();
        trace!(block = %id, kind = node.block.kind(), "block added");
        self.nodes.push(node);
        self.phase = Phase::Assembly;
        id
    }

    /// Validate `spec`, build the block, and append it.
    pub fn add(&mut self, spec: BlockSpec) -> SchemeResult<BlockId> {
        let block = spec.build()?;
        Ok(self.add_block(block))
    }

    /// Decode an assembly stream of `count` blocks, append them, bind its
    /// links, and schedule.  Block numbers in the stream (link ends and
    /// `IntInSignal` sources) are relative to the first block of the stream.
    ///
    /// All-or-nothing: on any error the scheme is left exactly as it was.
    pub fn assign(&mut self, count: usize, bytes: &[u8]) -> SchemeResult<Vec<BlockId>> {
        let assembly = decode(count, bytes)?;
        let in_stream = |n: u32| {
            if (n as usize) < count {
                Ok(())
            } else {
                Err(ConfigError::BlockOutOfRange(BlockId(n)))
            }
        };
        for l in &assembly.links {
            in_stream(l.producer)?;
            in_stream(l.consumer)?;
        }

        let base = self.nodes.len() as u32;
        let blocks = assembly
            .blocks
            .iter()
            .map(|spec| match *spec {
                BlockSpec::IntInSignal { initial, source } => {
                    in_stream(source)?;
                    BlockSpec::IntInSignal { initial, source: source + base }.build()
                }
                ref spec => spec.build(),
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        let links: Vec<BlockLink> = assembly
            .links
            .iter()
            .map(|l| BlockLink {
                producer:      l.producer + base,
                producer_port: l.producer_port,
                consumer:      l.consumer + base,
                consumer_port: l.consumer_port,
            })
            .collect();

        let snapshot = Snapshot::take(self);
        let ids: Vec<BlockId> = blocks.into_iter().map(|b| self.add_block(b)).collect();
        if let Err(err) = self.set_links(&links) {
            warn!(blocks = ids.len(), error = %err, "assembly rejected; scheme restored");
            snapshot.restore(self);
            return Err(err);
        }
        debug!(blocks = ids.len(), links = links.len(), "assembly assigned");
        Ok(ids)
    }

    // ── Linking ───────────────────────────────────────────────────────────

    /// Links by scheme-wide absolute output and input numbers.
    pub fn set_absolute_links(&mut self, links: &[AbsoluteLink]) -> SchemeResult<()> {
        self.set_links(links)
    }

    /// Links by type key and scheme-wide per-type output and input numbers.
    pub fn set_relative_links(&mut self, links: &[RelativeLink]) -> SchemeResult<()> {
        self.set_links(links)
    }

    /// Links by block and block-absolute port numbers.
    pub fn set_block_links(&mut self, links: &[BlockLink]) -> SchemeResult<()> {
        self.set_links(links)
    }

    /// Links by type key, block, and per-type port numbers.
    pub fn set_relative_block_links(&mut self, links: &[RelativeBlockLink]) -> SchemeResult<()> {
        self.set_links(links)
    }

    /// Bind one batch of links and reschedule.
    ///
    /// The batch is all-or-nothing: out-of-range ports, type mismatches, and
    /// loops without a loop-breaker are detected before any input is rewired.
    pub fn set_links<L: Link>(&mut self, links: &[L]) -> SchemeResult<()> {
        self.prepare()?;

        let ctx = BindContext { nodes: &self.nodes, index: &self.index };
        let wires = links
            .iter()
            .map(|l| l.resolve(&ctx))
            .collect::<ConfigResult<Vec<Wire>>>()?;

        let mut candidate = self.graph.clone();
        for w in &wires {
            candidate.add_edge(w.producer, w.consumer);
        }
        let breakers: Vec<bool> = self.nodes.iter().map(|n| n.caps.can_untie_loop).collect();
        topological_order(&candidate, &breakers)?;

        apply(&wires, &mut self.nodes, &mut self.graph, &mut self.frozen);
        debug!(links = wires.len(), edges = self.graph.edge_count(), "links bound");

        self.run_schedule()
    }

    // ── Scheduling ────────────────────────────────────────────────────────

    /// Re-run allocate → index → schedule without new links.
    pub fn schedule(&mut self) -> SchemeResult<&ExecutionPlan> {
        self.prepare()?;
        self.run_schedule()?;
        Ok(&self.plan)
    }

    fn prepare(&mut self) -> ConfigResult<()> {
        self.counts = allocate(&mut self.nodes, &mut self.memory, &mut self.signals)?;
        self.index = index(&self.nodes, &mut self.memory);
        self.bind_taps()
    }

    /// Point every tapping block at the first real output of its source.
    /// Taps add no dependency edge.
    fn bind_taps(&mut self) -> ConfigResult<()> {
        for i in 0..self.nodes.len() {
            let Some(source) = self.nodes[i].block.tap() else { continue };
            let src = self
                .nodes
                .get(source as usize)
                .ok_or(ConfigError::BlockOutOfRange(BlockId(source)))?;
            let addr = src.ports.output_addr(PortType::Real, 0).ok_or(ConfigError::LinkOutOfRange {
                what:  "tapped output",
                index: 0,
                len:   src.ports.output_count_of(PortType::Real),
            })?;
            trace!(block = i, source, "tap bound");
            self.nodes[i].ports.set_tap(Some(addr));
        }
        Ok(())
    }

    fn run_schedule(&mut self) -> SchemeResult<()> {
        self.phase = Phase::Assembly;
        self.plan = schedule(
            &mut self.nodes,
            &self.graph,
            &mut self.memory,
            &mut self.signals,
            &mut self.clock,
        )?;
        self.phase = Phase::Ready;
        Ok(())
    }

    pub(crate) fn ensure_ready(&self) -> SchemeResult<()> {
        match self.phase {
            Phase::Ready => Ok(()),
            Phase::Assembly => Err(SchemeError::NotScheduled),
        }
    }

    // ── External signals ──────────────────────────────────────────────────

    /// Overwrite the external input vector.  Length must match exactly.
    pub fn set_inputs(&mut self, values: &[f64]) -> SchemeResult<()> {
        let expected = self.signals.inputs().len();
        if values.len() != expected {
            return Err(SchemeError::SignalCountMismatch {
                expected,
                got: values.len(),
                what: "input signal vector",
            });
        }
        self.signals.inputs_mut().copy_from_slice(values);
        Ok(())
    }

    /// Copy the external output vector into `out`.  Length must match exactly.
    pub fn get_outputs(&self, out: &mut [f64]) -> SchemeResult<()> {
        let expected = self.signals.outputs().len();
        if out.len() != expected {
            return Err(SchemeError::SignalCountMismatch {
                expected,
                got: out.len(),
                what: "output signal vector",
            });
        }
        out.copy_from_slice(self.signals.outputs());
        Ok(())
    }

    pub fn inputs(&self) -> &[f64] {
        self.signals.inputs()
    }

    pub fn outputs(&self) -> &[f64] {
        self.signals.outputs()
    }

    // ── Parameters ────────────────────────────────────────────────────────

    /// Named scalar from the config (or set later).
    pub fn parameter(&self, name: &str) -> ConfigResult<f64> {
        self.parameters
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownParameter(name.to_string()))
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: f64) {
        self.parameters.insert(name.into(), value);
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn block_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn block_kind(&self, id: BlockId) -> Option<&'static str> {
        self.nodes.get(id.index()).map(|n| n.block.kind())
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn sorted_blocks(&self) -> &[BlockId] {
        &self.plan.sorted
    }

    pub fn active_blocks(&self) -> &[BlockId] {
        &self.plan.active
    }

    pub fn compute_blocks(&self) -> &[BlockId] {
        &self.plan.compute
    }

    /// Port totals from the last allocation.
    pub fn port_counts(&self) -> &PortCounts {
        &self.counts
    }

    pub fn port_index(&self) -> &PortIndex {
        &self.index
    }

    pub fn port_info(&self, addr: OutputAddr) -> Option<PortInfo> {
        self.memory.info(addr).copied()
    }

    pub fn absolute_output(&self, index: usize) -> Option<OutputRef> {
        self.index.absolute_output(index)
    }

    /// Current value of an output, converted to `f64`.
    pub fn output_value(&self, addr: OutputAddr) -> f64 {
        self.memory.arena(addr.ty).read_f64(addr.index())
    }

    /// Current value of output `port` (block-absolute) of `block`.
    pub fn block_output(&self, block: BlockId, port: u32) -> Option<f64> {
        let ports = &self.nodes.get(block.index())?.ports;
        let (ty, rel) = ports.output_location(port as usize)?;
        ports.output_addr(ty, rel).map(|addr| self.output_value(addr))
    }

    /// Where input `port` (block-absolute) of `block` currently reads from.
    pub fn input_source(&self, block: BlockId, port: u32) -> Option<InputSource> {
        let ports = &self.nodes.get(block.index())?.ports;
        let (ty, rel) = ports.input_location(port as usize)?;
        ports.input_source(ty, rel)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn time(&self) -> SimTime {
        self.clock.now
    }

    pub fn step_count(&self) -> u64 {
        self.clock.steps
    }
}

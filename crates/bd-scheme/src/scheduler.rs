//! Scheduler: loop-tolerant topological order, init, folding, and the
//! per-step compute order.
//!
//! # Ordering
//!
//! ```text
//! 1. Kahn's algorithm over the dependency graph, ready ties → smallest id.
//!    On a stall (every unplaced block still waits on an input) the
//!    smallest-id loop-breaker lying on a residual cycle has its outgoing
//!    edges released, which lets its consumers proceed.  No such block
//!    → ConfigError::UnbreakableLoop.
//! 2. init() every block in that order at time zero.
//! 3. try_make_constant() every block in that order; folded blocks are
//!    dropped from per-step work.
//! 4. compute = implicit active blocks in REVERSE order
//!            ++ explicit active blocks in forward order
//! ```
//!
//! Step 4 is what makes a feedback loop through an integrator behave: the
//! integrator runs first on the previous step's loop value, and the
//! explicit blocks after it see its fresh output.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bd_block::{BlockIo, Memory, SignalBus};
use bd_core::{BlockId, ConfigError, ConfigResult, SimClock};
use tracing::{debug, info};

use crate::graph::DependencyGraph;
use crate::node::Node;

/// Result of one scheduling pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionPlan {
    /// Every block in topological order.
    pub sorted:  Vec<BlockId>,
    /// `sorted` minus folded blocks.
    pub active:  Vec<BlockId>,
    /// Per-step order.
    pub compute: Vec<BlockId>,
    /// Blocks folded to constants, in `sorted` order.
    pub folded:  Vec<BlockId>,
}

// ── Topological order ─────────────────────────────────────────────────────────

/// Order every node of `graph`, cutting cycles at loop-breakers.
///
/// `breakers[i]` says whether block `i` may lag its inputs by one step.
pub fn topological_order(graph: &DependencyGraph, breakers: &[bool]) -> ConfigResult<Vec<BlockId>> {
    let n = graph.node_count();
    let mut sort = Kahn {
        graph,
        indegree: graph.indegrees(),
        placed:   vec![false; n],
        released: vec![false; n],
        ready:    BinaryHeap::new(),
    };
    for i in 0..n {
        if sort.indegree[i] == 0 {
            sort.ready.push(Reverse(BlockId(i as u32)));
        }
    }

    let mut sorted = Vec::with_capacity(n);
    while sorted.len() < n {
        if let Some(Reverse(id)) = sort.ready.pop() {
            sort.placed[id.index()] = true;
            sorted.push(id);
            if !sort.released[id.index()] {
                sort.release(id);
            }
            continue;
        }

        // Stall: everything left sits on or behind a cycle.
        let breaker = (0..n)
            .map(|i| BlockId(i as u32))
            .filter(|id| breakers[id.index()] && sort.pending(*id))
            .find(|&id| sort.on_residual_cycle(id));
        match breaker {
            Some(id) => {
                debug!(block = %id, "feedback loop cut at loop-breaker");
                sort.release(id);
            }
            None => {
                let blocks: Vec<BlockId> = (0..n)
                    .map(|i| BlockId(i as u32))
                    .filter(|&id| sort.pending(id) && sort.on_residual_cycle(id))
                    .collect();
                return Err(ConfigError::UnbreakableLoop { blocks });
            }
        }
    }
    Ok(sorted)
}

struct Kahn<'a> {
    graph:    &'a DependencyGraph,
    indegree: Vec<u32>,
    placed:   Vec<bool>,
    /// Outgoing edges already accounted for.
    released: Vec<bool>,
    ready:    BinaryHeap<Reverse<BlockId>>,
}

impl Kahn<'_> {
    /// Not yet placed and still holding back its consumers.
    fn pending(&self, id: BlockId) -> bool {
        !self.placed[id.index()] && !self.released[id.index()]
    }

    fn release(&mut self, id: BlockId) {
        self.released[id.index()] = true;
        for &c in self.graph.consumers(id) {
            self.indegree[c.index()] -= 1;
            if self.indegree[c.index()] == 0 {
                self.ready.push(Reverse(c));
            }
        }
    }

    /// `true` if `id` reaches itself along edges of pending blocks.
    fn on_residual_cycle(&self, id: BlockId) -> bool {
        let mut seen = vec![false; self.graph.node_count()];
        let mut stack: Vec<BlockId> = self.graph.consumers(id).to_vec();
        while let Some(v) = stack.pop() {
            if v == id {
                return true;
            }
            if seen[v.index()] || !self.pending(v) {
                continue;
            }
            seen[v.index()] = true;
            stack.extend_from_slice(self.graph.consumers(v));
        }
        false
    }
}

// ── Full pass ─────────────────────────────────────────────────────────────────

/// Order, initialize, and fold; returns the plan.
///
/// Resets the clock and every output to its default before `init`, so a
/// re-schedule starts from the same state as the first one.
pub(crate) fn schedule(
    nodes:   &mut [Node],
    graph:   &DependencyGraph,
    memory:  &mut Memory,
    signals: &mut SignalBus,
    clock:   &mut SimClock,
) -> ConfigResult<ExecutionPlan> {
    let breakers: Vec<bool> = nodes.iter().map(|n| n.caps.can_untie_loop).collect();
    let sorted = topological_order(graph, &breakers)?;

    clock.reset();
    memory.clear_values();

    for &id in &sorted {
        let node = &mut nodes[id.index()];
        let mut io = BlockIo::new(&node.ports, memory, signals, clock);
        node.block.init(&mut io);
    }

    let mut active = Vec::with_capacity(sorted.len());
    let mut folded = Vec::new();
    for &id in &sorted {
        let node = &mut nodes[id.index()];
        let mut io = BlockIo::new(&node.ports, memory, signals, clock);
        if node.block.try_make_constant(&mut io) {
            folded.push(id);
        } else {
            active.push(id);
        }
    }

    let implicit = active
        .iter()
        .rev()
        .copied()
        .filter(|id| nodes[id.index()].caps.implicit_compute);
    let explicit = active
        .iter()
        .copied()
        .filter(|id| !nodes[id.index()].caps.implicit_compute);
    let compute: Vec<BlockId> = implicit.chain(explicit).collect();

    info!(
        blocks = sorted.len(),
        active = active.len(),
        folded = folded.len(),
        edges = graph.edge_count(),
        "scheme scheduled"
    );
    Ok(ExecutionPlan { sorted, active, compute, folded })
}

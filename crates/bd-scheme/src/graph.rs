//! Producer → consumer dependency graph.

use bd_core::BlockId;

/// Adjacency lists indexed by producer id.  One edge per bound link, so
/// parallel edges between the same pair are kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DependencyGraph {
    consumers: Vec<Vec<BlockId>>,
    edges:     usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an isolated node; returns its id.
    pub fn add_node(&mut self) -> BlockId {
        self.consumers.push(Vec::new());
        BlockId(self.consumers.len() as u32 - 1)
    }

    /// Record that `consumer` reads an output of `producer`.
    pub fn add_edge(&mut self, producer: BlockId, consumer: BlockId) {
        self.consumers[producer.index()].push(consumer);
        self.edges += 1;
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.consumers.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    #[inline]
    pub fn consumers(&self, producer: BlockId) -> &[BlockId] {
        &self.consumers[producer.index()]
    }

    /// Incoming edge count per node, parallel edges counted separately.
    pub fn indegrees(&self) -> Vec<u32> {
        let mut deg = vec![0u32; self.consumers.len()];
        for list in &self.consumers {
            for c in list {
                deg[c.index()] += 1;
            }
        }
        deg
    }

    /// Iterate `(producer, consumer)` over every edge.
    pub fn edges(&self) -> impl Iterator<Item = (BlockId, BlockId)> + '_ {
        self.consumers
            .iter()
            .enumerate()
            .flat_map(|(p, list)| list.iter().map(move |&c| (BlockId(p as u32), c)))
    }
}

//! One entry of the scheme's block table.

use bd_block::{Block, BlockPorts, Capabilities};

/// A block together with the port table the scheme maintains for it.
pub(crate) struct Node {
    pub block: Box<dyn Block>,
    pub ports: BlockPorts,
    pub caps:  Capabilities,
}

impl Node {
    pub fn new(block: Box<dyn Block>) -> Self {
        let mut ports = BlockPorts::new();
        block.declare_ports(&mut ports);
        let caps = block.capabilities();
        Self { block, ports, caps }
    }
}

//! Fluent builder for constructing a [`Scheme`].

use bd_blocks::BlockSpec;
use bd_core::{BlockLink, EngineConfig};

use crate::{Scheme, SchemeResult};

/// Fluent builder for [`Scheme`].
///
/// # Optional inputs
///
/// | Method               | Effect                                            |
/// |----------------------|---------------------------------------------------|
/// | `.parameter(k, v)`   | Adds or overrides one named parameter             |
/// | `.block(spec)`       | Appends one block                                 |
/// | `.links(v)`          | Block links bound after all blocks are added      |
/// | `.assembly(n, bytes)`| Appends a decoded assembly stream (and its links) |
///
/// `build` always schedules, so the returned scheme is ready to compute.
///
/// # Example
///
/// ```rust,ignore
/// let mut scheme = SchemeBuilder::new(EngineConfig::with_step(0.01))
///     .block(BlockSpec::Constant { value: 1.0 })
///     .block(BlockSpec::Integrator { k: 1.0, y0: 0.0 })
///     .links(vec![BlockLink::new(0, 0, 1, 0)])
///     .build()?;
/// scheme.compute(100)?;
/// ```
pub struct SchemeBuilder {
    config:   EngineConfig,
    blocks:   Vec<BlockSpec>,
    links:    Vec<BlockLink>,
    assembly: Option<(usize, Vec<u8>)>,
}

impl SchemeBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            blocks:   Vec::new(),
            links:    Vec::new(),
            assembly: None,
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.config.parameters.insert(name.into(), value);
        self
    }

    pub fn block(mut self, spec: BlockSpec) -> Self {
        self.blocks.push(spec);
        self
    }

    pub fn blocks(mut self, specs: impl IntoIterator<Item = BlockSpec>) -> Self {
        self.blocks.extend(specs);
        self
    }

    /// Block links between the blocks added with `block`/`blocks`.
    pub fn links(mut self, links: Vec<BlockLink>) -> Self {
        self.links = links;
        self
    }

    /// An assembly stream of `count` blocks, appended after the individually
    /// added blocks.  Its link numbers are relative to its own first block.
    pub fn assembly(mut self, count: usize, bytes: Vec<u8>) -> Self {
        self.assembly = Some((count, bytes));
        self
    }

    /// Validate, wire, and schedule.
    pub fn build(self) -> SchemeResult<Scheme> {
        let mut scheme = Scheme::new(&self.config)?;
        for spec in self.blocks {
            scheme.add(spec)?;
        }
        scheme.set_block_links(&self.links)?;
        if let Some((count, bytes)) = self.assembly {
            scheme.assign(count, &bytes)?;
        }
        Ok(scheme)
    }
}

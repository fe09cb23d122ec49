//! Configuration error type.
//!
//! Every error here is detected while a scheme is being built or scheduled,
//! never in the middle of a step.  Sub-crates wrap `ConfigError` as one
//! variant of their own enums via `#[from]`.

use thiserror::Error;

use crate::{BlockId, PortType};

/// A scheme that cannot be built, wired, or scheduled as described.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown port type key {0}")]
    UnknownType(u32),

    #[error("{what} must be a positive number of microseconds, got {secs} s")]
    InvalidStep { what: &'static str, secs: f64 },

    #[error("invalid {kind} parameters: {reason}")]
    InvalidParameters { kind: &'static str, reason: String },

    #[error("block {0} does not exist")]
    BlockOutOfRange(BlockId),

    #[error("{what} index {index} out of range (0..{len})")]
    LinkOutOfRange {
        what:  &'static str,
        index: usize,
        len:   usize,
    },

    #[error("cannot wire a {output} output into a {input} input")]
    TypeMismatch { output: PortType, input: PortType },

    #[error("link table length {len} is not a multiple of {stride}")]
    MalformedLinkTable { len: usize, stride: usize },

    #[error("feedback loop without a loop-breaking block through {blocks:?}")]
    UnbreakableLoop { blocks: Vec<BlockId> },

    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),
}

/// Shorthand result type for configuration-time operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

use bd_assembly::AssemblyError;
use bd_core::{BlockId, ConfigError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("assembly stream error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Blocks were added (or scheduling failed) since the last successful
    /// schedule; the execution plan is stale.
    #[error("scheme is not scheduled; bind links or call schedule() first")]
    NotScheduled,

    #[error("{block} has no input port {port} (it has {inputs})")]
    PortOutOfRange {
        block:  BlockId,
        port:   u32,
        inputs: usize,
    },

    #[error("{what} length {got} does not match the declared {expected}")]
    SignalCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },
}

pub type SchemeResult<T> = Result<T, SchemeError>;

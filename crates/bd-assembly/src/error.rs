use bd_blocks::BlockKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("stream truncated at byte {offset}: {what} needs {needed} more byte(s)")]
    Truncated { offset: usize, needed: usize, what: &'static str },

    #[error("unknown block kind tag {tag} for block #{index} at byte {offset}")]
    UnknownBlockKind { tag: u8, index: usize, offset: usize },

    #[error("{kind}: mode {mode} at byte {offset} is not supported (only static mode 0)")]
    UnsupportedMode { kind: BlockKind, mode: u8, offset: usize },

    #[error("{remaining} trailing byte(s) after the link table at byte {offset}")]
    TrailingBytes { offset: usize, remaining: usize },
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;

//! Fatal generation errors.
//!
//! Structural oddities in the instruction stream are never errors; the
//! reclassifier falls back to the weaker reading and generation continues.
//! The only fatal conditions are name-resolution failures, and those abort
//! the whole function: callers must treat them as "this IR has no valid
//! rendering" and halt assembly.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// An `instantiate_object` named a user-defined type that is not in the
    /// contract's registry.
    #[error("unable to instantiate unrecognized UDT: {0}")]
    UnresolvedType(String),

    /// An `instantiate_object` named a composite kind outside the closed set.
    #[error("unknown object type: {0}")]
    UnknownObjectKind(String),

    /// An instruction name outside the closed opcode set.
    #[error("unknown instruction: {0}")]
    UnknownOpcode(String),
}

pub type Result<T> = std::result::Result<T, CodegenError>;

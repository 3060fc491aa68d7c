// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler errors.
//!
//! Only graph corruption is an error. Unresolved references and dangling
//! connections are reported as diagnostics and never abort a pass.

use crate::scope::ScopeOwner;
use shadergraph_model::{ComponentId, ModelError};

/// Result alias for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Hard failure of a compile pass
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Inconsistent model, e.g. a property without a declaring line
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A pattern in use has no entry function
    #[error("Pattern has no functions: {0}")]
    EmptyPattern(ComponentId),

    /// A component needed by the request was not supplied
    #[error("Component not supplied: {0}")]
    ComponentNotSupplied(ComponentId),

    /// Scopes were closed out of order
    #[error("Scope closed out of order: expected {expected:?}, found {found:?}")]
    ScopeMismatch {
        /// Scope that was asked to close
        expected: ScopeOwner,
        /// Innermost open scope
        found: Option<ScopeOwner>,
    },

    /// Configuration text could not be decoded
    #[error("Failed to decode config: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Configuration could not be encoded
    #[error("Failed to encode config: {0}")]
    Encode(#[from] ron::Error),
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Non-fatal findings of a compile pass.

use serde::{Deserialize, Serialize};
use shadergraph_model::{ComponentId, FragmentId};

/// What went wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DiagnosticKind {
    /// A variable reference was replaced by a default constant
    #[error("unresolved variable `{name}` replaced by a default constant")]
    UnresolvedVariable {
        /// Name of the missing variable
        name: String,
    },
    /// A call was replaced by a default constant
    #[error("unresolved function `{name}` replaced by a default constant")]
    UnresolvedFunction {
        /// Name of the missing function
        name: String,
    },
    /// An unresolved assignment target was declared as a throwaway local
    #[error("unresolved assignment to `{name}` declared as placeholder")]
    PlaceholderDeclaration {
        /// Name of the missing variable
        name: String,
    },
    /// A connection whose source is not among the supplied patterns
    #[error("connection from {origin}.{terminal} ignored, source not supplied")]
    DanglingConnection {
        /// Source component of the connection
        origin: ComponentId,
        /// Terminal read from it
        terminal: String,
    },
    /// A pattern dependency cycle was broken at this pattern
    #[error("pattern cycle broken at {pattern}")]
    PatternCycle {
        /// Pattern reached again while being visited
        pattern: ComponentId,
    },
}

/// A finding attached to a component and optionally one of its fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{component}: {kind}")]
pub struct Diagnostic {
    /// Component being compiled
    pub component: ComponentId,
    /// Offending fragment
    pub fragment: Option<FragmentId>,
    /// What went wrong
    pub kind: DiagnosticKind,
}

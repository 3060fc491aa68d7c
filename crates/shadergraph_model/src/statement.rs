// SPDX-License-Identifier: MIT OR Apache-2.0
//! Statements: flat, ordered fragment lists.

use crate::fragment::Fragment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementId(pub Uuid);

impl StatementId {
    /// Create a new random statement ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StatementId {
    fn default() -> Self {
        Self::new()
    }
}

/// How the fragments of a statement combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatementKind {
    /// An arithmetic chain (`a + b * c`)
    #[default]
    Arithmetic,
    /// A parameter list (function header)
    List,
    /// A boolean chain (`a < b && c`)
    Boolean,
}

/// One flat expression or parameter list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statement {
    /// Unique statement ID
    pub id: StatementId,
    /// Statement kind
    pub kind: StatementKind,
    /// Fragments in order
    pub fragments: Vec<Fragment>,
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Statement {
    /// Create a new empty statement
    pub fn new(kind: StatementKind) -> Self {
        Self {
            id: StatementId::new(),
            kind,
            fragments: Vec::new(),
        }
    }

    /// Create a statement holding one fragment
    pub fn single(kind: StatementKind, fragment: Fragment) -> Self {
        Self::new(kind).with(fragment)
    }

    /// Append a fragment
    pub fn with(mut self, fragment: Fragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Whether the statement has no fragments
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

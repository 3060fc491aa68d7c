// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lexical scopes and variable symbols.
//!
//! Function bodies and If/Else/For bodies each open a scope. Registering a
//! variable makes it resolvable until its scope closes; its emission symbol
//! is memoized on the fragment and survives the scope.

use crate::error::{CompileError, Result};
use crate::symbol::fresh_symbol;
use shadergraph_model::{BlockId, Fragment, FragmentId, FunctionId};
use std::collections::HashMap;

/// Owner of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeOwner {
    /// A function body
    Function(FunctionId),
    /// A control-flow body
    Block(BlockId),
}

/// A variable visible in the active scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSymbol {
    /// Emitted name: the hygienic symbol, or the plain name of a
    /// shader-supplied parameter
    pub symbol: String,
    /// Declared type
    pub type_name: String,
}

#[derive(Debug)]
struct Frame {
    owner: ScopeOwner,
    registered: Vec<FragmentId>,
}

/// Stack of open scopes
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    active: HashMap<FragmentId, VariableSymbol>,
}

impl ScopeStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope
    pub fn open(&mut self, owner: ScopeOwner) {
        self.frames.push(Frame { owner, registered: Vec::new() });
    }

    /// Close the innermost scope, which must be owned by `owner`. Variables
    /// registered in it stop resolving.
    pub fn close(&mut self, owner: ScopeOwner) -> Result<()> {
        match self.frames.last() {
            Some(frame) if frame.owner == owner => {}
            other => {
                return Err(CompileError::ScopeMismatch {
                    expected: owner,
                    found: other.map(|f| f.owner),
                })
            }
        }
        if let Some(frame) = self.frames.pop() {
            for id in frame.registered {
                self.active.remove(&id);
            }
        }
        Ok(())
    }

    /// Register a variable in the innermost scope, assigning its symbol on
    /// first sight. Shader-supplied parameters keep their plain name.
    pub fn register(&mut self, variable: &mut Fragment) -> &VariableSymbol {
        let symbol = if variable.flags.not_codeable {
            variable.name.clone()
        } else {
            variable.symbol.get_or_insert_with(fresh_symbol).clone()
        };
        if let Some(frame) = self.frames.last_mut() {
            frame.registered.push(variable.id);
        }
        self.active.insert(
            variable.id,
            VariableSymbol {
                symbol,
                type_name: variable.type_name.clone(),
            },
        );
        &self.active[&variable.id]
    }

    /// Look up an active variable
    pub fn resolve(&self, id: FragmentId) -> Option<&VariableSymbol> {
        self.active.get(&id)
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

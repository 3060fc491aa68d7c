// SPDX-License-Identifier: MIT OR Apache-2.0
//! Function symbol table shared by every pass of a compiler session.
//!
//! A function becomes callable once its own pass has emitted it, which
//! makes later functions invisible to earlier ones and rules out
//! recursion.

use indexmap::IndexMap;
use shadergraph_model::{ComponentId, Function, FunctionId, FunctionKind};

/// A compiled, callable function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// Display name
    pub name: String,
    /// Emitted name at call sites
    pub call_name: String,
    /// Calling convention
    pub kind: FunctionKind,
    /// Declared return type
    pub return_type: String,
    /// Owning component
    pub component: ComponentId,
}

impl FunctionSymbol {
    /// Describe a function of `component`. Prototypes are called by their
    /// declared name, everything else by its hygienic symbol.
    pub fn of(function: &Function, component: ComponentId) -> Self {
        let call_name = match (&function.symbol, function.is_prototype()) {
            (Some(symbol), false) => symbol.clone(),
            _ => function.header.fragment.name.clone(),
        };
        Self {
            name: function.name.clone(),
            call_name,
            kind: function.kind,
            return_type: function.return_type().to_string(),
            component,
        }
    }
}

/// Callable functions and the calls recorded per component
#[derive(Debug, Default)]
pub struct FunctionTable {
    symbols: IndexMap<FunctionId, FunctionSymbol>,
    calls: IndexMap<ComponentId, IndexMap<FunctionId, u32>>,
}

impl FunctionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a function callable
    pub fn insert(&mut self, id: FunctionId, symbol: FunctionSymbol) {
        self.symbols.insert(id, symbol);
    }

    /// Look up a function
    pub fn get(&self, id: FunctionId) -> Option<&FunctionSymbol> {
        self.symbols.get(&id)
    }

    /// Drop the functions and call records of a component ahead of its
    /// recompilation
    pub fn forget_component(&mut self, component: ComponentId) {
        self.symbols.retain(|_, s| s.component != component);
        self.calls.shift_remove(&component);
    }

    /// Replace the calls recorded for a component
    pub fn record_calls(&mut self, component: ComponentId, calls: IndexMap<FunctionId, u32>) {
        self.calls.insert(component, calls);
    }

    /// Total calls to a function across all compiled components
    pub fn references(&self, id: FunctionId) -> u32 {
        self.calls.values().filter_map(|c| c.get(&id)).sum()
    }

    /// Number of callable functions
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no function is callable
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

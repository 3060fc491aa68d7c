// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mutable state threaded through one compile pass.

use crate::config::CompilerConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::pattern::PatternTable;
use crate::scope::ScopeStack;
use crate::table::FunctionTable;
use indexmap::IndexMap;
use shadergraph_model::{
    CompiledCode, Component, ComponentId, ComponentKind, Connection, FragmentId, FunctionId,
    FunctionKind, GlobalScope, InputRef, PatternBinding, TextureRef,
};

/// Snapshot of the output lengths, used to discard emitted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    code: usize,
    global_code: usize,
    inputs: usize,
    textures: usize,
}

/// Result of a finished pass
#[derive(Debug)]
pub struct PassResult {
    /// Emitted code and bindings
    pub code: CompiledCode,
    /// Findings of the pass
    pub diagnostics: Vec<Diagnostic>,
    /// References seen per variable
    pub variable_references: IndexMap<FragmentId, u32>,
}

/// Context for compiling one component
pub struct CompilationContext<'a> {
    /// Compiler configuration
    pub config: &'a CompilerConfig,
    /// Global variables visible to the component
    pub globals: &'a GlobalScope,
    /// Callable functions
    pub functions: &'a mut FunctionTable,
    /// Entry symbols of the supplied patterns
    pub patterns: &'a PatternTable,
    /// Active variables
    pub scopes: ScopeStack,
    component: ComponentId,
    component_kind: ComponentKind,
    properties: Vec<FragmentId>,
    connections: IndexMap<FragmentId, Connection>,
    base_offset: usize,
    output: CompiledCode,
    in_global: bool,
    function_kind: FunctionKind,
    dependencies: Vec<FunctionId>,
    variable_references: IndexMap<FragmentId, u32>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CompilationContext<'a> {
    /// Create a context for `component`. Output starts from `prelude`,
    /// which holds whatever was emitted ahead of the component (pattern
    /// entry functions and their bindings).
    pub fn new(
        config: &'a CompilerConfig,
        globals: &'a GlobalScope,
        functions: &'a mut FunctionTable,
        patterns: &'a PatternTable,
        component: &Component,
        base_offset: usize,
        prelude: CompiledCode,
    ) -> Self {
        Self {
            config,
            globals,
            functions,
            patterns,
            scopes: ScopeStack::new(),
            component: component.id,
            component_kind: component.kind,
            properties: component.properties.clone(),
            connections: component.connections.clone(),
            base_offset,
            output: prelude,
            in_global: false,
            function_kind: FunctionKind::Headerless,
            dependencies: Vec::new(),
            variable_references: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Component being compiled
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// Role of the component being compiled
    pub fn component_kind(&self) -> ComponentKind {
        self.component_kind
    }

    /// Route emitted text to the global (true) or local buffer
    pub fn set_global(&mut self, global: bool) {
        self.in_global = global;
    }

    /// Append text to the active buffer
    pub fn add_code(&mut self, code: &str) {
        if self.in_global {
            self.output.global_code.push_str(code);
        } else {
            self.output.code.push_str(code);
        }
    }

    /// Remember the current output lengths
    pub fn mark(&self) -> Mark {
        Mark {
            code: self.output.code.len(),
            global_code: self.output.global_code.len(),
            inputs: self.output.inputs.len(),
            textures: self.output.textures.len(),
        }
    }

    /// Discard everything emitted and bound since `mark`
    pub fn rewind(&mut self, mark: Mark) {
        self.output.code.truncate(mark.code);
        self.output.global_code.truncate(mark.global_code);
        self.output.inputs.truncate(mark.inputs);
        self.output.input_components.truncate(mark.inputs);
        self.output.textures.truncate(mark.textures);
    }

    /// Discard the text emitted since `mark`, keeping inputs and textures
    /// recorded meanwhile
    pub fn rewind_text(&mut self, mark: Mark) {
        self.output.code.truncate(mark.code);
        self.output.global_code.truncate(mark.global_code);
    }

    /// Enter a function
    pub fn begin_function(&mut self, kind: FunctionKind) {
        self.function_kind = kind;
        self.dependencies.clear();
    }

    /// Leave the current function, returning the functions it called
    pub fn end_function(&mut self) -> Vec<FunctionId> {
        std::mem::take(&mut self.dependencies)
    }

    /// Record a call from the current function
    pub fn add_dependency(&mut self, callee: FunctionId) {
        if !self.dependencies.contains(&callee) {
            self.dependencies.push(callee);
        }
        *self.output.call_counts.entry(callee).or_insert(0) += 1;
    }

    /// Record a reference to a variable
    pub fn count_variable(&mut self, variable: FragmentId) {
        *self.variable_references.entry(variable).or_insert(0) += 1;
    }

    /// Whether a fragment is a declared property of the component
    pub fn is_property(&self, fragment: FragmentId) -> bool {
        self.properties.contains(&fragment)
    }

    /// Inbound connection of a property
    pub fn connection(&self, property: FragmentId) -> Option<&Connection> {
        self.connections.get(&property)
    }

    /// Bind an input to the next data buffer slot and return its index
    pub fn bind_input(&mut self, input: InputRef) -> usize {
        let index = self.base_offset + self.output.inputs.len();
        self.output.inputs.push(input);
        self.output.input_components.push(self.component);
        tracing::debug!(component = %self.component, index, ?input, "Bound input");
        index
    }

    /// Data buffer lookup, through the context pointer in free-flow
    /// functions
    pub fn buffer_lookup(&self, index: usize) -> String {
        if self.function_kind == FunctionKind::FreeFlow {
            self.context_lookup(index)
        } else {
            format!("{}[{index}]", self.config.data_buffer)
        }
    }

    /// Data buffer lookup through the context pointer
    pub fn context_lookup(&self, index: usize) -> String {
        format!("{}[{index}]", self.config.context_field(&self.config.data_buffer))
    }

    /// Record a sampled texture
    pub fn record_texture(&mut self, name: &str, token: &str) {
        self.output.textures.push(TextureRef {
            name: name.to_string(),
            token: token.to_string(),
        });
    }

    /// Record a pattern-fed property
    pub fn record_binding(&mut self, property: FragmentId, binding: PatternBinding) {
        self.output.pattern_bindings.insert(property, binding);
    }

    /// Pattern binding of a property, if any
    pub fn binding(&self, property: FragmentId) -> Option<&PatternBinding> {
        self.output.pattern_bindings.get(&property)
    }

    /// Report a finding
    pub fn diagnose(&mut self, fragment: Option<FragmentId>, kind: DiagnosticKind) {
        tracing::warn!(component = %self.component, ?fragment, "{kind}");
        self.diagnostics.push(Diagnostic {
            component: self.component,
            fragment,
            kind,
        });
    }

    /// Finish the pass
    pub fn finish(self) -> PassResult {
        PassResult {
            code: self.output,
            diagnostics: self.diagnostics,
            variable_references: self.variable_references,
        }
    }
}

/// Accessor reading `width` components of a buffer slot
pub fn accessor(width: usize) -> &'static str {
    match width {
        1 => ".x",
        2 => ".xy",
        3 => ".xyz",
        _ => "",
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler session: runs passes over components and keeps the function
//! table alive between them.

use crate::config::CompilerConfig;
use crate::context::{CompilationContext, PassResult};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::emit::component::emit_component;
use crate::error::{CompileError, Result};
use crate::pattern::{self, PatternTable};
use crate::table::FunctionTable;
use serde::{Deserialize, Serialize};
use shadergraph_model::{
    CompiledCode, Component, ComponentId, ComponentKind, FunctionId, GlobalScope, InputRef,
    Project,
};

/// Result of compiling one component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileOutput {
    /// Emitted code and bindings
    pub code: CompiledCode,
    /// Findings of every pass involved
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    /// Local code
    pub fn local_code(&self) -> &str {
        &self.code.code
    }

    /// Global code
    pub fn global_code(&self) -> &str {
        &self.code.global_code
    }

    /// Inputs in data buffer order
    pub fn inputs(&self) -> &[InputRef] {
        &self.code.inputs
    }

    /// Whether the passes ran without findings
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// A compiler session
#[derive(Debug, Default)]
pub struct Compiler {
    config: CompilerConfig,
    functions: FunctionTable,
}

impl Compiler {
    /// Create a session with the given configuration
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            functions: FunctionTable::new(),
        }
    }

    /// Configuration of the session
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Calls to a function recorded across every compiled component
    pub fn function_references(&self, id: FunctionId) -> u32 {
        self.functions.references(id)
    }

    /// Compile a component that consumes no patterns
    pub fn compile(&mut self, component: &mut Component, globals: &GlobalScope) -> Result<CompileOutput> {
        self.compile_with_patterns(component, &mut [], globals)
    }

    /// Compile a component together with the patterns its properties may
    /// read from. Every pattern the component uses, directly or through
    /// other patterns, is emitted ahead of it as a global entry function.
    pub fn compile_with_patterns(
        &mut self,
        component: &mut Component,
        patterns: &mut [Component],
        globals: &GlobalScope,
    ) -> Result<CompileOutput> {
        let table = PatternTable::from_components(patterns);
        let mut diagnostics = Vec::new();
        let mut prelude = CompiledCode::default();

        if component.kind == ComponentKind::Material3D && !table.is_empty() {
            let order = pattern::used_patterns(component, patterns);
            diagnostics.extend(order.cycles.iter().map(|&pattern| Diagnostic {
                component: component.id,
                fragment: None,
                kind: DiagnosticKind::PatternCycle { pattern },
            }));

            let mut prototypes = String::new();
            let mut wrappers = String::new();
            for index in order.order {
                let source = &mut patterns[index];
                let entry = pattern::require_entry(&table, source)?.to_string();
                let offset = self.config.base_offset + prelude.input_count();
                let result = self.pass(source, globals, &table, offset, CompiledCode::default())?;

                prelude.absorb(&result.code);
                prototypes.push_str(&pattern::entry_prototype(&entry, &self.config));
                wrappers.push_str(&result.code.global_code);
                wrappers.push_str(&pattern::entry_wrapper(&entry, &result.code.code, &self.config));
                diagnostics.extend(result.diagnostics);
            }
            prelude.global_code = prototypes + &wrappers;
        }

        let offset = self.config.base_offset;
        let result = self.pass(component, globals, &table, offset, prelude)?;
        diagnostics.extend(result.diagnostics);

        Ok(CompileOutput {
            code: result.code,
            diagnostics,
        })
    }

    /// Compile one component of a project. Function libraries are
    /// compiled first so the component may call into them, and their
    /// global code is prepended to the output. Pattern state (entry
    /// symbols, compiled code) is written back to the project.
    pub fn compile_in_project(&mut self, project: &mut Project, target: ComponentId) -> Result<CompileOutput> {
        let globals = project.global_scope();
        let mut library_code = String::new();
        let mut diagnostics = Vec::new();

        let libraries: Vec<ComponentId> = project
            .components()
            .filter(|c| c.kind == ComponentKind::FunctionContainer && c.id != target)
            .map(|c| c.id)
            .collect();
        for id in libraries {
            if let Some(library) = project.component_mut(id) {
                let output = self.compile(library, &globals)?;
                library_code.push_str(output.global_code());
                diagnostics.extend(output.diagnostics);
            }
        }

        let mut patterns: Vec<Component> = project
            .patterns()
            .filter(|p| p.id != target)
            .cloned()
            .collect();
        let component = project
            .component_mut(target)
            .ok_or(CompileError::ComponentNotSupplied(target))?;
        let mut output = self.compile_with_patterns(component, &mut patterns, &globals)?;

        for pattern in patterns {
            if let Some(slot) = project.component_mut(pattern.id) {
                *slot = pattern;
            }
        }

        output.code.global_code.insert_str(0, &library_code);
        diagnostics.append(&mut output.diagnostics);
        output.diagnostics = diagnostics;
        Ok(output)
    }

    /// One complete pass over a component. The component's compiled code
    /// is only replaced when the pass succeeds.
    fn pass(
        &mut self,
        component: &mut Component,
        globals: &GlobalScope,
        patterns: &PatternTable,
        base_offset: usize,
        prelude: CompiledCode,
    ) -> Result<PassResult> {
        tracing::debug!(component = %component.id, name = %component.name, base_offset, "Compiling component");

        self.functions.forget_component(component.id);
        for &property in &component.properties {
            component.require_property(property)?;
        }

        let mut ctx = CompilationContext::new(
            &self.config,
            globals,
            &mut self.functions,
            patterns,
            component,
            base_offset,
            prelude,
        );
        emit_component(&mut ctx, component)?;
        let result = ctx.finish();

        component.visit_fragments_mut(&mut |fragment| {
            fragment.references = result
                .variable_references
                .get(&fragment.id)
                .copied()
                .unwrap_or(0);
        });
        self.functions
            .record_calls(component.id, result.code.call_counts.clone());
        for function in &mut component.functions {
            function.references = self.functions.references(function.id);
        }
        component.compiled = Some(result.code.clone());

        tracing::debug!(
            component = %component.id,
            inputs = result.code.input_count(),
            diagnostics = result.diagnostics.len(),
            "Compiled component"
        );
        Ok(result)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Function emission: header, pattern calls, body and epilogue.

use super::block::emit_block;
use crate::context::CompilationContext;
use crate::diagnostics::DiagnosticKind;
use crate::error::Result;
use crate::pattern::{self, TEXTURE_DEFINITIONS};
use crate::scope::ScopeOwner;
use crate::symbol::fresh_symbol;
use shadergraph_model::{Block, BlockKind, FragmentKind, Function, PatternBinding, PATTERN_TERMINALS};

/// Emit a function. Its parameters are in scope for the whole body.
pub fn emit_function(ctx: &mut CompilationContext<'_>, function: &mut Function) -> Result<()> {
    ctx.begin_function(function.kind);
    if !function.is_prototype() {
        function.symbol.get_or_insert_with(fresh_symbol);
    }

    let owner = ScopeOwner::Function(function.id);
    ctx.scopes.open(owner);
    for parameter in &mut function.header.statement.fragments {
        ctx.scopes.register(parameter);
    }

    if function.header.fragment.kind == FragmentKind::TypeDefinition {
        emit_header(ctx, function);
    }

    if ctx.component_kind().consumes_patterns() {
        for block in &mut function.body {
            bind_pattern(ctx, block);
            for child in &mut block.children {
                bind_pattern(ctx, child);
            }
        }
    }

    for block in &mut function.body {
        emit_block(ctx, block)?;
    }

    if function.is_free_flow() {
        ctx.add_code("return out;\n}\n");
    }

    ctx.scopes.close(owner)?;
    function.depends_on = ctx.end_function();
    Ok(())
}

/// `type symbol(params, context) {` plus the standard locals
fn emit_header(ctx: &mut CompilationContext<'_>, function: &Function) {
    let return_type = function.return_type().to_string();
    let name = function
        .symbol
        .clone()
        .unwrap_or_else(|| function.header.fragment.name.clone());

    let mut parameters: Vec<String> = function
        .parameters()
        .iter()
        .filter(|p| !p.flags.not_codeable)
        .map(|p| {
            let symbol = p.symbol.as_deref().unwrap_or(&p.name);
            format!("{} {symbol}", p.type_name)
        })
        .collect();
    parameters.push(ctx.config.context_parameter());

    let mut code = format!("{return_type} {name}({}) {{\n", parameters.join(", "));
    if ctx.config.free_flow_prologue {
        let field = |name: &str| ctx.config.context_field(name);
        code.push_str(&format!("float GlobalTime = {};\n", field("GlobalTime")));
        code.push_str(&format!("float GlobalSeed = {};\n", field("GlobalSeed")));
        code.push_str(&format!("float3 CamOrigin = {};\n", field("cameraOrigin")));
        code.push_str(&format!("float3 CamDir = {};\n", field("cameraDirection")));
        code.push_str(TEXTURE_DEFINITIONS);
        code.push('\n');
    }
    code.push_str(&format!("{return_type} out = {return_type}(0);\n"));
    ctx.add_code(&code);
}

/// Call the pattern feeding a declared variable and remember where its
/// terminals live
fn bind_pattern(ctx: &mut CompilationContext<'_>, block: &mut Block) {
    if block.kind != BlockKind::VariableDefinition {
        return;
    }
    let property = block.fragment.id;
    let Some(connection) = ctx.connection(property).cloned() else {
        return;
    };

    let entry = ctx
        .patterns
        .entry(connection.component)
        .filter(|_| PATTERN_TERMINALS.contains(&connection.terminal.as_str()))
        .map(str::to_string);
    let Some(entry) = entry else {
        ctx.diagnose(
            Some(property),
            DiagnosticKind::DanglingConnection {
                origin: connection.component,
                terminal: connection.terminal,
            },
        );
        return;
    };

    let token = format!(
        "{}_pattern",
        block.fragment.symbol.get_or_insert_with(fresh_symbol)
    );
    let code = format!(
        "{} {token};\n{entry}({}, &{token}, {});\n",
        ctx.config.pattern_struct,
        pattern::call_arguments(ctx.component_kind()),
        ctx.config.context_param
    );
    ctx.add_code(&code);
    ctx.record_binding(
        property,
        PatternBinding {
            token,
            terminal: connection.terminal,
            pattern: connection.component,
            entry,
        },
    );
}

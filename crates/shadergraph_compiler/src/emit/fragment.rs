// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fragment emission and reference resolution.

use super::block::emit_statement;
use crate::context::{accessor, CompilationContext};
use crate::diagnostics::DiagnosticKind;
use crate::error::Result;
use crate::symbol::fresh_symbol;
use shadergraph_model::{Fragment, FragmentKind, InputRef};

/// Position of a fragment within its block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Left-hand side of an assignment
    Left,
    /// Anywhere else
    Operand,
}

/// What was emitted for a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitted {
    /// Regular code
    Code,
    /// A throwaway declaration standing in for an unresolved assignment
    /// target
    Placeholder,
}

/// Emit a fragment and its arguments
pub fn emit_fragment(
    ctx: &mut CompilationContext<'_>,
    fragment: &mut Fragment,
    slot: Slot,
) -> Result<Emitted> {
    let sign = if fragment.negated { "-" } else { "" };

    match fragment.kind {
        // Headers are emitted by their function, end markers by nothing
        FragmentKind::Undefined
        | FragmentKind::TypeDefinition
        | FragmentKind::ConstTypeDefinition
        | FragmentKind::End => {}
        FragmentKind::OutVariable => {
            if fragment.name == "GlobalHash" {
                let hash = ctx.config.context_field("hash");
                ctx.add_code(&hash);
            } else {
                let code = format!("{}{}", fragment.name, fragment.qualifier_suffix());
                ctx.add_code(&code);
            }
        }
        FragmentKind::Break | FragmentKind::Else => ctx.add_code(&fragment.name),
        FragmentKind::If | FragmentKind::For => {
            let code = format!("{} ", fragment.name);
            ctx.add_code(&code);
        }
        FragmentKind::ConstantDefinition => {
            if fragment.simplified {
                let value = fragment
                    .arguments
                    .first()
                    .and_then(|a| a.fragments.first())
                    .map(Fragment::value_string)
                    .unwrap_or_default();
                let code = format!("{sign}{value}");
                ctx.add_code(&code);
                return Ok(Emitted::Code);
            }
            let code = format!("{sign}{}", fragment.name);
            ctx.add_code(&code);
        }
        FragmentKind::ConstantValue => {
            let value = fragment.value_string();
            ctx.add_code(&value);
        }
        FragmentKind::Primitive => {
            if let Some(function) = fragment.function_reference() {
                let resolved = ctx
                    .functions
                    .get(function)
                    .map(|s| (s.call_name.clone(), s.name.clone()));
                match resolved {
                    Some((call_name, name)) => {
                        ctx.add_dependency(function);
                        fragment.name = name;
                        let code = format!("{sign}{call_name}");
                        ctx.add_code(&code);
                    }
                    None => {
                        ctx.diagnose(
                            Some(fragment.id),
                            DiagnosticKind::UnresolvedFunction {
                                name: fragment.name.clone(),
                            },
                        );
                        substitute_default(fragment);
                        return emit_fragment(ctx, fragment, slot);
                    }
                }
            } else if fragment.call_data().is_image {
                let token = fragment.symbol.get_or_insert_with(fresh_symbol).clone();
                ctx.record_texture(&fragment.name, &token);
                let code = format!("{sign}__interpolateTexture({token}, ");
                ctx.add_code(&code);
            } else if fragment.name == "PI" {
                let code = format!("{sign}M_PI_F");
                ctx.add_code(&code);
            } else {
                let code = format!("{sign}{}", fragment.name);
                ctx.add_code(&code);
            }
        }
        FragmentKind::VariableDefinition => {
            let symbol = ctx.scopes.register(fragment).symbol.clone();
            if !fragment.flags.not_codeable {
                let code = format!("{} {symbol}", fragment.type_name);
                ctx.add_code(&code);
            }
        }
        FragmentKind::VariableReference => {
            return emit_reference(ctx, fragment, slot);
        }
        FragmentKind::Arithmetic
        | FragmentKind::Assignment
        | FragmentKind::Comparison
        | FragmentKind::Logic => {
            let code = format!(" {} ", fragment.name);
            ctx.add_code(&code);
        }
        FragmentKind::OpeningBracket | FragmentKind::ClosingBracket => {
            ctx.add_code(&fragment.name);
        }
    }

    emit_arguments(ctx, fragment)?;
    Ok(Emitted::Code)
}

/// Resolve a variable reference: an active local first, then a global
/// variable by name. Anything else is substituted.
fn emit_reference(
    ctx: &mut CompilationContext<'_>,
    fragment: &mut Fragment,
    slot: Slot,
) -> Result<Emitted> {
    let sign = if fragment.negated { "-" } else { "" };

    let local = fragment
        .variable_reference()
        .and_then(|id| ctx.scopes.resolve(id).map(|v| (id, v.symbol.clone())));
    if let Some((id, symbol)) = local {
        ctx.count_variable(id);
        let code = format!("{sign}{symbol}{}", fragment.qualifier_suffix());
        ctx.add_code(&code);
        return Ok(Emitted::Code);
    }

    let global = match slot {
        Slot::Operand => ctx
            .globals
            .find(&fragment.name)
            .map(|g| (g.component, g.component_count())),
        Slot::Left => None,
    };
    if let Some((component, width)) = global {
        let index = ctx.bind_input(InputRef::GlobalVariable(component));
        let suffix = if fragment.qualifier.is_empty() {
            accessor(width).to_string()
        } else {
            fragment.qualifier_suffix()
        };
        let code = format!("{sign}{}{suffix}", ctx.buffer_lookup(index));
        ctx.add_code(&code);
        return Ok(Emitted::Code);
    }

    let name = fragment.name.clone();
    match slot {
        Slot::Left => {
            let symbol = fragment.symbol.get_or_insert_with(fresh_symbol).clone();
            if !fragment.unresolved {
                fragment.unresolved = true;
                fragment.flags.selectable = false;
                ctx.diagnose(Some(fragment.id), DiagnosticKind::PlaceholderDeclaration { name });
            }
            let code = format!("{} {symbol}", fragment.type_name);
            ctx.add_code(&code);
            Ok(Emitted::Placeholder)
        }
        Slot::Operand => {
            ctx.diagnose(Some(fragment.id), DiagnosticKind::UnresolvedVariable { name });
            substitute_default(fragment);
            emit_fragment(ctx, fragment, slot)
        }
    }
}

/// Replace a fragment in place by the default constant of its type,
/// keeping its id, qualifier and sign
fn substitute_default(fragment: &mut Fragment) {
    let qualifier = std::mem::take(&mut fragment.qualifier);
    let negated = fragment.negated;
    Fragment::default_constant(&fragment.type_name).copy_onto(fragment);
    fragment.qualifier = qualifier;
    fragment.negated = negated;
    fragment.unresolved = true;
}

/// Emit the bracketed argument list and trailing qualifier
fn emit_arguments(ctx: &mut CompilationContext<'_>, fragment: &mut Fragment) -> Result<()> {
    let call = fragment.call_data();
    let passes_context = fragment.function_reference().is_some() || call.needs_context;

    if !fragment.arguments.is_empty() || passes_context {
        if !call.is_image {
            ctx.add_code("(");
        }
        let separator = if fragment.kind == FragmentKind::For { "; " } else { ", " };
        for (index, argument) in fragment.arguments.iter_mut().enumerate() {
            if index > 0 {
                ctx.add_code(separator);
            }
            emit_statement(ctx, argument)?;
        }
        if passes_context {
            if !fragment.arguments.is_empty() {
                ctx.add_code(", ");
            }
            let context = ctx.config.context_param.clone();
            ctx.add_code(&context);
        }
        ctx.add_code(")");
    }

    if !matches!(
        fragment.kind,
        FragmentKind::VariableReference | FragmentKind::OutVariable
    ) {
        let qualifier = fragment.qualifier_suffix();
        ctx.add_code(&qualifier);
    }
    Ok(())
}

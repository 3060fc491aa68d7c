// SPDX-License-Identifier: MIT OR Apache-2.0
//! Statement and block emission, including data buffer flattening of
//! properties.

use super::fragment::{emit_fragment, Emitted, Slot};
use crate::context::{accessor, CompilationContext};
use crate::error::Result;
use crate::scope::ScopeOwner;
use shadergraph_model::{Block, BlockKind, InputRef, Statement};

/// Emit the fragments of a statement in order
pub fn emit_statement(ctx: &mut CompilationContext<'_>, statement: &mut Statement) -> Result<()> {
    for fragment in &mut statement.fragments {
        emit_fragment(ctx, fragment, Slot::Operand)?;
    }
    Ok(())
}

/// Emit one body block
pub fn emit_block(ctx: &mut CompilationContext<'_>, block: &mut Block) -> Result<()> {
    match block.kind {
        BlockKind::Empty | BlockKind::End | BlockKind::FunctionHeader => Ok(()),
        BlockKind::Break => {
            emit_fragment(ctx, &mut block.fragment, Slot::Operand)?;
            ctx.add_code(";\n");
            Ok(())
        }
        BlockKind::IfHeader | BlockKind::ElseHeader | BlockKind::ForHeader => {
            emit_control(ctx, block)
        }
        BlockKind::OutVariable | BlockKind::VariableDefinition | BlockKind::VariableReference => {
            emit_line(ctx, block)
        }
    }
}

/// `keyword (arguments) { children }`. The scope opens ahead of the
/// header so that For clause variables stay local to the loop.
fn emit_control(ctx: &mut CompilationContext<'_>, block: &mut Block) -> Result<()> {
    let owner = ScopeOwner::Block(block.id);
    ctx.scopes.open(owner);
    emit_fragment(ctx, &mut block.fragment, Slot::Operand)?;
    ctx.add_code(" {\n");
    for child in &mut block.children {
        emit_block(ctx, child)?;
    }
    ctx.scopes.close(owner)?;
    ctx.add_code("}\n");
    Ok(())
}

/// `left = statement;`, where the statement of a property is replaced by a
/// data buffer lookup or its pattern terminal
fn emit_line(ctx: &mut CompilationContext<'_>, block: &mut Block) -> Result<()> {
    if emit_fragment(ctx, &mut block.fragment, Slot::Left)? == Emitted::Placeholder {
        block.assignment.name = "=".to_string();
    }
    emit_fragment(ctx, &mut block.assignment, Slot::Operand)?;

    let property = block.fragment.id;
    if !ctx.is_property(property) {
        emit_statement(ctx, &mut block.statement)?;
        ctx.add_code(";\n");
        return Ok(());
    }

    if let Some(binding) = ctx.binding(property).cloned() {
        let code = if binding.terminal == "color" {
            let index = ctx.bind_input(InputRef::Property(property));
            let color = format!("{}.color", binding.token);
            format!("mix({}, {color}, {color}.w)", ctx.context_lookup(index))
        } else {
            format!("{}.{}", binding.token, binding.terminal)
        };
        ctx.add_code(&code);
    } else {
        // Only the side effects of the value are kept
        let mark = ctx.mark();
        emit_statement(ctx, &mut block.statement)?;
        ctx.rewind_text(mark);

        let index = ctx.bind_input(InputRef::Property(property));
        let mut code = ctx.buffer_lookup(index);
        code.push_str(accessor(block.fragment.component_count(false)));
        let random = block
            .statement
            .fragments
            .first()
            .and_then(|f| f.value_data())
            .and_then(|v| v.random);
        if let Some(random) = random {
            code.push_str(&format!(
                " + {random:.3} * ({} - 0.5)",
                ctx.config.context_field("hash")
            ));
        }
        ctx.add_code(&code);
    }
    ctx.add_code(";\n");
    Ok(())
}

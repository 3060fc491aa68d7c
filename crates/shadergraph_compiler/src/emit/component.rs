// SPDX-License-Identifier: MIT OR Apache-2.0
//! Component emission.

use super::function::emit_function;
use crate::context::CompilationContext;
use crate::error::Result;
use crate::table::FunctionSymbol;
use shadergraph_model::Component;

/// Emit every function of a component in definition order. Free-flow
/// functions and prototypes go to the global buffer, role functions to
/// the local one. A prototype only declares its signature, so its text is
/// discarded once resolved.
///
/// Each function becomes callable after it was emitted.
pub fn emit_component(ctx: &mut CompilationContext<'_>, component: &mut Component) -> Result<()> {
    let id = component.id;
    for function in &mut component.functions {
        ctx.set_global(function.kind.has_type_definition());
        let mark = ctx.mark();
        emit_function(ctx, function)?;
        if function.is_prototype() {
            ctx.rewind(mark);
        }
        ctx.functions.insert(function.id, FunctionSymbol::of(function, id));
    }
    ctx.set_global(false);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::pattern::PatternTable;
    use crate::table::FunctionTable;
    use shadergraph_model::{
        Block, CompiledCode, ComponentKind, Fragment, Function, FunctionKind, GlobalScope,
        Statement, StatementKind,
    };

    #[test]
    fn test_later_functions_call_earlier_ones() {
        let mut component = Component::new(ComponentKind::FunctionContainer, "library");
        let helper = Function::new(FunctionKind::FreeFlow, "helper");
        let call = helper.call();
        component.push_function(helper);
        let mut user = Function::new(FunctionKind::FreeFlow, "user");
        let out = user.out_variable_block("float4", "out", None);
        user.body.push(out);
        user.body[0].statement = Statement::single(StatementKind::Arithmetic, call);
        component.push_function(user);

        let config = CompilerConfig::default();
        let globals = GlobalScope::new();
        let mut functions = FunctionTable::new();
        let patterns = PatternTable::new();
        let mut ctx = CompilationContext::new(
            &config,
            &globals,
            &mut functions,
            &patterns,
            &component,
            0,
            CompiledCode::default(),
        );
        emit_component(&mut ctx, &mut component).expect("emits");
        let result = ctx.finish();

        let helper_symbol = component.functions[0].symbol.clone().expect("symbol");
        assert!(result.code.code.is_empty());
        assert!(result
            .code
            .global_code
            .contains(&format!("out = {helper_symbol}(__funcData);\n")));
        assert!(result.diagnostics.is_empty());
        assert_eq!(component.functions[1].depends_on, vec![component.functions[0].id]);
        assert_eq!(functions.len(), 2);
    }

    #[test]
    fn test_prototype_text_is_discarded() {
        let mut component = Component::new(ComponentKind::FunctionContainer, "library");
        component.push_function(
            Function::new(FunctionKind::Prototype, "noise")
                .with_parameter(Fragment::variable("float2", "p"))
                .with_line(Block::empty()),
        );

        let config = CompilerConfig::default();
        let globals = GlobalScope::new();
        let mut functions = FunctionTable::new();
        let patterns = PatternTable::new();
        let mut ctx = CompilationContext::new(
            &config,
            &globals,
            &mut functions,
            &patterns,
            &component,
            0,
            CompiledCode::default(),
        );
        emit_component(&mut ctx, &mut component).expect("emits");
        let result = ctx.finish();

        assert!(result.code.global_code.is_empty());
        let prototype = component.functions[0].id;
        assert_eq!(functions.get(prototype).map(|s| s.call_name.as_str()), Some("noise"));
    }
}

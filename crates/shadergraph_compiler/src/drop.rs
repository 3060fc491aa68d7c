// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attachment rules: whether a dragged fragment may be dropped onto a
//! target fragment.
//!
//! Rejected edits never reach the model, so the compiler can rely on the
//! tree being well formed apart from references going stale.

use shadergraph_model::{BlockKind, Component, Fragment, FragmentId, FragmentKind, FunctionId};
use std::collections::HashSet;
use thiserror::Error;

/// Why a drop was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropRejection {
    /// Fragment dropped onto itself
    #[error("Cannot drop a fragment onto itself")]
    SelfAttachment,

    /// Function called from its own body
    #[error("Function cannot call itself")]
    Recursion,

    /// Function called above its definition
    #[error("Function is defined after its use")]
    DefinedAfterUse,

    /// Function already calls the target function
    #[error("Call would create a dependency cycle")]
    Cycle,

    /// Global variable used as an assignment target
    #[error("Global variables cannot be assigned")]
    GlobalOnLeftSide,

    /// Target does not accept drops
    #[error("Target does not accept drops")]
    NotTargetable,

    /// Component counts differ
    #[error("Component count mismatch")]
    ArityMismatch,

    /// Types differ
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type of the target
        expected: String,
        /// Type of the dropped fragment
        found: String,
    },

    /// Dropped call cannot produce the target type
    #[error("Result type {0} not supported")]
    UnsupportedType(String),

    /// Call dropped onto a For clause declaration
    #[error("Cannot replace a loop variable declaration")]
    ForHeaderDeclaration,

    /// Raw declaration dropped somewhere other than an empty line
    #[error("Declarations can only be dropped on empty lines")]
    PaletteDeclaration,
}

/// Where a fragment is dropped
#[derive(Debug, Clone, Copy)]
pub struct DropSite<'a> {
    /// Fragment under the drop
    pub target: &'a Fragment,
    /// Kind of the block holding the target
    pub block_kind: BlockKind,
    /// Component being edited
    pub component: &'a Component,
    /// Function holding the target
    pub function: FunctionId,
}

/// Decide whether `drop` may be attached at `site`
pub fn check_drop(drop: &Fragment, site: &DropSite<'_>) -> Result<(), DropRejection> {
    let target = site.target;
    if drop.id == target.id {
        return Err(DropRejection::SelfAttachment);
    }

    if let Some(callee) = drop.function_reference() {
        check_call_order(callee, site)?;
    }

    if site.block_kind == BlockKind::Empty && starts_line(drop) {
        if drop.is_global_variable() || is_global_reference(drop, site.component) {
            return Err(DropRejection::GlobalOnLeftSide);
        }
        return Ok(());
    }

    if !target.flags.targetable {
        return Err(DropRejection::NotTargetable);
    }

    match (drop.kind, target.kind) {
        (FragmentKind::ConstantDefinition, FragmentKind::ConstantValue) => {
            return Err(DropRejection::ArityMismatch);
        }
        (FragmentKind::ConstantDefinition, FragmentKind::VariableReference)
            if drop.component_count(false) != target.component_count(false) =>
        {
            return Err(DropRejection::ArityMismatch);
        }
        (FragmentKind::ConstantDefinition, FragmentKind::ConstantDefinition)
        | (FragmentKind::VariableReference, FragmentKind::Primitive)
            if drop.type_name != target.type_name =>
        {
            return Err(DropRejection::TypeMismatch {
                expected: target.type_name.clone(),
                found: drop.type_name.clone(),
            });
        }
        _ => {}
    }

    if drop.kind == FragmentKind::Primitive {
        let wanted = target.effective_type(false);
        if !drop.supports_type(&wanted) && matches!(drop.type_name.as_str(), "float" | "block") {
            return Err(DropRejection::UnsupportedType(wanted));
        }
        if target.kind == FragmentKind::VariableDefinition && site.block_kind == BlockKind::ForHeader {
            return Err(DropRejection::ForHeaderDeclaration);
        }
    }

    if drop.kind == FragmentKind::VariableDefinition {
        return Err(DropRejection::PaletteDeclaration);
    }
    Ok(())
}

/// Fragments that may open a new line
fn starts_line(drop: &Fragment) -> bool {
    match drop.kind {
        FragmentKind::VariableDefinition
        | FragmentKind::VariableReference
        | FragmentKind::OutVariable => true,
        _ => {
            drop.type_name == "block"
                && (drop.name.starts_with("if") || drop.name.starts_with("for") || drop.name == "break")
        }
    }
}

/// A reference resolved by name against the global scope rather than to a
/// variable of the component
fn is_global_reference(drop: &Fragment, component: &Component) -> bool {
    drop.kind == FragmentKind::VariableReference
        && match drop.variable_reference() {
            Some(variable) => !component.declares_variable(variable) && !is_parameter(variable, component),
            None => true,
        }
}

fn is_parameter(variable: FragmentId, component: &Component) -> bool {
    component
        .functions
        .iter()
        .any(|f| f.parameters().iter().any(|p| p.id == variable))
}

/// A call is only allowed to functions defined above the site function
/// that do not already depend on it
fn check_call_order(callee: FunctionId, site: &DropSite<'_>) -> Result<(), DropRejection> {
    if callee == site.function {
        return Err(DropRejection::Recursion);
    }
    let component = site.component;
    if let (Some(callee_index), Some(site_index)) =
        (component.function_index(callee), component.function_index(site.function))
    {
        if callee_index > site_index {
            return Err(DropRejection::DefinedAfterUse);
        }
    }

    let mut pending = vec![callee];
    let mut seen = HashSet::new();
    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(function) = component.function(id) else {
            continue;
        };
        if function.depends_on.contains(&site.function) {
            return Err(DropRejection::Cycle);
        }
        pending.extend(function.depends_on.iter().copied());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadergraph_model::{Block, ComponentKind, FunctionKind, Statement, StatementKind};

    fn library() -> Component {
        let mut component = Component::new(ComponentKind::FunctionContainer, "library");
        component.add_function("first");
        component.add_function("second");
        component
    }

    fn site<'a>(target: &'a Fragment, component: &'a Component, function: usize) -> DropSite<'a> {
        DropSite {
            target,
            block_kind: BlockKind::VariableReference,
            component,
            function: component.functions[function].id,
        }
    }

    #[test]
    fn test_self_attachment() {
        let component = library();
        let fragment = Fragment::constant("float", 1.0);
        assert_eq!(
            check_drop(&fragment, &site(&fragment, &component, 0)),
            Err(DropRejection::SelfAttachment)
        );
    }

    #[test]
    fn test_call_order() {
        let mut component = library();
        let target = Fragment::constant("float", 1.0);
        let first = component.functions[0].call();
        let second = component.functions[1].call();

        assert_eq!(check_drop(&first, &site(&target, &component, 0)), Err(DropRejection::Recursion));
        assert_eq!(
            check_drop(&second, &site(&target, &component, 0)),
            Err(DropRejection::DefinedAfterUse)
        );
        assert_eq!(check_drop(&first, &site(&target, &component, 1)), Ok(()));

        let second_id = component.functions[1].id;
        component.functions[0].depends_on = vec![second_id];
        assert_eq!(check_drop(&first, &site(&target, &component, 1)), Err(DropRejection::Cycle));
    }

    #[test]
    fn test_empty_line_rules() {
        let mut component = Component::new(ComponentKind::Shader, "shader");
        component.add_default_function(FunctionKind::Shader);
        let empty = Block::empty();
        let on_empty = DropSite {
            target: &empty.fragment,
            block_kind: BlockKind::Empty,
            component: &component,
            function: component.functions[0].id,
        };

        assert_eq!(check_drop(&Fragment::variable("float", "a"), &on_empty), Ok(()));
        let branch = Block::if_block(Statement::new(StatementKind::Boolean), Vec::new());
        assert_eq!(check_drop(&branch.fragment, &on_empty), Ok(()));
        let uv = component.functions[0].parameters()[0].clone();
        assert_eq!(check_drop(&Fragment::reference_to(&uv), &on_empty), Ok(()));
        assert_eq!(
            check_drop(&Fragment::global_reference("float", "exposure"), &on_empty),
            Err(DropRejection::GlobalOnLeftSide)
        );
        assert_eq!(
            check_drop(&Fragment::constant("float", 1.0), &on_empty),
            Err(DropRejection::NotTargetable)
        );
    }

    #[test]
    fn test_constant_rules() {
        let component = library();
        let scalar = Fragment::constant("float", 1.0);
        let vector = Fragment::default_constant("float3");
        let other_vector = Fragment::default_constant("float2");
        let reference = Fragment::global_reference("float2", "offset");

        assert_eq!(
            check_drop(&vector, &site(&scalar, &component, 0)),
            Err(DropRejection::ArityMismatch)
        );
        assert_eq!(
            check_drop(&vector, &site(&reference, &component, 0)),
            Err(DropRejection::ArityMismatch)
        );
        assert!(matches!(
            check_drop(&vector, &site(&other_vector, &component, 0)),
            Err(DropRejection::TypeMismatch { .. })
        ));
        assert_eq!(check_drop(&other_vector, &site(&reference, &component, 0)), Ok(()));
        assert_eq!(
            check_drop(&Fragment::variable("float", "a"), &site(&scalar, &component, 0)),
            Err(DropRejection::PaletteDeclaration)
        );
    }

    #[test]
    fn test_primitive_rules() {
        let component = library();
        let mut length = Fragment::primitive("float", "length").with_evaluates_to("float");
        let target = Fragment::default_constant("float3");
        assert_eq!(
            check_drop(&length, &site(&target, &component, 0)),
            Err(DropRejection::UnsupportedType("float3".to_string()))
        );

        length.evaluates_to = Some("input0".to_string());
        length.argument_format = Some(vec!["float|float2|float3|float4".to_string()]);
        assert_eq!(check_drop(&length, &site(&target, &component, 0)), Ok(()));

        let mut declaration = Fragment::variable("int", "i");
        declaration.flags.targetable = true;
        let in_for = DropSite {
            block_kind: BlockKind::ForHeader,
            ..site(&declaration, &component, 0)
        };
        let abs = Fragment::primitive("int", "abs").with_evaluates_to("int");
        assert_eq!(check_drop(&abs, &in_for), Err(DropRejection::ForHeaderDeclaration));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deep copies with fresh ids.
//!
//! Copying is two-phase: every node of the subtree is duplicated under a
//! fresh id while the old-to-new mapping is recorded, then every reference
//! held inside the copy is rewritten through that mapping. References that
//! point outside the copied subtree are left as they are.

use crate::block::{Block, BlockId};
use crate::component::{Component, ComponentId};
use crate::fragment::{Fragment, FragmentId, Reference};
use crate::function::{Function, FunctionId};
use crate::statement::{Statement, StatementId};
use std::collections::HashMap;

/// Mapping from original ids to the ids of their copies
#[derive(Debug, Default)]
pub struct IdRemap {
    fragments: HashMap<FragmentId, FragmentId>,
    functions: HashMap<FunctionId, FunctionId>,
}

impl IdRemap {
    /// Id of the copy of a fragment, or the id itself outside the subtree
    pub fn fragment(&self, id: FragmentId) -> FragmentId {
        self.fragments.get(&id).copied().unwrap_or(id)
    }

    /// Id of the copy of a function, or the id itself outside the subtree
    pub fn function(&self, id: FunctionId) -> FunctionId {
        self.functions.get(&id).copied().unwrap_or(id)
    }

    /// Rewrite a reference
    pub fn reference(&self, reference: Reference) -> Reference {
        match reference {
            Reference::Fragment(id) => Reference::Fragment(self.fragment(id)),
            Reference::Function(id) => Reference::Function(self.function(id)),
        }
    }
}

/// Structural copy minting fresh ids for every contained node
pub trait DeepCopy: Sized {
    /// Copy with fresh ids, recording each id pair in `remap`
    fn copy_with(&self, remap: &mut IdRemap) -> Self;

    /// Rewrite the references held inside `self` through `remap`
    fn remap_references(&mut self, remap: &IdRemap);

    /// Copy with fresh ids and references into the copied subtree remapped
    fn deep_copy(&self) -> Self {
        let mut remap = IdRemap::default();
        let mut copy = self.copy_with(&mut remap);
        copy.remap_references(&remap);
        copy
    }
}

impl DeepCopy for Fragment {
    fn copy_with(&self, remap: &mut IdRemap) -> Self {
        let mut copy = self.clone();
        copy.id = FragmentId::new();
        copy.symbol = None;
        copy.references = 0;
        copy.arguments = self.arguments.iter().map(|a| a.copy_with(remap)).collect();
        remap.fragments.insert(self.id, copy.id);
        copy
    }

    fn remap_references(&mut self, remap: &IdRemap) {
        self.refers_to = self.refers_to.map(|r| remap.reference(r));
        for argument in &mut self.arguments {
            argument.remap_references(remap);
        }
    }
}

impl DeepCopy for Statement {
    fn copy_with(&self, remap: &mut IdRemap) -> Self {
        Self {
            id: StatementId::new(),
            kind: self.kind,
            fragments: self.fragments.iter().map(|f| f.copy_with(remap)).collect(),
        }
    }

    fn remap_references(&mut self, remap: &IdRemap) {
        for fragment in &mut self.fragments {
            fragment.remap_references(remap);
        }
    }
}

impl DeepCopy for Block {
    fn copy_with(&self, remap: &mut IdRemap) -> Self {
        Self {
            id: BlockId::new(),
            kind: self.kind,
            fragment: self.fragment.copy_with(remap),
            assignment: self.assignment.copy_with(remap),
            statement: self.statement.copy_with(remap),
            children: self.children.iter().map(|c| c.copy_with(remap)).collect(),
            comment: self.comment.clone(),
        }
    }

    fn remap_references(&mut self, remap: &IdRemap) {
        self.fragment.remap_references(remap);
        self.assignment.remap_references(remap);
        self.statement.remap_references(remap);
        for child in &mut self.children {
            child.remap_references(remap);
        }
    }
}

impl DeepCopy for Function {
    fn copy_with(&self, remap: &mut IdRemap) -> Self {
        let copy = Self {
            id: FunctionId::new(),
            kind: self.kind,
            name: self.name.clone(),
            header: self.header.copy_with(remap),
            body: self.body.iter().map(|b| b.copy_with(remap)).collect(),
            comment: self.comment.clone(),
            references: 0,
            depends_on: Vec::new(),
            symbol: None,
        };
        remap.functions.insert(self.id, copy.id);
        copy
    }

    fn remap_references(&mut self, remap: &IdRemap) {
        self.header.remap_references(remap);
        for block in &mut self.body {
            block.remap_references(remap);
        }
    }
}

impl DeepCopy for Component {
    fn copy_with(&self, remap: &mut IdRemap) -> Self {
        Self {
            id: ComponentId::new(),
            kind: self.kind,
            name: self.name.clone(),
            functions: self.functions.iter().map(|f| f.copy_with(remap)).collect(),
            properties: self.properties.clone(),
            property_names: self.property_names.clone(),
            connections: self.connections.clone(),
            compiled: None,
        }
    }

    fn remap_references(&mut self, remap: &IdRemap) {
        for function in &mut self.functions {
            function.remap_references(remap);
        }
        for property in &mut self.properties {
            *property = remap.fragment(*property);
        }
        self.property_names = self
            .property_names
            .drain(..)
            .map(|(id, name)| (remap.fragment(id), name))
            .collect();
        self.connections = self
            .connections
            .drain(..)
            .map(|(id, connection)| (remap.fragment(id), connection))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::connection::Connection;
    use crate::function::FunctionKind;
    use crate::statement::StatementKind;

    #[test]
    fn test_copy_remaps_internal_references() {
        let variable = Fragment::variable("float", "a");
        let definition = Block::line(
            variable.clone(),
            Statement::single(StatementKind::Arithmetic, Fragment::constant("float", 1.0)),
        );
        let usage = Block::line(
            Fragment::reference_to(&variable),
            Statement::single(StatementKind::Arithmetic, Fragment::reference_to(&variable)),
        );
        let function = Function::new(FunctionKind::FreeFlow, "f")
            .with_line(definition)
            .with_line(usage);

        let copy = function.deep_copy();
        let new_variable = copy.body[0].fragment.id;
        assert_ne!(new_variable, variable.id);
        assert_eq!(copy.body[1].fragment.variable_reference(), Some(new_variable));
        assert_eq!(
            copy.body[1].statement.fragments[0].variable_reference(),
            Some(new_variable)
        );
    }

    #[test]
    fn test_copy_keeps_external_references() {
        let outside = Fragment::variable("float3", "shared");
        let line = Block::line(
            Fragment::variable("float3", "local"),
            Statement::single(StatementKind::Arithmetic, Fragment::reference_to(&outside)),
        );
        let copy = line.deep_copy();
        assert_eq!(copy.statement.fragments[0].variable_reference(), Some(outside.id));
    }

    #[test]
    fn test_copy_remaps_recursive_call() {
        let mut function = Function::new(FunctionKind::FreeFlow, "recurse");
        let call = function.call();
        function.body.push(Block::line(
            Fragment::variable("float4", "r"),
            Statement::single(StatementKind::Arithmetic, call),
        ));
        let copy = function.deep_copy();
        assert_eq!(copy.body[0].statement.fragments[0].function_reference(), Some(copy.id));
    }

    #[test]
    fn test_component_copy_remaps_properties() {
        let mut component = Component::new(ComponentKind::Material3D, "metal");
        let line = Function::variable_definition_block("float4", "tint");
        let property = line.fragment.id;
        component.push_function(Function::new(FunctionKind::Material3D, "material").with_line(line));
        component.expose_property(property, "Tint");
        component.connect(property, Connection::new(ComponentId::new(), "color"));

        let copy = component.deep_copy();
        assert_ne!(copy.id, component.id);
        let copied = copy.properties[0];
        assert_ne!(copied, property);
        assert!(copy.declares_variable(copied));
        assert_eq!(copy.property_names.get(&copied).map(String::as_str), Some("Tint"));
        assert!(copy.connections.contains_key(&copied));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project: the ordered set of components plus the global scope they see.

use crate::component::{Component, ComponentId, ComponentKind};
use crate::error::{ModelError, Result};
use crate::types;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A project of components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    pub name: String,
    /// Components in definition order
    components: IndexMap<ComponentId, Component>,
}

impl Project {
    /// Create a new empty project
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: IndexMap::new(),
        }
    }

    /// Add a component to the project
    pub fn add_component(&mut self, component: Component) -> ComponentId {
        let id = component.id;
        self.components.insert(id, component);
        id
    }

    /// Remove a component and every connection reading from it
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Component> {
        let removed = self.components.shift_remove(&id)?;
        for component in self.components.values_mut() {
            component.connections.retain(|_, c| !c.involves_component(id));
        }
        Some(removed)
    }

    /// Get a component by ID
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Get a mutable component by ID
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    /// Get a component by ID, failing if absent
    pub fn require(&self, id: ComponentId) -> Result<&Component> {
        self.components.get(&id).ok_or(ModelError::ComponentNotFound(id))
    }

    /// Get the first component with a given name
    pub fn component_by_name(&self, name: &str) -> Option<&Component> {
        self.components.values().find(|c| c.name == name)
    }

    /// Find a component by uuid text or by name
    pub fn find(&self, key: &str) -> Option<&Component> {
        Uuid::parse_str(key)
            .ok()
            .and_then(|uuid| self.components.get(&ComponentId(uuid)))
            .or_else(|| self.component_by_name(key))
    }

    /// Get all components
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Get the number of components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Get all pattern components
    pub fn patterns(&self) -> impl Iterator<Item = &Component> {
        self.components.values().filter(|c| c.kind == ComponentKind::Pattern)
    }

    /// Drop connections whose source component or target property no
    /// longer exists. Returns the number of connections dropped.
    pub fn prune_connections(&mut self) -> usize {
        let live: Vec<ComponentId> = self.components.keys().copied().collect();
        let mut dropped = 0;
        for component in self.components.values_mut() {
            let before = component.connections.len();
            let properties = component.properties.clone();
            component
                .connections
                .retain(|property, c| live.contains(&c.component) && properties.contains(property));
            dropped += before - component.connections.len();
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Pruned dangling connections");
        }
        dropped
    }

    /// Snapshot of the global Variable components visible to compilation
    pub fn global_scope(&self) -> GlobalScope {
        GlobalScope::from_components(self.components.values())
    }

    /// Encode the project as pretty RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Decode a project from RON
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// A global variable exposed by a Variable component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    /// Owning Variable component
    pub component: ComponentId,
    /// Exposed name, matched against unresolved variable references
    pub name: String,
    /// Declared type
    pub type_name: String,
    /// Current value
    pub value: [f32; 4],
}

impl GlobalVariable {
    /// Number of components of the variable's type
    pub fn component_count(&self) -> usize {
        types::arity(&self.type_name)
    }
}

/// Read-only view of the global variables of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalScope {
    variables: Vec<GlobalVariable>,
}

impl GlobalScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the Variable components among `components`
    pub fn from_components<'a>(components: impl IntoIterator<Item = &'a Component>) -> Self {
        let variables = components
            .into_iter()
            .filter(|c| c.kind == ComponentKind::Variable)
            .filter_map(|c| {
                let property = *c.properties.first()?;
                let (left, _) = c.property(property)?;
                Some(GlobalVariable {
                    component: c.id,
                    name: c.name.clone(),
                    type_name: left.type_name.clone(),
                    value: c.property_value(property).unwrap_or_default(),
                })
            })
            .collect();
        Self { variables }
    }

    /// Add a variable
    pub fn insert(&mut self, variable: GlobalVariable) {
        self.variables.push(variable);
    }

    /// Look up a variable by exposed name
    pub fn find(&self, name: &str) -> Option<&GlobalVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Look up a variable by owning component
    pub fn find_by_id(&self, component: ComponentId) -> Option<&GlobalVariable> {
        self.variables.iter().find(|v| v.component == component)
    }

    /// Iterate over all variables
    pub fn iter(&self) -> impl Iterator<Item = &GlobalVariable> {
        self.variables.iter()
    }

    /// Whether the scope is empty
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

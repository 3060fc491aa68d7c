// SPDX-License-Identifier: MIT OR Apache-2.0
//! Result of a compile pass as recorded on a component.

use crate::component::ComponentId;
use crate::fragment::FragmentId;
use crate::function::FunctionId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An input bound to the external data buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputRef {
    /// A component property, by the id of its left-hand fragment
    Property(FragmentId),
    /// A global Variable component
    GlobalVariable(ComponentId),
}

/// A texture sampled by an image primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    /// Image name as shown in the editor
    pub name: String,
    /// Emitted texture symbol
    pub token: String,
}

/// A property fed by a pattern's output terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternBinding {
    /// Symbol of the local `PatternOut` value
    pub token: String,
    /// Terminal read from it
    pub terminal: String,
    /// Source pattern component
    pub pattern: ComponentId,
    /// Symbol of the pattern's entry function
    pub entry: String,
}

/// Emitted code and bookkeeping of one complete compile pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledCode {
    /// Function body source
    pub code: String,
    /// Free function and prototype source
    pub global_code: String,
    /// Inputs bound to the data buffer, in index order
    pub inputs: Vec<InputRef>,
    /// Owning component of each entry of `inputs`
    pub input_components: Vec<ComponentId>,
    /// Textures sampled by the component
    pub textures: Vec<TextureRef>,
    /// Pattern-fed properties
    pub pattern_bindings: IndexMap<FragmentId, PatternBinding>,
    /// Calls per function seen in the pass
    pub call_counts: IndexMap<FunctionId, u32>,
}

impl CompiledCode {
    /// Number of inputs bound to the data buffer
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Append another pass' bindings (a pattern compiled ahead of its
    /// material)
    pub fn absorb(&mut self, other: &CompiledCode) {
        self.inputs.extend_from_slice(&other.inputs);
        self.input_components.extend_from_slice(&other.input_components);
        self.textures.extend(other.textures.iter().cloned());
        self.pattern_bindings
            .extend(other.pattern_bindings.iter().map(|(k, v)| (*k, v.clone())));
    }
}

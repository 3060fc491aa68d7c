// SPDX-License-Identifier: MIT OR Apache-2.0
//! Components: named bundles of functions with externally bindable
//! properties.

use crate::block::Block;
use crate::connection::Connection;
use crate::error::{ModelError, Result};
use crate::fragment::{Fragment, FragmentData, FragmentId, VariableData};
use crate::function::{uv_parameters, Function, FunctionId, FunctionKind};
use crate::output::CompiledCode;
use crate::statement::{Statement, StatementKind};
use crate::value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub Uuid);

impl ComponentId {
    /// Create a new random component ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Role of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ComponentKind {
    Colorize,
    SkyDome,
    SDF2D,
    SDF3D,
    Render2D,
    Render3D,
    Boolean,
    /// Library of free-flow functions and prototypes
    FunctionContainer,
    Camera2D,
    Camera3D,
    Domain2D,
    Domain3D,
    Transform2D,
    Transform3D,
    Dummy,
    /// Global variable visible to every component of the project
    Variable,
    RayMarch3D,
    Ground3D,
    RegionProfile3D,
    AO3D,
    Shadows3D,
    Normal3D,
    /// Material, may consume patterns
    Material3D,
    UVMap3D,
    Modifier2D,
    Modifier3D,
    /// Pattern, exposes color, mask and id terminals
    Pattern,
    Light3D,
    Image,
    Texture,
    PostFX,
    Fog3D,
    Clouds3D,
    Shader,
    Shape,
}

impl ComponentKind {
    /// Whether properties of this kind may be fed by patterns
    pub fn consumes_patterns(self) -> bool {
        matches!(self, Self::Material3D | Self::Pattern)
    }
}

/// A named bundle of functions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Unique component ID
    pub id: ComponentId,
    /// Component role
    pub kind: ComponentKind,
    /// Name, also the exposed name of a global variable
    pub name: String,
    /// Functions in definition order
    pub functions: Vec<Function>,
    /// Externally tweakable inputs, in data-buffer order
    pub properties: Vec<FragmentId>,
    /// Display name per property
    #[serde(default)]
    pub property_names: IndexMap<FragmentId, String>,
    /// Inbound connections per property
    #[serde(default)]
    pub connections: IndexMap<FragmentId, Connection>,
    /// Output of the last complete compile pass
    #[serde(skip)]
    pub compiled: Option<CompiledCode>,
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Component {
    /// Create a new component without functions
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            id: ComponentId::new(),
            kind,
            name: name.into(),
            functions: Vec::new(),
            properties: Vec::new(),
            property_names: IndexMap::new(),
            connections: IndexMap::new(),
            compiled: None,
        }
    }

    /// Create a global Variable component holding one property
    pub fn variable(name: &str, type_name: &str, display_name: &str, default: &[f32]) -> Self {
        let mut component = Self::new(ComponentKind::Variable, name);

        let mut fragment = Fragment::variable(type_name, name);
        fragment.data = FragmentData::Variable(VariableData { is_global_variable: true });
        let id = fragment.id;

        let mut constant = Fragment::default_constant(type_name);
        value::insert_value(&mut constant, default);

        let function = Function::new(FunctionKind::Headerless, "")
            .with_line(Block::line(fragment, Statement::single(StatementKind::Arithmetic, constant)))
            .with_line(Block::new(crate::block::BlockKind::Empty));
        component.functions.push(function);
        component.expose_property(id, display_name);
        component
    }

    /// Append a free-flow function with one empty line
    pub fn add_function(&mut self, name: impl Into<String>) -> FunctionId {
        let function = Function::new(FunctionKind::FreeFlow, name).with_line(Block::empty());
        let id = function.id;
        self.functions.push(function);
        id
    }

    /// Append the standard entry function for a role
    pub fn add_default_function(&mut self, kind: FunctionKind) -> FunctionId {
        let function = default_function(kind);
        let id = function.id;
        self.functions.push(function);
        id
    }

    /// Append a function
    pub fn push_function(&mut self, function: Function) -> FunctionId {
        let id = function.id;
        self.functions.push(function);
        id
    }

    /// Declare the left-hand fragment of a body line as property
    pub fn expose_property(&mut self, fragment: FragmentId, display_name: impl Into<String>) {
        if !self.properties.contains(&fragment) {
            self.properties.push(fragment);
        }
        self.property_names.insert(fragment, display_name.into());
    }

    /// Remove a property and its inbound connection
    pub fn remove_property(&mut self, fragment: FragmentId) {
        self.properties.retain(|p| *p != fragment);
        self.property_names.shift_remove(&fragment);
        self.connections.shift_remove(&fragment);
    }

    /// Feed a property from another component's terminal
    pub fn connect(&mut self, property: FragmentId, connection: Connection) {
        self.connections.insert(property, connection);
    }

    /// Whether the fragment is a declared property
    pub fn is_property(&self, fragment: FragmentId) -> bool {
        self.properties.contains(&fragment)
    }

    /// Get the line declaring a property
    pub fn property_block(&self, property: FragmentId) -> Option<&Block> {
        self.functions
            .iter()
            .flat_map(|f| f.body.iter())
            .find(|b| b.fragment.id == property)
    }

    /// Get the line declaring a property, failing if there is none
    pub fn require_property(&self, property: FragmentId) -> Result<&Block> {
        self.property_block(property)
            .ok_or(ModelError::PropertyNotFound(property))
    }

    /// Get the left-hand fragment of a property and the first fragment of
    /// its value
    pub fn property(&self, property: FragmentId) -> Option<(&Fragment, Option<&Fragment>)> {
        self.property_block(property)
            .map(|b| (&b.fragment, b.statement.fragments.first()))
    }

    /// Current value of a property
    pub fn property_value(&self, property: FragmentId) -> Option<[f32; 4]> {
        let (_, value_fragment) = self.property(property)?;
        Some(value_fragment.map_or([0.0; 4], value::extract_value))
    }

    /// Whether any line (nested ones included) declares this variable
    pub fn declares_variable(&self, fragment: FragmentId) -> bool {
        fn search(blocks: &[Block], fragment: FragmentId) -> bool {
            blocks
                .iter()
                .any(|b| b.fragment.id == fragment || search(&b.children, fragment))
        }
        self.functions.iter().any(|f| search(&f.body, fragment))
    }

    /// Get a function by ID
    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.iter().find(|f| f.id == id)
    }

    /// Position of a function in definition order
    pub fn function_index(&self, id: FunctionId) -> Option<usize> {
        self.functions.iter().position(|f| f.id == id)
    }

    /// Mutably visit every fragment of every function
    pub fn visit_fragments_mut(&mut self, f: &mut impl FnMut(&mut Fragment)) {
        for function in &mut self.functions {
            function.visit_fragments_mut(f);
        }
    }
}

/// Build the standard entry function of a role
fn default_function(kind: FunctionKind) -> Function {
    let (name, comment, parameters, outputs): (&str, &str, Vec<Fragment>, &[(&str, &str)]) =
        match kind {
            FunctionKind::Shader => (
                "shader_entry",
                "Main shader entry point",
                uv_parameters().into(),
                &[("float4", "outColor")],
            ),
            FunctionKind::Shape => (
                "shape_entry",
                "Compute shape distance, normal, and material settings",
                uv_parameters().into(),
                &[
                    ("float", "outDistance"),
                    ("float3", "outNormal"),
                    ("float3", "outMaterialAlbedo"),
                    ("float", "outMaterialMetallic"),
                    ("float", "outMaterialRoughness"),
                    ("float3", "outMaterialEmissive"),
                    ("float3", "outMaterialTransmissive"),
                ],
            ),
            FunctionKind::Colorize => (
                "colorize",
                "Returns a color for the given uv position [0..1]",
                uv_parameters().into(),
                &[("float4", "outColor")],
            ),
            FunctionKind::SkyDome => {
                let mut parameters: Vec<Fragment> = uv_parameters().into();
                parameters.push(Fragment::parameter("float3", "rayOrigin"));
                parameters.push(Fragment::parameter("float3", "rayDirection"));
                (
                    "skyDome",
                    "Returns a color for the given ray direction",
                    parameters,
                    &[("float4", "outColor")],
                )
            }
            FunctionKind::SDF2D => (
                "shapeDistance",
                "Returns the distance to the shape for the given position",
                vec![Fragment::parameter("float2", "position")],
                &[("float", "outDistance")],
            ),
            FunctionKind::SDF3D => (
                "shapeDistance",
                "Returns the distance to the shape for the given position",
                vec![
                    Fragment::parameter("float3", "position"),
                    Fragment::parameter("float3", "rayOrigin"),
                    Fragment::parameter("float3", "rayDirection"),
                ],
                &[("float", "outDistance")],
            ),
            FunctionKind::Pattern => (
                "pattern",
                "Returns color, mask and id for the given hit",
                vec![
                    Fragment::parameter("float2", "uv"),
                    Fragment::parameter("float3", "position"),
                    Fragment::parameter("float", "distance2D"),
                    Fragment::parameter("float3", "normal"),
                    Fragment::parameter("float3", "rayOrigin"),
                    Fragment::parameter("float3", "rayDirection"),
                ],
                &[("float4", "outColor"), ("float", "outMask"), ("float", "outId")],
            ),
            FunctionKind::Material3D => (
                "material",
                "Returns the material settings for the given hit",
                vec![
                    Fragment::parameter("float2", "uv"),
                    Fragment::parameter("float3", "localPosition"),
                    Fragment::parameter("float3", "hitNormal"),
                    Fragment::parameter("float3", "rayOrigin"),
                    Fragment::parameter("float3", "incomingDirection"),
                ],
                &[
                    ("float4", "outColor"),
                    ("float3", "outMask"),
                    ("float3", "outReflectionDir"),
                    ("float", "outReflectionBlur"),
                    ("float", "outReflectionDist"),
                ],
            ),
            _ => ("main", "", Vec::new(), &[]),
        };

    let mut function = Function::new(kind, name).with_comment(comment);
    function.header.statement.fragments = parameters;
    function.body.push(Block::empty());
    for (type_name, out_name) in outputs {
        let line = function.out_variable_block(type_name, out_name, None);
        function.body.push(line);
    }
    function
}

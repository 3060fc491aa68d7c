// SPDX-License-Identifier: MIT OR Apache-2.0
//! Functions: a header block plus an ordered body, tagged with a calling
//! convention.

use crate::block::{Block, BlockKind};
use crate::fragment::{Fragment, FragmentKind};
use crate::statement::{Statement, StatementKind};
use crate::types;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub Uuid);

impl FunctionId {
    /// Create a new random function ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FunctionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Calling convention / shader role of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum FunctionKind {
    /// User function taking an implicit trailing context pointer
    FreeFlow,
    Colorize,
    SkyDome,
    SDF2D,
    SDF3D,
    Render2D,
    Render3D,
    Boolean,
    Camera2D,
    Camera3D,
    Transform2D,
    Transform3D,
    /// Body lines only, no header (global variables)
    Headerless,
    RayMarch3D,
    /// Declaration only, used for type checking and resolution
    Prototype,
    Ground3D,
    RegionProfile3D,
    AO3D,
    Shadows3D,
    Normal3D,
    Material3D,
    UVMap3D,
    Domain2D,
    Domain3D,
    Modifier2D,
    Modifier3D,
    Pattern,
    Light3D,
    PostFX,
    Fog3D,
    Clouds3D,
    Shader,
    Shape,
}

impl FunctionKind {
    /// Entry point name of a role function
    fn entry_name(self) -> Option<&'static str> {
        match self {
            Self::Colorize => Some("colorize"),
            Self::SkyDome => Some("skyDome"),
            Self::SDF2D | Self::SDF3D => Some("shapeDistance"),
            Self::Render2D => Some("computeColor"),
            _ => None,
        }
    }

    /// Whether the header carries a user editable type definition
    pub fn has_type_definition(self) -> bool {
        matches!(self, Self::FreeFlow | Self::Prototype)
    }
}

/// A function of a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    /// Unique function ID
    pub id: FunctionId,
    /// Calling convention
    pub kind: FunctionKind,
    /// Display name
    pub name: String,
    /// Header: return type, name and parameter list
    pub header: Block,
    /// Body lines
    pub body: Vec<Block>,
    /// Free-text comment
    #[serde(default)]
    pub comment: String,
    /// Number of calls seen in the last compile pass
    #[serde(skip)]
    pub references: u32,
    /// Functions called from this one in the last compile pass
    #[serde(skip)]
    pub depends_on: Vec<FunctionId>,
    /// Hygienic emission symbol, assigned on first compile
    #[serde(skip)]
    pub symbol: Option<String>,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Function {
    /// Create a new function with an empty body
    pub fn new(kind: FunctionKind, name: impl Into<String>) -> Self {
        let name = name.into();
        let return_type = if kind == FunctionKind::FreeFlow { "float4" } else { "void" };
        let header_name = kind.entry_name().map_or_else(|| name.clone(), str::to_string);

        let mut header = Block::new(BlockKind::FunctionHeader);
        header.fragment = if kind.has_type_definition() {
            let mut fragment = Fragment::new(FragmentKind::TypeDefinition, return_type, header_name);
            fragment.flags.selectable = true;
            fragment.flags.draggable = true;
            fragment
        } else {
            Fragment::new(FragmentKind::ConstTypeDefinition, return_type, header_name)
        };

        Self {
            id: FunctionId::new(),
            kind,
            name,
            header,
            body: Vec::new(),
            comment: String::new(),
            references: 0,
            depends_on: Vec::new(),
            symbol: None,
        }
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Append a parameter to the header
    pub fn with_parameter(mut self, parameter: Fragment) -> Self {
        self.header.statement.fragments.push(parameter);
        self
    }

    /// Append a body line
    pub fn with_line(mut self, block: Block) -> Self {
        self.body.push(block);
        self
    }

    /// Header parameters
    pub fn parameters(&self) -> &[Fragment] {
        &self.header.statement.fragments
    }

    /// Declared return type
    pub fn return_type(&self) -> &str {
        &self.header.fragment.type_name
    }

    /// Whether calls pass the context pointer implicitly
    pub fn is_free_flow(&self) -> bool {
        self.kind == FunctionKind::FreeFlow
    }

    /// Whether this function is declaration only
    pub fn is_prototype(&self) -> bool {
        self.kind == FunctionKind::Prototype
    }

    /// Create a call to this function
    pub fn call(&self) -> Fragment {
        Fragment::call(self.id, self.return_type(), self.name.clone())
    }

    /// Create a line assigning an output variable. Initialized with a
    /// reference to `refers_to` if given, the role's default constant
    /// otherwise.
    pub fn out_variable_block(
        &self,
        type_name: &str,
        name: &str,
        refers_to: Option<&Fragment>,
    ) -> Block {
        let mut out = Fragment::new(FragmentKind::OutVariable, type_name, name);
        out.flags.selectable = true;
        out.flags.monitorable = true;
        out.flags.draggable = name != "out";
        out.evaluates_to = Some(type_name.to_string());

        let initializer = match refers_to {
            Some(target) => Fragment::reference_to(target),
            None => {
                let mut constant = Fragment::default_constant(type_name);
                if types::arity(type_name) == 1 {
                    if name == "outDistance" {
                        if let Some(data) = constant.value_data_mut() {
                            data.min = -10000.0;
                            data.max = 10000.0;
                        }
                    }
                } else if name == "outColor" {
                    let color = match self.kind {
                        FunctionKind::Colorize | FunctionKind::SkyDome => [0.161, 0.165, 0.184, 1.0],
                        _ => [0.0, 0.0, 0.0, 1.0],
                    };
                    for (argument, value) in constant.arguments.iter_mut().zip(color) {
                        if let Some(fragment) = argument.fragments.first_mut() {
                            fragment.set_value(value);
                        }
                    }
                }
                constant
            }
        };
        Block::line(out, Statement::single(StatementKind::Arithmetic, initializer))
    }

    /// Create a line declaring a variable initialized with its type's
    /// default constant
    pub fn variable_definition_block(type_name: &str, name: &str) -> Block {
        let variable = Fragment::variable(type_name, name).with_evaluates_to(type_name);
        Block::line(
            variable,
            Statement::single(StatementKind::Arithmetic, Fragment::default_constant(type_name)),
        )
    }

    /// Visit every fragment of the header and body
    pub fn visit_fragments<'a>(&'a self, f: &mut impl FnMut(&'a Fragment)) {
        self.header.visit_fragments(f);
        for block in &self.body {
            block.visit_fragments(f);
        }
    }

    /// Mutably visit every fragment of the header and body
    pub fn visit_fragments_mut(&mut self, f: &mut impl FnMut(&mut Fragment)) {
        self.header.visit_fragments_mut(f);
        for block in &mut self.body {
            block.visit_fragments_mut(f);
        }
    }
}

/// Standard parameter list shared by the 2D role functions
pub(crate) fn uv_parameters() -> [Fragment; 2] {
    [Fragment::parameter("float2", "uv"), Fragment::parameter("float2", "size")]
}

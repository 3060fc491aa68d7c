// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fragments, the smallest typed nodes of the expression tree.
//!
//! Leaf kinds (constants, variables, operators) and composite kinds (calls,
//! constant constructors, control keywords) share one shape: a fragment owns
//! its argument statements and refers to other nodes only by id.

use crate::function::FunctionId;
use crate::statement::{Statement, StatementKind};
use crate::types;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentId(pub Uuid);

impl FragmentId {
    /// Create a new random fragment ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FragmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FragmentKind {
    /// Not defined yet (empty line placeholder)
    #[default]
    Undefined,
    /// Type definition of a function header (`float4 name`)
    TypeDefinition,
    /// Fixed type definition of a role function header
    ConstTypeDefinition,
    /// Definition of a variable (`float4 color`)
    VariableDefinition,
    /// Reference to a variable
    VariableReference,
    /// Output variable of a role function (`outColor`)
    OutVariable,
    /// Constructor of a vector constant (`float4(...)`)
    ConstantDefinition,
    /// Scalar constant value (`1.2`)
    ConstantValue,
    /// Builtin or user function call (`abs`, `sin`, ...)
    Primitive,
    /// Arithmetic operator (`+`, `-`, ...)
    Arithmetic,
    /// `(`
    OpeningBracket,
    /// `)`
    ClosingBracket,
    /// Assignment operator (`=`, `+=`, ...)
    Assignment,
    /// Comparison operator (`==`, `<=`, ...)
    Comparison,
    /// Logic operator (`&&`, `||`)
    Logic,
    /// `if`
    If,
    /// `else`
    Else,
    /// `for`
    For,
    /// End of a control-flow block
    End,
    /// `break`
    Break,
}

/// Interaction flags consulted by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FragmentFlags {
    /// Can be selected
    pub selectable: bool,
    /// Can be dragged
    pub draggable: bool,
    /// Accepts drops
    pub targetable: bool,
    /// Supplied by the shader itself, never emitted
    pub not_codeable: bool,
    /// Value can be monitored
    pub monitorable: bool,
}

impl FragmentFlags {
    /// No interaction at all
    pub const NONE: Self = Self {
        selectable: false,
        draggable: false,
        targetable: false,
        not_codeable: false,
        monitorable: false,
    };

    /// Selectable, draggable and targetable
    pub const EDITABLE: Self = Self {
        selectable: true,
        draggable: true,
        targetable: true,
        not_codeable: false,
        monitorable: false,
    };

    /// Externally supplied function parameter
    pub const PARAMETER: Self = Self {
        selectable: true,
        draggable: true,
        targetable: false,
        not_codeable: true,
        monitorable: false,
    };

    /// Variable declared on a line of its own
    pub const DECLARATION: Self = Self {
        selectable: true,
        draggable: true,
        targetable: false,
        not_codeable: false,
        monitorable: true,
    };
}

/// Value settings of a constant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueData {
    /// Current value
    pub value: f32,
    /// Lower bound for editing
    pub min: f32,
    /// Upper bound for editing
    pub max: f32,
    /// Decimal places when emitted
    pub precision: u8,
    /// Per-instance randomization amplitude
    #[serde(default)]
    pub random: Option<f32>,
}

impl ValueData {
    /// Default settings for a type
    pub fn for_type(type_name: &str) -> Self {
        if types::is_integer(type_name) {
            Self { value: 1.0, min: 0.0, max: 10.0, precision: 0, random: None }
        } else {
            Self { value: 1.0, min: 0.0, max: 1.0, precision: 3, random: None }
        }
    }
}

/// Flags of a primitive call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallData {
    /// Samples an image bound as a texture
    pub is_image: bool,
    /// Takes the context pointer as trailing argument
    pub needs_context: bool,
}

/// Extra data of a variable definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariableData {
    /// Declared by a global Variable component
    pub is_global_variable: bool,
}

/// Kind specific attributes of a fragment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum FragmentData {
    /// Nothing beyond the common attributes
    #[default]
    None,
    /// Constant value settings
    Value(ValueData),
    /// Call flags
    Call(CallData),
    /// Variable flags
    Variable(VariableData),
}

/// What a fragment refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reference {
    /// A variable definition or function parameter
    Fragment(FragmentId),
    /// A function
    Function(FunctionId),
}

/// A node of the expression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Unique fragment ID
    pub id: FragmentId,
    /// Fragment kind
    pub kind: FragmentKind,
    /// Declared type (`float`, `float3`, ...)
    pub type_name: String,
    /// Display name (operator, keyword, variable or function name)
    pub name: String,
    /// Interaction flags
    pub flags: FragmentFlags,
    /// Argument statements
    pub arguments: Vec<Statement>,
    /// Accepted argument types, alternatives separated by `|`
    pub argument_format: Option<Vec<String>>,
    /// Result type, `input*` when it follows the first argument
    pub evaluates_to: Option<String>,
    /// Referenced variable or function
    pub refers_to: Option<Reference>,
    /// Swizzle-like qualifier (`xy`)
    pub qualifier: String,
    /// Emitted with a unary minus
    pub negated: bool,
    /// Vector type displayed as scalar
    pub simplified: bool,
    /// Kind specific attributes
    pub data: FragmentData,
    /// Substituted by the compiler for a reference that no longer resolves
    #[serde(default)]
    pub unresolved: bool,
    /// Hygienic emission symbol, assigned on first use
    #[serde(skip)]
    pub symbol: Option<String>,
    /// Number of references seen in the last compile pass
    #[serde(skip)]
    pub references: u32,
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Fragment {}

impl Fragment {
    /// Create a new fragment
    pub fn new(kind: FragmentKind, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let data = match kind {
            FragmentKind::ConstantValue | FragmentKind::ConstantDefinition => {
                FragmentData::Value(ValueData::for_type(&type_name))
            }
            FragmentKind::Primitive => FragmentData::Call(CallData::default()),
            FragmentKind::VariableDefinition => FragmentData::Variable(VariableData::default()),
            _ => FragmentData::None,
        };
        Self {
            id: FragmentId::new(),
            kind,
            type_name,
            name: name.into(),
            flags: FragmentFlags::NONE,
            arguments: Vec::new(),
            argument_format: None,
            evaluates_to: None,
            refers_to: None,
            qualifier: String::new(),
            negated: false,
            simplified: false,
            data,
            unresolved: false,
            symbol: None,
            references: 0,
        }
    }

    /// Create a scalar constant
    pub fn constant(type_name: impl Into<String>, value: f32) -> Self {
        let mut fragment = Self::new(FragmentKind::ConstantValue, type_name, "")
            .with_flags(FragmentFlags::EDITABLE);
        fragment.set_value(value);
        fragment
    }

    /// Create a variable definition
    pub fn variable(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(FragmentKind::VariableDefinition, type_name, name)
            .with_flags(FragmentFlags::DECLARATION)
    }

    /// Create a function parameter supplied by the shader
    pub fn parameter(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(FragmentKind::VariableDefinition, type_name.clone(), name)
            .with_flags(FragmentFlags::PARAMETER)
            .with_format(vec![type_name.clone()])
            .with_evaluates_to(type_name)
    }

    /// Create a reference to a variable definition
    pub fn reference_to(target: &Fragment) -> Self {
        Self::new(FragmentKind::VariableReference, target.type_name.clone(), target.name.clone())
            .with_flags(FragmentFlags::EDITABLE)
            .with_reference(Reference::Fragment(target.id))
    }

    /// Create a reference to a global variable, resolved by name
    pub fn global_reference(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(FragmentKind::VariableReference, type_name, name).with_flags(FragmentFlags::EDITABLE)
    }

    /// Create a builtin primitive call
    pub fn primitive(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(FragmentKind::Primitive, type_name, name).with_flags(FragmentFlags::EDITABLE)
    }

    /// Create a call to a function
    pub fn call(function: FunctionId, return_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::primitive(return_type, name).with_reference(Reference::Function(function))
    }

    /// Create an operator
    pub fn operator(kind: FragmentKind, name: impl Into<String>) -> Self {
        let mut fragment = Self::new(kind, "", name);
        fragment.flags.selectable = true;
        fragment
    }

    /// Create the default constant for a type: a scalar value or a
    /// constructor with one zero argument per component
    pub fn default_constant(type_name: &str) -> Self {
        let components = types::arity(type_name);
        if components == 1 {
            return Self::constant(type_name, 0.0);
        }
        let base = types::base_type(type_name);
        let mut constructor = Self::new(FragmentKind::ConstantDefinition, type_name, type_name)
            .with_flags(FragmentFlags::EDITABLE)
            .with_format(vec![type_name.to_string()])
            .with_evaluates_to(type_name);
        constructor.set_value(0.0);
        for _ in 0..components {
            constructor.arguments.push(Statement::single(
                StatementKind::Arithmetic,
                Self::constant(base, 0.0),
            ));
        }
        constructor
    }

    /// Set the flags
    pub fn with_flags(mut self, flags: FragmentFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the accepted argument format
    pub fn with_format(mut self, format: Vec<String>) -> Self {
        self.argument_format = Some(format);
        self
    }

    /// Set the result type
    pub fn with_evaluates_to(mut self, type_name: impl Into<String>) -> Self {
        self.evaluates_to = Some(type_name.into());
        self
    }

    /// Set the reference
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.refers_to = Some(reference);
        self
    }

    /// Set the qualifier
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// Append an argument statement
    pub fn with_argument(mut self, argument: Statement) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Mark as negated
    pub fn negate(mut self) -> Self {
        self.negated = true;
        self
    }

    /// Constant value, if this fragment carries one
    pub fn value(&self) -> Option<f32> {
        self.value_data().map(|v| v.value)
    }

    /// Set the constant value
    pub fn set_value(&mut self, value: f32) {
        if let Some(data) = self.value_data_mut() {
            data.value = value;
        }
    }

    /// Value settings, if any
    pub fn value_data(&self) -> Option<&ValueData> {
        match &self.data {
            FragmentData::Value(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable value settings, if any
    pub fn value_data_mut(&mut self) -> Option<&mut ValueData> {
        match &mut self.data {
            FragmentData::Value(data) => Some(data),
            _ => None,
        }
    }

    /// Call flags (all unset for non-calls)
    pub fn call_data(&self) -> CallData {
        match self.data {
            FragmentData::Call(data) => data,
            _ => CallData::default(),
        }
    }

    /// Whether this is a variable declared by a global Variable component
    pub fn is_global_variable(&self) -> bool {
        matches!(self.data, FragmentData::Variable(VariableData { is_global_variable: true }))
    }

    /// Referenced variable, if any
    pub fn variable_reference(&self) -> Option<FragmentId> {
        match self.refers_to {
            Some(Reference::Fragment(id)) => Some(id),
            _ => None,
        }
    }

    /// Referenced function, if any
    pub fn function_reference(&self) -> Option<FunctionId> {
        match self.refers_to {
            Some(Reference::Function(id)) => Some(id),
            _ => None,
        }
    }

    /// Type this fragment evaluates to, accounting for simplification and
    /// the qualifier
    pub fn effective_type(&self, ignore_qualifier: bool) -> String {
        let mut type_name = if self.simplified {
            types::base_type(&self.type_name).to_string()
        } else {
            self.type_name.clone()
        };

        if !ignore_qualifier && !self.qualifier.is_empty() {
            let components = self.qualifier.chars().count();
            type_name = types::with_arity(types::base_type(&type_name), components);
        }
        type_name
    }

    /// Number of components of the evaluated type
    pub fn component_count(&self, ignore_qualifier: bool) -> usize {
        if !ignore_qualifier && !self.qualifier.is_empty() {
            return self.qualifier.chars().count();
        }
        types::arity(&self.effective_type(ignore_qualifier))
    }

    /// Whether this fragment can produce the given type
    pub fn supports_type(&self, type_name: &str) -> bool {
        match &self.evaluates_to {
            Some(evaluates) if evaluates == type_name => true,
            Some(evaluates) if evaluates.starts_with("input") => self
                .argument_format
                .as_ref()
                .and_then(|format| format.first())
                .is_some_and(|first| first.split('|').any(|t| t == type_name)),
            Some(_) => false,
            None => self.type_name == type_name,
        }
    }

    /// Emitted text of a constant value
    pub fn value_string(&self) -> String {
        let Some(data) = self.value_data() else {
            return String::new();
        };
        let value = if self.negated { -data.value } else { data.value };
        format!("{:.*}", usize::from(data.precision), value)
    }

    /// Qualifier as emitted suffix (`.xy`), empty without qualifier
    pub fn qualifier_suffix(&self) -> String {
        if self.qualifier.is_empty() {
            String::new()
        } else {
            format!(".{}", self.qualifier)
        }
    }

    /// Overwrite `dest` with this fragment's kind and attributes, keeping
    /// the id of `dest`. Arguments are copied with fresh ids.
    ///
    /// A multiple choice argument format on `dest` survives being replaced
    /// by a single choice one.
    pub fn copy_onto(&self, dest: &mut Fragment) {
        let keep_format = match (&dest.argument_format, &self.argument_format) {
            (Some(dest_format), Some(source_format)) => {
                dest_format.len() == 1
                    && source_format.len() == 1
                    && dest_format[0].contains('|')
                    && !source_format[0].contains('|')
            }
            (Some(_), None) => true,
            _ => false,
        };

        dest.kind = self.kind;
        dest.type_name = self.type_name.clone();
        dest.name = self.name.clone();
        dest.flags = self.flags;
        if !keep_format {
            dest.argument_format = self.argument_format.clone();
        }
        dest.evaluates_to = self.evaluates_to.clone();
        dest.refers_to = self.refers_to;
        dest.qualifier = self.qualifier.clone();
        dest.negated = self.negated;
        dest.simplified = self.simplified;
        dest.data = self.data.clone();
        dest.symbol = None;
        dest.arguments = self.arguments.iter().map(crate::copy::DeepCopy::deep_copy).collect();
    }

    /// Visit this fragment and every fragment nested in its arguments
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Fragment)) {
        f(self);
        for argument in &self.arguments {
            for fragment in &argument.fragments {
                fragment.visit(f);
            }
        }
    }

    /// Mutably visit this fragment and every fragment nested in its arguments
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Fragment)) {
        f(self);
        for argument in &mut self.arguments {
            for fragment in &mut argument.fragments {
                fragment.visit_mut(f);
            }
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data model of the shader graph.
//!
//! A project holds components. Each component bundles functions made of
//! blocks (lines), each block holding statements of fragments, the typed
//! nodes of the expression tree. The compiler walks this tree to emit
//! source text.
//!
//! ## Identity
//!
//! Every node carries a stable uuid id and compares by it. Nodes refer
//! to each other only through ids (`Reference`), never through pointers,
//! so copies made with [`DeepCopy`] can remap every reference into the
//! copied subtree.

pub mod block;
pub mod component;
pub mod connection;
pub mod copy;
pub mod error;
pub mod fragment;
pub mod function;
pub mod output;
pub mod project;
pub mod statement;
pub mod types;
pub mod value;

pub use block::{Block, BlockId, BlockKind};
pub use component::{Component, ComponentId, ComponentKind};
pub use connection::{Connection, PATTERN_TERMINALS};
pub use copy::{DeepCopy, IdRemap};
pub use error::{ModelError, Result};
pub use fragment::{
    CallData, Fragment, FragmentData, FragmentFlags, FragmentId, FragmentKind, Reference,
    ValueData, VariableData,
};
pub use function::{Function, FunctionId, FunctionKind};
pub use output::{CompiledCode, InputRef, PatternBinding, TextureRef};
pub use project::{GlobalScope, GlobalVariable, Project};
pub use statement::{Statement, StatementId, StatementKind};
pub use value::{extract_value, insert_value};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-to-source compiler for shader graph components.
//!
//! A compile pass walks the functions of one component and emits shader
//! source text, binding every externally tweakable value to a slot of a
//! data buffer. The pass never fails on stale references: they are
//! replaced in place by typed defaults and reported as diagnostics.
//!
//! ## Architecture
//!
//! - [`Compiler`] owns the configuration and the function table shared
//!   by every pass of a session
//! - `CompilationContext` carries the output buffers, scopes and bound
//!   inputs of one pass
//! - `emit` turns fragments, blocks, functions and components into text
//! - `pattern` orders and wraps the patterns a material reads from
//! - [`check_drop`] validates edits before they reach the model

pub mod assemble;
pub mod compiler;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod drop;
pub mod emit;
pub mod error;
pub mod pattern;
pub mod scope;
pub mod symbol;
pub mod table;
pub mod values;

pub use assemble::TranslationUnit;
pub use compiler::{CompileOutput, Compiler};
pub use config::CompilerConfig;
pub use context::CompilationContext;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use drop::{check_drop, DropRejection, DropSite};
pub use error::{CompileError, Result};
pub use values::input_values;

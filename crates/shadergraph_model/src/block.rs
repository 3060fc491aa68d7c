// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blocks: one source line or one control-flow construct.

use crate::fragment::{Fragment, FragmentKind};
use crate::statement::{Statement, StatementKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Create a new random block ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    /// Empty line, a drop target for new lines
    #[default]
    Empty,
    /// Function header
    FunctionHeader,
    /// Assignment to an output variable
    OutVariable,
    /// Variable declaration with initializer
    VariableDefinition,
    /// Assignment to an existing variable
    VariableReference,
    /// `if (...) { ... }`
    IfHeader,
    /// `else { ... }`
    ElseHeader,
    /// `for (...; ...; ...) { ... }`
    ForHeader,
    /// End of a control-flow body
    End,
    /// `break;`
    Break,
}

impl BlockKind {
    /// Whether blocks of this kind own child blocks
    pub fn has_children(self) -> bool {
        matches!(self, Self::IfHeader | Self::ElseHeader | Self::ForHeader)
    }
}

/// A line of code: `fragment assignment statement`, or a control-flow
/// header with nested child blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Unique block ID
    pub id: BlockId,
    /// Block kind
    pub kind: BlockKind,
    /// Left-hand fragment (or control keyword)
    pub fragment: Fragment,
    /// Assignment operator
    pub assignment: Fragment,
    /// Right-hand statement (or parameter list for headers)
    pub statement: Statement,
    /// Nested blocks of If/Else/For
    #[serde(default)]
    pub children: Vec<Block>,
    /// Free-text comment
    #[serde(default)]
    pub comment: String,
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Block {
    /// Create a new block of the given kind
    pub fn new(kind: BlockKind) -> Self {
        let statement_kind = if kind == BlockKind::FunctionHeader {
            StatementKind::List
        } else {
            StatementKind::Arithmetic
        };
        let fragment_kind = match kind {
            BlockKind::End => FragmentKind::End,
            BlockKind::Break => FragmentKind::Break,
            _ => FragmentKind::Undefined,
        };
        let mut fragment = Fragment::new(fragment_kind, "", "");
        if kind == BlockKind::Break {
            fragment.name = "break".to_string();
            fragment.type_name = "block".to_string();
        }
        Self {
            id: BlockId::new(),
            kind,
            fragment,
            assignment: Fragment::operator(FragmentKind::Assignment, "="),
            statement: Statement::new(statement_kind),
            children: Vec::new(),
            comment: String::new(),
        }
    }

    /// Create an empty line
    pub fn empty() -> Self {
        let mut block = Self::new(BlockKind::Empty);
        block.fragment.flags.selectable = true;
        block
    }

    /// Create a line `left = statement`, the block kind following the kind
    /// of the left-hand fragment
    pub fn line(left: Fragment, statement: Statement) -> Self {
        let kind = match left.kind {
            FragmentKind::OutVariable => BlockKind::OutVariable,
            FragmentKind::VariableReference => BlockKind::VariableReference,
            _ => BlockKind::VariableDefinition,
        };
        let mut block = Self::new(kind);
        block.fragment = left;
        block.statement = statement;
        block
    }

    /// Create an `if` block with its condition
    pub fn if_block(condition: Statement, children: Vec<Block>) -> Self {
        Self::control(BlockKind::IfHeader, FragmentKind::If, "if", vec![condition], children)
    }

    /// Create an `else` block
    pub fn else_block(children: Vec<Block>) -> Self {
        Self::control(BlockKind::ElseHeader, FragmentKind::Else, "else", Vec::new(), children)
    }

    /// Create a `for` block from its init, condition and step clauses
    pub fn for_block(clauses: Vec<Statement>, children: Vec<Block>) -> Self {
        Self::control(BlockKind::ForHeader, FragmentKind::For, "for", clauses, children)
    }

    /// Create a `break` line
    pub fn break_line() -> Self {
        Self::new(BlockKind::Break)
    }

    /// Create an end marker
    pub fn end() -> Self {
        Self::new(BlockKind::End)
    }

    fn control(
        kind: BlockKind,
        keyword_kind: FragmentKind,
        keyword: &str,
        arguments: Vec<Statement>,
        children: Vec<Block>,
    ) -> Self {
        let mut block = Self::new(kind);
        let mut fragment = Fragment::new(keyword_kind, "block", keyword);
        fragment.flags.selectable = true;
        fragment.arguments = arguments;
        block.fragment = fragment;
        block.children = children;
        block
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Type of the block, the type of its left-hand fragment
    pub fn effective_type(&self) -> String {
        self.fragment.effective_type(false)
    }

    /// Visit every fragment of this block and its children
    pub fn visit_fragments<'a>(&'a self, f: &mut impl FnMut(&'a Fragment)) {
        self.fragment.visit(f);
        self.assignment.visit(f);
        for fragment in &self.statement.fragments {
            fragment.visit(f);
        }
        for child in &self.children {
            child.visit_fragments(f);
        }
    }

    /// Mutably visit every fragment of this block and its children
    pub fn visit_fragments_mut(&mut self, f: &mut impl FnMut(&mut Fragment)) {
        self.fragment.visit_mut(f);
        self.assignment.visit_mut(f);
        for fragment in &mut self.statement.fragments {
            fragment.visit_mut(f);
        }
        for child in &mut self.children {
            child.visit_fragments_mut(f);
        }
    }
}

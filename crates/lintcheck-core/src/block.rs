//! Block tree produced by the parser.
//!
//! A test file is a tree of [`Block`]s: suites (`describe`), contexts
//! (`context`) and examples (`it`). Only suites and contexts hold child
//! blocks; only examples hold statements. The constructors and
//! [`Block::push_child`] / [`Block::push_statement`] keep that invariant.

use serde::Serialize;
use std::fmt::Write;

/// Kind of a structural block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// `describe` and friends.
    Suite,
    /// `context` and friends.
    Context,
    /// `it` and friends; the smallest test unit.
    Example,
}

impl BlockKind {
    /// Canonical keyword used when re-serializing a block of this kind.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Suite => "describe",
            Self::Context => "context",
            Self::Example => "it",
        }
    }

    /// Returns true for kinds that may hold child blocks.
    #[must_use]
    pub fn is_container(self) -> bool {
        !matches!(self, Self::Example)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suite => write!(f, "suite"),
            Self::Context => write!(f, "context"),
            Self::Example => write!(f, "example"),
        }
    }
}

/// Line range and header column of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// Line of the block header (1-indexed).
    pub start_line: usize,
    /// Line of the closing delimiter (1-indexed).
    pub end_line: usize,
    /// Column of the block keyword (1-indexed).
    pub column: usize,
}

impl Span {
    /// Creates a span that starts and ends on `line`.
    #[must_use]
    pub fn at(line: usize, column: usize) -> Self {
        Self {
            start_line: line,
            end_line: line,
            column,
        }
    }
}

/// One raw line of an example body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Line number (1-indexed).
    pub line: usize,
    /// Trimmed source text.
    pub text: String,
}

impl Statement {
    /// Creates a new statement.
    #[must_use]
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// Attempted to break the container/statement split of a block tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    /// Examples cannot hold child blocks.
    #[error("an example block cannot contain child blocks")]
    ChildInExample,
    /// Suites and contexts cannot hold statements.
    #[error("a {0} block cannot contain statements")]
    StatementInContainer(BlockKind),
}

/// A named structural unit of a test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    kind: BlockKind,
    label: String,
    span: Span,
    children: Vec<Block>,
    statements: Vec<Statement>,
}

impl Block {
    fn new(kind: BlockKind, label: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            label: label.into(),
            span,
            children: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Creates an empty suite block.
    #[must_use]
    pub fn suite(label: impl Into<String>, span: Span) -> Self {
        Self::new(BlockKind::Suite, label, span)
    }

    /// Creates an empty context block.
    #[must_use]
    pub fn context(label: impl Into<String>, span: Span) -> Self {
        Self::new(BlockKind::Context, label, span)
    }

    /// Creates an example block with no statements.
    #[must_use]
    pub fn example(label: impl Into<String>, span: Span) -> Self {
        Self::new(BlockKind::Example, label, span)
    }

    /// Creates a block of the given kind.
    #[must_use]
    pub fn of_kind(kind: BlockKind, label: impl Into<String>, span: Span) -> Self {
        Self::new(kind, label, span)
    }

    /// The synthetic root suite standing for a whole file.
    #[must_use]
    pub fn root(line_count: usize) -> Self {
        Self::suite(
            "",
            Span {
                start_line: 1,
                end_line: line_count.max(1),
                column: 1,
            },
        )
    }

    /// Block kind.
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Block label; empty for anonymous examples and the file root.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Child blocks in source order.
    #[must_use]
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// Body statements in source order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns true for blocks that hold no children and no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.statements.is_empty()
    }

    pub(crate) fn set_end_line(&mut self, line: usize) {
        self.span.end_line = line;
    }

    /// Appends a child block.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::ChildInExample`] if this block is an example.
    pub fn push_child(&mut self, child: Block) -> Result<(), BlockError> {
        if !self.kind.is_container() {
            return Err(BlockError::ChildInExample);
        }
        self.children.push(child);
        Ok(())
    }

    /// Appends a body statement.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::StatementInContainer`] unless this block is an example.
    pub fn push_statement(&mut self, statement: Statement) -> Result<(), BlockError> {
        if self.kind.is_container() {
            return Err(BlockError::StatementInContainer(self.kind));
        }
        self.statements.push(statement);
        Ok(())
    }

    /// Builder form of [`Block::push_child`].
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::ChildInExample`] if this block is an example.
    pub fn with_child(mut self, child: Block) -> Result<Self, BlockError> {
        self.push_child(child)?;
        Ok(self)
    }

    /// Builder form of [`Block::push_statement`].
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::StatementInContainer`] unless this block is an example.
    pub fn with_statement(mut self, statement: Statement) -> Result<Self, BlockError> {
        self.push_statement(statement)?;
        Ok(self)
    }

    /// Visits every block depth-first (pre-order) together with its
    /// ancestor chain, outermost first. The block itself comes first with
    /// an empty chain.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Block, &[&'a Block]),
    {
        let mut ancestors = Vec::new();
        self.walk_inner(&mut ancestors, visit);
    }

    fn walk_inner<'a, F>(&'a self, ancestors: &mut Vec<&'a Block>, visit: &mut F)
    where
        F: FnMut(&'a Block, &[&'a Block]),
    {
        visit(self, ancestors);
        ancestors.push(self);
        for child in &self.children {
            child.walk_inner(ancestors, visit);
        }
        ancestors.pop();
    }

    /// Counts this block and all of its descendants.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Block::count).sum::<usize>()
    }

    /// Compares kinds, labels, statement text and nesting, ignoring spans.
    #[must_use]
    pub fn same_structure(&self, other: &Block) -> bool {
        self.kind == other.kind
            && self.label == other.label
            && self.statements.len() == other.statements.len()
            && self
                .statements
                .iter()
                .zip(&other.statements)
                .all(|(a, b)| a.text == b.text)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_structure(b))
    }

    /// Re-serializes the block structure as canonical test source.
    ///
    /// The output parses back into a tree for which
    /// [`Block::same_structure`] holds. A block with an empty label at the
    /// top (the file root) renders only its children.
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        if self.kind == BlockKind::Suite && self.label.is_empty() {
            for child in &self.children {
                child.write_outline(&mut out, 0);
            }
        } else {
            self.write_outline(&mut out, 0);
        }
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}{}", self.kind.keyword());
        if !self.label.is_empty() {
            let _ = write!(out, " {}", quote_label(&self.label));
        }
        let _ = writeln!(out, " do");
        for statement in &self.statements {
            let _ = writeln!(out, "{indent}  {}", statement.text);
        }
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
        let _ = writeln!(out, "{indent}end");
    }
}

fn quote_label(label: &str) -> String {
    let mut quoted = String::with_capacity(label.len() + 2);
    quoted.push('"');
    for c in label.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

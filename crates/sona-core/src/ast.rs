// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Sona.
//!
//! The AST represents the structure of a Sona program after parsing.
//!
//! # Design Philosophy
//!
//! - **Every node is positioned** - each statement, expression and name
//!   carries a [`NodeMeta`]: a program-unique [`NodeId`], a byte [`Span`]
//!   and the [`Position`] of its left-most significant token
//! - **Ownership flows downward** - parents own children exclusively;
//!   upward navigation goes through [`AstIndex`](crate::ast_walker::AstIndex),
//!   which maps node ids to parent ids
//! - **Closed variants** - [`Statement`] and [`Expression`] are exhaustive
//!   enums, so every phase must handle every construct
//! - **Canonical operators** - `and`/`&&`, `or`/`||` and `not`/`!` are one
//!   operator each; the surface spelling is kept in [`Metadata`]
//!
//! # Example
//!
//! ```ignore
//! // Source: let x = 3 + 4
//! Program {
//!     statements: vec![Statement::Assignment(Assignment {
//!         target: AssignTarget::Name(Identifier { name: "x", .. }),
//!         value: Expression::Binary { op: BinaryOperator::Add, .. },
//!         mode: AssignMode::Declare { constant: false, type_hint: None },
//!         ..
//!     })],
//!     ..
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use ecow::EcoString;

use crate::source_analysis::{Position, Span};

/// Identifies one AST node within a [`Program`]. Ids are dense, starting at
/// zero, in the order the builder created the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node id.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The id as an index into per-node tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity and location shared by every AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMeta {
    /// Program-unique node id.
    pub id: NodeId,
    /// Byte range covered by the node.
    pub span: Span,
    /// Position of the node's left-most significant token.
    pub position: Position,
}

impl NodeMeta {
    /// Creates node metadata.
    #[must_use]
    pub const fn new(id: NodeId, span: Span, position: Position) -> Self {
        Self { id, span, position }
    }

    /// 1-based line of the node.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.position.line()
    }

    /// 1-based column of the node.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.position.column()
    }
}

/// Auxiliary per-node facts, keyed by [`NodeId`].
///
/// The builder records:
/// - `"operator"`: the surface spelling of a binary or unary operator
///   (`and` vs `&&`)
/// - `"keyword"`: the declaring keyword of a declaration as written
///   (`let`, `LET`, `const`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: HashMap<NodeId, Vec<(&'static str, EcoString)>>,
}

impl Metadata {
    /// Sets `key` on `id`, replacing any previous value.
    pub fn insert(&mut self, id: NodeId, key: &'static str, value: impl Into<EcoString>) {
        let values = self.entries.entry(id).or_default();
        let value = value.into();
        match values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => values.push((key, value)),
        }
    }

    /// Looks up `key` on `id`.
    #[must_use]
    pub fn get(&self, id: NodeId, key: &str) -> Option<&str> {
        self.entries
            .get(&id)?
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All entries recorded for `id`.
    #[must_use]
    pub fn for_node(&self, id: NodeId) -> &[(&'static str, EcoString)] {
        self.entries.get(&id).map_or(&[], Vec::as_slice)
    }
}

/// The root of a parsed program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
    /// Source location spanning the entire program.
    pub span: Span,
    /// Number of nodes (and therefore node ids) in the program.
    pub node_count: u32,
    /// Per-node auxiliary facts.
    pub metadata: Metadata,
}

/// A name with its location: variable references, declared names,
/// parameters, property names and module path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The name as written.
    pub name: EcoString,
    /// Node identity and location.
    pub meta: NodeMeta,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Integer literal, kept as written to preserve arbitrary precision.
    Integer(EcoString),
    /// Decimal literal as written: `3.14`
    Decimal(EcoString),
    /// String literal with escapes decoded.
    String(EcoString),
    /// `true` / `false`
    Boolean(bool),
    /// `null`
    Null,
}

/// Canonical binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&` / `and`
    And,
    /// `||` / `or`
    Or,
}

impl BinaryOperator {
    /// The canonical symbol for this operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Returns `true` for `==`, `!=`, `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Canonical unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `-`
    Negate,
    /// `!` / `not`
    Not,
}

impl UnaryOperator {
    /// The canonical symbol for this operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The key of an object literal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
    /// `{name: ...}`: a bare identifier, used as a string key.
    Name(EcoString),
    /// `{"name": ...}`
    String(EcoString),
    /// `{1: ...}`, kept as written.
    Number(EcoString),
}

/// One `key: value` pair of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    /// The key.
    pub key: ObjectKey,
    /// The value expression.
    pub value: Expression,
    /// Span of the whole entry.
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value.
    Literal {
        /// The value.
        value: Literal,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// A variable reference.
    Identifier(Identifier),

    /// `left op right`
    Binary {
        /// The canonical operator.
        op: BinaryOperator,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `op operand`
    Unary {
        /// The canonical operator.
        op: UnaryOperator,
        /// The operand.
        operand: Box<Expression>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `callee(arguments)`
    Call {
        /// The called expression.
        callee: Box<Expression>,
        /// Positional arguments.
        arguments: Vec<Expression>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `[a, b, c]`
    Array {
        /// Elements in order.
        elements: Vec<Expression>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `{key: value, ...}`
    Object {
        /// Entries in source order.
        entries: Vec<ObjectEntry>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `object.property`
    Property {
        /// The accessed expression.
        object: Box<Expression>,
        /// The property name.
        property: Identifier,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `object[index]`
    Index {
        /// The indexed expression.
        object: Box<Expression>,
        /// The index expression.
        index: Box<Expression>,
        /// Node identity and location.
        meta: NodeMeta,
    },
}

impl Expression {
    /// Node identity and location.
    #[must_use]
    pub const fn meta(&self) -> &NodeMeta {
        match self {
            Self::Identifier(identifier) => &identifier.meta,
            Self::Literal { meta, .. }
            | Self::Binary { meta, .. }
            | Self::Unary { meta, .. }
            | Self::Call { meta, .. }
            | Self::Array { meta, .. }
            | Self::Object { meta, .. }
            | Self::Property { meta, .. }
            | Self::Index { meta, .. } => meta,
        }
    }

    /// The source span of this expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.meta().span
    }

    /// The node kind, for tables that do not need the payload.
    #[must_use]
    pub const fn node_kind(&self) -> NodeKind {
        match self {
            Self::Literal { .. } => NodeKind::Literal,
            Self::Identifier(_) => NodeKind::Identifier,
            Self::Binary { .. } => NodeKind::Binary,
            Self::Unary { .. } => NodeKind::Unary,
            Self::Call { .. } => NodeKind::Call,
            Self::Array { .. } => NodeKind::Array,
            Self::Object { .. } => NodeKind::Object,
            Self::Property { .. } => NodeKind::Property,
            Self::Index { .. } => NodeKind::Index,
        }
    }
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// `name = ...`
    Name(Identifier),
    /// `object.property = ...`
    Property {
        /// The object being updated.
        object: Expression,
        /// The property name.
        property: Identifier,
    },
    /// `object[index] = ...`
    Index {
        /// The container being updated.
        object: Expression,
        /// The index expression.
        index: Expression,
    },
}

/// Whether an assignment introduces a binding or updates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignMode {
    /// `let` or `const`: defines a new binding in the current scope.
    Declare {
        /// `true` for `const`.
        constant: bool,
        /// Optional `: Type` annotation.
        type_hint: Option<Identifier>,
    },
    /// Plain `=`: updates an existing binding, property or element.
    Reassign,
}

/// An assignment or declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// What is being assigned.
    pub target: AssignTarget,
    /// The assigned value.
    pub value: Expression,
    /// Declaration or re-assignment.
    pub mode: AssignMode,
    /// Node identity and location.
    pub meta: NodeMeta,
}

impl Assignment {
    /// Returns `true` for `let`/`const`.
    #[must_use]
    pub const fn is_declaration(&self) -> bool {
        matches!(self.mode, AssignMode::Declare { .. })
    }
}

/// The `else` part of an `if`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    /// `else { ... }`
    Block(Vec<Statement>),
    /// `else if ...`
    If(Box<IfStatement>),
}

/// `if condition { ... } [else ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition.
    pub condition: Expression,
    /// Statements run when the condition holds.
    pub then_branch: Vec<Statement>,
    /// Optional else branch.
    pub else_branch: Option<ElseBranch>,
    /// Node identity and location.
    pub meta: NodeMeta,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name.
    pub name: Identifier,
    /// Optional `: Type` annotation.
    pub type_hint: Option<Identifier>,
    /// Optional default value.
    pub default: Option<Expression>,
}

/// `func name(params) [-> Type] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// Function name.
    pub name: Identifier,
    /// Parameters in order.
    pub parameters: Vec<Parameter>,
    /// Optional `-> Type` annotation.
    pub return_type: Option<Identifier>,
    /// Function body.
    pub body: Vec<Statement>,
    /// Node identity and location.
    pub meta: NodeMeta,
}

/// What an import binds.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportKind {
    /// `import a.b [as c]`
    Module {
        /// Optional alias.
        alias: Option<Identifier>,
    },
    /// `from a.b import x, y`
    Names(Vec<Identifier>),
}

/// An import statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// Module path segments: `a.b` is `[a, b]`.
    pub path: Vec<Identifier>,
    /// Plain or from-import.
    pub kind: ImportKind,
    /// Node identity and location.
    pub meta: NodeMeta,
}

impl Import {
    /// The dotted module path as written.
    #[must_use]
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// `class Name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    /// Class name.
    pub name: Identifier,
    /// Class body: method definitions and field declarations.
    pub body: Vec<Statement>,
    /// Node identity and location.
    pub meta: NodeMeta,
}

/// `try { ... } catch [(name)] { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    /// Guarded statements.
    pub body: Vec<Statement>,
    /// Optional name bound to the caught error.
    pub binding: Option<Identifier>,
    /// Handler statements.
    pub handler: Vec<Statement>,
    /// Node identity and location.
    pub meta: NodeMeta,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let`/`const` declaration or `=` re-assignment.
    Assignment(Assignment),

    /// An expression evaluated for its effect.
    Expression {
        /// The expression.
        expression: Expression,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `print(args)`
    Print {
        /// Values to print.
        arguments: Vec<Expression>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `if` / `else`
    If(IfStatement),

    /// `while condition { ... }`
    While {
        /// Loop condition.
        condition: Expression,
        /// Loop body.
        body: Vec<Statement>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `for variable in iterable { ... }`
    For {
        /// Loop variable.
        variable: Identifier,
        /// The iterated expression.
        iterable: Expression,
        /// Loop body.
        body: Vec<Statement>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// A function definition.
    FunctionDef(FunctionDef),

    /// `return [value]`
    Return {
        /// Returned value, if any.
        value: Option<Expression>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `break`
    Break {
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `continue`
    Continue {
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// `import` / `from ... import`
    Import(Import),

    /// `{ ... }`: a nested lexical scope.
    Block {
        /// Statements in the block.
        body: Vec<Statement>,
        /// Node identity and location.
        meta: NodeMeta,
    },

    /// A class definition.
    Class(ClassDef),

    /// `try` / `catch`
    Try(TryStatement),
}

impl Statement {
    /// Node identity and location.
    #[must_use]
    pub const fn meta(&self) -> &NodeMeta {
        match self {
            Self::Assignment(Assignment { meta, .. })
            | Self::If(IfStatement { meta, .. })
            | Self::FunctionDef(FunctionDef { meta, .. })
            | Self::Import(Import { meta, .. })
            | Self::Class(ClassDef { meta, .. })
            | Self::Try(TryStatement { meta, .. })
            | Self::Expression { meta, .. }
            | Self::Print { meta, .. }
            | Self::While { meta, .. }
            | Self::For { meta, .. }
            | Self::Return { meta, .. }
            | Self::Break { meta }
            | Self::Continue { meta }
            | Self::Block { meta, .. } => meta,
        }
    }

    /// The source span of this statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.meta().span
    }

    /// The node kind, for tables that do not need the payload.
    #[must_use]
    pub const fn node_kind(&self) -> NodeKind {
        match self {
            Self::Assignment(_) => NodeKind::Assignment,
            Self::Expression { .. } => NodeKind::ExpressionStatement,
            Self::Print { .. } => NodeKind::Print,
            Self::If(_) => NodeKind::If,
            Self::While { .. } => NodeKind::While,
            Self::For { .. } => NodeKind::For,
            Self::FunctionDef(_) => NodeKind::FunctionDef,
            Self::Return { .. } => NodeKind::Return,
            Self::Break { .. } => NodeKind::Break,
            Self::Continue { .. } => NodeKind::Continue,
            Self::Import(_) => NodeKind::Import,
            Self::Block { .. } => NodeKind::Block,
            Self::Class(_) => NodeKind::Class,
            Self::Try(_) => NodeKind::Try,
        }
    }
}

/// Payload-free tag for every node that carries a [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// [`Statement::Assignment`]
    Assignment,
    /// [`Statement::Expression`]
    ExpressionStatement,
    /// [`Statement::Print`]
    Print,
    /// [`Statement::If`], including `else if` links.
    If,
    /// [`Statement::While`]
    While,
    /// [`Statement::For`]
    For,
    /// [`Statement::FunctionDef`]
    FunctionDef,
    /// [`Statement::Return`]
    Return,
    /// [`Statement::Break`]
    Break,
    /// [`Statement::Continue`]
    Continue,
    /// [`Statement::Import`]
    Import,
    /// [`Statement::Block`]
    Block,
    /// [`Statement::Class`]
    Class,
    /// [`Statement::Try`]
    Try,
    /// [`Expression::Literal`]
    Literal,
    /// [`Expression::Identifier`]
    Identifier,
    /// [`Expression::Binary`]
    Binary,
    /// [`Expression::Unary`]
    Unary,
    /// [`Expression::Call`]
    Call,
    /// [`Expression::Array`]
    Array,
    /// [`Expression::Object`]
    Object,
    /// [`Expression::Property`]
    Property,
    /// [`Expression::Index`]
    Index,
    /// A declared name: variable, parameter, function, class, import
    /// segment, loop or catch variable, property name, type hint.
    Name,
}

impl NodeKind {
    /// Returns `true` for `while` and `for`.
    #[must_use]
    pub const fn is_loop(self) -> bool {
        matches!(self, Self::While | Self::For)
    }

    /// Returns `true` for expression kinds.
    #[must_use]
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            Self::Literal
                | Self::Identifier
                | Self::Binary
                | Self::Unary
                | Self::Call
                | Self::Array
                | Self::Object
                | Self::Property
                | Self::Index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: u32) -> NodeMeta {
        NodeMeta::new(NodeId::new(id), Span::new(0, 1), Position::new(1, 1))
    }

    #[test]
    fn metadata_insert_and_get() {
        let mut metadata = Metadata::default();
        metadata.insert(NodeId::new(3), "operator", "and");
        metadata.insert(NodeId::new(3), "operator", "&&");
        metadata.insert(NodeId::new(3), "keyword", "let");

        assert_eq!(metadata.get(NodeId::new(3), "operator"), Some("&&"));
        assert_eq!(metadata.get(NodeId::new(3), "keyword"), Some("let"));
        assert_eq!(metadata.get(NodeId::new(4), "operator"), None);
        assert_eq!(metadata.for_node(NodeId::new(3)).len(), 2);
        assert!(metadata.for_node(NodeId::new(9)).is_empty());
    }

    #[test]
    fn expression_meta_and_kind() {
        let expr = Expression::Identifier(Identifier {
            name: "x".into(),
            meta: meta(7),
        });
        assert_eq!(expr.meta().id, NodeId::new(7));
        assert_eq!(expr.node_kind(), NodeKind::Identifier);
        assert!(expr.node_kind().is_expression());
    }

    #[test]
    fn statement_meta_and_kind() {
        let stmt = Statement::Break { meta: meta(2) };
        assert_eq!(stmt.meta().id.index(), 2);
        assert_eq!(stmt.node_kind(), NodeKind::Break);

        let stmt = Statement::While {
            condition: Expression::Literal {
                value: Literal::Boolean(true),
                meta: meta(0),
            },
            body: Vec::new(),
            meta: meta(1),
        };
        assert!(stmt.node_kind().is_loop());
    }

    #[test]
    fn operator_symbols_are_canonical() {
        assert_eq!(BinaryOperator::And.symbol(), "&&");
        assert_eq!(BinaryOperator::Or.to_string(), "||");
        assert_eq!(UnaryOperator::Not.symbol(), "!");
        assert!(BinaryOperator::LessEqual.is_comparison());
        assert!(!BinaryOperator::Add.is_comparison());
    }

    #[test]
    fn import_dotted_path() {
        let import = Import {
            path: vec![
                Identifier {
                    name: "os".into(),
                    meta: meta(0),
                },
                Identifier {
                    name: "path".into(),
                    meta: meta(1),
                },
            ],
            kind: ImportKind::Module { alias: None },
            meta: meta(2),
        };
        assert_eq!(import.dotted_path(), "os.path");
    }
}

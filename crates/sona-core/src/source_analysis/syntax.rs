// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Concrete parse tree produced by the parser.
//!
//! A [`SyntaxNode`] is one grammar production: its [`SyntaxKind`], the span
//! it covers, the position of its left-most significant token, and the
//! children the production matched. Punctuation that only delimits (`(`,
//! `,`, `{`) is dropped; tokens that carry meaning (names, literals,
//! operators, the `let`/`const` keyword) are kept as [`SyntaxElement::Token`].
//!
//! Parse trees are transient: the AST builder consumes them.

use std::fmt::{self, Write as _};

use super::{Position, Span, Token};

/// The grammar rule a [`SyntaxNode`] was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root: statements.
    Program,
    /// `{ ... }`: statements.
    Block,
    /// `let`/`const`: keyword token, name token, optional `TypeHint`, value.
    VarDecl,
    /// `: Type` or `-> Type`: type name token.
    TypeHint,
    /// `target = value`: target expression, value expression.
    Assign,
    /// A bare expression used as a statement.
    ExprStmt,
    /// `print(...)`: `ArgList`.
    Print,
    /// `if`: condition, `Block`, optional `Block` or nested `If`.
    If,
    /// `while`: condition, `Block`.
    While,
    /// `for x in e`: name token, iterable, `Block`.
    For,
    /// `func`: name token, `ParamList`, optional `TypeHint`, `Block`.
    FuncDef,
    /// Parameters: `Param`s.
    ParamList,
    /// One parameter: name token, optional `TypeHint`, optional default.
    Param,
    /// `return`: optional value.
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `import a.b as c`: `DottedName`, optional alias token.
    Import,
    /// `from a.b import x, y`: `DottedName`, name tokens.
    ImportFrom,
    /// `a.b.c`: name tokens.
    DottedName,
    /// `class`: name token, `Block`.
    ClassDef,
    /// `try`: `Block`, `Catch`.
    Try,
    /// `catch (e) { ... }`: optional name token, `Block`.
    Catch,
    /// Binary operation: left, operator token, right.
    Binary,
    /// Unary operation: operator token, operand.
    Unary,
    /// Call: callee, `ArgList`.
    Call,
    /// Arguments: expressions.
    ArgList,
    /// `object.name`: object, name token.
    Property,
    /// `object[index]`: object, index.
    Index,
    /// `[a, b]`: expressions.
    Array,
    /// `{k: v}`: `Entry` nodes.
    Object,
    /// `k: v`: key token, value.
    Entry,
    /// Number, string, boolean or null: the literal token.
    Literal,
    /// An identifier reference: the name token.
    Name,
    /// `( expr )`: the inner expression.
    Group,
}

impl SyntaxKind {
    /// Human-readable rule name, used in error messages.
    #[must_use]
    pub const fn rule_name(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::Block => "block",
            Self::VarDecl => "variable declaration",
            Self::TypeHint => "type hint",
            Self::Assign => "assignment",
            Self::ExprStmt => "expression statement",
            Self::Print => "print statement",
            Self::If => "if statement",
            Self::While => "while loop",
            Self::For => "for loop",
            Self::FuncDef => "function definition",
            Self::ParamList => "parameter list",
            Self::Param => "parameter",
            Self::Return => "return statement",
            Self::Break => "break statement",
            Self::Continue => "continue statement",
            Self::Import => "import",
            Self::ImportFrom => "from-import",
            Self::DottedName => "module path",
            Self::ClassDef => "class definition",
            Self::Try => "try statement",
            Self::Catch => "catch clause",
            Self::Binary => "binary expression",
            Self::Unary => "unary expression",
            Self::Call => "call",
            Self::ArgList => "argument list",
            Self::Property => "property access",
            Self::Index => "index expression",
            Self::Array => "array literal",
            Self::Object => "object literal",
            Self::Entry => "object entry",
            Self::Literal => "literal",
            Self::Name => "name",
            Self::Group => "parenthesized expression",
        }
    }

    /// Returns `true` for productions that may appear on the left of `=`.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        matches!(self, Self::Name | Self::Property | Self::Index)
    }
}

/// A child of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    /// A nested production.
    Node(SyntaxNode),
    /// A meaningful token.
    Token(Token),
}

impl SyntaxElement {
    /// The span covered by this element.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Node(node) => node.span(),
            Self::Token(token) => token.span(),
        }
    }
}

impl From<SyntaxNode> for SyntaxElement {
    fn from(node: SyntaxNode) -> Self {
        Self::Node(node)
    }
}

impl From<Token> for SyntaxElement {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

/// One production in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: SyntaxKind,
    span: Span,
    position: Position,
    children: Vec<SyntaxElement>,
}

impl SyntaxNode {
    /// Creates a node. `position` is the position of the production's
    /// left-most significant token.
    #[must_use]
    pub fn new(
        kind: SyntaxKind,
        span: Span,
        position: Position,
        children: Vec<SyntaxElement>,
    ) -> Self {
        Self {
            kind,
            span,
            position,
            children,
        }
    }

    /// The production kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// The source span covered by the production.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Position of the left-most significant token.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// All children in source order.
    #[must_use]
    pub fn children(&self) -> &[SyntaxElement] {
        &self.children
    }

    /// Consumes the node, returning its children.
    #[must_use]
    pub fn into_children(self) -> Vec<SyntaxElement> {
        self.children
    }

    /// Child nodes only, in source order.
    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(|child| match child {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        })
    }

    /// Child tokens only, in source order.
    pub fn child_tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|child| match child {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        })
    }

    /// Renders the tree as an indented outline, one production or token per
    /// line. Useful for debugging the parser.
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let _ = writeln!(out, "{:indent$}{:?}@{}", "", self.kind, self.position, indent = depth * 2);
        for child in &self.children {
            match child {
                SyntaxElement::Node(node) => node.write_outline(out, depth + 1),
                SyntaxElement::Token(token) => {
                    let _ = writeln!(out, "{:indent$}{}", "", token.text(), indent = (depth + 1) * 2);
                }
            }
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::TokenKind;

    fn name_token(text: &str, start: u32) -> Token {
        let end = start + u32::try_from(text.len()).unwrap();
        Token::new(
            TokenKind::Identifier(text.into()),
            text,
            Span::new(start, end),
            Position::new(1, start + 1),
        )
    }

    #[test]
    fn child_iterators_split_nodes_and_tokens() {
        let name = SyntaxNode::new(
            SyntaxKind::Name,
            Span::new(0, 1),
            Position::new(1, 1),
            vec![name_token("a", 0).into()],
        );
        let property = SyntaxNode::new(
            SyntaxKind::Property,
            Span::new(0, 3),
            Position::new(1, 1),
            vec![name.into(), name_token("b", 2).into()],
        );

        assert_eq!(property.child_nodes().count(), 1);
        assert_eq!(property.child_tokens().map(Token::text).collect::<Vec<_>>(), ["b"]);
        assert_eq!(property.children()[1].span(), Span::new(2, 3));
    }

    #[test]
    fn outline_is_indented() {
        let name = SyntaxNode::new(
            SyntaxKind::Name,
            Span::new(0, 1),
            Position::new(1, 1),
            vec![name_token("x", 0).into()],
        );
        let stmt = SyntaxNode::new(
            SyntaxKind::ExprStmt,
            Span::new(0, 1),
            Position::new(1, 1),
            vec![name.into()],
        );
        assert_eq!(stmt.outline(), "ExprStmt@1:1\n  Name@1:1\n    x\n");
    }

    #[test]
    fn only_names_properties_and_indexes_are_assignable() {
        assert!(SyntaxKind::Name.is_assignable());
        assert!(SyntaxKind::Index.is_assignable());
        assert!(!SyntaxKind::Call.is_assignable());
        assert!(!SyntaxKind::Group.is_assignable());
    }
}

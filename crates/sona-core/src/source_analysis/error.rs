// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for tokenizing and parsing Sona source.
//!
//! Errors carry both a byte [`Span`] (for [`miette`] labels) and a 1-based
//! [`Position`] (for messages and machine-readable reports). Both phases
//! fail fast: the first error aborts the request.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::{Position, Span};

/// A lexical error encountered during tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(sona::lex))]
pub struct LexError {
    /// The kind of lexical error.
    #[source]
    pub kind: LexErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
    /// Line and column of the error.
    pub position: Position,
}

impl LexError {
    /// Creates a new lexical error.
    #[must_use]
    pub fn new(kind: LexErrorKind, span: Span, position: Position) -> Self {
        Self {
            kind,
            span,
            position,
        }
    }

    /// Creates an "unexpected character" error.
    #[must_use]
    pub fn unexpected_char(c: char, span: Span, position: Position) -> Self {
        Self::new(LexErrorKind::UnexpectedCharacter(c), span, position)
    }

    /// Creates an "unterminated string" error located at the opening quote.
    #[must_use]
    pub fn unterminated_string(span: Span, position: Position) -> Self {
        Self::new(LexErrorKind::UnterminatedString, span, position)
    }

    /// Creates an "unterminated comment" error located at the opening `/*`.
    #[must_use]
    pub fn unterminated_comment(span: Span, position: Position) -> Self {
        Self::new(LexErrorKind::UnterminatedComment, span, position)
    }
}

/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// A character that cannot start any token.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// A string literal reached a newline or the end of input before its
    /// closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A `/*` comment without a matching `*/`.
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// A syntax error encountered while parsing or while building the AST.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(sona::parse))]
pub struct ParseError {
    /// The kind of syntax error.
    #[source]
    pub kind: ParseErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
    /// Line and column of the error.
    pub position: Position,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, span: Span, position: Position) -> Self {
        Self {
            kind,
            span,
            position,
        }
    }

    /// The tokens that would have been accepted at the error location, if
    /// the parser knew them.
    #[must_use]
    pub fn expected(&self) -> &[&'static str] {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, .. }
            | ParseErrorKind::UnexpectedEof { expected } => expected,
            _ => &[],
        }
    }
}

/// The kind of syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A token that no rule accepts at this point.
    #[error("unexpected {found}{}", expected_suffix(.expected))]
    UnexpectedToken {
        /// How the offending token was written.
        found: EcoString,
        /// Descriptions of the tokens that would have been accepted.
        expected: Vec<&'static str>,
    },

    /// Input ended in the middle of a construct.
    #[error("unexpected end of input{}", expected_suffix(.expected))]
    UnexpectedEof {
        /// Descriptions of the tokens that would have been accepted.
        expected: Vec<&'static str>,
    },

    /// A parse-tree node is missing children its production requires.
    #[error("malformed {rule}: {detail}")]
    MalformedProduction {
        /// The grammar rule being built.
        rule: &'static str,
        /// What was missing or out of place.
        detail: EcoString,
    },

    /// The left-hand side of `=` is not a name, property or index.
    #[error("invalid assignment target; only names, properties and index expressions can be assigned")]
    InvalidAssignmentTarget,

    /// Expressions or blocks nested beyond the parser's limit.
    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep {
        /// The limit that was exceeded.
        limit: usize,
    },
}

fn expected_suffix(expected: &[&'static str]) -> String {
    match expected {
        [] => String::new(),
        [only] => format!(", expected {only}"),
        [init @ .., last] => format!(", expected {} or {last}", init.join(", ")),
    }
}

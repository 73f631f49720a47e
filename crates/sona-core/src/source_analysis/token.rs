// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for Sona lexical analysis.
//!
//! Each [`Token`] carries:
//! - A [`TokenKind`] indicating the type of token
//! - The raw source text it was lexed from
//! - A byte [`Span`] and a 1-based [`Position`]
//!
//! Keyword spelling is case-insensitive (`LET`, `Let` and `let` are the same
//! keyword), so parsers should match on [`TokenKind`] and only consult
//! [`Token::text`] when the original spelling matters.

use std::fmt;

use ecow::EcoString;

use super::{Position, Span};

/// The kind of token, not including source location.
///
/// Tokens are cheap to clone ([`EcoString`] for string data).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals ===
    /// An identifier: `count`, `_tmp`, `Person`
    Identifier(EcoString),

    /// An integer literal: `0`, `42`
    Integer(EcoString),

    /// A decimal literal: `3.14`
    Decimal(EcoString),

    /// A string literal with escapes already decoded. The surrounding quotes
    /// and the original escape spelling are kept in [`Token::text`].
    String(EcoString),

    // === Keywords ===
    /// `let`
    Let,
    /// `const`
    Const,
    /// `func`
    Func,
    /// `class`
    Class,
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `for`
    For,
    /// `in`
    In,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `import`
    Import,
    /// `from`
    From,
    /// `as`
    As,
    /// `try`
    Try,
    /// `catch`
    Catch,
    /// `print`
    Print,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,

    // === Operators ===
    /// `&&` or the keyword `and`
    And,
    /// `||` or the keyword `or`
    Or,
    /// `!` or the keyword `not`
    Not,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Assign,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `->`
    Arrow,

    // === Delimiters ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `:`
    Colon,

    // === Layout ===
    /// A line break. Statements are separated by newlines or `;`.
    Newline,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is a literal value.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Integer(_)
                | Self::Decimal(_)
                | Self::String(_)
                | Self::True
                | Self::False
                | Self::Null
        )
    }

    /// Returns `true` if this token is an identifier.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    /// Returns `true` if this token came from the keyword table.
    ///
    /// `and`, `or` and `not` share their kinds with `&&`, `||` and `!`, so
    /// they are reported as operators rather than keywords here.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Let
                | Self::Const
                | Self::Func
                | Self::Class
                | Self::If
                | Self::Else
                | Self::While
                | Self::For
                | Self::In
                | Self::Return
                | Self::Break
                | Self::Continue
                | Self::Import
                | Self::From
                | Self::As
                | Self::Try
                | Self::Catch
                | Self::Print
                | Self::True
                | Self::False
                | Self::Null
        )
    }

    /// Returns `true` for statement separators (newline and `;`).
    #[must_use]
    pub const fn is_separator(&self) -> bool {
        matches!(self, Self::Newline | Self::Semicolon)
    }

    /// Returns `true` if this is the end-of-input marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns the string payload if this token carries one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Identifier(s) | Self::Integer(s) | Self::Decimal(s) | Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// A short description of this kind of token, used in "expected ..."
    /// lists. Payload-carrying kinds describe their category, not their value.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Identifier(_) => "identifier",
            Self::Integer(_) | Self::Decimal(_) => "number",
            Self::String(_) => "string",
            Self::Let => "`let`",
            Self::Const => "`const`",
            Self::Func => "`func`",
            Self::Class => "`class`",
            Self::If => "`if`",
            Self::Else => "`else`",
            Self::While => "`while`",
            Self::For => "`for`",
            Self::In => "`in`",
            Self::Return => "`return`",
            Self::Break => "`break`",
            Self::Continue => "`continue`",
            Self::Import => "`import`",
            Self::From => "`from`",
            Self::As => "`as`",
            Self::Try => "`try`",
            Self::Catch => "`catch`",
            Self::Print => "`print`",
            Self::True => "`true`",
            Self::False => "`false`",
            Self::Null => "`null`",
            Self::And => "`&&`",
            Self::Or => "`||`",
            Self::Not => "`!`",
            Self::Plus => "`+`",
            Self::Minus => "`-`",
            Self::Star => "`*`",
            Self::Slash => "`/`",
            Self::Percent => "`%`",
            Self::Assign => "`=`",
            Self::EqualEqual => "`==`",
            Self::BangEqual => "`!=`",
            Self::Less => "`<`",
            Self::LessEqual => "`<=`",
            Self::Greater => "`>`",
            Self::GreaterEqual => "`>=`",
            Self::Arrow => "`->`",
            Self::LeftParen => "`(`",
            Self::RightParen => "`)`",
            Self::LeftBrace => "`{`",
            Self::RightBrace => "`}`",
            Self::LeftBracket => "`[`",
            Self::RightBracket => "`]`",
            Self::Comma => "`,`",
            Self::Dot => "`.`",
            Self::Semicolon => "`;`",
            Self::Colon => "`:`",
            Self::Newline => "newline",
            Self::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) | Self::Integer(s) | Self::Decimal(s) => write!(f, "{s}"),
            Self::String(s) => write!(f, "{s:?}"),
            other => f.write_str(other.describe()),
        }
    }
}

/// A token with its source text and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: EcoString,
    span: Span,
    position: Position,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<EcoString>, span: Span, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            position,
        }
    }

    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Consumes the token and returns its kind.
    #[must_use]
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// The raw source text of this token, exactly as written.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the source span of this token.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the line/column where this token starts.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// 1-based line of the first character.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.position.line()
    }

    /// 1-based column of the first character.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.position.column()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline | TokenKind::Eof => f.write_str(self.kind.describe()),
            _ => write!(f, "`{}`", self.text),
        }
    }
}

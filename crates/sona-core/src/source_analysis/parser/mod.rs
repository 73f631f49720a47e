// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Sona source code.
//!
//! The parser turns a token stream into a concrete parse tree
//! ([`SyntaxNode`]) following `grammar/sona.ebnf`. It looks at most one
//! token ahead (plus runs of newlines) and never backtracks.
//!
//! # Design Philosophy
//!
//! - **Fail fast** - the first syntax error stops parsing
//! - **Precise positions** - every node records the position of its
//!   left-most significant token
//! - **Bounded recursion** - nesting beyond [`MAX_NESTING_DEPTH`] is an error
//!   rather than a stack overflow
//!
//! # Operator Precedence (Pratt Parsing)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 10 | `\|\|` `or` | Left |
//! | 20 | `&&` `and` | Left |
//! | 30 | `==` `!=` | Left |
//! | 40 | `<` `>` `<=` `>=` | Left |
//! | 50 | `+` `-` | Left |
//! | 60 | `*` `/` `%` | Left |
//!
//! Prefix `-`, `!` and `not` bind tighter than every binary operator, and
//! postfix calls, property access and indexing bind tightest of all.
//!
//! # Usage
//!
//! ```
//! use sona_core::source_analysis::{parse, tokenize, SyntaxKind};
//!
//! let tokens = tokenize("let x = 3 + 4").unwrap();
//! let tree = parse(tokens).unwrap();
//!
//! assert_eq!(tree.kind(), SyntaxKind::Program);
//! assert_eq!(tree.child_nodes().count(), 1);
//! ```

use crate::source_analysis::{
    ParseError, ParseErrorKind, Position, Span, SyntaxElement, SyntaxKind, SyntaxNode, Token,
    TokenKind,
};

mod expressions;
mod statements;


/// Result type used throughout the parser.
pub(super) type ParseResult<T> = Result<T, ParseError>;

// ============================================================================
// Pratt Parsing for Binary Operator Precedence
// ============================================================================

/// Binding power for binary operators (Pratt parsing).
///
/// Higher values bind tighter. All Sona binary operators are
/// left-associative: `left_bp == right_bp - 1`.
#[derive(Debug, Clone, Copy)]
pub(super) struct BindingPower {
    /// How tightly this operator binds to its left operand.
    pub(super) left: u8,
    /// How tightly this operator binds to its right operand.
    pub(super) right: u8,
}

impl BindingPower {
    /// Creates a left-associative binding power.
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

/// Gets the binding power for a binary operator token.
///
/// Returns `None` for tokens that are not binary operators, which ends the
/// binary expression.
pub(super) fn binary_binding_power(kind: &TokenKind) -> Option<BindingPower> {
    match kind {
        TokenKind::Or => Some(BindingPower::left_assoc(10)),
        TokenKind::And => Some(BindingPower::left_assoc(20)),
        TokenKind::EqualEqual | TokenKind::BangEqual => Some(BindingPower::left_assoc(30)),
        TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual => {
            Some(BindingPower::left_assoc(40))
        }
        TokenKind::Plus | TokenKind::Minus => Some(BindingPower::left_assoc(50)),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
            Some(BindingPower::left_assoc(60))
        }
        _ => None,
    }
}

/// Maximum nesting depth before the parser bails out.
///
/// Parentheses, blocks, prefix operators, each operator in a binary chain
/// and each `else if` link count one level, so the limit also bounds the
/// height of the tree that later phases walk recursively. It is a language
/// limit: a 300-term sum is rejected, an array of 300 elements is not.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parses a token stream (ending in [`TokenKind::Eof`]) into a parse tree
/// rooted at a [`SyntaxKind::Program`] node.
pub fn parse(tokens: Vec<Token>) -> Result<SyntaxNode, ParseError> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

/// Where a production started: the byte offset and position of its first
/// significant token.
#[derive(Debug, Clone, Copy)]
pub(super) struct Marker {
    start: u32,
    position: Position,
}

impl Marker {
    /// A marker at the start of an already-built node, used when a postfix
    /// or binary production wraps its left operand.
    pub(super) fn at(node: &SyntaxNode) -> Self {
        Self {
            start: node.span().start(),
            position: node.position(),
        }
    }
}

/// The parser state.
pub(super) struct Parser {
    /// The tokens being parsed. Always ends with an EOF token.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Current nesting depth (guards against stack overflow).
    nesting_depth: usize,
}

impl Parser {
    /// Creates a new parser for the given tokens, appending an EOF token if
    /// the stream lacks one.
    fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.kind().is_eof()) {
            let (span, position) = tokens.last().map_or(
                (Span::default(), Position::default()),
                |last| (Span::new(last.span().end(), last.span().end()), last.position()),
            );
            tokens.push(Token::new(TokenKind::Eof, "", span, position));
        }
        Self {
            tokens,
            current: 0,
            nesting_depth: 0,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token.
    pub(super) fn current_token(&self) -> &Token {
        let index = self.current.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Returns the current token kind.
    pub(super) fn current_kind(&self) -> &TokenKind {
        self.current_token().kind()
    }

    /// Checks if we're at the end of input.
    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Advances to the next token and returns the consumed one.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Checks if the current token has the same kind as `kind` (payloads are
    /// ignored).
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Consumes the current token if it matches the given kind.
    pub(super) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match the given kind, advancing if it
    /// does.
    pub(super) fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(vec![kind.describe()]))
        }
    }

    /// Expects an identifier.
    pub(super) fn expect_identifier(&mut self) -> ParseResult<Token> {
        if self.current_kind().is_identifier() {
            Ok(self.advance())
        } else {
            Err(self.unexpected(vec!["identifier"]))
        }
    }

    /// Skips any run of newline tokens.
    pub(super) fn skip_newlines(&mut self) {
        while matches!(self.current_kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    /// Returns `true` if the first token after any run of newlines has the
    /// given kind. Consumes nothing.
    pub(super) fn check_after_newlines(&self, kind: &TokenKind) -> bool {
        self.tokens[self.current..]
            .iter()
            .find(|t| !matches!(t.kind(), TokenKind::Newline))
            .is_some_and(|t| std::mem::discriminant(t.kind()) == std::mem::discriminant(kind))
    }

    // ========================================================================
    // Node Construction
    // ========================================================================

    /// Records where the production starting at the current token begins.
    pub(super) fn mark(&self) -> Marker {
        let token = self.current_token();
        Marker {
            start: token.span().start(),
            position: token.position(),
        }
    }

    /// Builds a node spanning from `marker` to the end of the last consumed
    /// token.
    pub(super) fn finish(
        &self,
        kind: SyntaxKind,
        marker: Marker,
        children: Vec<SyntaxElement>,
    ) -> SyntaxNode {
        let end = self
            .current
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map_or(marker.start, |token| token.span().end())
            .max(marker.start);
        SyntaxNode::new(kind, Span::new(marker.start, end), marker.position, children)
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Builds an error for the current token, listing what would have been
    /// accepted instead.
    pub(super) fn unexpected(&self, expected: Vec<&'static str>) -> ParseError {
        let token = self.current_token();
        let kind = if token.kind().is_eof() {
            ParseErrorKind::UnexpectedEof { expected }
        } else {
            ParseErrorKind::UnexpectedToken {
                found: token.to_string().into(),
                expected,
            }
        };
        ParseError::new(kind, token.span(), token.position())
    }

    /// Runs `parse` one nesting level deeper, failing if the limit is hit.
    pub(super) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.enter_nesting()?;
        let result = parse(self);
        self.nesting_depth -= 1;
        result
    }

    /// Increments the nesting depth; the caller must decrement it again.
    pub(super) fn enter_nesting(&mut self) -> ParseResult<()> {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            let token = self.current_token();
            return Err(ParseError::new(
                ParseErrorKind::NestingTooDeep {
                    limit: MAX_NESTING_DEPTH,
                },
                token.span(),
                token.position(),
            ));
        }
        self.nesting_depth += 1;
        Ok(())
    }

    /// Decrements the nesting depth by `levels`.
    pub(super) fn exit_nesting(&mut self, levels: usize) {
        self.nesting_depth -= levels;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::tokenize;

    pub(super) fn parse_source(source: &str) -> Result<SyntaxNode, ParseError> {
        parse(tokenize(source).expect("source should tokenize"))
    }

    #[test]
    fn empty_program() {
        let tree = parse_source("").unwrap();
        assert_eq!(tree.kind(), SyntaxKind::Program);
        assert!(tree.children().is_empty());
    }

    #[test]
    fn missing_eof_is_tolerated() {
        let mut tokens = tokenize("x").unwrap();
        tokens.pop();
        let tree = parse(tokens).unwrap();
        assert_eq!(tree.child_nodes().count(), 1);
    }

    #[test]
    fn binding_powers_follow_precedence_table() {
        let power = |kind: TokenKind| binary_binding_power(&kind).unwrap().left;
        assert!(power(TokenKind::Or) < power(TokenKind::And));
        assert!(power(TokenKind::And) < power(TokenKind::EqualEqual));
        assert!(power(TokenKind::EqualEqual) < power(TokenKind::Less));
        assert!(power(TokenKind::Less) < power(TokenKind::Plus));
        assert!(power(TokenKind::Plus) < power(TokenKind::Star));
        assert!(binary_binding_power(&TokenKind::Assign).is_none());
    }

    #[test]
    fn error_reports_position_and_expected_set() {
        let err = parse_source("let = 4").unwrap_err();
        assert_eq!(err.position, Position::new(1, 5));
        assert_eq!(err.expected(), &["identifier"]);
        assert_eq!(err.to_string(), "unexpected `=`, expected identifier");
    }

    #[test]
    fn unexpected_end_of_input() {
        let err = parse_source("print(1,").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let depth = MAX_NESTING_DEPTH + 10;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let err = parse_source(&source).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH
            }
        );
    }

    #[test]
    fn long_operator_chains_are_bounded() {
        let source = vec!["1"; MAX_NESTING_DEPTH + 5].join(" + ");
        let err = parse_source(&source).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::NestingTooDeep { .. }));

        let source = vec!["1"; 200].join(" + ");
        assert!(parse_source(&source).is_ok());
    }

    #[test]
    fn else_if_chains_are_bounded() {
        let chain = |arms: usize| {
            let mut source = String::from("let n = 0\nif n == 0 { print(0) }");
            for arm in 1..arms {
                source.push_str(&format!(" else if n == {arm} {{ print({arm}) }}"));
            }
            source
        };
        assert!(parse_source(&chain(200)).is_ok());
        let err = parse_source(&chain(MAX_NESTING_DEPTH + 50)).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH
            }
        );
    }
}

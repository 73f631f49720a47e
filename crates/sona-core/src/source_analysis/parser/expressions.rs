// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! Binary operators go through a Pratt loop driven by
//! [`binary_binding_power`]; prefix operators, postfix chains and primaries
//! are plain recursive descent.

use super::{binary_binding_power, Marker, ParseResult, Parser};
use crate::source_analysis::{SyntaxElement, SyntaxKind, SyntaxNode, TokenKind};

/// Tokens that can start an expression, for "expected ..." messages.
const EXPRESSION_START: &[&str] = &[
    "identifier",
    "number",
    "string",
    "`true`",
    "`false`",
    "`null`",
    "`(`",
    "`[`",
    "`{`",
    "`-`",
    "`!`",
];

impl Parser {
    /// Parses a full expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<SyntaxNode> {
        self.nested(|p| p.parse_binary(0))
    }

    /// Pratt loop: parses operands and operators whose left binding power is
    /// at least `min_bp`.
    fn parse_binary(&mut self, min_bp: u8) -> ParseResult<SyntaxNode> {
        let mut left = self.parse_unary()?;
        let mut chain = 0;

        let result = loop {
            let Some(power) = binary_binding_power(self.current_kind()) else {
                break Ok(left);
            };
            if power.left < min_bp {
                break Ok(left);
            }
            if let Err(err) = self.enter_nesting() {
                break Err(err);
            }
            chain += 1;

            let marker = Marker::at(&left);
            let operator = self.advance();
            // An operator at the end of a line continues the expression.
            self.skip_newlines();
            let right = match self.parse_binary(power.right) {
                Ok(right) => right,
                Err(err) => break Err(err),
            };
            left = self.finish(
                SyntaxKind::Binary,
                marker,
                vec![left.into(), operator.into(), right.into()],
            );
        };

        self.exit_nesting(chain);
        result
    }

    /// Parses prefix `-`, `!` and `not`, which bind tighter than any binary
    /// operator.
    fn parse_unary(&mut self) -> ParseResult<SyntaxNode> {
        if matches!(self.current_kind(), TokenKind::Minus | TokenKind::Not) {
            let marker = self.mark();
            let operator = self.advance();
            let operand = self.nested(Self::parse_unary)?;
            return Ok(self.finish(
                SyntaxKind::Unary,
                marker,
                vec![operator.into(), operand.into()],
            ));
        }
        self.parse_postfix()
    }

    /// Parses a primary followed by any number of calls, property accesses
    /// and index expressions.
    fn parse_postfix(&mut self) -> ParseResult<SyntaxNode> {
        let mut node = self.parse_primary()?;
        let mut chain = 0;

        let result = loop {
            let kind = match self.current_kind() {
                TokenKind::LeftParen => SyntaxKind::Call,
                TokenKind::Dot => SyntaxKind::Property,
                TokenKind::LeftBracket => SyntaxKind::Index,
                _ => break Ok(node),
            };
            if let Err(err) = self.enter_nesting() {
                break Err(err);
            }
            chain += 1;

            let marker = Marker::at(&node);
            let second = match kind {
                SyntaxKind::Call => self.parse_arguments().map(SyntaxElement::from),
                SyntaxKind::Property => {
                    self.advance();
                    self.expect_identifier().map(SyntaxElement::from)
                }
                _ => self.parse_index().map(SyntaxElement::from),
            };
            match second {
                Ok(second) => node = self.finish(kind, marker, vec![node.into(), second]),
                Err(err) => break Err(err),
            }
        };

        self.exit_nesting(chain);
        result
    }

    /// Parses `[ expression ]` after an indexed expression.
    fn parse_index(&mut self) -> ParseResult<SyntaxNode> {
        self.expect(&TokenKind::LeftBracket)?;
        self.skip_newlines();
        let index = self.parse_expression()?;
        self.skip_newlines();
        self.expect(&TokenKind::RightBracket)?;
        Ok(index)
    }

    /// Parses `( a, b, ... )` into an [`SyntaxKind::ArgList`] node spanning
    /// the parentheses.
    pub(super) fn parse_arguments(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.expect(&TokenKind::LeftParen)?;
        let arguments = self.parse_comma_list(&TokenKind::RightParen, Self::parse_expression)?;
        self.expect(&TokenKind::RightParen)?;
        Ok(self.finish(SyntaxKind::ArgList, marker, arguments))
    }

    /// Parses comma-separated items up to (not including) `close`. Newlines
    /// between items are ignored and a trailing comma is allowed.
    pub(super) fn parse_comma_list(
        &mut self,
        close: &TokenKind,
        mut item: impl FnMut(&mut Self) -> ParseResult<SyntaxNode>,
    ) -> ParseResult<Vec<SyntaxElement>> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(close) {
                break;
            }
            items.push(item(self)?.into());
            self.skip_newlines();
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.skip_newlines();
        if !self.check(close) {
            return Err(self.unexpected(vec!["`,`", close.describe()]));
        }
        Ok(items)
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        match self.current_kind() {
            TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::String(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                let token = self.advance();
                Ok(self.finish(SyntaxKind::Literal, marker, vec![token.into()]))
            }
            TokenKind::Identifier(_) => {
                let token = self.advance();
                Ok(self.finish(SyntaxKind::Name, marker, vec![token.into()]))
            }
            TokenKind::LeftParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.parse_expression()?;
                self.skip_newlines();
                self.expect(&TokenKind::RightParen)?;
                Ok(self.finish(SyntaxKind::Group, marker, vec![inner.into()]))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let elements =
                    self.parse_comma_list(&TokenKind::RightBracket, Self::parse_expression)?;
                self.expect(&TokenKind::RightBracket)?;
                Ok(self.finish(SyntaxKind::Array, marker, elements))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let entries = self.parse_comma_list(&TokenKind::RightBrace, Self::parse_entry)?;
                self.expect(&TokenKind::RightBrace)?;
                Ok(self.finish(SyntaxKind::Object, marker, entries))
            }
            _ => Err(self.unexpected(EXPRESSION_START.to_vec())),
        }
    }

    /// Parses one `key: value` entry of an object literal.
    fn parse_entry(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        let key = match self.current_kind() {
            TokenKind::Identifier(_)
            | TokenKind::String(_)
            | TokenKind::Integer(_)
            | TokenKind::Decimal(_) => self.advance(),
            _ => return Err(self.unexpected(vec!["identifier", "string", "number"])),
        };
        self.expect(&TokenKind::Colon)?;
        self.skip_newlines();
        let value = self.parse_expression()?;
        Ok(self.finish(SyntaxKind::Entry, marker, vec![key.into(), value.into()]))
    }
}

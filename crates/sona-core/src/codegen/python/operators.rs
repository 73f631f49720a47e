// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Operator mapping and Python precedence.
//!
//! **DDD Context:** Compilation - Code Generation
//!
//! Canonical Sona operators map to Python through a fixed table. Python
//! precedence differs from Sona's in two places that matter for emission:
//! `not` binds looser than comparisons, and comparisons chain
//! (`a < b == c` is not `(a < b) == c`). Operands are parenthesized only
//! when their own precedence is too low for the slot they fill.

use crate::ast::{BinaryOperator, UnaryOperator};

/// Python precedence levels, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    /// Any expression is accepted (statement level, call arguments).
    Lowest,
    /// `or`
    Or,
    /// `and`
    And,
    /// `not x`
    Not,
    /// `==`, `!=`, `<`, `<=`, `>`, `>=`
    Comparison,
    /// `+`, `-`
    Additive,
    /// `*`, `/`, `%`
    Multiplicative,
    /// `-x`
    Negate,
    /// Calls, attribute access and subscripts.
    Postfix,
    /// Literals, names and bracketed displays.
    Atom,
}

impl Precedence {
    /// The next tighter level.
    const fn tighter(self) -> Self {
        match self {
            Self::Lowest => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Not,
            Self::Not => Self::Comparison,
            Self::Comparison => Self::Additive,
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Negate,
            Self::Negate => Self::Postfix,
            Self::Postfix | Self::Atom => Self::Atom,
        }
    }
}

/// The Python spelling of a binary operator.
pub(super) const fn binary_symbol(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::And => "and",
        BinaryOperator::Or => "or",
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulo => "%",
        BinaryOperator::Equal => "==",
        BinaryOperator::NotEqual => "!=",
        BinaryOperator::Less => "<",
        BinaryOperator::LessEqual => "<=",
        BinaryOperator::Greater => ">",
        BinaryOperator::GreaterEqual => ">=",
    }
}

/// The Python prefix for a unary operator, including any separating space.
pub(super) const fn unary_prefix(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Negate => "-",
        UnaryOperator::Not => "not ",
    }
}

/// Precedence of a binary operator.
pub(super) const fn binary_precedence(op: BinaryOperator) -> Precedence {
    match op {
        BinaryOperator::Or => Precedence::Or,
        BinaryOperator::And => Precedence::And,
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => Precedence::Comparison,
        BinaryOperator::Add | BinaryOperator::Subtract => Precedence::Additive,
        BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => {
            Precedence::Multiplicative
        }
    }
}

/// Precedence of a unary operator.
pub(super) const fn unary_precedence(op: UnaryOperator) -> Precedence {
    match op {
        UnaryOperator::Negate => Precedence::Negate,
        UnaryOperator::Not => Precedence::Not,
    }
}

/// Minimum precedences of the left and right operands of `op`.
///
/// Binary operators are left-associative, so the right operand must bind
/// strictly tighter. Comparisons are strict on both sides so that Python
/// never chains them.
pub(super) const fn operand_precedence(op: BinaryOperator) -> (Precedence, Precedence) {
    let own = binary_precedence(op);
    if op.is_comparison() {
        (own.tighter(), own.tighter())
    } else {
        (own, own.tighter())
    }
}

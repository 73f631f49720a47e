// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression rendering.
//!
//! **DDD Context:** Compilation - Code Generation
//!
//! Rendering an expression reads the scope (to spell bound names the way
//! their binding says) but never changes it, so the same node always
//! renders the same way at the same point of the traversal.

use super::document::{break_, group, join, nest, Document};
use super::operators::{
    binary_precedence, binary_symbol, operand_precedence, unary_precedence, unary_prefix,
    Precedence,
};
use super::util::{normalize_integer, python_name, python_string};
use super::PythonGenerator;
use crate::ast::{Expression, Identifier, Literal, ObjectEntry, ObjectKey};
use crate::docvec;

impl PythonGenerator {
    /// Renders `expr` for a slot that accepts any expression.
    pub(super) fn expression_doc(&self, expr: &Expression) -> Document<'static> {
        self.expression_at(expr, Precedence::Lowest)
    }

    /// Renders `expr` for a slot that needs at least `min` precedence,
    /// parenthesizing it otherwise.
    pub(super) fn expression_at(&self, expr: &Expression, min: Precedence) -> Document<'static> {
        let (doc, precedence) = self.expression_with_precedence(expr);
        if precedence < min {
            docvec!["(", doc, ")"]
        } else {
            doc
        }
    }

    /// Renders the object of an attribute access or subscript.
    pub(super) fn receiver_doc(&self, object: &Expression) -> Document<'static> {
        // `1.real` lexes as a float in Python.
        if let Expression::Literal {
            value: Literal::Integer(_),
            ..
        } = object
        {
            return docvec!["(", self.expression_doc(object), ")"];
        }
        self.expression_at(object, Precedence::Postfix)
    }

    /// Renders comma-separated arguments in parentheses.
    pub(super) fn arguments_doc(&self, arguments: &[Expression]) -> Document<'static> {
        self.bracketed(
            "(",
            arguments.iter().map(|arg| self.expression_doc(arg)).collect(),
            ")",
        )
    }

    fn expression_with_precedence(&self, expr: &Expression) -> (Document<'static>, Precedence) {
        match expr {
            Expression::Literal { value, .. } => (literal_doc(value), Precedence::Atom),
            Expression::Identifier(identifier) => (self.name_doc(identifier), Precedence::Atom),
            Expression::Binary {
                op, left, right, ..
            } => {
                let (left_min, right_min) = operand_precedence(*op);
                let doc = docvec![
                    self.expression_at(left, left_min),
                    " ",
                    binary_symbol(*op),
                    " ",
                    self.expression_at(right, right_min),
                ];
                (doc, binary_precedence(*op))
            }
            Expression::Unary { op, operand, .. } => {
                let precedence = unary_precedence(*op);
                let doc = docvec![unary_prefix(*op), self.expression_at(operand, precedence)];
                (doc, precedence)
            }
            Expression::Call {
                callee, arguments, ..
            } => {
                let doc = docvec![
                    self.expression_at(callee, Precedence::Postfix),
                    self.arguments_doc(arguments),
                ];
                (doc, Precedence::Postfix)
            }
            Expression::Array { elements, .. } => {
                let items = elements.iter().map(|e| self.expression_doc(e)).collect();
                (self.bracketed("[", items, "]"), Precedence::Atom)
            }
            Expression::Object { entries, .. } => {
                let items = entries.iter().map(|entry| self.entry_doc(entry)).collect();
                (self.bracketed("{", items, "}"), Precedence::Atom)
            }
            Expression::Property {
                object, property, ..
            } => {
                let doc = docvec![
                    self.receiver_doc(object),
                    ".",
                    python_name(&property.name)
                ];
                (doc, Precedence::Postfix)
            }
            Expression::Index { object, index, .. } => {
                let doc = docvec![
                    self.receiver_doc(object),
                    "[",
                    self.expression_doc(index),
                    "]"
                ];
                (doc, Precedence::Postfix)
            }
        }
    }

    /// A name read: bound names use their binding's spelling.
    pub(super) fn name_doc(&self, identifier: &Identifier) -> Document<'static> {
        let spelled = self
            .scope
            .lookup(&identifier.name)
            .map_or_else(|| python_name(&identifier.name), |b| b.host_name.clone());
        Document::String(spelled.into())
    }

    fn entry_doc(&self, entry: &ObjectEntry) -> Document<'static> {
        let key = match &entry.key {
            ObjectKey::Name(name) | ObjectKey::String(name) => python_string(name),
            ObjectKey::Number(number) => number_text(number).to_string(),
        };
        docvec![key, ": ", self.expression_doc(&entry.value)]
    }

    /// `open items close`, laid out flat when it fits and one item per
    /// line (with a trailing comma) otherwise.
    pub(super) fn bracketed(
        &self,
        open: &'static str,
        items: Vec<Document<'static>>,
        close: &'static str,
    ) -> Document<'static> {
        if items.is_empty() {
            return docvec![open, close];
        }
        let indent = isize::try_from(self.options.indent_width).unwrap_or(4);
        group(docvec![
            open,
            nest(
                indent,
                docvec![break_("", ""), join(items, &docvec![",", break_("", " ")])]
            ),
            break_(",", ""),
            close,
        ])
    }
}

fn literal_doc(value: &Literal) -> Document<'static> {
    match value {
        Literal::Integer(text) => Document::String(normalize_integer(text).to_string()),
        Literal::Decimal(text) => Document::String(text.to_string()),
        Literal::String(text) => Document::String(python_string(text)),
        Literal::Boolean(true) => Document::Str("True"),
        Literal::Boolean(false) => Document::Str("False"),
        Literal::Null => Document::Str("None"),
    }
}

/// Numeric object keys: integers are normalized, decimals kept.
fn number_text(text: &str) -> &str {
    if text.contains('.') {
        text
    } else {
        normalize_integer(text)
    }
}

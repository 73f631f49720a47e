// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical helpers for emitting Python text.
//!
//! This module provides helper functions for:
//! - Name mangling (Python reserved words)
//! - String literal quoting
//! - Integer literal normalization

use std::fmt::Write;

use ecow::EcoString;

/// Python's reserved words. A Sona identifier spelled like one of these is
/// emitted with a trailing underscore.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Returns `true` if `name` is a Python reserved word.
#[must_use]
pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// The Python spelling of a Sona identifier.
#[must_use]
pub fn python_name(name: &str) -> EcoString {
    if is_python_keyword(name) {
        let mut mangled = EcoString::from(name);
        mangled.push('_');
        mangled
    } else {
        name.into()
    }
}

/// Quotes `value` as a double-quoted Python string literal.
#[must_use]
pub fn python_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(quoted, "\\x{:02x}", u32::from(c));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Strips leading zeros from an integer literal: Python rejects `007`.
#[must_use]
pub fn normalize_integer(text: &str) -> &str {
    let trimmed = text.trim_start_matches('0');
    if trimmed.is_empty() && !text.is_empty() {
        "0"
    } else {
        trimmed
    }
}

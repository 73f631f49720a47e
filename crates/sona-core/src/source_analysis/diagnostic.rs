// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Non-fatal diagnostics reported alongside successful output.

use std::fmt;

use ecow::EcoString;

use super::{Position, Span};

/// A diagnostic message attached to a source location.
///
/// Fatal problems are returned as errors; a `Diagnostic` is what survives a
/// successful request (for example a name the runtime is expected to supply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The message.
    pub message: EcoString,
    /// The source location.
    pub span: Span,
    /// Line and column of the location.
    pub position: Position,
    /// Optional hint for how to fix the issue.
    pub hint: Option<EcoString>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, span: Span, position: Position) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            position,
            hint: None,
        }
    }

    /// Creates a new warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<EcoString>, span: Span, position: Position) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            position,
            hint: None,
        }
    }

    /// Attaches a hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.position)
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A problem that prevents transpilation.
    Error,
    /// Something that may fail at run time.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

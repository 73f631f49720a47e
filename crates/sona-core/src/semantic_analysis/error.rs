// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis error types.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::{Position, Span};

/// A violation of the scoping rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// `name` is already bound in the current frame.
    #[error("`{name}` is already defined in this scope")]
    DuplicateBinding {
        /// The name.
        name: EcoString,
    },

    /// No frame in the chain binds `name`.
    #[error("`{name}` is not defined")]
    UndefinedName {
        /// The name.
        name: EcoString,
    },

    /// `name` was declared with `const`.
    #[error("cannot assign to constant `{name}`")]
    ConstAssignment {
        /// The name.
        name: EcoString,
    },

    /// A deferred name was still unbound when its retry budget ran out.
    #[error("`{name}` is still undefined after {attempts} resolution attempts")]
    UnresolvedDeferred {
        /// The name.
        name: EcoString,
        /// Attempts made.
        attempts: u32,
    },

    /// The global frame cannot be popped.
    #[error("cannot leave the global scope")]
    RootFramePop,
}

impl ScopeError {
    /// The name involved, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::DuplicateBinding { name }
            | Self::UndefinedName { name }
            | Self::ConstAssignment { name }
            | Self::UnresolvedDeferred { name, .. } => Some(name.as_str()),
            Self::RootFramePop => None,
        }
    }
}

/// A [`ScopeError`] located in source.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(sona::semantic))]
pub struct SemanticError {
    /// What went wrong.
    #[source]
    pub kind: ScopeError,
    /// The offending name or statement.
    #[label("here")]
    pub span: Span,
    /// Line and column of the offending node.
    pub position: Position,
}

impl SemanticError {
    /// Creates a new semantic error.
    #[must_use]
    pub fn new(kind: ScopeError, span: Span, position: Position) -> Self {
        Self {
            kind,
            span,
            position,
        }
    }
}

// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error and warning rendering using miette.
//!
//! Pipeline errors already carry labelled spans; they only need the source
//! text attached. Warnings are plain `sona_core` diagnostics and are wrapped
//! in [`CompileDiagnostic`] to get the same rendering.

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use sona_core::source_analysis::{Diagnostic as CoreDiagnostic, Severity};
use sona_core::transpiler::TranspileError;

/// A non-fatal diagnostic with rich formatting.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(sona::check))]
pub struct CompileDiagnostic {
    /// Error or warning
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Optional fix-it text
    #[help]
    pub hint: Option<String>,
    /// Source code for context
    #[source_code]
    pub src: NamedSource<String>,
    /// Location of the finding
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label for the span (interpolated by miette derive macro)
    pub label: String,
}

impl CompileDiagnostic {
    /// Create a new diagnostic from a sona-core diagnostic.
    pub fn from_core_diagnostic(
        diagnostic: &CoreDiagnostic,
        source_path: &str,
        source: &str,
    ) -> Self {
        let label = match diagnostic.severity {
            Severity::Error => "error here",
            Severity::Warning => "warning here",
        };

        Self {
            severity: diagnostic.severity,
            message: diagnostic.message.to_string(),
            hint: diagnostic.hint.as_ref().map(ToString::to_string),
            src: NamedSource::new(source_path, source.to_string()),
            span: diagnostic.span.into(),
            label: label.to_string(),
        }
    }
}

/// Attaches `source` to a pipeline error so miette can show the offending
/// line.
pub fn error_report(error: TranspileError, source_path: &str, source: &str) -> Report {
    Report::new(error).with_source_code(NamedSource::new(source_path, source.to_string()))
}

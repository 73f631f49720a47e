// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The transpilation pipeline.
//!
//! **DDD Context:** Compilation
//!
//! A [`Transpiler`] wires the phases together for one request at a time:
//!
//! ```text
//! source ──tokenize──▶ tokens ──parse──▶ SyntaxNode ──build──▶ Program
//!        ──PythonGenerator (ScopeStack, SourceMapper)──▶ Python text
//! ```
//!
//! Every phase fails fast. A failed request returns a [`TranspileError`] and
//! no partial output; [`TranspileReport`] flattens either outcome into one
//! serializable shape for tools.
//!
//! Instances hold no shared state, so independent transpilers can run on
//! separate threads.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use std::time::{Duration, Instant};

use miette::Diagnostic as MietteDiagnostic;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::ast_builder::build_program;
use crate::codegen::python::{CodeGenError, CodegenOptions, PythonGenerator};
use crate::semantic_analysis::SemanticError;
use crate::source_analysis::{parse, tokenize, Diagnostic, LexError, ParseError, Position, Span};
use crate::source_map::SourceMap;

/// Any failure of the pipeline, tagged by phase.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum TranspileError {
    /// The tokenizer rejected the input.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    /// The parser or AST builder rejected the input.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// A scoping rule was violated.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Semantic(#[from] SemanticError),

    /// A construct could not be translated.
    #[error(transparent)]
    #[diagnostic(transparent)]
    CodeGen(CodeGenError),
}

impl From<CodeGenError> for TranspileError {
    fn from(error: CodeGenError) -> Self {
        match error {
            CodeGenError::Semantic(semantic) => Self::Semantic(semantic),
            other => Self::CodeGen(other),
        }
    }
}

impl TranspileError {
    /// Stable upper-snake-case code for the failing phase.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Lex(_) => "LEXER_ERROR",
            Self::Parse(_) => "PARSER_ERROR",
            Self::Semantic(_) => "SEMANTIC_ERROR",
            Self::CodeGen(_) => "CODEGEN_ERROR",
        }
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Byte range of the offending source, when known.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex(error) => Some(error.span),
            Self::Parse(error) => Some(error.span),
            Self::Semantic(error) => Some(error.span),
            Self::CodeGen(error) => error.span(),
        }
    }

    /// 1-based line and column of the offending source, when known.
    #[must_use]
    pub fn line_column(&self) -> Option<(u32, u32)> {
        let position = match self {
            Self::Lex(error) => Some(error.position),
            Self::Parse(error) => Some(error.position),
            Self::Semantic(error) => Some(error.position),
            Self::CodeGen(error) => error.position(),
        };
        position.map(|p: Position| (p.line(), p.column()))
    }
}

/// Timing and size figures for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranspileStats {
    /// Tokenizing, parsing and AST building.
    #[serde(rename = "parse_time_us", serialize_with = "micros")]
    pub parse_duration: Duration,
    /// Python generation.
    #[serde(rename = "generation_time_us", serialize_with = "micros")]
    pub generation_duration: Duration,
    /// AST nodes in the program.
    pub node_count: u32,
    /// Lines of generated Python.
    pub line_count: usize,
    /// Source map entries recorded.
    pub mapping_count: usize,
}

fn micros<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
}

/// A successful request.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspileOutput {
    /// Python source text.
    pub code: String,
    /// Generated ↔ source mappings, when enabled.
    pub source_map: Option<SourceMap>,
    /// Timing and size figures.
    pub stats: TranspileStats,
    /// Non-fatal findings.
    pub warnings: Vec<Diagnostic>,
}

/// Transpiles Sona source to Python.
///
/// # Example
///
/// ```
/// use sona_core::codegen::python::CodegenOptions;
/// use sona_core::transpiler::Transpiler;
///
/// let mut transpiler = Transpiler::new(CodegenOptions::new().with_header(false));
/// let output = transpiler.transpile("let x = 42", "main.sona").unwrap();
/// assert_eq!(output.code, "x = 42\n");
///
/// let error = transpiler.transpile("let x = 1\nlet x = 2", "main.sona").unwrap_err();
/// assert_eq!(error.kind(), "SEMANTIC_ERROR");
/// assert_eq!(error.line_column(), Some((2, 5)));
/// ```
#[derive(Debug)]
pub struct Transpiler {
    generator: PythonGenerator,
}

impl Transpiler {
    /// Creates a transpiler.
    #[must_use]
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            generator: PythonGenerator::new(options),
        }
    }

    /// The code generation options in effect.
    #[must_use]
    pub const fn options(&self) -> &CodegenOptions {
        self.generator.options()
    }

    /// Runs the whole pipeline on `source`. `file_name` is used in the
    /// source map and in diagnostics only.
    ///
    /// # Errors
    ///
    /// Returns the first error of the first failing phase.
    #[instrument(skip_all, fields(file = %file_name, bytes = source.len()))]
    pub fn transpile(
        &mut self,
        source: &str,
        file_name: &str,
    ) -> Result<TranspileOutput, TranspileError> {
        let started = Instant::now();
        let tokens = tokenize(source)?;
        let token_count = tokens.len();
        let tree = parse(tokens)?;
        let program = build_program(tree)?;
        let parse_duration = started.elapsed();
        debug!(
            tokens = token_count,
            nodes = program.node_count,
            elapsed_us = parse_duration.as_micros(),
            "parsed"
        );

        let started = Instant::now();
        let generated = self.generator.generate(&program, file_name)?;
        let generation_duration = started.elapsed();
        debug!(
            elapsed_us = generation_duration.as_micros(),
            warnings = generated.warnings.len(),
            "generated"
        );

        let stats = TranspileStats {
            parse_duration,
            generation_duration,
            node_count: program.node_count,
            line_count: generated.code.lines().count(),
            mapping_count: generated
                .source_map
                .as_ref()
                .map_or(0, |map| map.mappings.len()),
        };
        Ok(TranspileOutput {
            code: generated.code,
            source_map: generated.source_map,
            stats,
            warnings: generated.warnings,
        })
    }

    /// Runs the pipeline and flattens the outcome into a report.
    pub fn report(&mut self, source: &str, file_name: &str) -> TranspileReport {
        TranspileReport::from_result(&self.transpile(source, file_name))
    }
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new(CodegenOptions::new())
    }
}

/// Transpiles `source` with default options.
///
/// # Errors
///
/// Returns the first error of the first failing phase.
pub fn transpile(source: &str) -> Result<TranspileOutput, TranspileError> {
    Transpiler::default().transpile(source, "<string>")
}

/// The failure half of a [`TranspileReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    /// Phase code, e.g. `PARSER_ERROR`.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// 1-based line, when known.
    pub line: Option<u32>,
    /// 1-based column, when known.
    pub column: Option<u32>,
}

/// Uniform, serializable result of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranspileReport {
    /// Whether the request succeeded.
    pub success: bool,
    /// Generated Python.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Source map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<SourceMap>,
    /// Timing and size figures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TranspileStats>,
    /// Rendered warnings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// The failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportedError>,
}

impl TranspileReport {
    /// Builds a report from a pipeline result.
    #[must_use]
    pub fn from_result(result: &Result<TranspileOutput, TranspileError>) -> Self {
        match result {
            Ok(output) => Self {
                success: true,
                code: Some(output.code.clone()),
                source_map: output.source_map.clone(),
                stats: Some(output.stats),
                warnings: output.warnings.iter().map(ToString::to_string).collect(),
                error: None,
            },
            Err(error) => {
                let (line, column) = error.line_column().unzip();
                Self {
                    success: false,
                    code: None,
                    source_map: None,
                    stats: None,
                    warnings: Vec::new(),
                    error: Some(ReportedError {
                        kind: error.kind(),
                        message: error.message(),
                        line,
                        column,
                    }),
                }
            }
        }
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; none is expected for this shape.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

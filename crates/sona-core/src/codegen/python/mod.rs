// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Python code generation for Sona.
//!
//! This module transforms the Sona AST into Python 3 source text. The
//! generator is a single-pass visitor: statements are emitted in document
//! order, one line (or one bracketed multi-line group) at a time, and no
//! node is visited twice.
//!
//! # Example
//!
//! Sona source:
//! ```sona
//! func add(a, b) {
//!     return a + b
//! }
//! print(add(2, 3))
//! ```
//!
//! Generated Python:
//! ```python
//! # Auto-generated from Sona source code
//! from sona.runtime import *
//!
//! def add(a, b):
//!     return a + b
//!
//! print(add(2, 3))
//! ```
//!
//! # Scoping
//!
//! The generator owns a [`ScopeStack`]. Function, class and block bodies
//! push a frame before their statements and pop it afterwards; function and
//! class names are hoisted to the top of the statement list that declares
//! them, so calls may precede definitions. Names read before any binding
//! exists are deferred and, if still unbound at the end of the program,
//! reported as warnings: the runtime may supply them.
//!
//! # Module Organization
//!
//! - [`document`] - Wadler-style document tree and line-width renderer
//! - [`statements`] - Statement emission (assignments, control flow, imports)
//! - [`definitions`] - Function and class definitions, `global`/`nonlocal`
//! - [`expressions`] - Expression rendering (pure: reads scope, never writes)
//! - [`operators`] - Operator table and Python precedence
//! - [`util`] - Name mangling and literal spelling

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

mod definitions;
pub mod document;
mod expressions;
mod operators;
mod statements;
pub mod util;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write};

use ecow::EcoString;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;
use tracing::debug;

use crate::ast::{Expression, NodeMeta, Program};
use crate::ast_walker::{walk_binding_names, walk_expression, walk_program, AstIndex};
use crate::semantic_analysis::scope::{BUILTIN_CONSTANTS, BUILTIN_FUNCTIONS};
use crate::semantic_analysis::{Resolution, ScopeError, ScopeStack, SemanticError};
use crate::source_analysis::{Diagnostic, Position, Span};
use crate::source_map::{FileId, SourceMap, SourceMapper};
use document::Document;
use util::python_name;

/// Errors that can occur during code generation.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum CodeGenError {
    /// A construct that has no Python equivalent in its position.
    #[error("cannot translate {construct}: {reason}")]
    #[diagnostic(code(sona::codegen))]
    NoMapping {
        /// The construct, e.g. `break`.
        construct: &'static str,
        /// Why it cannot be translated.
        reason: EcoString,
        /// Location of the construct.
        #[label("here")]
        span: Span,
        /// Line and column of the construct.
        position: Position,
    },

    /// Formatting error while writing output.
    #[error("formatting error: {0}")]
    #[diagnostic(code(sona::codegen))]
    Format(#[from] fmt::Error),

    /// A scoping rule was violated.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Semantic(#[from] SemanticError),
}

impl CodeGenError {
    /// Builds a [`CodeGenError::NoMapping`] located at `meta`.
    pub(crate) fn no_mapping(
        construct: &'static str,
        reason: impl Into<EcoString>,
        meta: &NodeMeta,
    ) -> Self {
        Self::NoMapping {
            construct,
            reason: reason.into(),
            span: meta.span,
            position: meta.position,
        }
    }

    /// Locates a scope error at `meta`.
    pub(crate) fn scope(kind: ScopeError, meta: &NodeMeta) -> Self {
        Self::Semantic(SemanticError::new(kind, meta.span, meta.position))
    }

    /// Location of the error.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::NoMapping { span, .. } => Some(*span),
            Self::Semantic(error) => Some(error.span),
            Self::Format(_) => None,
        }
    }

    /// Line and column of the error.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::NoMapping { position, .. } => Some(*position),
            Self::Semantic(error) => Some(error.position),
            Self::Format(_) => None,
        }
    }
}

/// Result type for code generation operations.
pub type Result<T> = std::result::Result<T, CodeGenError>;

/// Options for Python code generation.
///
/// Use [`CodegenOptions::new`] for the defaults, then chain builder methods.
///
/// # Example
///
/// ```
/// use sona_core::codegen::python::CodegenOptions;
///
/// let options = CodegenOptions::new()
///     .with_runtime_module(None)
///     .with_line_width(100);
/// assert_eq!(options.line_width(), 100);
/// assert!(options.runtime_module().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Module star-imported by the header; `None` omits the import.
    runtime_module: Option<EcoString>,
    /// Whether to emit the header at all.
    header: bool,
    /// Whether to record source mappings.
    source_maps: bool,
    /// Maximum line width before bracketed expressions are broken.
    line_width: usize,
    /// Spaces per indentation level.
    indent_width: usize,
}

/// Runtime module imported by generated code unless configured otherwise.
pub const DEFAULT_RUNTIME_MODULE: &str = "sona.runtime";

impl CodegenOptions {
    /// Creates default options: `sona.runtime` header import, source maps
    /// on, 88 columns, 4-space indentation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            runtime_module: Some(DEFAULT_RUNTIME_MODULE.into()),
            header: true,
            source_maps: true,
            line_width: document::DEFAULT_WIDTH,
            indent_width: 4,
        }
    }

    /// Sets the module star-imported by the header, or omits the import.
    #[must_use]
    pub fn with_runtime_module(mut self, module: Option<EcoString>) -> Self {
        self.runtime_module = module;
        self
    }

    /// Enables or disables the generated header.
    #[must_use]
    pub fn with_header(mut self, enabled: bool) -> Self {
        self.header = enabled;
        self
    }

    /// Enables or disables source map recording.
    #[must_use]
    pub fn with_source_maps(mut self, enabled: bool) -> Self {
        self.source_maps = enabled;
        self
    }

    /// Sets the maximum line width.
    #[must_use]
    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }

    /// Sets the indentation width. Zero is treated as one space.
    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.max(1);
        self
    }

    /// The runtime module, if the header imports one.
    #[must_use]
    pub fn runtime_module(&self) -> Option<&str> {
        self.runtime_module.as_deref()
    }

    /// Whether the header is emitted.
    #[must_use]
    pub const fn header(&self) -> bool {
        self.header
    }

    /// Whether source maps are recorded.
    #[must_use]
    pub const fn source_maps(&self) -> bool {
        self.source_maps
    }

    /// Maximum line width.
    #[must_use]
    pub const fn line_width(&self) -> usize {
        self.line_width
    }

    /// Spaces per indentation level.
    #[must_use]
    pub const fn indent_width(&self) -> usize {
        self.indent_width
    }
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of generating one program.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPython {
    /// Python source text.
    pub code: String,
    /// Mappings from generated to source positions, when enabled.
    pub source_map: Option<SourceMap>,
    /// Non-fatal findings, such as names the runtime must supply.
    pub warnings: Vec<Diagnostic>,
}

/// Generates Python from a program with default options.
///
/// # Errors
///
/// Returns [`CodeGenError`] if a construct has no Python mapping or a
/// scoping rule is violated.
///
/// # Example
///
/// ```
/// use sona_core::ast_builder::build_program;
/// use sona_core::codegen::python::generate;
/// use sona_core::source_analysis::{parse, tokenize};
///
/// let tree = parse(tokenize("let x = 42").unwrap()).unwrap();
/// let program = build_program(tree).unwrap();
/// let generated = generate(&program).unwrap();
/// assert!(generated.code.ends_with("x = 42\n"));
/// ```
pub fn generate(program: &Program) -> Result<GeneratedPython> {
    PythonGenerator::new(CodegenOptions::new()).generate(program, "<string>")
}

/// Python code generator.
///
/// One generator may serve many requests; each call to
/// [`generate`](Self::generate) starts from a clean state.
#[derive(Debug)]
pub struct PythonGenerator {
    options: CodegenOptions,
    /// Bindings visible at the current point of the traversal.
    scope: ScopeStack,
    /// Generated text.
    output: String,
    /// Current indentation level.
    indent: usize,
    mapper: SourceMapper,
    file: Option<FileId>,
    /// Parent links of the program being generated.
    index: AstIndex,
    /// Positions of deferred reads, for warnings.
    deferred_sites: HashMap<Span, Position>,
    /// Python names in use; renamed bindings must avoid them.
    reserved: HashSet<EcoString>,
    /// Per enclosing function: names its body uses from outside itself.
    outer_references: Vec<HashSet<EcoString>>,
}

impl PythonGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            scope: ScopeStack::new(),
            output: String::new(),
            indent: 0,
            mapper: SourceMapper::new(),
            file: None,
            index: AstIndex::default(),
            deferred_sites: HashMap::new(),
            reserved: HashSet::new(),
            outer_references: Vec::new(),
        }
    }

    /// The options in effect.
    #[must_use]
    pub const fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Clears all per-request state.
    pub fn reset(&mut self) {
        self.scope = ScopeStack::new();
        self.output.clear();
        self.indent = 0;
        self.mapper.reset();
        self.file = None;
        self.index = AstIndex::default();
        self.deferred_sites.clear();
        self.reserved.clear();
        self.outer_references.clear();
    }

    /// Generates Python for `program`. `file_name` names the source in the
    /// source map.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGenError`] if a construct has no Python mapping or a
    /// scoping rule is violated. No partial output is returned.
    pub fn generate(&mut self, program: &Program, file_name: &str) -> Result<GeneratedPython> {
        self.reset();
        self.file = Some(self.mapper.add_file(file_name));
        self.index = AstIndex::build(program);
        self.reserve_names(program);

        let result = self
            .emit_header()
            .and_then(|()| self.emit_statements(&program.statements));
        if let Err(error) = result {
            self.reset();
            return Err(error);
        }
        while self.output.ends_with("\n\n") {
            self.output.pop();
        }

        let warnings = self.unresolved_warnings();
        let source_map = self.options.source_maps.then(|| self.mapper.to_source_map());
        debug!(
            lines = self.output.lines().count(),
            mappings = self.mapper.entries().len(),
            warnings = warnings.len(),
            "generated python"
        );
        Ok(GeneratedPython {
            code: std::mem::take(&mut self.output),
            source_map,
            warnings,
        })
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn emit_header(&mut self) -> Result<()> {
        if !self.options.header {
            return Ok(());
        }
        let mut header = String::from("# Auto-generated from Sona source code\n");
        if let Some(module) = &self.options.runtime_module {
            writeln!(header, "from {module} import *")?;
        }
        header.push('\n');
        self.push_text(&header);
        Ok(())
    }

    /// Columns of indentation at the current level.
    fn indent_columns(&self) -> usize {
        self.indent * self.options.indent_width
    }

    fn push_text(&mut self, text: &str) {
        self.output.push_str(text);
        if self.options.source_maps {
            self.mapper.advance(text);
        }
    }

    /// Writes one line at the current indentation. When `origin` is given,
    /// a mapping from the first non-blank column to the node's source
    /// position is recorded first.
    fn write_line(&mut self, text: &str, origin: Option<(&NodeMeta, Option<&str>)>) {
        let indent = " ".repeat(self.indent_columns());
        self.push_text(&indent);
        if let (Some((meta, name)), Some(file)) = (origin, self.file) {
            if self.options.source_maps {
                self.mapper.record(meta.line(), meta.column(), file, name);
            }
        }
        self.push_text(text);
        self.push_text("\n");
    }

    /// Renders `doc` as one logical line at the current indentation.
    fn write_doc(&mut self, doc: &Document<'_>, origin: Option<(&NodeMeta, Option<&str>)>) {
        let width = self.options.line_width;
        let indent = isize::try_from(self.indent_columns()).unwrap_or(isize::MAX);
        let text = doc.render(width, indent);
        self.write_line(&text, origin);
    }

    fn blank_line(&mut self) {
        self.push_text("\n");
    }

    // ========================================================================
    // Scope helpers
    // ========================================================================

    /// Defers every name `expr` reads that is not bound yet.
    fn note_reads(&mut self, expr: &Expression) {
        let scope = &mut self.scope;
        let sites = &mut self.deferred_sites;
        walk_expression(expr, &mut |node| {
            if let Expression::Identifier(identifier) = node {
                if scope.lookup(&identifier.name).is_none() {
                    scope.defer(&identifier.name, identifier.meta.span);
                    sites
                        .entry(identifier.meta.span)
                        .or_insert(identifier.meta.position);
                }
            }
        });
    }

    /// Collects every Python name the program can produce.
    fn reserve_names(&mut self, program: &Program) {
        let reserved = &mut self.reserved;
        reserved.extend(BUILTIN_FUNCTIONS.iter().map(|&name| EcoString::from(name)));
        reserved.extend(BUILTIN_CONSTANTS.iter().map(|&(_, host)| EcoString::from(host)));
        walk_binding_names(program, &mut |name| {
            reserved.insert(python_name(&name.name));
        });
        walk_program(program, &mut |expr| {
            if let Expression::Identifier(identifier) = expr {
                reserved.insert(python_name(&identifier.name));
            }
        });
    }

    /// The Python name for a new binding of `name` in the current frame.
    ///
    /// Python has no block scope, and a function's locals cover the whole
    /// function body. A binding that shadows a visible name therefore gets a
    /// fresh Python name when the shadowed binding lives in the same Python
    /// namespace, or when the enclosing function also uses the outer name.
    /// Class attributes keep their names.
    fn binding_name(&mut self, name: &str) -> EcoString {
        let host = python_name(name);
        if self.scope.is_class_scope() {
            return host;
        }
        let Some(depth) = self.scope.defining_depth(name) else {
            return host;
        };
        let same_namespace = depth >= self.scope.namespace_depth();
        let used_outside = self
            .outer_references
            .last()
            .is_some_and(|names| names.contains(name));
        if same_namespace || used_outside {
            self.fresh_name(&host)
        } else {
            host
        }
    }

    /// `base_1`, `base_2`, ...: the first one not in use.
    fn fresh_name(&mut self, base: &str) -> EcoString {
        let mut suffix = 1usize;
        loop {
            let candidate = EcoString::from(format!("{base}_{suffix}"));
            if self.reserved.insert(candidate.clone()) {
                debug!(%base, renamed = %candidate, "renamed shadowing binding");
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Pops the current frame; `meta` locates any error.
    fn pop_scope(&mut self, meta: &NodeMeta) -> Result<()> {
        self.scope
            .pop()
            .map_err(|kind| CodeGenError::scope(kind, meta))
    }

    /// One warning per name that was read but never bound.
    fn unresolved_warnings(&mut self) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();
        for reference in self.scope.unresolved_references() {
            if let Ok(Resolution::Bound(_)) = self.scope.resolve(&reference.name) {
                continue;
            }
            let span = reference.sites.first().copied().unwrap_or_default();
            let position = self
                .deferred_sites
                .get(&span)
                .copied()
                .unwrap_or_default();
            let uses = reference.sites.len();
            warnings.push(
                Diagnostic::warning(
                    format!("`{}` is never defined in this program", reference.name),
                    span,
                    position,
                )
                .with_hint(format!(
                    "the runtime must provide it ({uses} use{})",
                    if uses == 1 { "" } else { "s" }
                )),
            );
        }
        warnings
    }
}

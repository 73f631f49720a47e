// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Sona transpiler core.
//!
//! This crate contains the whole Sona to Python pipeline:
//! - Lexical analysis (tokenization)
//! - Parsing (concrete syntax tree, then AST)
//! - Scope resolution (bindings, constants, deferred references)
//! - Code generation (Python source with a source map)
//!
//! Each request runs the phases in order and stops at the first error.

#![doc = include_str!("../../../README.md")]

pub mod ast;
pub mod ast_builder;
pub mod ast_walker;
pub mod codegen;
pub mod semantic_analysis;
pub mod source_analysis;
pub mod source_map;
pub mod transpiler;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Expression, Identifier, Literal, Program, Statement};
    pub use crate::codegen::python::CodegenOptions;
    pub use crate::source_analysis::{Position, Span};
    pub use crate::source_map::SourceMap;
    pub use crate::transpiler::{transpile, TranspileError, TranspileOutput, Transpiler};
}

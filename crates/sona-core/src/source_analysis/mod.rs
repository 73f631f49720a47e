// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tokenizing and parsing for Sona source code.
//!
//! **DDD Context:** Source Analysis
//!
//! This module contains the lexer, the grammar parser and the concrete parse
//! tree they produce.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s. Each token
//! carries its byte [`Span`] and its 1-based line/column [`Position`].
//!
//! ```
//! use sona_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("x + 1").collect::<Result<_, _>>().unwrap();
//! assert_eq!(tokens.len(), 3); // x, +, 1
//! ```
//!
//! The keyword table ([`KEYWORDS`]) is generated at build time from the
//! keyword declarations in `grammar/sona.ebnf`.
//!
//! # Parsing
//!
//! The [`parse`] function turns tokens into a [`SyntaxNode`] tree following
//! the grammar. Binary operator precedence uses Pratt parsing (see the
//! `parser` module for the binding power table).
//!
//! # Error Handling
//!
//! Both phases fail fast. [`LexError`] and [`ParseError`] implement
//! [`miette::Diagnostic`] with a label under the offending span.

mod diagnostic;
mod error;
mod lexer;
mod parser;
mod span;
mod syntax;
mod token;


pub use diagnostic::{Diagnostic, Severity};
pub use error::{LexError, LexErrorKind, ParseError, ParseErrorKind};
pub use lexer::{tokenize, Lexer, KEYWORDS};
pub use parser::{parse, MAX_NESTING_DEPTH};
pub use span::{Position, Span};
pub use syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
pub use token::{Token, TokenKind};

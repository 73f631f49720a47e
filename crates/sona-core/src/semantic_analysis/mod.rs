// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis for Sona.
//!
//! **DDD Context:** Semantic Analysis
//!
//! Sona has no separate analysis pass: the code generator consults a
//! [`ScopeStack`] while it walks the AST, defining names as declarations are
//! emitted and checking re-assignments and reads against the chain.
//!
//! ```
//! use sona_core::semantic_analysis::{Binding, BindingKind, ScopeError, ScopeStack};
//! use sona_core::source_analysis::Span;
//!
//! let mut scope = ScopeStack::new();
//! let binding = Binding::new(BindingKind::Variable, Span::new(4, 5), "x");
//! scope.define("x", binding.clone(), false, None).unwrap();
//! assert_eq!(
//!     scope.define("x", binding, false, None),
//!     Err(ScopeError::DuplicateBinding { name: "x".into() })
//! );
//! ```

pub mod error;
pub mod scope;


pub use error::{ScopeError, SemanticError};
pub use scope::{
    Binding, BindingKind, DeferredReference, FrameKind, Resolution, ScopeStack,
    UnresolvedReference, DEFERRED_RETRY_BUDGET,
};

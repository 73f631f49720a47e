// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical scope tracking for code generation.
//!
//! Scopes form a stack of frames. Each frame's parent is the frame below it,
//! so a parent always outlives its children:
//! - Global (level 0, seeded with built-in names)
//! - Function / Class (one per definition)
//! - Block (bare blocks and the bodies of `if`, `while`, `for` and `try`)
//!
//! **DDD Context:** Semantic Analysis
//!
//! This module implements the `Binding` value object and the deferred
//! reference table used for names read before they are bound.

use std::collections::HashMap;

use ecow::EcoString;
use tracing::trace;

use super::ScopeError;
use crate::source_analysis::Span;

/// Number of [`ScopeStack::resolve`] attempts a deferred name gets. The
/// attempt that reaches the budget fails with
/// [`ScopeError::UnresolvedDeferred`].
pub const DEFERRED_RETRY_BUDGET: u32 = 3;

/// Built-in functions provided by the runtime.
pub const BUILTIN_FUNCTIONS: &[&str] = &["print", "len", "str", "int", "float", "bool", "type", "range"];

/// Built-in constants and their Python spelling.
pub const BUILTIN_CONSTANTS: &[(&str, &str)] = &[
    ("true", "True"),
    ("false", "False"),
    ("null", "None"),
    ("PI", "PI"),
    ("E", "E"),
];

/// `PI` as supplied by the runtime.
pub const PI: f64 = std::f64::consts::PI;

/// `E` as supplied by the runtime.
pub const E: f64 = std::f64::consts::E;

/// The kind of frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// The root frame.
    Global,
    /// A function or method body.
    Function,
    /// A class body.
    Class,
    /// Any other `{ ... }` body.
    Block,
}

impl FrameKind {
    /// Returns `true` for frames that are their own Python namespace.
    ///
    /// Python has no block scope, so a Sona block shares the namespace of
    /// the nearest enclosing global, function or class frame.
    #[must_use]
    pub const fn is_namespace(self) -> bool {
        !matches!(self, Self::Block)
    }
}

/// The kind of binding in a scope.
///
/// **DDD Context:** Semantic Analysis - Value Object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Seeded by the runtime.
    Builtin,
    /// `let` declaration.
    Variable,
    /// `const` declaration.
    Constant,
    /// Function parameter.
    Parameter,
    /// Function or method name.
    Function,
    /// Class name.
    Class,
    /// Name introduced by `import` or `from ... import`.
    Import,
    /// `for` loop variable.
    LoopVariable,
    /// `catch (e)` variable.
    CatchVariable,
    /// The implicit `self` of a method.
    Receiver,
}

/// A binding in a scope.
///
/// **DDD Context:** Semantic Analysis - Value Object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// What introduced the name.
    pub kind: BindingKind,
    /// Source location of the definition; empty for built-ins.
    pub defined_at: Span,
    /// How the name is spelled in generated Python.
    pub host_name: EcoString,
}

impl Binding {
    /// Creates a binding.
    #[must_use]
    pub fn new(kind: BindingKind, defined_at: Span, host_name: impl Into<EcoString>) -> Self {
        Self {
            kind,
            defined_at,
            host_name: host_name.into(),
        }
    }
}

/// Outcome of [`ScopeStack::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The name is bound in the scope chain.
    Bound(Binding),
    /// The name is not bound yet but was deferred; `attempts` counts the
    /// resolutions tried so far, including this one.
    Deferred {
        /// Attempts so far.
        attempts: u32,
    },
}

/// A name read before it was bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredReference {
    /// Every place the name was read, in order.
    pub sites: Vec<Span>,
    /// Resolution attempts so far.
    pub attempts: u32,
}

/// A deferred name that is still unbound, as reported by
/// [`ScopeStack::unresolved_references`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// The name.
    pub name: EcoString,
    /// Where it was read.
    pub sites: Vec<Span>,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    name: EcoString,
    level: usize,
    /// Bindings in definition order.
    bindings: Vec<(EcoString, Binding)>,
    slots: HashMap<EcoString, usize>,
    constants: Vec<EcoString>,
    type_hints: HashMap<EcoString, EcoString>,
    modified: Vec<EcoString>,
    deferred: Vec<(EcoString, DeferredReference)>,
}

impl Frame {
    fn new(kind: FrameKind, name: EcoString, level: usize) -> Self {
        Self {
            kind,
            name,
            level,
            bindings: Vec::new(),
            slots: HashMap::new(),
            constants: Vec::new(),
            type_hints: HashMap::new(),
            modified: Vec::new(),
            deferred: Vec::new(),
        }
    }

    fn get(&self, name: &str) -> Option<&Binding> {
        self.slots.get(name).map(|&slot| &self.bindings[slot].1)
    }

    fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    fn deferred_mut(&mut self, name: &str) -> Option<&mut DeferredReference> {
        self.deferred
            .iter_mut()
            .find(|(deferred, _)| deferred == name)
            .map(|(_, reference)| reference)
    }
}

/// Tracks bindings across nested lexical scopes.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    /// Never empty: index 0 is the global frame.
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// Creates a scope stack holding only the global frame, seeded with
    /// built-in functions and constants.
    #[must_use]
    pub fn new() -> Self {
        let mut global = Frame::new(FrameKind::Global, "global".into(), 0);
        let builtins = BUILTIN_FUNCTIONS
            .iter()
            .map(|&name| (name, name))
            .chain(BUILTIN_CONSTANTS.iter().copied());
        for (name, host_name) in builtins {
            let name = EcoString::from(name);
            global.slots.insert(name.clone(), global.bindings.len());
            global.constants.push(name.clone());
            global.bindings.push((
                name,
                Binding::new(BindingKind::Builtin, Span::default(), host_name),
            ));
        }
        Self {
            frames: vec![global],
        }
    }

    fn current(&self) -> &Frame {
        let index = self.frames.len() - 1;
        &self.frames[index]
    }

    fn current_mut(&mut self) -> &mut Frame {
        let index = self.frames.len() - 1;
        &mut self.frames[index]
    }

    /// Index of the innermost visible frame binding `name`.
    ///
    /// A class body is not an enclosing scope of its methods, so class
    /// frames below a function frame are skipped.
    fn defining_index(&self, name: &str) -> Option<usize> {
        let mut in_function = false;
        for (index, frame) in self.frames.iter().enumerate().rev() {
            let hidden = in_function && frame.kind == FrameKind::Class;
            if !hidden && frame.contains(name) {
                return Some(index);
            }
            in_function |= frame.kind == FrameKind::Function;
        }
        None
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Enters a new frame.
    pub fn push(&mut self, kind: FrameKind, name: impl Into<EcoString>) {
        let level = self.current().level + 1;
        let name = name.into();
        trace!(?kind, %name, level, "push scope");
        self.frames.push(Frame::new(kind, name, level));
    }

    /// Leaves the current frame.
    ///
    /// Deferred names that the popped frame never bound move to the parent,
    /// since an enclosing scope may still bind them. A class frame passes on
    /// all of them: its own names never satisfy a read from a method.
    ///
    /// # Errors
    ///
    /// [`ScopeError::RootFramePop`] if only the global frame is left.
    pub fn pop(&mut self) -> Result<(), ScopeError> {
        if self.frames.len() == 1 {
            return Err(ScopeError::RootFramePop);
        }
        let Some(frame) = self.frames.pop() else {
            return Err(ScopeError::RootFramePop);
        };
        trace!(kind = ?frame.kind, name = %frame.name, level = frame.level, "pop scope");

        for (name, reference) in frame.deferred {
            if frame.kind != FrameKind::Class && frame.slots.contains_key(&name) {
                continue;
            }
            let parent = self.current_mut();
            match parent.deferred_mut(&name) {
                Some(existing) => {
                    existing.sites.extend(reference.sites);
                    existing.attempts = existing.attempts.max(reference.attempts);
                }
                None => parent.deferred.push((name, reference)),
            }
        }
        Ok(())
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    /// Binds `name` in the current frame.
    ///
    /// # Errors
    ///
    /// [`ScopeError::DuplicateBinding`] if the current frame already binds
    /// `name`. Outer bindings may be shadowed.
    pub fn define(
        &mut self,
        name: &str,
        binding: Binding,
        is_constant: bool,
        type_hint: Option<&str>,
    ) -> Result<(), ScopeError> {
        let frame = self.current_mut();
        if frame.contains(name) {
            return Err(ScopeError::DuplicateBinding { name: name.into() });
        }
        let name = EcoString::from(name);
        frame.slots.insert(name.clone(), frame.bindings.len());
        if is_constant {
            frame.constants.push(name.clone());
        }
        if let Some(hint) = type_hint {
            frame.type_hints.insert(name.clone(), hint.into());
        }
        frame.bindings.push((name, binding));
        Ok(())
    }

    /// Records an update of an existing binding.
    ///
    /// # Errors
    ///
    /// [`ScopeError::UndefinedName`] if no frame binds `name`,
    /// [`ScopeError::ConstAssignment`] if the binding is constant.
    pub fn assign(&mut self, name: &str) -> Result<(), ScopeError> {
        let Some(index) = self.defining_index(name) else {
            return Err(ScopeError::UndefinedName { name: name.into() });
        };
        let frame = &mut self.frames[index];
        if frame.constants.iter().any(|constant| constant == name) {
            return Err(ScopeError::ConstAssignment { name: name.into() });
        }
        if !frame.modified.iter().any(|modified| modified == name) {
            frame.modified.push(name.into());
        }
        Ok(())
    }

    /// Resolves a name read.
    ///
    /// A bound name resolves to its innermost binding and leaves the stack
    /// unchanged. An unbound name that was [deferred](Self::defer) uses up
    /// one attempt of its [`DEFERRED_RETRY_BUDGET`].
    ///
    /// # Errors
    ///
    /// [`ScopeError::UnresolvedDeferred`] on the attempt that exhausts the
    /// budget, [`ScopeError::UndefinedName`] for names never deferred.
    pub fn resolve(&mut self, name: &str) -> Result<Resolution, ScopeError> {
        if let Some(binding) = self.lookup(name) {
            return Ok(Resolution::Bound(binding.clone()));
        }
        let reference = self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.deferred_mut(name));
        let Some(reference) = reference else {
            return Err(ScopeError::UndefinedName { name: name.into() });
        };
        reference.attempts += 1;
        if reference.attempts >= DEFERRED_RETRY_BUDGET {
            return Err(ScopeError::UnresolvedDeferred {
                name: name.into(),
                attempts: reference.attempts,
            });
        }
        Ok(Resolution::Deferred {
            attempts: reference.attempts,
        })
    }

    /// Records a read of `name` at `site` before `name` is bound.
    pub fn defer(&mut self, name: &str, site: Span) {
        let frame = self.current_mut();
        match frame.deferred_mut(name) {
            Some(reference) => reference.sites.push(site),
            None => frame.deferred.push((
                name.into(),
                DeferredReference {
                    sites: vec![site],
                    attempts: 0,
                },
            )),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The innermost visible binding of `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.defining_index(name)
            .and_then(|index| self.frames[index].get(name))
    }

    /// The binding of `name` in the current frame only.
    #[must_use]
    pub fn lookup_local(&self, name: &str) -> Option<&Binding> {
        self.current().get(name)
    }

    /// Returns `true` if the innermost binding of `name` is constant.
    #[must_use]
    pub fn is_constant(&self, name: &str) -> bool {
        self.defining_index(name)
            .is_some_and(|index| self.frames[index].constants.iter().any(|c| c == name))
    }

    /// The type hint recorded with the innermost binding of `name`.
    #[must_use]
    pub fn type_hint(&self, name: &str) -> Option<&str> {
        let index = self.defining_index(name)?;
        self.frames[index].type_hints.get(name).map(EcoString::as_str)
    }

    /// Number of frames above the global frame.
    #[must_use]
    pub fn current_depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Scope level of the current frame (global is 0).
    #[must_use]
    pub fn scope_level(&self) -> usize {
        self.current().level
    }

    /// Kind of the current frame.
    #[must_use]
    pub fn current_kind(&self) -> FrameKind {
        self.current().kind
    }

    /// Name of the current frame.
    #[must_use]
    pub fn current_name(&self) -> &str {
        &self.current().name
    }

    /// Kind of the innermost frame binding `name`.
    #[must_use]
    pub fn defining_frame_kind(&self, name: &str) -> Option<FrameKind> {
        self.defining_index(name).map(|index| self.frames[index].kind)
    }

    /// Depth of the innermost frame binding `name` (global is 0).
    #[must_use]
    pub fn defining_depth(&self, name: &str) -> Option<usize> {
        self.defining_index(name)
    }

    /// Kind of the Python namespace that owns the frame at `depth`: the
    /// nearest frame at or below it that is not a block.
    #[must_use]
    pub fn namespace_kind(&self, depth: usize) -> FrameKind {
        self.frames[..=depth.min(self.current_depth())]
            .iter()
            .rev()
            .map(|frame| frame.kind)
            .find(|kind| kind.is_namespace())
            .unwrap_or(FrameKind::Global)
    }

    /// Depth of the frame that owns the current Python namespace: the
    /// innermost frame that is not a block.
    #[must_use]
    pub fn namespace_depth(&self) -> usize {
        self.frames
            .iter()
            .rposition(|frame| frame.kind.is_namespace())
            .unwrap_or(0)
    }

    /// Depth of the innermost function frame, if any.
    #[must_use]
    pub fn function_depth(&self) -> Option<usize> {
        self.frames
            .iter()
            .rposition(|frame| frame.kind == FrameKind::Function)
    }

    /// Returns `true` if the current frame is a function body.
    #[must_use]
    pub fn is_function_scope(&self) -> bool {
        self.current_kind() == FrameKind::Function
    }

    /// Returns `true` if the current frame is a class body.
    #[must_use]
    pub fn is_class_scope(&self) -> bool {
        self.current_kind() == FrameKind::Class
    }

    /// Names of the current frame's bindings that were re-assigned, in
    /// first-assignment order.
    pub fn modified_in_current_frame(&self) -> impl Iterator<Item = &str> {
        self.current().modified.iter().map(EcoString::as_str)
    }

    /// Deferred names that are still unbound in every frame of the chain.
    #[must_use]
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        self.frames
            .iter()
            .flat_map(|frame| frame.deferred.iter())
            .filter(|(name, _)| self.lookup(name).is_none())
            .map(|(name, reference)| UnresolvedReference {
                name: name.clone(),
                sites: reference.sites.clone(),
            })
            .collect()
    }

    /// Bindings of the current frame in definition order.
    pub fn current_bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.current()
            .bindings
            .iter()
            .map(|(name, binding)| (name.as_str(), binding))
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Function and class definitions.
//!
//! **DDD Context:** Compilation - Code Generation
//!
//! Function and class names are hoisted: [`PythonGenerator::hoist_definitions`]
//! binds every definition of a statement list in the current frame before
//! the list is emitted, so a call may precede the definition it targets.
//!
//! Python decides per function which names are local: any name assigned in
//! the body is local unless declared `global` or `nonlocal`. Sona assigns to
//! the binding found by lexical lookup, so a function that re-assigns an
//! outer name gets the matching declaration as its first body line. Before a
//! body is emitted, [`OuterReferences`] scans it for the names it uses from
//! outside; a local binding that would capture one of them is renamed.

use std::collections::HashSet;

use ecow::EcoString;

use super::util::python_name;
use super::{CodeGenError, PythonGenerator, Result};
use crate::ast::{
    AssignMode, AssignTarget, ClassDef, ElseBranch, Expression, FunctionDef, IfStatement,
    ImportKind, Statement,
};
use crate::ast_walker::walk_expression;
use crate::docvec;
use crate::semantic_analysis::{Binding, BindingKind, FrameKind};

/// Python's name for a Sona constructor.
const CONSTRUCTOR: &str = "__init__";

/// The receiver parameter of a method.
const RECEIVER: &str = "self";

impl PythonGenerator {
    /// Binds the function and class names of `statements` in the current
    /// frame.
    pub(super) fn hoist_definitions(&mut self, statements: &[Statement]) -> Result<()> {
        let in_class = self.scope.is_class_scope();
        for statement in statements {
            match statement {
                Statement::FunctionDef(def) => {
                    let host = if in_class {
                        function_host_name(&def.name.name, true)
                    } else {
                        self.binding_name(&def.name.name)
                    };
                    self.scope
                        .define(
                            &def.name.name,
                            Binding::new(BindingKind::Function, def.name.meta.span, host),
                            false,
                            def.return_type.as_ref().map(|hint| hint.name.as_str()),
                        )
                        .map_err(|error| CodeGenError::scope(error, &def.name.meta))?;
                }
                Statement::Class(class) => {
                    let host = self.binding_name(&class.name.name);
                    self.scope
                        .define(
                            &class.name.name,
                            Binding::new(BindingKind::Class, class.name.meta.span, host),
                            false,
                            None,
                        )
                        .map_err(|error| CodeGenError::scope(error, &class.name.meta))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `def name(params):` followed by the body and a blank line. Inside a
    /// class body the function is a method and gets a `self` parameter.
    pub(super) fn emit_function(&mut self, def: &FunctionDef) -> Result<()> {
        let meta = &def.meta;
        let is_method = self.scope.is_class_scope();
        let host = self
            .scope
            .lookup(&def.name.name)
            .map_or_else(
                || function_host_name(&def.name.name, is_method),
                |binding| binding.host_name.clone(),
            );

        // Defaults are evaluated where the function is defined.
        let mut seen_default = false;
        let mut defaults = Vec::with_capacity(def.parameters.len());
        for parameter in &def.parameters {
            match &parameter.default {
                Some(default) => {
                    seen_default = true;
                    self.note_reads(default);
                    defaults.push(Some(self.expression_doc(default)));
                }
                None if seen_default => {
                    return Err(CodeGenError::no_mapping(
                        "parameter",
                        format!(
                            "`{}` has no default but follows a parameter with one",
                            parameter.name.name
                        ),
                        &parameter.name.meta,
                    ));
                }
                None => defaults.push(None),
            }
        }

        self.scope.push(FrameKind::Function, def.name.name.clone());
        let mut parameters = Vec::with_capacity(def.parameters.len() + 1);
        if is_method {
            self.scope
                .define(
                    RECEIVER,
                    Binding::new(BindingKind::Receiver, def.name.meta.span, RECEIVER),
                    false,
                    None,
                )
                .map_err(|error| CodeGenError::scope(error, &def.name.meta))?;
            parameters.push(docvec![RECEIVER]);
        }
        for (parameter, default) in def.parameters.iter().zip(defaults) {
            let name = python_name(&parameter.name.name);
            self.scope
                .define(
                    &parameter.name.name,
                    Binding::new(BindingKind::Parameter, parameter.name.meta.span, name.clone()),
                    false,
                    parameter.type_hint.as_ref().map(|hint| hint.name.as_str()),
                )
                .map_err(|error| CodeGenError::scope(error, &parameter.name.meta))?;
            parameters.push(match default {
                Some(default) => docvec![name, "=", default],
                None => docvec![name],
            });
        }

        let signature = docvec!["def ", host, self.bracketed("(", parameters, ")"), ":"];
        self.write_doc(&signature, Some((meta, Some(def.name.name.as_str()))));

        let references = OuterReferences::of_function(def, is_method);
        self.indent += 1;
        self.emit_outer_declarations(&references.reassigned);
        self.indent -= 1;
        self.outer_references.push(references.names);
        let body = self.emit_suite(&def.body);
        self.outer_references.pop();
        body?;
        self.pop_scope(meta)?;
        self.blank_line();
        Ok(())
    }

    /// `class Name:` followed by the body and a blank line.
    pub(super) fn emit_class(&mut self, class: &ClassDef) -> Result<()> {
        let meta = &class.meta;
        let host = self
            .scope
            .lookup(&class.name.name)
            .map_or_else(|| python_name(&class.name.name), |b| b.host_name.clone());
        let header = format!("class {host}:");
        self.write_line(&header, Some((meta, Some(class.name.name.as_str()))));

        self.scope.push(FrameKind::Class, class.name.name.clone());
        self.emit_suite(&class.body)?;
        self.pop_scope(meta)?;
        self.blank_line();
        Ok(())
    }

    /// Emits `global`/`nonlocal` lines for the outer names in
    /// `reassigned`. Called with the function frame current.
    fn emit_outer_declarations(&mut self, reassigned: &[EcoString]) {
        let Some(function_depth) = self.scope.function_depth() else {
            return;
        };
        let mut globals = Vec::new();
        let mut nonlocals = Vec::new();
        for name in reassigned {
            let Some(depth) = self.scope.defining_depth(name) else {
                continue;
            };
            if depth >= function_depth {
                continue;
            }
            let host = self
                .scope
                .lookup(name)
                .map_or_else(|| python_name(name), |b| b.host_name.clone());
            match self.scope.namespace_kind(depth) {
                FrameKind::Global => globals.push(host),
                FrameKind::Function => nonlocals.push(host),
                FrameKind::Class | FrameKind::Block => {}
            }
        }

        if !globals.is_empty() {
            self.write_line(&format!("global {}", globals.join(", ")), None);
        }
        if !nonlocals.is_empty() {
            self.write_line(&format!("nonlocal {}", nonlocals.join(", ")), None);
        }
    }
}

/// The Python name of a function; `init` in a class body is the constructor.
fn function_host_name(name: &str, in_class: bool) -> EcoString {
    if in_class && name == "init" {
        CONSTRUCTOR.into()
    } else {
        python_name(name)
    }
}

/// Names a function body uses without binding them first.
#[derive(Debug, Default)]
struct OuterReferences {
    /// Re-assigned by the body itself, in first-assignment order. Nested
    /// functions declare their own.
    reassigned: Vec<EcoString>,
    /// Read or re-assigned anywhere in the body, nested functions included.
    names: HashSet<EcoString>,
}

impl OuterReferences {
    /// Scans `def` the way the generator will emit it: statement lists in
    /// order, hoisted definitions first, one frame per body.
    fn of_function(def: &FunctionDef, is_method: bool) -> Self {
        let mut scan = ReferenceScan::default();
        let parameters = def.parameters.iter().map(|p| p.name.name.clone());
        let receiver = is_method.then(|| EcoString::from(RECEIVER));
        scan.frame(FrameKind::Function, parameters.chain(receiver), &def.body);
        scan.references
    }
}

#[derive(Debug, Default)]
struct ReferenceScan {
    frames: Vec<(FrameKind, HashSet<EcoString>)>,
    /// Functions entered below the scanned one.
    nested: usize,
    references: OuterReferences,
}

impl ReferenceScan {
    /// Mirrors [`ScopeStack::lookup`](crate::semantic_analysis::ScopeStack::lookup):
    /// class frames are hidden from the functions inside them.
    fn is_bound(&self, name: &str) -> bool {
        let mut in_function = false;
        for (kind, names) in self.frames.iter().rev() {
            if !(in_function && *kind == FrameKind::Class) && names.contains(name) {
                return true;
            }
            in_function |= *kind == FrameKind::Function;
        }
        false
    }

    fn bind(&mut self, name: &EcoString) {
        if let Some((_, names)) = self.frames.last_mut() {
            names.insert(name.clone());
        }
    }

    fn read(&mut self, expr: &Expression) {
        let mut unbound = Vec::new();
        walk_expression(expr, &mut |node| {
            if let Expression::Identifier(identifier) = node {
                if !self.is_bound(&identifier.name) {
                    unbound.push(identifier.name.clone());
                }
            }
        });
        self.references.names.extend(unbound);
    }

    fn frame(
        &mut self,
        kind: FrameKind,
        bound: impl IntoIterator<Item = EcoString>,
        statements: &[Statement],
    ) {
        self.frames.push((kind, bound.into_iter().collect()));
        for statement in statements {
            match statement {
                Statement::FunctionDef(FunctionDef { name, .. })
                | Statement::Class(ClassDef { name, .. }) => self.bind(&name.name),
                _ => {}
            }
        }
        for statement in statements {
            self.statement(statement);
        }
        self.frames.pop();
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Assignment(assignment) => {
                match &assignment.target {
                    AssignTarget::Name(_) => {}
                    AssignTarget::Property { object, .. } => self.read(object),
                    AssignTarget::Index { object, index } => {
                        self.read(object);
                        self.read(index);
                    }
                }
                self.read(&assignment.value);
                if let AssignTarget::Name(name) = &assignment.target {
                    match assignment.mode {
                        AssignMode::Declare { .. } => self.bind(&name.name),
                        AssignMode::Reassign => self.reassign(&name.name),
                    }
                }
            }
            Statement::Expression { expression, .. } => self.read(expression),
            Statement::Print { arguments, .. } => arguments.iter().for_each(|arg| self.read(arg)),
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.read(value);
                }
            }
            Statement::If(if_stmt) => self.if_statement(if_stmt),
            Statement::While {
                condition, body, ..
            } => {
                self.read(condition);
                self.frame(FrameKind::Block, [], body);
            }
            Statement::For {
                variable,
                iterable,
                body,
                ..
            } => {
                self.read(iterable);
                self.frame(FrameKind::Block, [variable.name.clone()], body);
            }
            Statement::Block { body, .. } => self.frame(FrameKind::Block, [], body),
            Statement::Try(try_stmt) => {
                self.frame(FrameKind::Block, [], &try_stmt.body);
                let binding = try_stmt.binding.iter().map(|b| b.name.clone());
                self.frame(FrameKind::Block, binding, &try_stmt.handler);
            }
            Statement::FunctionDef(def) => {
                for default in def.parameters.iter().filter_map(|p| p.default.as_ref()) {
                    self.read(default);
                }
                let in_class = self
                    .frames
                    .last()
                    .is_some_and(|(kind, _)| *kind == FrameKind::Class);
                let parameters = def.parameters.iter().map(|p| p.name.name.clone());
                let receiver = in_class.then(|| EcoString::from(RECEIVER));
                self.nested += 1;
                self.frame(FrameKind::Function, parameters.chain(receiver), &def.body);
                self.nested -= 1;
            }
            Statement::Class(class) => self.frame(FrameKind::Class, [], &class.body),
            Statement::Import(import) => match &import.kind {
                ImportKind::Module { alias: Some(alias) } => self.bind(&alias.name),
                ImportKind::Module { alias: None } => {
                    if let Some(root) = import.path.first() {
                        self.bind(&root.name);
                    }
                }
                ImportKind::Names(names) => {
                    for name in names {
                        self.bind(&name.name);
                    }
                }
            },
            Statement::Break { .. } | Statement::Continue { .. } => {}
        }
    }

    fn reassign(&mut self, name: &EcoString) {
        if self.is_bound(name) {
            return;
        }
        self.references.names.insert(name.clone());
        if self.nested == 0 && !self.references.reassigned.contains(name) {
            self.references.reassigned.push(name.clone());
        }
    }

    fn if_statement(&mut self, if_stmt: &IfStatement) {
        self.read(&if_stmt.condition);
        self.frame(FrameKind::Block, [], &if_stmt.then_branch);
        match &if_stmt.else_branch {
            Some(ElseBranch::Block(body)) => self.frame(FrameKind::Block, [], body),
            Some(ElseBranch::If(nested)) => self.if_statement(nested),
            None => {}
        }
    }
}

// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement emission.
//!
//! **DDD Context:** Compilation - Code Generation
//!
//! Each statement becomes one header line (rendered from a [`Document`]) and,
//! for compound statements, an indented suite. Sona blocks have their own
//! scope frame but Python has no block scope, so a bare `{ ... }` emits its
//! statements at the current indentation.

use super::document::Document;
use super::util::python_name;
use super::{CodeGenError, PythonGenerator, Result};
use crate::ast::{
    AssignMode, AssignTarget, Assignment, ElseBranch, Expression, IfStatement, Import, ImportKind,
    NodeKind, NodeMeta, Statement, TryStatement,
};
use crate::docvec;
use crate::semantic_analysis::{Binding, BindingKind, FrameKind};

impl PythonGenerator {
    /// Emits a statement list: hoists its function and class names into the
    /// current frame, then emits each statement in order.
    pub(super) fn emit_statements(&mut self, statements: &[Statement]) -> Result<()> {
        self.hoist_definitions(statements)?;
        for statement in statements {
            self.emit_statement(statement)?;
        }
        Ok(())
    }

    /// Emits `statements` as an indented suite, emitting `pass` when they
    /// produce no lines. The caller pushes and pops the frame.
    pub(super) fn emit_suite(&mut self, statements: &[Statement]) -> Result<()> {
        self.indent += 1;
        let before = self.output.len();
        self.emit_statements(statements)?;
        if self.output.len() == before {
            self.write_line("pass", None);
        }
        self.indent -= 1;
        Ok(())
    }

    /// Emits a suite in a fresh block frame.
    fn emit_block_suite(
        &mut self,
        statements: &[Statement],
        frame_name: &str,
        meta: &NodeMeta,
    ) -> Result<()> {
        self.scope.push(FrameKind::Block, frame_name);
        self.emit_suite(statements)?;
        self.pop_scope(meta)
    }

    fn emit_statement(&mut self, statement: &Statement) -> Result<()> {
        if self.scope.is_class_scope() && !allowed_in_class_body(statement) {
            return Err(CodeGenError::no_mapping(
                construct_name(statement.node_kind()),
                "a class body may only contain methods and field declarations",
                statement.meta(),
            ));
        }

        match statement {
            Statement::Assignment(assignment) => self.emit_assignment(assignment),
            Statement::Expression { expression, meta } => {
                self.note_reads(expression);
                let doc = self.expression_doc(expression);
                self.write_doc(&doc, Some((meta, None)));
                Ok(())
            }
            Statement::Print { arguments, meta } => {
                for argument in arguments {
                    self.note_reads(argument);
                }
                let doc = docvec!["print", self.arguments_doc(arguments)];
                self.write_doc(&doc, Some((meta, None)));
                Ok(())
            }
            Statement::If(if_stmt) => self.emit_if(if_stmt, "if"),
            Statement::While {
                condition,
                body,
                meta,
            } => {
                self.note_reads(condition);
                let doc = docvec!["while ", self.expression_doc(condition), ":"];
                self.write_doc(&doc, Some((meta, None)));
                self.emit_block_suite(body, "while", meta)
            }
            Statement::For {
                variable,
                iterable,
                body,
                meta,
            } => {
                self.note_reads(iterable);
                let iterable = self.expression_doc(iterable);

                self.scope.push(FrameKind::Block, "for");
                let host = self.binding_name(&variable.name);
                let doc = docvec!["for ", host.clone(), " in ", iterable, ":"];
                self.write_doc(&doc, Some((meta, Some(variable.name.as_str()))));
                self.scope
                    .define(
                        &variable.name,
                        Binding::new(BindingKind::LoopVariable, variable.meta.span, host),
                        false,
                        None,
                    )
                    .map_err(|kind| CodeGenError::scope(kind, &variable.meta))?;
                self.emit_suite(body)?;
                self.pop_scope(meta)
            }
            Statement::FunctionDef(def) => self.emit_function(def),
            Statement::Return { value, meta } => self.emit_return(value.as_ref(), meta),
            Statement::Break { meta } => self.emit_loop_jump("break", meta),
            Statement::Continue { meta } => self.emit_loop_jump("continue", meta),
            Statement::Import(import) => self.emit_import(import),
            Statement::Block { body, meta } => {
                self.scope.push(FrameKind::Block, "block");
                self.emit_statements(body)?;
                self.pop_scope(meta)
            }
            Statement::Class(class) => self.emit_class(class),
            Statement::Try(try_stmt) => self.emit_try(try_stmt),
        }
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    fn emit_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        let meta = &assignment.meta;
        match (&assignment.target, &assignment.mode) {
            (AssignTarget::Name(name), AssignMode::Declare { constant, type_hint }) => {
                // The value is evaluated before the name exists.
                self.note_reads(&assignment.value);
                let value = self.expression_doc(&assignment.value);
                let host = self.binding_name(&name.name);
                let kind = if *constant {
                    BindingKind::Constant
                } else {
                    BindingKind::Variable
                };
                self.scope
                    .define(
                        &name.name,
                        Binding::new(kind, name.meta.span, host.clone()),
                        *constant,
                        type_hint.as_ref().map(|hint| hint.name.as_str()),
                    )
                    .map_err(|error| CodeGenError::scope(error, &name.meta))?;
                let doc = docvec![host, " = ", value];
                self.write_doc(&doc, Some((meta, Some(name.name.as_str()))));
                Ok(())
            }
            (_, AssignMode::Declare { .. }) => Err(CodeGenError::no_mapping(
                "declaration",
                "only a plain name can be declared",
                meta,
            )),
            (AssignTarget::Name(name), AssignMode::Reassign) => {
                self.note_reads(&assignment.value);
                self.scope
                    .assign(&name.name)
                    .map_err(|kind| CodeGenError::scope(kind, &name.meta))?;
                let doc = docvec![self.name_doc(name), " = ", self.expression_doc(&assignment.value)];
                self.write_doc(&doc, Some((meta, Some(name.name.as_str()))));
                Ok(())
            }
            (AssignTarget::Property { object, property }, AssignMode::Reassign) => {
                self.note_reads(object);
                self.note_reads(&assignment.value);
                let doc = docvec![
                    self.receiver_doc(object),
                    ".",
                    python_name(&property.name),
                    " = ",
                    self.expression_doc(&assignment.value),
                ];
                self.write_doc(&doc, Some((meta, None)));
                Ok(())
            }
            (AssignTarget::Index { object, index }, AssignMode::Reassign) => {
                self.note_reads(object);
                self.note_reads(index);
                self.note_reads(&assignment.value);
                let doc = docvec![
                    self.receiver_doc(object),
                    "[",
                    self.expression_doc(index),
                    "] = ",
                    self.expression_doc(&assignment.value),
                ];
                self.write_doc(&doc, Some((meta, None)));
                Ok(())
            }
        }
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    /// Emits `if` (or `elif` for an `else if` link) and its branches.
    fn emit_if(&mut self, if_stmt: &IfStatement, keyword: &'static str) -> Result<()> {
        let meta = &if_stmt.meta;
        self.note_reads(&if_stmt.condition);
        let doc = docvec![keyword, " ", self.expression_doc(&if_stmt.condition), ":"];
        self.write_doc(&doc, Some((meta, None)));
        self.emit_block_suite(&if_stmt.then_branch, "if", meta)?;

        match &if_stmt.else_branch {
            Some(ElseBranch::If(nested)) => self.emit_if(nested, "elif"),
            Some(ElseBranch::Block(body)) => {
                self.write_line("else:", None);
                self.emit_block_suite(body, "else", meta)
            }
            None => Ok(()),
        }
    }

    /// `break` / `continue`: the nearest enclosing loop, function or class
    /// must be a loop.
    fn emit_loop_jump(&mut self, keyword: &'static str, meta: &NodeMeta) -> Result<()> {
        let boundary = self.index.enclosing(meta.id, |kind| {
            kind.is_loop() || matches!(kind, NodeKind::FunctionDef | NodeKind::Class)
        });
        let in_loop = boundary
            .and_then(|id| self.index.kind(id))
            .is_some_and(NodeKind::is_loop);
        if !in_loop {
            return Err(CodeGenError::no_mapping(
                keyword,
                format!("`{keyword}` outside of a loop"),
                meta,
            ));
        }
        self.write_line(keyword, Some((meta, None)));
        Ok(())
    }

    fn emit_return(&mut self, value: Option<&Expression>, meta: &NodeMeta) -> Result<()> {
        if self
            .index
            .enclosing(meta.id, |kind| kind == NodeKind::FunctionDef)
            .is_none()
        {
            return Err(CodeGenError::no_mapping(
                "return",
                "`return` outside of a function",
                meta,
            ));
        }
        let doc = match value {
            Some(value) => {
                self.note_reads(value);
                docvec!["return ", self.expression_doc(value)]
            }
            None => Document::Str("return"),
        };
        self.write_doc(&doc, Some((meta, None)));
        Ok(())
    }

    fn emit_try(&mut self, try_stmt: &TryStatement) -> Result<()> {
        let meta = &try_stmt.meta;
        self.write_line("try:", Some((meta, None)));
        self.emit_block_suite(&try_stmt.body, "try", meta)?;

        self.scope.push(FrameKind::Block, "catch");
        match &try_stmt.binding {
            Some(binding) => {
                let host = self.binding_name(&binding.name);
                self.scope
                    .define(
                        &binding.name,
                        Binding::new(BindingKind::CatchVariable, binding.meta.span, host.clone()),
                        false,
                        None,
                    )
                    .map_err(|kind| CodeGenError::scope(kind, &binding.meta))?;
                let line = format!("except Exception as {host}:");
                self.write_line(&line, Some((&binding.meta, Some(binding.name.as_str()))));
            }
            None => self.write_line("except Exception:", None),
        }
        self.emit_suite(&try_stmt.handler)?;
        self.pop_scope(meta)
    }

    // ========================================================================
    // Imports
    // ========================================================================

    fn emit_import(&mut self, import: &Import) -> Result<()> {
        let path = import
            .path
            .iter()
            .map(|segment| python_name(&segment.name).to_string())
            .collect::<Vec<_>>()
            .join(".");

        let (line, bound) = match &import.kind {
            ImportKind::Module { alias: Some(alias) } => {
                let host = python_name(&alias.name);
                (format!("import {path} as {host}"), vec![alias])
            }
            ImportKind::Module { alias: None } => {
                // `import a.b` after `import a` rebinds the same package.
                let root = import.path.first().filter(|root| {
                    !self
                        .scope
                        .lookup_local(&root.name)
                        .is_some_and(|binding| binding.kind == BindingKind::Import)
                });
                (format!("import {path}"), root.into_iter().collect())
            }
            ImportKind::Names(names) => {
                let list = names
                    .iter()
                    .map(|name| python_name(&name.name).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                (format!("from {path} import {list}"), names.iter().collect())
            }
        };

        for name in bound {
            self.scope
                .define(
                    &name.name,
                    Binding::new(BindingKind::Import, name.meta.span, python_name(&name.name)),
                    false,
                    None,
                )
                .map_err(|kind| CodeGenError::scope(kind, &name.meta))?;
        }
        self.write_line(&line, Some((&import.meta, None)));
        Ok(())
    }
}

/// Class bodies hold methods and `let`/`const` field declarations.
fn allowed_in_class_body(statement: &Statement) -> bool {
    match statement {
        Statement::FunctionDef(_) => true,
        Statement::Assignment(assignment) => {
            assignment.is_declaration() && matches!(assignment.target, AssignTarget::Name(_))
        }
        _ => false,
    }
}

/// Human-readable name of a statement kind, for diagnostics.
pub(super) const fn construct_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Assignment => "assignment",
        NodeKind::ExpressionStatement => "expression statement",
        NodeKind::Print => "print",
        NodeKind::If => "if",
        NodeKind::While => "while",
        NodeKind::For => "for",
        NodeKind::FunctionDef => "function definition",
        NodeKind::Return => "return",
        NodeKind::Break => "break",
        NodeKind::Continue => "continue",
        NodeKind::Import => "import",
        NodeKind::Block => "block",
        NodeKind::Class => "class definition",
        NodeKind::Try => "try",
        _ => "expression",
    }
}

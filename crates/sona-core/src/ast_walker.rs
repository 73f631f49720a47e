// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared AST walkers and the parent index.
//!
//! **DDD Context:** Compilation
//!
//! - [`walk_expression`]: pre-order walk of a single expression tree.
//! - [`walk_program`]: pre-order walk of every expression in a program,
//!   descending through nested statement lists.
//! - [`walk_binding_names`]: every identifier that introduces a binding.
//! - [`AstIndex`]: parent links, positions and kinds keyed by [`NodeId`],
//!   built once per program. The AST itself owns children only; upward
//!   navigation (which loop encloses this `break`?) goes through the index.

use crate::ast::{
    AssignMode, AssignTarget, ElseBranch, Expression, Identifier, IfStatement, ImportKind, NodeId,
    NodeKind, Program, Statement,
};
use crate::source_analysis::Position;

// ── Expression walker ─────────────────────────────────────────────────────────

/// Recursively walks an expression tree in pre-order, calling `f` on every node.
pub fn walk_expression<F>(expr: &Expression, f: &mut F)
where
    F: FnMut(&Expression),
{
    f(expr);
    match expr {
        Expression::Binary { left, right, .. } => {
            walk_expression(left, f);
            walk_expression(right, f);
        }
        Expression::Unary { operand, .. } => walk_expression(operand, f),
        Expression::Call {
            callee, arguments, ..
        } => {
            walk_expression(callee, f);
            for arg in arguments {
                walk_expression(arg, f);
            }
        }
        Expression::Array { elements, .. } => {
            for element in elements {
                walk_expression(element, f);
            }
        }
        Expression::Object { entries, .. } => {
            for entry in entries {
                walk_expression(&entry.value, f);
            }
        }
        Expression::Property { object, .. } => walk_expression(object, f),
        Expression::Index { object, index, .. } => {
            walk_expression(object, f);
            walk_expression(index, f);
        }
        // Leaves
        Expression::Literal { .. } | Expression::Identifier(_) => {}
    }
}

/// Walks every expression in the program, including those nested inside
/// function, class, loop and block bodies (pre-order, document order).
pub fn walk_program<F>(program: &Program, f: &mut F)
where
    F: FnMut(&Expression),
{
    for stmt in &program.statements {
        walk_statement(stmt, f);
    }
}

fn walk_statements<F>(statements: &[Statement], f: &mut F)
where
    F: FnMut(&Expression),
{
    for stmt in statements {
        walk_statement(stmt, f);
    }
}

fn walk_statement<F>(stmt: &Statement, f: &mut F)
where
    F: FnMut(&Expression),
{
    match stmt {
        Statement::Assignment(assignment) => {
            match &assignment.target {
                AssignTarget::Name(_) => {}
                AssignTarget::Property { object, .. } => walk_expression(object, f),
                AssignTarget::Index { object, index } => {
                    walk_expression(object, f);
                    walk_expression(index, f);
                }
            }
            walk_expression(&assignment.value, f);
        }
        Statement::Expression { expression, .. } => walk_expression(expression, f),
        Statement::Print { arguments, .. } => {
            for arg in arguments {
                walk_expression(arg, f);
            }
        }
        Statement::If(if_stmt) => walk_if(if_stmt, f),
        Statement::While {
            condition, body, ..
        } => {
            walk_expression(condition, f);
            walk_statements(body, f);
        }
        Statement::For { iterable, body, .. } => {
            walk_expression(iterable, f);
            walk_statements(body, f);
        }
        Statement::FunctionDef(def) => {
            for param in &def.parameters {
                if let Some(default) = &param.default {
                    walk_expression(default, f);
                }
            }
            walk_statements(&def.body, f);
        }
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                walk_expression(value, f);
            }
        }
        Statement::Block { body, .. } => walk_statements(body, f),
        Statement::Class(class) => walk_statements(&class.body, f),
        Statement::Try(try_stmt) => {
            walk_statements(&try_stmt.body, f);
            walk_statements(&try_stmt.handler, f);
        }
        Statement::Break { .. } | Statement::Continue { .. } | Statement::Import(_) => {}
    }
}

fn walk_if<F>(if_stmt: &IfStatement, f: &mut F)
where
    F: FnMut(&Expression),
{
    walk_expression(&if_stmt.condition, f);
    walk_statements(&if_stmt.then_branch, f);
    match &if_stmt.else_branch {
        Some(ElseBranch::Block(body)) => walk_statements(body, f),
        Some(ElseBranch::If(nested)) => walk_if(nested, f),
        None => {}
    }
}

/// Calls `f` on every identifier that introduces a binding: declared and
/// loop variables, parameters, function and class names, catch variables
/// and imported names. Property names and type hints are not bindings.
pub fn walk_binding_names<F>(program: &Program, f: &mut F)
where
    F: FnMut(&Identifier),
{
    binding_names(&program.statements, f);
}

fn binding_names<F>(statements: &[Statement], f: &mut F)
where
    F: FnMut(&Identifier),
{
    for stmt in statements {
        match stmt {
            Statement::Assignment(assignment) => {
                if let (AssignTarget::Name(name), AssignMode::Declare { .. }) =
                    (&assignment.target, &assignment.mode)
                {
                    f(name);
                }
            }
            Statement::If(if_stmt) => binding_names_in_if(if_stmt, f),
            Statement::While { body, .. } | Statement::Block { body, .. } => {
                binding_names(body, f);
            }
            Statement::For { variable, body, .. } => {
                f(variable);
                binding_names(body, f);
            }
            Statement::FunctionDef(def) => {
                f(&def.name);
                for param in &def.parameters {
                    f(&param.name);
                }
                binding_names(&def.body, f);
            }
            Statement::Class(class) => {
                f(&class.name);
                binding_names(&class.body, f);
            }
            Statement::Try(try_stmt) => {
                binding_names(&try_stmt.body, f);
                if let Some(binding) = &try_stmt.binding {
                    f(binding);
                }
                binding_names(&try_stmt.handler, f);
            }
            Statement::Import(import) => match &import.kind {
                ImportKind::Module { alias: Some(alias) } => f(alias),
                ImportKind::Module { alias: None } => {
                    if let Some(root) = import.path.first() {
                        f(root);
                    }
                }
                ImportKind::Names(names) => {
                    for name in names {
                        f(name);
                    }
                }
            },
            Statement::Expression { .. }
            | Statement::Print { .. }
            | Statement::Return { .. }
            | Statement::Break { .. }
            | Statement::Continue { .. } => {}
        }
    }
}

fn binding_names_in_if<F>(if_stmt: &IfStatement, f: &mut F)
where
    F: FnMut(&Identifier),
{
    binding_names(&if_stmt.then_branch, f);
    match &if_stmt.else_branch {
        Some(ElseBranch::Block(body)) => binding_names(body, f),
        Some(ElseBranch::If(nested)) => binding_names_in_if(nested, f),
        None => {}
    }
}

// ── Parent index ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Entry {
    kind: NodeKind,
    position: Position,
    parent: Option<NodeId>,
}

/// Parent links, positions and kinds for every node of a [`Program`].
///
/// Top-level statements have no parent. Lookups for ids that are not part
/// of the indexed program return `None`.
#[derive(Debug, Clone, Default)]
pub struct AstIndex {
    entries: Vec<Option<Entry>>,
}

impl AstIndex {
    /// Indexes every node of `program`.
    #[must_use]
    pub fn build(program: &Program) -> Self {
        let mut index = Self {
            entries: vec![None; program.node_count as usize],
        };
        for stmt in &program.statements {
            index.statement(stmt, None);
        }
        index
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Returns `true` if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The parent of `id`, or `None` for top-level statements.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id)?.parent
    }

    /// The kind of `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.entry(id).map(|entry| entry.kind)
    }

    /// The source position of `id`.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.entry(id).map(|entry| entry.position)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// The nearest ancestor of `id` whose kind satisfies `predicate`.
    #[must_use]
    pub fn enclosing(&self, id: NodeId, predicate: impl Fn(NodeKind) -> bool) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&ancestor| self.kind(ancestor).is_some_and(&predicate))
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.entries.get(id.index())?.as_ref()
    }

    fn insert(&mut self, id: NodeId, kind: NodeKind, position: Position, parent: Option<NodeId>) {
        if id.index() >= self.entries.len() {
            self.entries.resize(id.index() + 1, None);
        }
        self.entries[id.index()] = Some(Entry {
            kind,
            position,
            parent,
        });
    }

    fn name(&mut self, name: &Identifier, parent: NodeId) {
        self.insert(name.meta.id, NodeKind::Name, name.meta.position, Some(parent));
    }

    fn statements(&mut self, statements: &[Statement], parent: NodeId) {
        for stmt in statements {
            self.statement(stmt, Some(parent));
        }
    }

    fn statement(&mut self, stmt: &Statement, parent: Option<NodeId>) {
        let meta = stmt.meta();
        let id = meta.id;
        self.insert(id, stmt.node_kind(), meta.position, parent);

        match stmt {
            Statement::Assignment(assignment) => {
                match &assignment.target {
                    AssignTarget::Name(name) => self.name(name, id),
                    AssignTarget::Property { object, property } => {
                        self.expression(object, id);
                        self.name(property, id);
                    }
                    AssignTarget::Index { object, index } => {
                        self.expression(object, id);
                        self.expression(index, id);
                    }
                }
                if let AssignMode::Declare {
                    type_hint: Some(hint),
                    ..
                } = &assignment.mode
                {
                    self.name(hint, id);
                }
                self.expression(&assignment.value, id);
            }
            Statement::Expression { expression, .. } => self.expression(expression, id),
            Statement::Print { arguments, .. } => {
                for arg in arguments {
                    self.expression(arg, id);
                }
            }
            Statement::If(if_stmt) => self.if_branches(if_stmt),
            Statement::While {
                condition, body, ..
            } => {
                self.expression(condition, id);
                self.statements(body, id);
            }
            Statement::For {
                variable,
                iterable,
                body,
                ..
            } => {
                self.name(variable, id);
                self.expression(iterable, id);
                self.statements(body, id);
            }
            Statement::FunctionDef(def) => {
                self.name(&def.name, id);
                for param in &def.parameters {
                    self.name(&param.name, id);
                    if let Some(hint) = &param.type_hint {
                        self.name(hint, id);
                    }
                    if let Some(default) = &param.default {
                        self.expression(default, id);
                    }
                }
                if let Some(hint) = &def.return_type {
                    self.name(hint, id);
                }
                self.statements(&def.body, id);
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.expression(value, id);
                }
            }
            Statement::Import(import) => {
                for segment in &import.path {
                    self.name(segment, id);
                }
                match &import.kind {
                    ImportKind::Module { alias: Some(alias) } => self.name(alias, id),
                    ImportKind::Module { alias: None } => {}
                    ImportKind::Names(names) => {
                        for name in names {
                            self.name(name, id);
                        }
                    }
                }
            }
            Statement::Block { body, .. } => self.statements(body, id),
            Statement::Class(class) => {
                self.name(&class.name, id);
                self.statements(&class.body, id);
            }
            Statement::Try(try_stmt) => {
                self.statements(&try_stmt.body, id);
                if let Some(binding) = &try_stmt.binding {
                    self.name(binding, id);
                }
                self.statements(&try_stmt.handler, id);
            }
            Statement::Break { .. } | Statement::Continue { .. } => {}
        }
    }

    /// Indexes the children of an `if`; `else if` links become children of
    /// the `if` they hang off.
    fn if_branches(&mut self, if_stmt: &IfStatement) {
        let id = if_stmt.meta.id;
        self.expression(&if_stmt.condition, id);
        self.statements(&if_stmt.then_branch, id);
        match &if_stmt.else_branch {
            Some(ElseBranch::Block(body)) => self.statements(body, id),
            Some(ElseBranch::If(nested)) => {
                self.insert(nested.meta.id, NodeKind::If, nested.meta.position, Some(id));
                self.if_branches(nested);
            }
            None => {}
        }
    }

    fn expression(&mut self, expr: &Expression, parent: NodeId) {
        let meta = expr.meta();
        let id = meta.id;
        self.insert(id, expr.node_kind(), meta.position, Some(parent));

        match expr {
            Expression::Binary { left, right, .. } => {
                self.expression(left, id);
                self.expression(right, id);
            }
            Expression::Unary { operand, .. } => self.expression(operand, id),
            Expression::Call {
                callee, arguments, ..
            } => {
                self.expression(callee, id);
                for arg in arguments {
                    self.expression(arg, id);
                }
            }
            Expression::Array { elements, .. } => {
                for element in elements {
                    self.expression(element, id);
                }
            }
            Expression::Object { entries, .. } => {
                for entry in entries {
                    self.expression(&entry.value, id);
                }
            }
            Expression::Property {
                object, property, ..
            } => {
                self.expression(object, id);
                self.name(property, id);
            }
            Expression::Index { object, index, .. } => {
                self.expression(object, id);
                self.expression(index, id);
            }
            Expression::Literal { .. } | Expression::Identifier(_) => {}
        }
    }
}

// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lowering from the concrete parse tree to the typed AST.
//!
//! **DDD Context:** Source Analysis
//!
//! Each grammar production becomes exactly one AST node with a fresh
//! [`NodeId`] and the position of its left-most significant token. Operator
//! tokens are normalized to canonical operators with their surface spelling
//! kept in [`Metadata`]. Parenthesized groups disappear; precedence is
//! recomputed when Python is emitted.
//!
//! A production whose children do not match its layout fails with
//! [`ParseErrorKind::MalformedProduction`]. The builder never invents
//! placeholder nodes.

use ecow::{eco_format, EcoString};

use crate::ast::{
    AssignMode, AssignTarget, Assignment, BinaryOperator, ClassDef, ElseBranch, Expression,
    FunctionDef, Identifier, IfStatement, Import, ImportKind, Literal, Metadata, NodeId,
    NodeMeta, ObjectEntry, ObjectKey, Parameter, Program, Statement, TryStatement,
    UnaryOperator,
};
use crate::source_analysis::{
    ParseError, ParseErrorKind, Position, Span, SyntaxElement, SyntaxKind, SyntaxNode, Token,
    TokenKind,
};

type BuildResult<T> = Result<T, ParseError>;

/// Builds a [`Program`] from a parse tree rooted at [`SyntaxKind::Program`].
///
/// # Errors
///
/// Returns [`ParseErrorKind::MalformedProduction`] if the tree does not
/// follow the production layouts documented on [`SyntaxKind`].
///
/// ```
/// use sona_core::ast::Statement;
/// use sona_core::ast_builder::build_program;
/// use sona_core::source_analysis::{parse, tokenize};
///
/// let tree = parse(tokenize("let x = 42").unwrap()).unwrap();
/// let program = build_program(tree).unwrap();
/// assert!(matches!(program.statements[0], Statement::Assignment(_)));
/// ```
pub fn build_program(tree: SyntaxNode) -> BuildResult<Program> {
    if tree.kind() != SyntaxKind::Program {
        return Err(malformed(
            tree.kind(),
            tree.span(),
            tree.position(),
            eco_format!("expected a program, found a {}", tree.kind().rule_name()),
        ));
    }
    let span = tree.span();
    let mut builder = AstBuilder::default();
    let statements = builder.statements(tree)?;
    Ok(Program {
        statements,
        span,
        node_count: builder.next_id,
        metadata: builder.metadata,
    })
}

fn malformed(kind: SyntaxKind, span: Span, position: Position, detail: EcoString) -> ParseError {
    ParseError::new(
        ParseErrorKind::MalformedProduction {
            rule: kind.rule_name(),
            detail,
        },
        span,
        position,
    )
}

/// Cursor over the children of one production.
struct Children {
    kind: SyntaxKind,
    span: Span,
    position: Position,
    items: std::iter::Peekable<std::vec::IntoIter<SyntaxElement>>,
}

impl Children {
    fn of(node: SyntaxNode) -> Self {
        let kind = node.kind();
        let span = node.span();
        let position = node.position();
        Self {
            kind,
            span,
            position,
            items: node.into_children().into_iter().peekable(),
        }
    }

    fn error(&self, detail: EcoString) -> ParseError {
        malformed(self.kind, self.span, self.position, detail)
    }

    /// The next child, which must be a node.
    fn node(&mut self, what: &str) -> BuildResult<SyntaxNode> {
        match self.items.next() {
            Some(SyntaxElement::Node(node)) => Ok(node),
            Some(SyntaxElement::Token(token)) => {
                Err(self.error(eco_format!("expected {what}, found `{}`", token.text())))
            }
            None => Err(self.error(eco_format!("missing {what}"))),
        }
    }

    /// The next child, which must be a node of `kind`.
    fn node_of(&mut self, kind: SyntaxKind) -> BuildResult<SyntaxNode> {
        let node = self.node(kind.rule_name())?;
        if node.kind() == kind {
            Ok(node)
        } else {
            Err(self.error(eco_format!(
                "expected {}, found {}",
                kind.rule_name(),
                node.kind().rule_name()
            )))
        }
    }

    /// The next child, which must be a token.
    fn token(&mut self, what: &str) -> BuildResult<Token> {
        match self.items.next() {
            Some(SyntaxElement::Token(token)) => Ok(token),
            Some(SyntaxElement::Node(node)) => Err(self.error(eco_format!(
                "expected {what}, found {}",
                node.kind().rule_name()
            ))),
            None => Err(self.error(eco_format!("missing {what}"))),
        }
    }

    /// Takes the next child if it is a node of `kind`.
    fn optional_node(&mut self, kind: SyntaxKind) -> Option<SyntaxNode> {
        match self.items.peek() {
            Some(SyntaxElement::Node(node)) if node.kind() == kind => match self.items.next() {
                Some(SyntaxElement::Node(node)) => Some(node),
                _ => None,
            },
            _ => None,
        }
    }

    /// Takes the next child if it is a node of any kind.
    fn optional_any_node(&mut self) -> Option<SyntaxNode> {
        match self.items.peek() {
            Some(SyntaxElement::Node(_)) => match self.items.next() {
                Some(SyntaxElement::Node(node)) => Some(node),
                _ => None,
            },
            _ => None,
        }
    }

    /// Takes the next child if it is a token.
    fn optional_token(&mut self) -> Option<Token> {
        match self.items.peek() {
            Some(SyntaxElement::Token(_)) => match self.items.next() {
                Some(SyntaxElement::Token(token)) => Some(token),
                _ => None,
            },
            _ => None,
        }
    }

    fn has_more(&mut self) -> bool {
        self.items.peek().is_some()
    }

    /// Fails if any children are left over.
    fn end(mut self) -> BuildResult<()> {
        match self.items.next() {
            None => Ok(()),
            Some(SyntaxElement::Token(token)) => {
                Err(self.error(eco_format!("unexpected `{}`", token.text())))
            }
            Some(SyntaxElement::Node(node)) => Err(self.error(eco_format!(
                "unexpected {}",
                node.kind().rule_name()
            ))),
        }
    }
}

#[derive(Debug, Default)]
struct AstBuilder {
    next_id: u32,
    metadata: Metadata,
}

impl AstBuilder {
    fn meta(&mut self, span: Span, position: Position) -> NodeMeta {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        NodeMeta::new(id, span, position)
    }

    fn node_meta(&mut self, children: &Children) -> NodeMeta {
        self.meta(children.span, children.position)
    }

    fn identifier(&mut self, token: &Token, children: &Children) -> BuildResult<Identifier> {
        let TokenKind::Identifier(name) = token.kind() else {
            return Err(children.error(eco_format!(
                "expected identifier, found `{}`",
                token.text()
            )));
        };
        Ok(Identifier {
            name: name.clone(),
            meta: self.meta(token.span(), token.position()),
        })
    }

    /// Builds the statements of a `Program` or `Block` node.
    fn statements(&mut self, node: SyntaxNode) -> BuildResult<Vec<Statement>> {
        let mut children = Children::of(node);
        let mut statements = Vec::new();
        while children.has_more() {
            let stmt = children.node("statement")?;
            statements.push(self.statement(stmt)?);
        }
        Ok(statements)
    }

    fn block(&mut self, children: &mut Children) -> BuildResult<Vec<Statement>> {
        let block = children.node_of(SyntaxKind::Block)?;
        self.statements(block)
    }

    fn type_hint(&mut self, node: SyntaxNode) -> BuildResult<Identifier> {
        let mut children = Children::of(node);
        let name = children.token("type name")?;
        let hint = self.identifier(&name, &children)?;
        children.end()?;
        Ok(hint)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self, node: SyntaxNode) -> BuildResult<Statement> {
        let kind = node.kind();
        let mut children = Children::of(node);
        let meta = self.node_meta(&children);

        let stmt = match kind {
            SyntaxKind::VarDecl => {
                let keyword = children.token("`let` or `const`")?;
                let constant = match keyword.kind() {
                    TokenKind::Let => false,
                    TokenKind::Const => true,
                    _ => {
                        return Err(children.error(eco_format!(
                            "expected `let` or `const`, found `{}`",
                            keyword.text()
                        )))
                    }
                };
                self.metadata.insert(meta.id, "keyword", keyword.text());
                let name = children.token("variable name")?;
                let name = self.identifier(&name, &children)?;
                let type_hint = match children.optional_node(SyntaxKind::TypeHint) {
                    Some(hint) => Some(self.type_hint(hint)?),
                    None => None,
                };
                let value = self.expression(children.node("initial value")?)?;
                Statement::Assignment(Assignment {
                    target: AssignTarget::Name(name),
                    value,
                    mode: AssignMode::Declare {
                        constant,
                        type_hint,
                    },
                    meta,
                })
            }
            SyntaxKind::Assign => {
                let target = self.assign_target(children.node("assignment target")?)?;
                let value = self.expression(children.node("assigned value")?)?;
                Statement::Assignment(Assignment {
                    target,
                    value,
                    mode: AssignMode::Reassign,
                    meta,
                })
            }
            SyntaxKind::ExprStmt => Statement::Expression {
                expression: self.expression(children.node("expression")?)?,
                meta,
            },
            SyntaxKind::Print => Statement::Print {
                arguments: self.arguments(children.node_of(SyntaxKind::ArgList)?)?,
                meta,
            },
            SyntaxKind::If => Statement::If(self.if_statement(&mut children, meta)?),
            SyntaxKind::While => {
                let condition = self.expression(children.node("loop condition")?)?;
                let body = self.block(&mut children)?;
                Statement::While {
                    condition,
                    body,
                    meta,
                }
            }
            SyntaxKind::For => {
                let variable = children.token("loop variable")?;
                let variable = self.identifier(&variable, &children)?;
                let iterable = self.expression(children.node("iterable")?)?;
                let body = self.block(&mut children)?;
                Statement::For {
                    variable,
                    iterable,
                    body,
                    meta,
                }
            }
            SyntaxKind::FuncDef => Statement::FunctionDef(self.function_def(&mut children, meta)?),
            SyntaxKind::Return => Statement::Return {
                value: match children.optional_any_node() {
                    Some(value) => Some(self.expression(value)?),
                    None => None,
                },
                meta,
            },
            SyntaxKind::Break => Statement::Break { meta },
            SyntaxKind::Continue => Statement::Continue { meta },
            SyntaxKind::Import => {
                let path = self.dotted_name(children.node_of(SyntaxKind::DottedName)?)?;
                let alias = match children.optional_token() {
                    Some(alias) => Some(self.identifier(&alias, &children)?),
                    None => None,
                };
                Statement::Import(Import {
                    path,
                    kind: ImportKind::Module { alias },
                    meta,
                })
            }
            SyntaxKind::ImportFrom => {
                let path = self.dotted_name(children.node_of(SyntaxKind::DottedName)?)?;
                let mut names = Vec::new();
                while let Some(name) = children.optional_token() {
                    names.push(self.identifier(&name, &children)?);
                }
                if names.is_empty() {
                    return Err(children.error("missing imported name".into()));
                }
                Statement::Import(Import {
                    path,
                    kind: ImportKind::Names(names),
                    meta,
                })
            }
            SyntaxKind::Block => {
                let mut body = Vec::new();
                while children.has_more() {
                    let stmt = children.node("statement")?;
                    body.push(self.statement(stmt)?);
                }
                Statement::Block { body, meta }
            }
            SyntaxKind::ClassDef => {
                let name = children.token("class name")?;
                let name = self.identifier(&name, &children)?;
                let body = self.block(&mut children)?;
                Statement::Class(ClassDef { name, body, meta })
            }
            SyntaxKind::Try => {
                let body = self.block(&mut children)?;
                let mut catch = Children::of(children.node_of(SyntaxKind::Catch)?);
                let binding = match catch.optional_token() {
                    Some(name) => Some(self.identifier(&name, &catch)?),
                    None => None,
                };
                let handler = self.block(&mut catch)?;
                catch.end()?;
                Statement::Try(TryStatement {
                    body,
                    binding,
                    handler,
                    meta,
                })
            }
            other => {
                return Err(children.error(eco_format!(
                    "expected a statement, found {}",
                    other.rule_name()
                )))
            }
        };

        children.end()?;
        Ok(stmt)
    }

    /// Builds an `if` node; `children` are condition, block and an optional
    /// else branch.
    fn if_statement(&mut self, children: &mut Children, meta: NodeMeta) -> BuildResult<IfStatement> {
        let condition = self.expression(children.node("condition")?)?;
        let then_branch = self.block(children)?;
        let else_branch = match children.optional_any_node() {
            None => None,
            Some(node) if node.kind() == SyntaxKind::Block => {
                Some(ElseBranch::Block(self.statements(node)?))
            }
            Some(node) if node.kind() == SyntaxKind::If => {
                let mut nested = Children::of(node);
                let nested_meta = self.node_meta(&nested);
                let nested_if = self.if_statement(&mut nested, nested_meta)?;
                nested.end()?;
                Some(ElseBranch::If(Box::new(nested_if)))
            }
            Some(node) => {
                return Err(children.error(eco_format!(
                    "expected else block, found {}",
                    node.kind().rule_name()
                )))
            }
        };
        Ok(IfStatement {
            condition,
            then_branch,
            else_branch,
            meta,
        })
    }

    fn function_def(&mut self, children: &mut Children, meta: NodeMeta) -> BuildResult<FunctionDef> {
        let name = children.token("function name")?;
        let name = self.identifier(&name, children)?;

        let mut params = Children::of(children.node_of(SyntaxKind::ParamList)?);
        let mut parameters = Vec::new();
        while params.has_more() {
            let param = params.node_of(SyntaxKind::Param)?;
            parameters.push(self.parameter(param)?);
        }

        let return_type = match children.optional_node(SyntaxKind::TypeHint) {
            Some(hint) => Some(self.type_hint(hint)?),
            None => None,
        };
        let body = self.block(children)?;
        Ok(FunctionDef {
            name,
            parameters,
            return_type,
            body,
            meta,
        })
    }

    fn parameter(&mut self, node: SyntaxNode) -> BuildResult<Parameter> {
        let mut children = Children::of(node);
        let name = children.token("parameter name")?;
        let name = self.identifier(&name, &children)?;
        let type_hint = match children.optional_node(SyntaxKind::TypeHint) {
            Some(hint) => Some(self.type_hint(hint)?),
            None => None,
        };
        let default = match children.optional_any_node() {
            Some(value) => Some(self.expression(value)?),
            None => None,
        };
        children.end()?;
        Ok(Parameter {
            name,
            type_hint,
            default,
        })
    }

    fn dotted_name(&mut self, node: SyntaxNode) -> BuildResult<Vec<Identifier>> {
        let mut children = Children::of(node);
        let mut path = Vec::new();
        while let Some(segment) = children.optional_token() {
            path.push(self.identifier(&segment, &children)?);
        }
        if path.is_empty() {
            return Err(children.error("missing module name".into()));
        }
        children.end()?;
        Ok(path)
    }

    fn assign_target(&mut self, node: SyntaxNode) -> BuildResult<AssignTarget> {
        let kind = node.kind();
        let mut children = Children::of(node);
        let target = match kind {
            SyntaxKind::Name => {
                let name = children.token("name")?;
                AssignTarget::Name(self.identifier(&name, &children)?)
            }
            SyntaxKind::Property => {
                let object = self.expression(children.node("object")?)?;
                let property = children.token("property name")?;
                let property = self.identifier(&property, &children)?;
                AssignTarget::Property { object, property }
            }
            SyntaxKind::Index => {
                let object = self.expression(children.node("object")?)?;
                let index = self.expression(children.node("index")?)?;
                AssignTarget::Index { object, index }
            }
            SyntaxKind::Group => return self.assign_target(children.node("expression")?),
            other => {
                return Err(children.error(eco_format!(
                    "{} cannot be assigned to",
                    other.rule_name()
                )))
            }
        };
        children.end()?;
        Ok(target)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn arguments(&mut self, node: SyntaxNode) -> BuildResult<Vec<Expression>> {
        let mut children = Children::of(node);
        let mut arguments = Vec::new();
        while children.has_more() {
            arguments.push(self.expression(children.node("argument")?)?);
        }
        Ok(arguments)
    }

    fn expression(&mut self, node: SyntaxNode) -> BuildResult<Expression> {
        let kind = node.kind();
        let mut children = Children::of(node);

        if kind == SyntaxKind::Group {
            let inner = children.node("expression")?;
            children.end()?;
            return self.expression(inner);
        }

        let meta = self.node_meta(&children);
        let expr = match kind {
            SyntaxKind::Literal => {
                let token = children.token("literal")?;
                let value = match token.into_kind() {
                    TokenKind::Integer(text) => Literal::Integer(text),
                    TokenKind::Decimal(text) => Literal::Decimal(text),
                    TokenKind::String(text) => Literal::String(text),
                    TokenKind::True => Literal::Boolean(true),
                    TokenKind::False => Literal::Boolean(false),
                    TokenKind::Null => Literal::Null,
                    other => {
                        return Err(children.error(eco_format!(
                            "expected a literal, found {}",
                            other.describe()
                        )))
                    }
                };
                Expression::Literal { value, meta }
            }
            SyntaxKind::Name => {
                let token = children.token("name")?;
                let TokenKind::Identifier(name) = token.into_kind() else {
                    return Err(children.error("expected identifier".into()));
                };
                Expression::Identifier(Identifier { name, meta })
            }
            SyntaxKind::Binary => {
                let left = self.expression(children.node("left operand")?)?;
                let operator = children.token("operator")?;
                let op = binary_operator(operator.kind()).ok_or_else(|| {
                    children.error(eco_format!("`{}` is not a binary operator", operator.text()))
                })?;
                self.metadata.insert(meta.id, "operator", operator.text());
                let right = self.expression(children.node("right operand")?)?;
                Expression::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    meta,
                }
            }
            SyntaxKind::Unary => {
                let operator = children.token("operator")?;
                let op = match operator.kind() {
                    TokenKind::Minus => UnaryOperator::Negate,
                    TokenKind::Not => UnaryOperator::Not,
                    _ => {
                        return Err(children.error(eco_format!(
                            "`{}` is not a unary operator",
                            operator.text()
                        )))
                    }
                };
                self.metadata.insert(meta.id, "operator", operator.text());
                let operand = self.expression(children.node("operand")?)?;
                Expression::Unary {
                    op,
                    operand: Box::new(operand),
                    meta,
                }
            }
            SyntaxKind::Call => {
                let callee = self.expression(children.node("callee")?)?;
                let arguments = self.arguments(children.node_of(SyntaxKind::ArgList)?)?;
                Expression::Call {
                    callee: Box::new(callee),
                    arguments,
                    meta,
                }
            }
            SyntaxKind::Property => {
                let object = self.expression(children.node("object")?)?;
                let property = children.token("property name")?;
                let property = self.identifier(&property, &children)?;
                Expression::Property {
                    object: Box::new(object),
                    property,
                    meta,
                }
            }
            SyntaxKind::Index => {
                let object = self.expression(children.node("object")?)?;
                let index = self.expression(children.node("index")?)?;
                Expression::Index {
                    object: Box::new(object),
                    index: Box::new(index),
                    meta,
                }
            }
            SyntaxKind::Array => {
                let mut elements = Vec::new();
                while children.has_more() {
                    elements.push(self.expression(children.node("element")?)?);
                }
                Expression::Array { elements, meta }
            }
            SyntaxKind::Object => {
                let mut entries = Vec::new();
                while children.has_more() {
                    let entry = children.node_of(SyntaxKind::Entry)?;
                    entries.push(self.entry(entry)?);
                }
                Expression::Object { entries, meta }
            }
            other => {
                return Err(children.error(eco_format!(
                    "expected an expression, found {}",
                    other.rule_name()
                )))
            }
        };

        children.end()?;
        Ok(expr)
    }

    fn entry(&mut self, node: SyntaxNode) -> BuildResult<ObjectEntry> {
        let span = node.span();
        let mut children = Children::of(node);
        let key = children.token("key")?;
        let key = match key.into_kind() {
            TokenKind::Identifier(name) => ObjectKey::Name(name),
            TokenKind::String(text) => ObjectKey::String(text),
            TokenKind::Integer(text) | TokenKind::Decimal(text) => ObjectKey::Number(text),
            other => {
                return Err(children.error(eco_format!(
                    "{} cannot be an object key",
                    other.describe()
                )))
            }
        };
        let value = self.expression(children.node("value")?)?;
        children.end()?;
        Ok(ObjectEntry { key, value, span })
    }
}

fn binary_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Modulo,
        TokenKind::EqualEqual => BinaryOperator::Equal,
        TokenKind::BangEqual => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEqual => BinaryOperator::LessEqual,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
        TokenKind::And => BinaryOperator::And,
        TokenKind::Or => BinaryOperator::Or,
        _ => return None,
    })
}

// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsing.
//!
//! Statements are separated by newlines or `;`. A `{` at the start of a
//! statement always opens a block; object literals only appear in
//! expression position.

use super::{ParseResult, Parser};
use crate::source_analysis::{
    ParseError, ParseErrorKind, SyntaxElement, SyntaxKind, SyntaxNode, TokenKind,
};

impl Parser {
    /// Parses the whole token stream.
    pub(super) fn parse_program(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        let statements = self.parse_statement_list(&TokenKind::Eof)?;
        self.expect(&TokenKind::Eof)?;
        Ok(self.finish(SyntaxKind::Program, marker, statements))
    }

    /// Parses statements until `terminator` (not consumed).
    fn parse_statement_list(&mut self, terminator: &TokenKind) -> ParseResult<Vec<SyntaxElement>> {
        let mut statements = Vec::new();
        loop {
            while self.current_kind().is_separator() {
                self.advance();
            }
            if self.check(terminator) || self.is_at_end() {
                return Ok(statements);
            }

            statements.push(self.parse_statement()?.into());

            if self.current_kind().is_separator() || self.check(terminator) {
                continue;
            }
            let mut expected = vec!["newline", "`;`"];
            if !terminator.is_eof() {
                expected.push(terminator.describe());
            }
            return Err(self.unexpected(expected));
        }
    }

    /// Parses `{ statements }`.
    pub(super) fn parse_block(&mut self) -> ParseResult<SyntaxNode> {
        self.nested(|p| {
            let marker = p.mark();
            p.expect(&TokenKind::LeftBrace)?;
            let statements = p.parse_statement_list(&TokenKind::RightBrace)?;
            p.expect(&TokenKind::RightBrace)?;
            Ok(p.finish(SyntaxKind::Block, marker, statements))
        })
    }

    /// Parses one statement.
    fn parse_statement(&mut self) -> ParseResult<SyntaxNode> {
        match self.current_kind() {
            TokenKind::Let | TokenKind::Const => self.parse_var_decl(),
            TokenKind::Print => self.parse_print(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Func => self.parse_func_def(),
            TokenKind::Class => self.parse_class_def(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => Ok(self.parse_keyword_only(SyntaxKind::Break)),
            TokenKind::Continue => Ok(self.parse_keyword_only(SyntaxKind::Continue)),
            TokenKind::Import => self.parse_import(),
            TokenKind::From => self.parse_import_from(),
            TokenKind::LeftBrace => self.parse_block(),
            _ => self.parse_assign_or_expr(),
        }
    }

    /// `let name [: Type] = value` or `const ...`
    fn parse_var_decl(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        let keyword = self.advance();
        let name = self.expect_identifier()?;
        let mut children: Vec<SyntaxElement> = vec![keyword.into(), name.into()];
        if self.check(&TokenKind::Colon) {
            children.push(self.parse_type_hint()?.into());
        }
        self.expect(&TokenKind::Assign)?;
        self.skip_newlines();
        children.push(self.parse_expression()?.into());
        Ok(self.finish(SyntaxKind::VarDecl, marker, children))
    }

    /// `: Type` or `-> Type`
    fn parse_type_hint(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let name = self.expect_identifier()?;
        Ok(self.finish(SyntaxKind::TypeHint, marker, vec![name.into()]))
    }

    /// `print(args)`
    fn parse_print(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let arguments = self.parse_arguments()?;
        Ok(self.finish(SyntaxKind::Print, marker, vec![arguments.into()]))
    }

    /// `if cond { ... } [else if ... | else { ... }]`
    fn parse_if(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;
        let mut children: Vec<SyntaxElement> = vec![condition.into(), then_block.into()];

        if self.check_after_newlines(&TokenKind::Else) {
            self.skip_newlines();
            self.advance();
            let else_branch = if self.check(&TokenKind::If) {
                self.nested(Self::parse_if)?
            } else {
                self.parse_block()?
            };
            children.push(else_branch.into());
        }
        Ok(self.finish(SyntaxKind::If, marker, children))
    }

    /// `while cond { ... }`
    fn parse_while(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(self.finish(SyntaxKind::While, marker, vec![condition.into(), body.into()]))
    }

    /// `for name in iterable { ... }`
    fn parse_for(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let variable = self.expect_identifier()?;
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(self.finish(
            SyntaxKind::For,
            marker,
            vec![variable.into(), iterable.into(), body.into()],
        ))
    }

    /// `func name(params) [-> Type] { ... }`
    fn parse_func_def(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let name = self.expect_identifier()?;

        let params_marker = self.mark();
        self.expect(&TokenKind::LeftParen)?;
        let params = self.parse_comma_list(&TokenKind::RightParen, Self::parse_param)?;
        self.expect(&TokenKind::RightParen)?;
        let params = self.finish(SyntaxKind::ParamList, params_marker, params);

        let mut children: Vec<SyntaxElement> = vec![name.into(), params.into()];
        if self.check(&TokenKind::Arrow) {
            children.push(self.parse_type_hint()?.into());
        }
        children.push(self.parse_block()?.into());
        Ok(self.finish(SyntaxKind::FuncDef, marker, children))
    }

    /// `name [: Type] [= default]`
    fn parse_param(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        let name = self.expect_identifier()?;
        let mut children: Vec<SyntaxElement> = vec![name.into()];
        if self.check(&TokenKind::Colon) {
            children.push(self.parse_type_hint()?.into());
        }
        if self.match_token(&TokenKind::Assign) {
            children.push(self.parse_expression()?.into());
        }
        Ok(self.finish(SyntaxKind::Param, marker, children))
    }

    /// `class Name { ... }`
    fn parse_class_def(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let name = self.expect_identifier()?;
        let body = self.parse_block()?;
        Ok(self.finish(SyntaxKind::ClassDef, marker, vec![name.into(), body.into()]))
    }

    /// `try { ... } catch [(name)] { ... }`
    fn parse_try(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let body = self.parse_block()?;

        if self.check_after_newlines(&TokenKind::Catch) {
            self.skip_newlines();
        }
        let catch_marker = self.mark();
        self.expect(&TokenKind::Catch)?;
        let mut catch_children: Vec<SyntaxElement> = Vec::new();
        if self.match_token(&TokenKind::LeftParen) {
            catch_children.push(self.expect_identifier()?.into());
            self.expect(&TokenKind::RightParen)?;
        }
        catch_children.push(self.parse_block()?.into());
        let catch = self.finish(SyntaxKind::Catch, catch_marker, catch_children);

        Ok(self.finish(SyntaxKind::Try, marker, vec![body.into(), catch.into()]))
    }

    /// `return [value]`
    fn parse_return(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let mut children = Vec::new();
        if !self.current_kind().is_separator()
            && !self.check(&TokenKind::RightBrace)
            && !self.is_at_end()
        {
            children.push(self.parse_expression()?.into());
        }
        Ok(self.finish(SyntaxKind::Return, marker, children))
    }

    /// `break` / `continue`
    fn parse_keyword_only(&mut self, kind: SyntaxKind) -> SyntaxNode {
        let marker = self.mark();
        self.advance();
        self.finish(kind, marker, Vec::new())
    }

    /// `import a.b [as c]`
    fn parse_import(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let path = self.parse_dotted_name()?;
        let mut children: Vec<SyntaxElement> = vec![path.into()];
        if self.match_token(&TokenKind::As) {
            children.push(self.expect_identifier()?.into());
        }
        Ok(self.finish(SyntaxKind::Import, marker, children))
    }

    /// `from a.b import x, y`
    fn parse_import_from(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        self.advance();
        let path = self.parse_dotted_name()?;
        self.expect(&TokenKind::Import)?;
        let mut children: Vec<SyntaxElement> = vec![path.into(), self.expect_identifier()?.into()];
        while self.match_token(&TokenKind::Comma) {
            children.push(self.expect_identifier()?.into());
        }
        Ok(self.finish(SyntaxKind::ImportFrom, marker, children))
    }

    /// `a.b.c`
    fn parse_dotted_name(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        let mut parts: Vec<SyntaxElement> = vec![self.expect_identifier()?.into()];
        while self.match_token(&TokenKind::Dot) {
            parts.push(self.expect_identifier()?.into());
        }
        Ok(self.finish(SyntaxKind::DottedName, marker, parts))
    }

    /// An expression statement, or an assignment when `=` follows the
    /// expression.
    fn parse_assign_or_expr(&mut self) -> ParseResult<SyntaxNode> {
        let marker = self.mark();
        let expression = self.parse_expression()?;

        if !self.match_token(&TokenKind::Assign) {
            return Ok(self.finish(SyntaxKind::ExprStmt, marker, vec![expression.into()]));
        }
        if !expression.kind().is_assignable() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAssignmentTarget,
                expression.span(),
                expression.position(),
            ));
        }
        self.skip_newlines();
        let value = self.parse_expression()?;
        Ok(self.finish(
            SyntaxKind::Assign,
            marker,
            vec![expression.into(), value.into()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::parse_source;
    use crate::source_analysis::{ParseErrorKind, Position, SyntaxKind, SyntaxNode};

    fn statements(source: &str) -> Vec<SyntaxNode> {
        parse_source(source).unwrap().child_nodes().cloned().collect()
    }

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        statements(source).iter().map(SyntaxNode::kind).collect()
    }

    #[test]
    fn statements_separated_by_newlines_and_semicolons() {
        assert_eq!(
            kinds("let a = 1\n\nb = 2; print(a)\n"),
            vec![SyntaxKind::VarDecl, SyntaxKind::Assign, SyntaxKind::Print]
        );
    }

    #[test]
    fn two_statements_on_one_line_need_a_separator() {
        let err = parse_source("let a = 1 let b = 2").unwrap_err();
        assert_eq!(err.expected(), &["newline", "`;`"]);
        assert_eq!(err.position, Position::new(1, 11));
    }

    #[test]
    fn var_decl_keeps_keyword_and_type_hint() {
        let stmts = statements("const LIMIT: int = 10");
        let decl = &stmts[0];
        let tokens: Vec<_> = decl.child_tokens().map(|t| t.text().to_string()).collect();
        assert_eq!(tokens, ["const", "LIMIT"]);
        let hint = decl.child_nodes().next().unwrap();
        assert_eq!(hint.kind(), SyntaxKind::TypeHint);
        assert_eq!(hint.child_tokens().next().unwrap().text(), "int");
    }

    #[test]
    fn if_else_chain() {
        let stmts = statements("if a { x } else if b { y } else { z }");
        let outer = &stmts[0];
        assert_eq!(outer.kind(), SyntaxKind::If);
        let nested = outer.child_nodes().nth(2).unwrap();
        assert_eq!(nested.kind(), SyntaxKind::If);
        assert_eq!(nested.child_nodes().nth(2).unwrap().kind(), SyntaxKind::Block);
    }

    #[test]
    fn else_may_start_on_next_line() {
        let stmts = statements("if x > 0 {\n  print(\"pos\")\n}\nelse {\n  print(\"neg\")\n}");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].child_nodes().count(), 3);
    }

    #[test]
    fn function_definition_with_params_defaults_and_return_type() {
        let stmts = statements("func greet(name: str, greeting = \"Hi\") -> str {\n  return greeting + name\n}");
        let func = &stmts[0];
        assert_eq!(func.kind(), SyntaxKind::FuncDef);
        assert_eq!(func.child_tokens().next().unwrap().text(), "greet");

        let nodes: Vec<_> = func.child_nodes().map(SyntaxNode::kind).collect();
        assert_eq!(
            nodes,
            vec![SyntaxKind::ParamList, SyntaxKind::TypeHint, SyntaxKind::Block]
        );

        let params: Vec<_> = func.child_nodes().next().unwrap().child_nodes().cloned().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].child_nodes().next().unwrap().kind(), SyntaxKind::TypeHint);
        assert_eq!(params[1].child_nodes().next().unwrap().kind(), SyntaxKind::Literal);
    }

    #[test]
    fn for_loop() {
        let stmts = statements("for i in range(5) { print(i) }");
        assert_eq!(stmts[0].kind(), SyntaxKind::For);
        assert_eq!(stmts[0].child_tokens().next().unwrap().text(), "i");
    }

    #[test]
    fn bare_return_before_closing_brace() {
        let stmts = statements("func f() { return }");
        let body = stmts[0].child_nodes().last().unwrap();
        let ret = body.child_nodes().next().unwrap();
        assert_eq!(ret.kind(), SyntaxKind::Return);
        assert!(ret.children().is_empty());
    }

    #[test]
    fn imports() {
        let stmts = statements("import os.path as p\nfrom math import sqrt, floor");
        assert_eq!(stmts[0].kind(), SyntaxKind::Import);
        assert_eq!(stmts[0].child_tokens().next().unwrap().text(), "p");
        let path = stmts[0].child_nodes().next().unwrap();
        assert_eq!(path.child_tokens().count(), 2);

        assert_eq!(stmts[1].kind(), SyntaxKind::ImportFrom);
        assert_eq!(stmts[1].child_tokens().count(), 2);
    }

    #[test]
    fn class_and_try() {
        assert_eq!(
            kinds("class Point { func init(x) { self.x = x } }\ntry { risky() }\ncatch (e) { print(e) }"),
            vec![SyntaxKind::ClassDef, SyntaxKind::Try]
        );
    }

    #[test]
    fn catch_without_binding() {
        let stmts = statements("try { a() } catch { b() }");
        let catch = stmts[0].child_nodes().nth(1).unwrap();
        assert_eq!(catch.kind(), SyntaxKind::Catch);
        assert_eq!(catch.child_tokens().count(), 0);
    }

    #[test]
    fn assignment_targets() {
        assert_eq!(
            kinds("x = 1\nperson.name = \"Ada\"\nitems[0] = 2"),
            vec![SyntaxKind::Assign, SyntaxKind::Assign, SyntaxKind::Assign]
        );
    }

    #[test]
    fn invalid_assignment_target() {
        let err = parse_source("f() = 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidAssignmentTarget);
        assert_eq!(err.position, Position::new(1, 1));
    }

    #[test]
    fn statement_position_is_keyword_position() {
        let stmts = statements("\n\n   while go { tick() }");
        assert_eq!(stmts[0].position(), Position::new(3, 4));
    }

    #[test]
    fn unclosed_block_is_unexpected_eof() {
        let err = parse_source("if x { print(x)").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn stray_closing_brace() {
        let err = parse_source("x = 1\n}").unwrap_err();
        assert_eq!(err.position, Position::new(2, 1));
    }
}

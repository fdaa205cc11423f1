//! Parser — recursive descent with precedence climbing for expressions.
//!
//! The parser converts a flat token stream into the AST. Statements and
//! declarations use plain recursive descent: each grammar production maps
//! to a function that consumes tokens and returns a node. Expressions use
//! an iterative precedence-climbing loop (see [`Parser::binary_expr`]):
//! the loop keeps consuming binary operators as long as their precedence
//! exceeds the current minimum, which handles precedence and left
//! associativity without one grammar rule per level.
//!
//! Lookahead is one token everywhere except at statement heads: a
//! statement beginning with an identifier is an assignment iff the token
//! after it is `=` or `+=`, which needs a second token of lookahead. No
//! backtracking is required.
//!
//! The parser fails fast: the first syntax error is returned as a single
//! diagnostic and no recovery is attempted.

use crate::ast::*;
use crate::errors::{Diagnostic, ErrorCode};
use crate::token::{Span, Token, TokenKind};

/// Parse a token stream into a program. `file` labels diagnostics.
pub fn parse(tokens: Vec<Token>, file: &str) -> Result<Program, Diagnostic> {
    Parser::new(tokens, file).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    file: String,
    next_expr_id: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, file: &str) -> Self {
        Self {
            tokens,
            current: 0,
            file: file.to_string(),
            next_expr_id: 0,
        }
    }

    /// Parse a complete program: a sequence of function declarations.
    pub fn parse(mut self) -> Result<Program, Diagnostic> {
        let mut decls = Vec::new();
        while !self.is_at_end() {
            decls.push(self.fn_decl()?);
        }
        Ok(decls)
    }

    // ── Declarations ─────────────────────────────────────────────────

    fn fn_decl(&mut self) -> Result<FnDecl, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Fn)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::RParen)?;

        // A return-type annotation is parsed but carries no meaning:
        // every function lowers to `define i32` returning 0.
        let return_type = if self.match_token(TokenKind::Colon) {
            Some(self.type_ref()?)
        } else {
            None
        };

        let body = self.block()?;
        let span = start.merge(body.span);
        Ok(FnDecl {
            name,
            params: Vec::new(),
            return_type,
            body,
            span,
        })
    }

    fn block(&mut self) -> Result<Block, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.statement()?);
        }
        let end = self.current_span();
        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    // ── Statements ───────────────────────────────────────────────────

    fn statement(&mut self) -> Result<Stmt, Diagnostic> {
        match self.peek_kind() {
            TokenKind::Var | TokenKind::Const => self.var_decl(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            // Two-token lookahead: `IDENT =` / `IDENT +=` is an
            // assignment, anything else is an expression statement.
            TokenKind::Identifier(_)
                if matches!(self.peek_next_kind(), TokenKind::Eq | TokenKind::PlusEq) =>
            {
                self.assign_stmt()
            }
            _ => {
                let expr = self.expression()?;
                let span = expr.span;
                Ok(Stmt {
                    kind: StmtKind::Expression(expr),
                    span,
                })
            }
        }
    }

    fn var_decl(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        let is_const = matches!(self.peek_kind(), TokenKind::Const);
        self.advance_token();
        let name = self.expect_identifier()?;

        let ty = if self.match_token(TokenKind::Colon) {
            Some(self.type_ref()?)
        } else {
            None
        };

        let init = if self.match_token(TokenKind::Eq) {
            Some(self.expression()?)
        } else {
            None
        };

        let end = init
            .as_ref()
            .map(|e| e.span)
            .or_else(|| ty.as_ref().map(|t| t.span))
            .unwrap_or_else(|| self.previous_span());
        Ok(Stmt {
            kind: StmtKind::VarDecl {
                name,
                ty,
                init,
                is_const,
            },
            span: start.merge(end),
        })
    }

    fn assign_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let name_span = self.current_span();
        let name = self.expect_identifier()?;
        let op = self.advance_token();
        let value = self.expression()?;
        let span = name_span.merge(value.span);

        // `a += e` desugars to `a = a + e` by synthesizing the addition.
        let value = match op.kind {
            TokenKind::PlusEq => {
                let load = self.new_expr(ExprKind::Ident(name.clone()), name_span);
                self.new_expr(
                    ExprKind::Binary {
                        left: Box::new(load),
                        op: BinOp::Add,
                        right: Box::new(value),
                    },
                    span,
                )
            }
            _ => value,
        };

        Ok(Stmt {
            kind: StmtKind::Assign { name, value },
            span,
        })
    }

    fn if_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::If)?;
        let mut branches = vec![self.if_branch()?];

        let mut else_body = None;
        let mut end = branches[0].body.span;
        loop {
            if self.match_token(TokenKind::Elif) {
                let branch = self.if_branch()?;
                end = branch.body.span;
                branches.push(branch);
            } else if self.match_token(TokenKind::Else) {
                let body = self.block()?;
                end = body.span;
                else_body = Some(body);
                break;
            } else {
                break;
            }
        }

        Ok(Stmt {
            kind: StmtKind::If {
                branches,
                else_body,
            },
            span: start.merge(end),
        })
    }

    fn if_branch(&mut self) -> Result<IfBranch, Diagnostic> {
        self.expect(TokenKind::LParen)?;
        let cond = self.expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        Ok(IfBranch { cond, body })
    }

    fn while_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        let span = start.merge(body.span);
        Ok(Stmt {
            kind: StmtKind::While { cond, body },
            span,
        })
    }

    fn type_ref(&mut self) -> Result<TypeRef, Diagnostic> {
        let token = self.advance_token();
        let name = match &token.kind {
            TokenKind::KwInt => "int",
            TokenKind::KwFloat => "float",
            TokenKind::KwBool => "bool",
            TokenKind::KwChar => "char",
            TokenKind::KwString => "string",
            // Unknown type names are accepted here and rejected by the
            // analyzer, which owns the InvalidType diagnostic.
            TokenKind::Identifier(name) => name.as_str(),
            _ => {
                return Err(Diagnostic::error(
                    ErrorCode::ExpectedToken,
                    &self.file,
                    token.span,
                    vec!["type name".into(), token.kind.to_string()],
                ));
            }
        };
        Ok(TypeRef {
            name: name.to_string(),
            span: token.span,
        })
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn expression(&mut self) -> Result<Expr, Diagnostic> {
        self.binary_expr(0)
    }

    /// Precedence of a binary operator token; `None` for anything else.
    /// Higher binds tighter. All binary operators are left-associative.
    fn binary_prec(kind: &TokenKind) -> Option<(BinOp, u8)> {
        match kind {
            TokenKind::OrOr => Some((BinOp::Or, 10)),
            TokenKind::AndAnd => Some((BinOp::And, 20)),
            TokenKind::EqEq => Some((BinOp::Eq, 30)),
            TokenKind::BangEq => Some((BinOp::Ne, 30)),
            TokenKind::Lt => Some((BinOp::Lt, 40)),
            TokenKind::LtEq => Some((BinOp::Le, 40)),
            TokenKind::Gt => Some((BinOp::Gt, 40)),
            TokenKind::GtEq => Some((BinOp::Ge, 40)),
            TokenKind::Plus => Some((BinOp::Add, 50)),
            TokenKind::Minus => Some((BinOp::Sub, 50)),
            TokenKind::Star => Some((BinOp::Mul, 60)),
            TokenKind::Slash => Some((BinOp::Div, 60)),
            TokenKind::Percent => Some((BinOp::Mod, 60)),
            TokenKind::Caret => Some((BinOp::Pow, 70)),
            _ => None,
        }
    }

    /// Iterative precedence climbing. Parses a unary operand, then keeps
    /// folding `op rhs` pairs while the next operator binds tighter than
    /// `min_prec`. The right-hand side parses at the operator's own
    /// precedence, so equal-precedence operators associate to the left.
    fn binary_expr(&mut self, min_prec: u8) -> Result<Expr, Diagnostic> {
        let mut left = self.unary_expr()?;

        while let Some((op, prec)) = Self::binary_prec(&self.peek_kind()) {
            if prec <= min_prec {
                break;
            }
            self.advance_token();
            let right = self.binary_expr(prec)?;
            let span = left.span.merge(right.span);
            left = self.new_expr(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// `!` binds tighter than any binary operator but looser than `.`.
    fn unary_expr(&mut self) -> Result<Expr, Diagnostic> {
        if self.check(&TokenKind::Bang) {
            let start = self.current_span();
            self.advance_token();
            let operand = self.unary_expr()?;
            let span = start.merge(operand.span);
            return Ok(self.new_expr(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.postfix_expr()
    }

    /// Method-call chains: `recv.m()...` — the tightest-binding form.
    fn postfix_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.primary_expr()?;

        while self.match_token(TokenKind::Dot) {
            let method = self.expect_identifier()?;
            self.expect(TokenKind::LParen)?;
            let args = self.call_args()?;
            let end = self.current_span();
            self.expect(TokenKind::RParen)?;
            let span = expr.span.merge(end);
            expr = self.new_expr(
                ExprKind::MethodCall {
                    receiver: Box::new(expr),
                    method,
                    args,
                },
                span,
            );
        }

        Ok(expr)
    }

    fn primary_expr(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.advance_token();
        let start = token.span;

        match token.kind {
            TokenKind::Int(n) => Ok(self.new_expr(ExprKind::IntLit(n), start)),
            TokenKind::Float(n) => Ok(self.new_expr(ExprKind::FloatLit(n), start)),
            TokenKind::True => Ok(self.new_expr(ExprKind::BoolLit(true), start)),
            TokenKind::False => Ok(self.new_expr(ExprKind::BoolLit(false), start)),
            TokenKind::Char(c) => Ok(self.new_expr(ExprKind::CharLit(c), start)),
            TokenKind::Str(s) => Ok(self.new_expr(ExprKind::StringLit(s), start)),

            TokenKind::Identifier(name) => {
                if self.match_token(TokenKind::LParen) {
                    let args = self.call_args()?;
                    let end = self.current_span();
                    self.expect(TokenKind::RParen)?;
                    Ok(self.new_expr(
                        ExprKind::Call { callee: name, args },
                        start.merge(end),
                    ))
                } else {
                    Ok(self.new_expr(ExprKind::Ident(name), start))
                }
            }

            TokenKind::LParen => {
                let mut expr = self.expression()?;
                let end = self.current_span();
                self.expect(TokenKind::RParen)?;
                // The parenthesized expression adopts the span covering
                // the parentheses themselves.
                expr.span = start.merge(end);
                Ok(expr)
            }

            _ => Err(Diagnostic::error(
                ErrorCode::ExpectedExpr,
                &self.file,
                start,
                vec![token.kind.to_string()],
            )),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        args.push(self.expression()?);
        while self.match_token(TokenKind::Comma) {
            args.push(self.expression()?);
        }
        Ok(args)
    }

    // ── Token manipulation ───────────────────────────────────────────

    fn new_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = ExprId(self.next_expr_id);
        self.next_expr_id += 1;
        Expr { id, kind, span }
    }

    fn advance_token(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.current].kind.clone()
    }

    fn peek_next_kind(&self) -> TokenKind {
        let next = (self.current + 1).min(self.tokens.len() - 1);
        self.tokens[next].kind.clone()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.tokens[self.current].kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), Diagnostic> {
        if self.check(&kind) {
            self.current += 1;
            Ok(())
        } else {
            let got = &self.tokens[self.current];
            Err(Diagnostic::error(
                ErrorCode::ExpectedToken,
                &self.file,
                got.span,
                vec![kind.to_string(), got.kind.to_string()],
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, Diagnostic> {
        let token = self.advance_token();
        match token.kind {
            TokenKind::Identifier(name) => Ok(name),
            other => Err(Diagnostic::error(
                ErrorCode::ExpectedToken,
                &self.file,
                token.span,
                vec!["identifier".into(), other.to_string()],
            )),
        }
    }

    fn current_span(&self) -> Span {
        self.tokens[self.current].span
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.current.saturating_sub(1)].span
    }

    fn is_at_end(&self) -> bool {
        matches!(self.tokens[self.current].kind, TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_source(source: &str) -> Program {
        let tokens = lexer::lex(source, "test.coal").expect("lexer errors");
        parse(tokens, "test.coal").expect("parse errors")
    }

    fn parse_expr_stmt(source: &str) -> Expr {
        let program = parse_source(&format!("fn main() {{ {} }}", source));
        match program[0].body.stmts[0].kind.clone() {
            StmtKind::Expression(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn walk_exprs(expr: &Expr, out: &mut Vec<Expr>) {
        out.push(expr.clone());
        match &expr.kind {
            ExprKind::Unary { operand, .. } => walk_exprs(operand, out),
            ExprKind::Binary { left, right, .. } => {
                walk_exprs(left, out);
                walk_exprs(right, out);
            }
            ExprKind::Call { args, .. } => args.iter().for_each(|a| walk_exprs(a, out)),
            ExprKind::MethodCall { receiver, args, .. } => {
                walk_exprs(receiver, out);
                args.iter().for_each(|a| walk_exprs(a, out));
            }
            _ => {}
        }
    }

    #[test]
    fn test_fn_decl() {
        let program = parse_source("fn main() { }");
        assert_eq!(program.len(), 1);
        assert_eq!(program[0].name, "main");
        assert!(program[0].params.is_empty());
        assert!(program[0].body.stmts.is_empty());
    }

    #[test]
    fn test_return_type_is_parsed_and_kept() {
        let program = parse_source("fn main(): int { }");
        assert_eq!(program[0].return_type.as_ref().unwrap().name, "int");
    }

    #[test]
    fn test_var_decl_forms() {
        let program = parse_source(
            "fn main() { var a: int = 1 var b = 2 var c: float const d = true }",
        );
        let stmts = &program[0].body.stmts;
        assert_eq!(stmts.len(), 4);
        match &stmts[0].kind {
            StmtKind::VarDecl {
                name,
                ty,
                init,
                is_const,
            } => {
                assert_eq!(name, "a");
                assert_eq!(ty.as_ref().unwrap().name, "int");
                assert!(init.is_some());
                assert!(!is_const);
            }
            other => panic!("expected VarDecl, got {:?}", other),
        }
        match &stmts[3].kind {
            StmtKind::VarDecl { is_const, .. } => assert!(is_const),
            other => panic!("expected VarDecl, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_lookahead() {
        let program = parse_source("fn main() { x = 1 x }");
        let stmts = &program[0].body.stmts;
        assert!(matches!(stmts[0].kind, StmtKind::Assign { .. }));
        assert!(matches!(stmts[1].kind, StmtKind::Expression(_)));
    }

    #[test]
    fn test_plus_eq_desugars_to_add() {
        let program = parse_source("fn main() { x += 2 }");
        match &program[0].body.stmts[0].kind {
            StmtKind::Assign { name, value } => {
                assert_eq!(name, "x");
                match &value.kind {
                    ExprKind::Binary { left, op, right } => {
                        assert_eq!(*op, BinOp::Add);
                        assert!(matches!(&left.kind, ExprKind::Ident(n) if n == "x"));
                        assert!(matches!(right.kind, ExprKind::IntLit(2)));
                    }
                    other => panic!("expected Binary, got {:?}", other),
                }
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 ^ 2 parses as 1 + (2 * (3 ^ 2))
        let expr = parse_expr_stmt("1 + 2 * 3 ^ 2");
        match expr.kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(op, BinOp::Add);
                match right.kind {
                    ExprKind::Binary { op, right, .. } => {
                        assert_eq!(op, BinOp::Mul);
                        assert!(matches!(
                            right.kind,
                            ExprKind::Binary { op: BinOp::Pow, .. }
                        ));
                    }
                    other => panic!("expected Mul, got {:?}", other),
                }
            }
            other => panic!("expected Add, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        // a - b - c parses as (a - b) - c
        let expr = parse_expr_stmt("a - b - c");
        match expr.kind {
            ExprKind::Binary { op, left, .. } => {
                assert_eq!(op, BinOp::Sub);
                assert!(matches!(
                    left.kind,
                    ExprKind::Binary { op: BinOp::Sub, .. }
                ));
            }
            other => panic!("expected Sub, got {:?}", other),
        }

        // Power is left-associative too: 2 ^ 3 ^ 2 is (2 ^ 3) ^ 2
        let expr = parse_expr_stmt("2 ^ 3 ^ 2");
        match expr.kind {
            ExprKind::Binary { op, left, .. } => {
                assert_eq!(op, BinOp::Pow);
                assert!(matches!(
                    left.kind,
                    ExprKind::Binary { op: BinOp::Pow, .. }
                ));
            }
            other => panic!("expected Pow, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_precedence() {
        // a || b && c parses as a || (b && c)
        let expr = parse_expr_stmt("a || b && c");
        match expr.kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(op, BinOp::Or);
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary { op: BinOp::And, .. }
                ));
            }
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_not_binds_tighter_than_binary() {
        // !a && b parses as (!a) && b
        let expr = parse_expr_stmt("!a && b");
        match expr.kind {
            ExprKind::Binary { op, left, .. } => {
                assert_eq!(op, BinOp::And);
                assert!(matches!(left.kind, ExprKind::Unary { .. }));
            }
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_method_call_binds_tighter_than_not() {
        // !a.toBool() would parse as !(a.toBool()); check shape with toString
        let expr = parse_expr_stmt("!a.toString()");
        match expr.kind {
            ExprKind::Unary { operand, .. } => {
                assert!(matches!(operand.kind, ExprKind::MethodCall { .. }));
            }
            other => panic!("expected Unary, got {:?}", other),
        }
    }

    #[test]
    fn test_method_call_chain() {
        let expr = parse_expr_stmt("x.toString().toInt()");
        match expr.kind {
            ExprKind::MethodCall {
                receiver, method, ..
            } => {
                assert_eq!(method, "toInt");
                assert!(matches!(receiver.kind, ExprKind::MethodCall { .. }));
            }
            other => panic!("expected MethodCall, got {:?}", other),
        }
    }

    #[test]
    fn test_call() {
        let expr = parse_expr_stmt("println(42)");
        match expr.kind {
            ExprKind::Call { callee, args } => {
                assert_eq!(callee, "println");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_span_covers_parens() {
        let source = "fn main() { (1 + 2) }";
        let program = parse_source(source);
        match &program[0].body.stmts[0].kind {
            StmtKind::Expression(expr) => {
                assert_eq!(&source[expr.span.start..expr.span.end], "(1 + 2)");
            }
            other => panic!("expected Expression, got {:?}", other),
        }
    }

    #[test]
    fn test_if_elif_else() {
        let program = parse_source(
            "fn main() { if (a) { 1 } elif (b) { 2 } elif (c) { 3 } else { 4 } }",
        );
        match &program[0].body.stmts[0].kind {
            StmtKind::If {
                branches,
                else_body,
            } => {
                assert_eq!(branches.len(), 3);
                assert!(else_body.is_some());
            }
            other => panic!("expected If, got {:?}", other),
        }
    }

    #[test]
    fn test_while() {
        let program = parse_source("fn main() { while (a < 10) { a += 1 } }");
        match &program[0].body.stmts[0].kind {
            StmtKind::While { body, .. } => assert_eq!(body.stmts.len(), 1),
            other => panic!("expected While, got {:?}", other),
        }
    }

    #[test]
    fn test_spans_lie_within_source() {
        let source = "fn main() { var x: int = 1 + 2 * 3 if (x == 7) { println(x.toString()) } }";
        let program = parse_source(source);
        let mut exprs = Vec::new();
        for stmt in &program[0].body.stmts {
            assert!(stmt.span.start < stmt.span.end);
            assert!(stmt.span.end <= source.len());
            match &stmt.kind {
                StmtKind::VarDecl { init: Some(e), .. } => walk_exprs(e, &mut exprs),
                StmtKind::If { branches, .. } => {
                    for b in branches {
                        walk_exprs(&b.cond, &mut exprs);
                        for s in &b.body.stmts {
                            if let StmtKind::Expression(e) = &s.kind {
                                walk_exprs(e, &mut exprs);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        assert!(!exprs.is_empty());
        for expr in &exprs {
            assert!(expr.span.start < expr.span.end);
            assert!(expr.span.end <= source.len());
        }
    }

    #[test]
    fn test_expr_ids_are_unique() {
        let source = "fn main() { var x = 1 + 2 x += x * 3 }";
        let program = parse_source(source);
        let mut exprs = Vec::new();
        for stmt in &program[0].body.stmts {
            match &stmt.kind {
                StmtKind::VarDecl { init: Some(e), .. } => walk_exprs(e, &mut exprs),
                StmtKind::Assign { value, .. } => walk_exprs(value, &mut exprs),
                _ => {}
            }
        }
        let mut ids: Vec<u32> = exprs.iter().map(|e| e.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), exprs.len());
    }

    #[test]
    fn test_expected_token_error() {
        let tokens = lexer::lex("fn main( { }", "t").unwrap();
        let err = parse(tokens, "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedToken);
    }

    #[test]
    fn test_expected_expr_error() {
        let tokens = lexer::lex("fn main() { var x = } }", "t").unwrap();
        let err = parse(tokens, "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedExpr);
    }
}

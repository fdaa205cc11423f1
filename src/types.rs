//! Type analyzer — scope resolution and static type checking.
//!
//! The analyzer walks the AST once, resolves every identifier against a
//! stack of lexical scopes, and checks the monomorphic typing rules of
//! Coal: no implicit promotion, `bool`-only conditions, `const`
//! discipline, and the small builtin surface (`print`/`println` and the
//! zero-argument conversion methods).
//!
//! The result is a [`TypeTable`]: a side table mapping every expression
//! node (by its [`ExprId`]) and every declared local (by `(fn, var)`) to
//! its resolved type. The AST itself is never mutated; the emitter reads
//! the table alongside the tree.
//!
//! Like every other stage, analysis fails fast on the first error.

use std::collections::HashMap;
use std::fmt;

use crate::ast::*;
use crate::errors::{Diagnostic, ErrorCode};
use crate::token::Span;

// ── Type representation ──────────────────────────────────────────────

/// A Coal type. The set is closed; there are no user-defined types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Bool,
    Char,
    Str,
}

impl Type {
    /// Resolve a source-level type name.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int),
            "float" => Some(Type::Float),
            "bool" => Some(Type::Bool),
            "char" => Some(Type::Char),
            "string" => Some(Type::Str),
            _ => None,
        }
    }

    /// Valid operand of `+ - * / ^`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Valid operand of `< <= > >=`.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Char)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::Str => write!(f, "string"),
        }
    }
}

// ── Type table ───────────────────────────────────────────────────────

/// Read-only output of the analyzer: expression types keyed by node
/// identity, and declared local types keyed by `(function, variable)`.
#[derive(Debug, Default)]
pub struct TypeTable {
    exprs: HashMap<ExprId, Type>,
    locals: HashMap<(String, String), Type>,
}

impl TypeTable {
    pub fn expr(&self, id: ExprId) -> Option<Type> {
        self.exprs.get(&id).copied()
    }

    pub fn local(&self, function: &str, variable: &str) -> Option<Type> {
        self.locals
            .get(&(function.to_string(), variable.to_string()))
            .copied()
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    fn record_expr(&mut self, id: ExprId, ty: Type) {
        self.exprs.insert(id, ty);
    }

    /// First declaration wins: a shadowing redeclaration keeps the
    /// original entry, matching the debug-mirror global it shares.
    fn record_local(&mut self, function: &str, variable: &str, ty: Type) {
        self.locals
            .entry((function.to_string(), variable.to_string()))
            .or_insert(ty);
    }
}

// ── Compile-time string conversions ──────────────────────────────────
//
// `"42".toInt()` folds at compile time; the analyzer validates the
// payload here so emission cannot fail on it. The emitter uses the same
// helpers to produce the constant.

pub(crate) fn fold_string_to_int(payload: &str) -> Option<i32> {
    payload.trim().parse::<i32>().ok()
}

pub(crate) fn fold_string_to_float(payload: &str) -> Option<f64> {
    payload.trim().parse::<f64>().ok()
}

// ── Analyzer ─────────────────────────────────────────────────────────

/// Check a program and produce its [`TypeTable`].
pub fn check(program: &Program, file: &str) -> Result<TypeTable, Diagnostic> {
    Analyzer::new(file).check(program)
}

struct VarInfo {
    ty: Type,
    is_const: bool,
}

struct Analyzer {
    file: String,
    /// Global function table, collected in a pre-pass.
    functions: HashMap<String, Span>,
    /// Innermost scope last. Inner declarations shadow outer ones.
    scopes: Vec<HashMap<String, VarInfo>>,
    current_fn: String,
    table: TypeTable,
}

impl Analyzer {
    fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            functions: HashMap::new(),
            scopes: Vec::new(),
            current_fn: String::new(),
            table: TypeTable::default(),
        }
    }

    fn check(mut self, program: &Program) -> Result<TypeTable, Diagnostic> {
        for decl in program {
            self.functions.insert(decl.name.clone(), decl.span);
        }

        for decl in program {
            self.current_fn = decl.name.clone();
            self.check_block(&decl.body)?;
        }

        Ok(self.table)
    }

    fn check_block(&mut self, block: &Block) -> Result<(), Diagnostic> {
        self.scopes.push(HashMap::new());
        for stmt in &block.stmts {
            let result = self.check_stmt(stmt);
            if result.is_err() {
                self.scopes.pop();
                return result;
            }
        }
        self.scopes.pop();
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), Diagnostic> {
        match &stmt.kind {
            StmtKind::VarDecl {
                name,
                ty,
                init,
                is_const,
            } => self.check_var_decl(stmt.span, name, ty.as_ref(), init.as_ref(), *is_const),

            StmtKind::Assign { name, value } => {
                let value_ty = self.check_expr(value)?;
                let info = self.lookup(name).ok_or_else(|| {
                    self.error(ErrorCode::UndefinedVariable, stmt.span, vec![name.clone()])
                })?;
                if info.is_const {
                    return Err(self.error(
                        ErrorCode::AssignToConst,
                        stmt.span,
                        vec![name.clone()],
                    ));
                }
                if info.ty != value_ty {
                    return Err(self.error(
                        ErrorCode::TypeMismatch,
                        stmt.span,
                        vec![info.ty.to_string(), value_ty.to_string()],
                    ));
                }
                Ok(())
            }

            StmtKind::Expression(expr) => {
                self.check_expr(expr)?;
                Ok(())
            }

            StmtKind::If {
                branches,
                else_body,
            } => {
                for branch in branches {
                    let cond_ty = self.check_expr(&branch.cond)?;
                    if cond_ty != Type::Bool {
                        return Err(self.error(
                            ErrorCode::NonBoolCondition,
                            branch.cond.span,
                            vec![cond_ty.to_string()],
                        ));
                    }
                    self.check_block(&branch.body)?;
                }
                if let Some(body) = else_body {
                    self.check_block(body)?;
                }
                Ok(())
            }

            StmtKind::While { cond, body } => {
                let cond_ty = self.check_expr(cond)?;
                if cond_ty != Type::Bool {
                    return Err(self.error(
                        ErrorCode::NonBoolCondition,
                        cond.span,
                        vec![cond_ty.to_string()],
                    ));
                }
                self.check_block(body)
            }
        }
    }

    fn check_var_decl(
        &mut self,
        span: Span,
        name: &str,
        ty: Option<&TypeRef>,
        init: Option<&Expr>,
        is_const: bool,
    ) -> Result<(), Diagnostic> {
        let annotated = match ty {
            Some(type_ref) => Some(Type::from_name(&type_ref.name).ok_or_else(|| {
                self.error(
                    ErrorCode::InvalidType,
                    type_ref.span,
                    vec![type_ref.name.clone()],
                )
            })?),
            None => None,
        };

        let initialized = match init {
            Some(expr) => Some(self.check_expr(expr)?),
            None => None,
        };

        if is_const && initialized.is_none() {
            return Err(self.error(ErrorCode::ConstNeedsInit, span, vec![name.to_string()]));
        }

        let var_ty = match (annotated, initialized) {
            (Some(a), Some(i)) => {
                if a != i {
                    return Err(self.error(
                        ErrorCode::TypeMismatch,
                        span,
                        vec![a.to_string(), i.to_string()],
                    ));
                }
                a
            }
            (Some(a), None) => a,
            (None, Some(i)) => i,
            (None, None) => {
                return Err(self.error(ErrorCode::VarNeedsType, span, vec![name.to_string()]));
            }
        };

        if self
            .scopes
            .last()
            .expect("scope stack empty")
            .contains_key(name)
        {
            return Err(self.error(
                ErrorCode::RedeclaredVariable,
                span,
                vec![name.to_string()],
            ));
        }
        self.scopes.last_mut().expect("scope stack empty").insert(
            name.to_string(),
            VarInfo {
                ty: var_ty,
                is_const,
            },
        );
        let function = self.current_fn.clone();
        self.table.record_local(&function, name, var_ty);
        Ok(())
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, Diagnostic> {
        let ty = match &expr.kind {
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::FloatLit(_) => Type::Float,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::CharLit(_) => Type::Char,
            ExprKind::StringLit(_) => Type::Str,

            ExprKind::Ident(name) => {
                self.lookup(name)
                    .map(|info| info.ty)
                    .ok_or_else(|| {
                        self.error(ErrorCode::UndefinedVariable, expr.span, vec![name.clone()])
                    })?
            }

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.check_expr(operand)?;
                match op {
                    UnaryOp::Not => {
                        if operand_ty != Type::Bool {
                            return Err(self.error(
                                ErrorCode::NotConditionBool,
                                expr.span,
                                vec![operand_ty.to_string()],
                            ));
                        }
                        Type::Bool
                    }
                }
            }

            ExprKind::Binary { left, op, right } => {
                self.check_binary(expr.span, left, *op, right)?
            }

            ExprKind::Call { callee, args } => self.check_call(expr.span, callee, args)?,

            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => self.check_method_call(expr.span, receiver, method, args)?,
        };

        self.table.record_expr(expr.id, ty);
        Ok(ty)
    }

    fn check_binary(
        &mut self,
        span: Span,
        left: &Expr,
        op: BinOp,
        right: &Expr,
    ) -> Result<Type, Diagnostic> {
        let lt = self.check_expr(left)?;
        let rt = self.check_expr(right)?;

        if op.is_logical() {
            for ty in [lt, rt] {
                if ty != Type::Bool {
                    return Err(self.error(
                        ErrorCode::LogicNeedsBool,
                        span,
                        vec![op.symbol().to_string(), ty.to_string()],
                    ));
                }
            }
            return Ok(Type::Bool);
        }

        if op.is_equality() {
            if lt != rt {
                return Err(self.error(
                    ErrorCode::CompareTypeMismatch,
                    span,
                    vec![lt.to_string(), rt.to_string()],
                ));
            }
            return Ok(Type::Bool);
        }

        if op.is_ordering() {
            if lt != rt {
                return Err(self.error(
                    ErrorCode::CompareTypeMismatch,
                    span,
                    vec![lt.to_string(), rt.to_string()],
                ));
            }
            if !lt.is_ordered() {
                return Err(self.error(
                    ErrorCode::RelopTypeInvalid,
                    span,
                    vec![lt.to_string()],
                ));
            }
            return Ok(Type::Bool);
        }

        // Arithmetic. Operands must agree exactly: mixing int and float
        // is an error, there is no implicit promotion.
        if lt != rt {
            return Err(self.error(
                ErrorCode::TypeMismatch,
                span,
                vec![lt.to_string(), rt.to_string()],
            ));
        }

        if lt == Type::Str {
            if op == BinOp::Add {
                return Ok(Type::Str);
            }
            return Err(self.error(
                ErrorCode::StringsOnlyAdd,
                span,
                vec![op.symbol().to_string()],
            ));
        }

        if op == BinOp::Mod && lt != Type::Int {
            return Err(self.error(
                ErrorCode::TypeMismatch,
                span,
                vec!["int".to_string(), lt.to_string()],
            ));
        }

        if !lt.is_numeric() {
            return Err(self.error(
                ErrorCode::TypeMismatch,
                span,
                vec!["int or float".to_string(), lt.to_string()],
            ));
        }

        Ok(lt)
    }

    fn check_call(&mut self, span: Span, callee: &str, args: &[Expr]) -> Result<Type, Diagnostic> {
        if callee != "print" && callee != "println" {
            let mut diag =
                self.error(ErrorCode::UnknownFunction, span, vec![callee.to_string()]);
            if self.functions.contains_key(callee) {
                diag = diag
                    .with_note("calls to user-defined functions are not supported yet");
            }
            return Err(diag);
        }

        if args.len() != 1 {
            return Err(self.error(
                ErrorCode::ArityMismatch,
                span,
                vec![callee.to_string(), "1".to_string(), args.len().to_string()],
            ));
        }

        // Every Coal type is printable; checking the argument records
        // its type for the emitter's format-string selection.
        self.check_expr(&args[0])?;
        Ok(Type::Int)
    }

    fn check_method_call(
        &mut self,
        span: Span,
        receiver: &Expr,
        method: &str,
        args: &[Expr],
    ) -> Result<Type, Diagnostic> {
        let recv_ty = self.check_expr(receiver)?;

        if !args.is_empty() {
            return Err(self.error(
                ErrorCode::ArityMismatch,
                span,
                vec![method.to_string(), "0".to_string(), args.len().to_string()],
            ));
        }

        match method {
            "toString" => Ok(Type::Str),
            "toInt" => {
                if let ExprKind::StringLit(payload) = &receiver.kind {
                    if fold_string_to_int(payload).is_none() {
                        return Err(self
                            .error(
                                ErrorCode::UnsupportedConversion,
                                span,
                                vec![format!("\"{}\"", payload), "toInt".to_string()],
                            )
                            .with_note("the literal is not a decimal integer"));
                    }
                }
                Ok(Type::Int)
            }
            "toFloat" => {
                if let ExprKind::StringLit(payload) = &receiver.kind {
                    if fold_string_to_float(payload).is_none() {
                        return Err(self
                            .error(
                                ErrorCode::UnsupportedConversion,
                                span,
                                vec![format!("\"{}\"", payload), "toFloat".to_string()],
                            )
                            .with_note("the literal is not a decimal number"));
                    }
                }
                Ok(Type::Float)
            }
            _ => Err(self.error(
                ErrorCode::UnknownMethod,
                span,
                vec![method.to_string(), recv_ty.to_string()],
            )),
        }
    }

    // ── Scope helpers ────────────────────────────────────────────────

    fn lookup(&self, name: &str) -> Option<&VarInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn error(&self, code: ErrorCode, span: Span, args: Vec<String>) -> Diagnostic {
        Diagnostic::error(code, &self.file, span, args)
    }
}

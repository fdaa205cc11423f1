//! Abstract syntax tree for the Coal language.
//!
//! Every node carries a [`Span`] for error reporting. The tree is
//! immutable once the parser hands it over: the type analyzer records
//! its results in a side table keyed by [`ExprId`] rather than mutating
//! nodes, and the emitter walks the same tree read-only.

use serde::Serialize;

use crate::token::Span;

/// A complete program is a sequence of function declarations.
pub type Program = Vec<FnDecl>;

/// `fn name() { body }`. Parameter lists and return-type annotations
/// are accepted by the grammar but carry no meaning yet: parameters are
/// always empty and every function returns `int`.
#[derive(Debug, Clone, Serialize)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<String>,
    pub return_type: Option<TypeRef>,
    pub body: Block,
    pub span: Span,
}

/// A braced statement list.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ── Statements ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub enum StmtKind {
    /// `var x: int = expr` / `const x = expr`. Either the annotation or
    /// the initializer may be missing, not both.
    VarDecl {
        name: String,
        ty: Option<TypeRef>,
        init: Option<Expr>,
        is_const: bool,
    },

    /// `x = expr`. `x += expr` is desugared to this form by the parser.
    Assign { name: String, value: Expr },

    /// Expression used as a statement (the value is discarded).
    Expression(Expr),

    /// `if (c) { .. } elif (c) { .. } else { .. }`
    If {
        branches: Vec<IfBranch>,
        else_body: Option<Block>,
    },

    /// `while (c) { .. }`
    While { cond: Expr, body: Block },
}

/// One `if`/`elif` arm: a condition and its body.
#[derive(Debug, Clone, Serialize)]
pub struct IfBranch {
    pub cond: Expr,
    pub body: Block,
}

// ── Expressions ──────────────────────────────────────────────────────

/// Identity of an expression node, assigned by the parser. The type
/// table is keyed by these ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExprId(pub u32);

#[derive(Debug, Clone, Serialize)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub enum ExprKind {
    /// `42`
    IntLit(i64),

    /// `3.14`
    FloatLit(f64),

    /// `true` / `false`
    BoolLit(bool),

    /// `'a'`
    CharLit(char),

    /// `"hello"` (unescaped content)
    StringLit(String),

    /// `x`
    Ident(String),

    /// `!b`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// `a + b`, `a == b`, ...
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// `println(x)` — the callee is a plain name.
    Call { callee: String, args: Vec<Expr> },

    /// `x.toString()`
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
}

// ── Operators ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// The source-level spelling, for diagnostics.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne)
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
}

// ── Type references ──────────────────────────────────────────────────

/// A type annotation as written in the source, e.g. `int` in
/// `var x: int`. Resolution to a [`crate::types::Type`] happens in the
/// analyzer; unknown names are rejected there.
#[derive(Debug, Clone, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub span: Span,
}

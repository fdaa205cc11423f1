//! Token types for the Coal language.
//!
//! Each token carries its kind, lexeme (the raw source text), and a span
//! indicating its position in the source. Spans enable precise error
//! reporting: we can underline the exact characters that caused an error.

use std::fmt;

use serde::Serialize;

/// Byte offset range in the source string, plus the 1-based line and
/// column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, col: u32) -> Self {
        Self {
            start,
            end,
            line,
            col,
        }
    }

    /// Merge two spans into one that covers both. Line and column come
    /// from the left-hand span.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            col: self.col,
        }
    }
}

/// All token kinds in the Coal language. Literal payloads are decoded
/// at lex time: the numeric value for numbers, the code point for char
/// literals, and the unescaped content for strings.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),

    // Identifiers
    Identifier(String),

    // Keywords
    Fn,
    Var,
    Const,
    True,
    False,
    KwInt,
    KwFloat,
    KwBool,
    KwChar,
    KwString,
    If,
    Elif,
    Else,
    While,

    // Punctuation
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    Colon,  // :
    Comma,  // ,
    Dot,    // .
    DotDot, // ..

    // Operators
    Eq,      // =
    EqEq,    // ==
    Bang,    // !
    BangEq,  // !=
    PlusEq,  // +=
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    Caret,   // ^
    Lt,      // <
    LtEq,    // <=
    Gt,      // >
    GtEq,    // >=
    AndAnd,  // &&
    OrOr,    // ||

    // Special
    Eof,
}

impl TokenKind {
    /// Stable kind name used by the token printers.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Int(_) => "IntLiteral",
            TokenKind::Float(_) => "FloatLiteral",
            TokenKind::Char(_) => "CharLiteral",
            TokenKind::Str(_) => "StringLiteral",
            TokenKind::Identifier(_) => "Identifier",
            TokenKind::Fn => "KwFn",
            TokenKind::Var => "KwVar",
            TokenKind::Const => "KwConst",
            TokenKind::True => "KwTrue",
            TokenKind::False => "KwFalse",
            TokenKind::KwInt => "KwInt",
            TokenKind::KwFloat => "KwFloat",
            TokenKind::KwBool => "KwBool",
            TokenKind::KwChar => "KwChar",
            TokenKind::KwString => "KwString",
            TokenKind::If => "KwIf",
            TokenKind::Elif => "KwElif",
            TokenKind::Else => "KwElse",
            TokenKind::While => "KwWhile",
            TokenKind::LParen => "LParen",
            TokenKind::RParen => "RParen",
            TokenKind::LBrace => "LBrace",
            TokenKind::RBrace => "RBrace",
            TokenKind::Colon => "Colon",
            TokenKind::Comma => "Comma",
            TokenKind::Dot => "Dot",
            TokenKind::DotDot => "DotDot",
            TokenKind::Eq => "Assign",
            TokenKind::EqEq => "EqEq",
            TokenKind::Bang => "Bang",
            TokenKind::BangEq => "BangEq",
            TokenKind::PlusEq => "PlusEq",
            TokenKind::Plus => "Plus",
            TokenKind::Minus => "Minus",
            TokenKind::Star => "Star",
            TokenKind::Slash => "Slash",
            TokenKind::Percent => "Percent",
            TokenKind::Caret => "Caret",
            TokenKind::Lt => "Lt",
            TokenKind::LtEq => "LtEq",
            TokenKind::Gt => "Gt",
            TokenKind::GtEq => "GtEq",
            TokenKind::AndAnd => "AndAnd",
            TokenKind::OrOr => "OrOr",
            TokenKind::Eof => "Eof",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(n) => write!(f, "{}", n),
            TokenKind::Float(n) => write!(f, "{}", n),
            TokenKind::Char(c) => write!(f, "'{}'", c),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::Identifier(s) => write!(f, "{}", s),
            TokenKind::Fn => write!(f, "fn"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::Const => write!(f, "const"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::KwInt => write!(f, "int"),
            TokenKind::KwFloat => write!(f, "float"),
            TokenKind::KwBool => write!(f, "bool"),
            TokenKind::KwChar => write!(f, "char"),
            TokenKind::KwString => write!(f, "string"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Elif => write!(f, "elif"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::While => write!(f, "while"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::DotDot => write!(f, ".."),
            TokenKind::Eq => write!(f, "="),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::BangEq => write!(f, "!="),
            TokenKind::PlusEq => write!(f, "+="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::AndAnd => write!(f, "&&"),
            TokenKind::OrOr => write!(f, "||"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

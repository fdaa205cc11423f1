//! Coal compiler — frontend and backend for the Coal programming language.
//!
//! # Compiler pipeline
//!
//! ```text
//! Source code (.coal)
//!     │
//!     ▼
//! ┌──────────┐
//! │  Lexer    │  Tokenizes source into a stream of tokens with spans
//! └────┬─────┘
//!      │
//!      ▼
//! ┌──────────┐
//! │  Parser   │  Recursive descent + precedence climbing, builds the AST
//! └────┬─────┘
//!      │
//!      ▼
//! ┌──────────┐
//! │  Types    │  Scope resolution and static checking, fills the TypeTable
//! └────┬─────┘
//!      │
//!      ▼
//! ┌──────────┐
//! │ Emitter   │  Lowers the typed AST to a textual LLVM IR module
//! └────┬─────┘
//!      │
//!      ▼
//! LLVM IR (.ll), handed to a C compiler driver for the final binary
//! ```
//!
//! The pipeline is strictly linear and fails fast: each stage either
//! produces the next stage's input or a single [`Diagnostic`].

pub mod ast;
pub mod emitter;
pub mod errors;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod types;

pub use errors::{Diagnostic, ErrorCode, Severity};

/// Run the whole pipeline: source text in, LLVM IR module text out.
/// `file` labels diagnostics and the IR module header.
pub fn compile(source: &str, file: &str) -> Result<String, Diagnostic> {
    let tokens = lexer::lex(source, file)?;
    let program = parser::parse(tokens, file)?;
    let table = types::check(&program, file)?;
    emitter::emit(&program, &table, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_and_print() {
        let ir = compile("fn main() { var x: int = 40 + 2 println(x) }", "t.coal").unwrap();
        assert!(ir.contains("add i32 40, 2"));
        assert!(ir.contains("c\"%d\\0A\\00\""));
        assert!(ir.contains("call i32 (ptr, ...) @printf"));
        assert!(ir.contains("ret i32 0"));
    }

    #[test]
    fn test_string_concat_round_trip() {
        let ir = compile(
            "fn main() { var a: string = \"foo\" var b: string = a + \"bar\" println(b) }",
            "t.coal",
        )
        .unwrap();
        assert!(ir.contains("zext i32 %t5 to i64"));
        assert!(ir.contains("call ptr @malloc(i64"));
        assert_eq!(ir.matches("call ptr @memcpy(").count(), 2);
        assert!(ir.contains("store i8 0, ptr"));
        assert!(ir.contains("c\"%s\\0A\\00\""));
    }

    #[test]
    fn test_short_circuit() {
        let ir = compile(
            "fn main() { var a: bool = false && 1 < 2 var b: bool = true || 1 < 2 }",
            "t.coal",
        )
        .unwrap();
        assert!(ir.contains("phi i1 [ 0, %and_false"));
        assert!(ir.contains("phi i1 [ 1, %or_true"));
    }

    #[test]
    fn test_const_reassignment_fails() {
        let err = compile("fn main() { const x: int = 1  x = 2 }", "t.coal").unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignToConst);
    }

    #[test]
    fn test_type_mismatch_fails() {
        let err = compile("fn main() { var x: int = 1.5 }", "t.coal").unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);
        assert_eq!(err.args, vec!["int".to_string(), "float".to_string()]);
    }

    #[test]
    fn test_if_elif_else_prints_the_right_branch() {
        let ir = compile(
            "fn main() {\n\
             var x: int = 3\n\
             if (x == 1) { println(1) }\n\
             elif (x == 2) { println(2) }\n\
             else { println(3) }\n\
             }",
            "t.coal",
        )
        .unwrap();
        assert_eq!(ir.matches("call i32 (ptr, ...) @printf").count(), 3);
        assert!(ir.contains("else3:"));
        assert!(ir.contains("end4:"));
    }

    #[test]
    fn test_lex_error_stops_the_pipeline() {
        let err = compile("fn main() { var x = 1 @ 2 }", "t.coal").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedChar);
        assert_eq!(err.severity, Severity::Error);
    }
}

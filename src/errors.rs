//! Structured diagnostics with source spans.
//!
//! Every stage of the pipeline fails fast: the first problem it finds is
//! returned as a [`Diagnostic`] and the pipeline stops. A diagnostic is a
//! plain value (severity, registry code, file, span, positional message
//! arguments, notes); turning it into terminal output is the caller's
//! job, see [`Diagnostic::render`].

use thiserror::Error;

use crate::token::Span;

/// Diagnostic severity. Warnings exist in the model but no stage
/// currently produces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// The closed registry of diagnostic codes. Each code owns a message
/// template; `{0}`, `{1}`, ... are replaced by the diagnostic's
/// positional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexical
    UnexpectedChar,
    UnterminatedString,
    UnterminatedChar,
    EmptyCharLiteral,
    UnknownEscapeSequence,

    // Syntactic
    ExpectedToken,
    ExpectedExpr,

    // Semantic
    RedeclaredVariable,
    UndefinedVariable,
    AssignToConst,
    ConstNeedsInit,
    VarNeedsType,
    TypeMismatch,
    CompareTypeMismatch,
    RelopTypeInvalid,
    LogicNeedsBool,
    NotConditionBool,
    NonBoolCondition,
    StringsOnlyAdd,
    InvalidType,
    UnknownFunction,
    ArityMismatch,
    UnsupportedPrintType,
    UnknownMethod,
    UnsupportedConversion,

    // Internal
    Internal,
}

impl ErrorCode {
    /// The registry identifier, e.g. `E0001`.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedChar => "E0001",
            ErrorCode::UnterminatedString => "E0002",
            ErrorCode::UnterminatedChar => "E0003",
            ErrorCode::EmptyCharLiteral => "E0004",
            ErrorCode::UnknownEscapeSequence => "E0005",
            ErrorCode::ExpectedToken => "E0101",
            ErrorCode::ExpectedExpr => "E0102",
            ErrorCode::RedeclaredVariable => "E0103",
            ErrorCode::UndefinedVariable => "E0104",
            ErrorCode::AssignToConst => "E0105",
            ErrorCode::ConstNeedsInit => "E0106",
            ErrorCode::VarNeedsType => "E0107",
            ErrorCode::TypeMismatch => "E0108",
            ErrorCode::CompareTypeMismatch => "E0109",
            ErrorCode::RelopTypeInvalid => "E0110",
            ErrorCode::LogicNeedsBool => "E0111",
            ErrorCode::NotConditionBool => "E0112",
            ErrorCode::NonBoolCondition => "E0113",
            ErrorCode::StringsOnlyAdd => "E0114",
            ErrorCode::InvalidType => "E0115",
            ErrorCode::UnknownFunction => "E0116",
            ErrorCode::ArityMismatch => "E0117",
            ErrorCode::UnsupportedPrintType => "E0118",
            ErrorCode::UnknownMethod => "E0119",
            ErrorCode::UnsupportedConversion => "E0120",
            ErrorCode::Internal => "E1001",
        }
    }

    /// The message template for this code.
    pub fn template(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedChar => "unexpected character '{0}'",
            ErrorCode::UnterminatedString => "unterminated string literal",
            ErrorCode::UnterminatedChar => "unterminated char literal",
            ErrorCode::EmptyCharLiteral => "empty char literal",
            ErrorCode::UnknownEscapeSequence => "unknown escape sequence '\\{0}'",
            ErrorCode::ExpectedToken => "expected '{0}', found '{1}'",
            ErrorCode::ExpectedExpr => "expected an expression, found '{0}'",
            ErrorCode::RedeclaredVariable => "variable '{0}' is already declared in this scope",
            ErrorCode::UndefinedVariable => "undefined variable '{0}'",
            ErrorCode::AssignToConst => "cannot assign to constant '{0}'",
            ErrorCode::ConstNeedsInit => "constant '{0}' must be initialized at declaration",
            ErrorCode::VarNeedsType => "variable '{0}' needs a type annotation or an initializer",
            ErrorCode::TypeMismatch => "type mismatch: expected '{0}', found '{1}'",
            ErrorCode::CompareTypeMismatch => "cannot compare '{0}' with '{1}'",
            ErrorCode::RelopTypeInvalid => "ordering comparison is not defined for '{0}'",
            ErrorCode::LogicNeedsBool => "'{0}' requires bool operands, found '{1}'",
            ErrorCode::NotConditionBool => "'!' requires a bool operand, found '{0}'",
            ErrorCode::NonBoolCondition => "condition must be bool, found '{0}'",
            ErrorCode::StringsOnlyAdd => "'{0}' is not defined for strings; only '+' is",
            ErrorCode::InvalidType => "unknown type '{0}'",
            ErrorCode::UnknownFunction => "unknown function '{0}'",
            ErrorCode::ArityMismatch => "'{0}' takes {1} argument(s), found {2}",
            ErrorCode::UnsupportedPrintType => "'{0}' cannot print a value of type '{1}'",
            ErrorCode::UnknownMethod => "no method '{0}' on type '{1}'",
            ErrorCode::UnsupportedConversion => "cannot convert '{0}' via '{1}'",
            ErrorCode::Internal => "internal compiler error: {0}",
        }
    }
}

/// A compiler diagnostic: the structured value handed to the CLI.
#[derive(Debug, Clone, Error)]
#[error("{}", self.message())]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub file: String,
    pub span: Span,
    pub args: Vec<String>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(
        code: ErrorCode,
        file: impl Into<String>,
        span: Span,
        args: Vec<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code,
            file: file.into(),
            span,
            args,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The message template with positional arguments substituted.
    pub fn message(&self) -> String {
        let mut msg = self.code.template().to_string();
        for (i, arg) in self.args.iter().enumerate() {
            msg = msg.replace(&format!("{{{}}}", i), arg);
        }
        msg
    }

    /// Render the diagnostic for a terminal:
    ///
    /// ```text
    /// file:line:col: severity[code]: message
    /// <source line>
    ///    ^^^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = format!(
            "{}:{}:{}: {}[{}]: {}",
            self.file,
            self.span.line,
            self.span.col,
            self.severity.as_str(),
            self.code.code(),
            self.message()
        );

        if let Some(line) = source.lines().nth(self.span.line as usize - 1) {
            out.push('\n');
            out.push_str(line);
            out.push('\n');

            let col = self.span.col as usize;
            let width = (self.span.end - self.span.start).max(1);
            // Clamp the underline to the end of the offending line.
            let width = width.min(line.chars().count().saturating_sub(col - 1)).max(1);
            out.push_str(&" ".repeat(col - 1));
            out.push_str(&"^".repeat(width));
        }

        for note in &self.notes {
            out.push_str("\nnote: ");
            out.push_str(note);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(4, 5, 1, 5)
    }

    #[test]
    fn test_message_substitution() {
        let diag = Diagnostic::error(
            ErrorCode::TypeMismatch,
            "main.coal",
            span(),
            vec!["int".into(), "float".into()],
        );
        assert_eq!(diag.message(), "type mismatch: expected 'int', found 'float'");
    }

    #[test]
    fn test_render_points_at_source() {
        let source = "var x = @";
        let diag = Diagnostic::error(
            ErrorCode::UnexpectedChar,
            "main.coal",
            Span::new(8, 9, 1, 9),
            vec!["@".into()],
        );
        let rendered = diag.render(source);
        assert!(rendered.starts_with("main.coal:1:9: error[E0001]: unexpected character '@'"));
        assert!(rendered.contains("var x = @"));
        assert!(rendered.ends_with("        ^"));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::UnexpectedChar.code(), "E0001");
        assert_eq!(ErrorCode::ExpectedToken.code(), "E0101");
        assert_eq!(ErrorCode::Internal.code(), "E1001");
    }
}

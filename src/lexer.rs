//! Lexer — tokenizes Coal source code.
//!
//! The lexer scans the source string character by character, producing a
//! vector of tokens terminated by `EOF`. Key design decisions:
//!
//! - **Fail fast**: the first lexical error aborts the scan and is
//!   returned as a single diagnostic pointing at the offending byte.
//!
//! - **Span tracking**: every token records its byte offset range plus
//!   the 1-based line/column of its start, so later stages can report
//!   errors that underline the exact problematic characters.
//!
//! - **Keyword recognition**: after scanning an identifier, we check it
//!   against a keyword table. This is simpler than reserving keywords in
//!   the character-scanning phase.
//!
//! Semicolons are treated like whitespace: Coal statements are newline-
//! free-form, and a stray `;` is simply skipped.

use crate::errors::{Diagnostic, ErrorCode};
use crate::token::{Span, Token, TokenKind};

/// Tokenize a source buffer. `file` labels diagnostics.
pub fn lex(source: &str, file: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source, file).scan_tokens()
}

pub struct Lexer<'src> {
    source: &'src str,
    file: String,
    chars: Vec<char>,
    start: usize,      // Start of current token (byte offset)
    start_line: u32,   // Line of current token start (1-based)
    start_col: u32,    // Column of current token start (1-based)
    current: usize,    // Current position (char index)
    byte_pos: usize,   // Current byte position
    line: u32,
    col: u32,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file: &str) -> Self {
        Self {
            source,
            file: file.to_string(),
            chars: source.chars().collect(),
            start: 0,
            start_line: 1,
            start_col: 1,
            current: 0,
            byte_pos: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, Diagnostic> {
        while !self.is_at_end() {
            self.start = self.byte_pos;
            self.start_line = self.line;
            self.start_col = self.col;
            self.scan_token()?;
        }
        self.tokens.push(Token::new(
            TokenKind::Eof,
            "",
            Span::new(self.byte_pos, self.byte_pos, self.line, self.col),
        ));
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), Diagnostic> {
        let c = self.advance();
        match c {
            // Whitespace — skip. Semicolons are tolerated the same way.
            ' ' | '\t' | '\r' | '\n' | ';' => Ok(()),

            // Line comments
            '/' if self.peek() == '/' => {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
                Ok(())
            }

            // Single-character tokens
            '(' => self.add_token(TokenKind::LParen),
            ')' => self.add_token(TokenKind::RParen),
            '{' => self.add_token(TokenKind::LBrace),
            '}' => self.add_token(TokenKind::RBrace),
            ':' => self.add_token(TokenKind::Colon),
            ',' => self.add_token(TokenKind::Comma),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Star),
            '/' => self.add_token(TokenKind::Slash),
            '%' => self.add_token(TokenKind::Percent),
            '^' => self.add_token(TokenKind::Caret),

            // One-or-two character tokens
            '+' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::PlusEq)
                } else {
                    self.add_token(TokenKind::Plus)
                }
            }

            '=' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::EqEq)
                } else {
                    self.add_token(TokenKind::Eq)
                }
            }

            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::BangEq)
                } else {
                    self.add_token(TokenKind::Bang)
                }
            }

            '<' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::LtEq)
                } else {
                    self.add_token(TokenKind::Lt)
                }
            }

            '>' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::GtEq)
                } else {
                    self.add_token(TokenKind::Gt)
                }
            }

            '.' => {
                if self.match_char('.') {
                    self.add_token(TokenKind::DotDot)
                } else {
                    self.add_token(TokenKind::Dot)
                }
            }

            // Coal has no bitwise operators: a lone '&' or '|' is an error.
            '&' => {
                if self.match_char('&') {
                    self.add_token(TokenKind::AndAnd)
                } else {
                    Err(self.error_at_start(ErrorCode::UnexpectedChar, vec!["&".into()]))
                }
            }

            '|' => {
                if self.match_char('|') {
                    self.add_token(TokenKind::OrOr)
                } else {
                    Err(self.error_at_start(ErrorCode::UnexpectedChar, vec!["|".into()]))
                }
            }

            // Literals
            '"' => self.string(),
            '\'' => self.char_literal(),
            c if c.is_ascii_digit() => self.number(c),

            // Identifiers and keywords
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(c),

            _ => Err(self.error_at_start(ErrorCode::UnexpectedChar, vec![c.to_string()])),
        }
    }

    // ── Literal scanners ─────────────────────────────────────────────

    fn string(&mut self) -> Result<(), Diagnostic> {
        let mut value = String::new();
        loop {
            if self.is_at_end() || self.peek() == '\n' {
                return Err(self.error_at_start(ErrorCode::UnterminatedString, vec![]));
            }
            match self.advance() {
                '"' => break,
                '\\' => {
                    let esc_start = self.byte_pos - 1;
                    let (esc_line, esc_col) = (self.line, self.col - 1);
                    if self.is_at_end() {
                        return Err(self.error_at_start(ErrorCode::UnterminatedString, vec![]));
                    }
                    match self.advance() {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        other => {
                            return Err(Diagnostic::error(
                                ErrorCode::UnknownEscapeSequence,
                                &self.file,
                                Span::new(esc_start, self.byte_pos, esc_line, esc_col),
                                vec![other.to_string()],
                            ));
                        }
                    }
                }
                c => value.push(c),
            }
        }
        self.add_token(TokenKind::Str(value))
    }

    fn char_literal(&mut self) -> Result<(), Diagnostic> {
        if self.is_at_end() {
            return Err(self.error_at_start(ErrorCode::UnterminatedChar, vec![]));
        }
        if self.peek() == '\'' {
            self.advance();
            return Err(self.error_at_start(ErrorCode::EmptyCharLiteral, vec![]));
        }

        let value = match self.advance() {
            '\\' => {
                let esc_start = self.byte_pos - 1;
                let (esc_line, esc_col) = (self.line, self.col - 1);
                if self.is_at_end() {
                    return Err(self.error_at_start(ErrorCode::UnterminatedChar, vec![]));
                }
                match self.advance() {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '\'' => '\'',
                    other => {
                        return Err(Diagnostic::error(
                            ErrorCode::UnknownEscapeSequence,
                            &self.file,
                            Span::new(esc_start, self.byte_pos, esc_line, esc_col),
                            vec![other.to_string()],
                        ));
                    }
                }
            }
            '\n' => return Err(self.error_at_start(ErrorCode::UnterminatedChar, vec![])),
            c => c,
        };

        if !self.match_char('\'') {
            return Err(self.error_at_start(ErrorCode::UnterminatedChar, vec![]));
        }
        self.add_token(TokenKind::Char(value))
    }

    fn number(&mut self, first: char) -> Result<(), Diagnostic> {
        let mut s = String::new();
        s.push(first);

        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == '_') {
            s.push(self.advance());
        }

        // A '.' makes this a float only when a digit follows; `1..5` and
        // `x.toString()`-style method calls keep the int intact.
        let mut is_float = false;
        if !self.is_at_end() && self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            s.push(self.advance());
            while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == '_') {
                s.push(self.advance());
            }
        }

        let digits: String = s.chars().filter(|&c| c != '_').collect();
        if is_float {
            match digits.parse::<f64>() {
                Ok(n) => self.add_token(TokenKind::Float(n)),
                Err(_) => Err(self
                    .error_at_start(ErrorCode::UnexpectedChar, vec![s.clone()])
                    .with_note("float literal is not representable as a 64-bit float")),
            }
        } else {
            match digits.parse::<i64>() {
                Ok(n) => self.add_token(TokenKind::Int(n)),
                Err(_) => Err(self
                    .error_at_start(ErrorCode::UnexpectedChar, vec![s.clone()])
                    .with_note("integer literal does not fit in a signed 64-bit integer")),
            }
        }
    }

    fn identifier(&mut self, first: char) -> Result<(), Diagnostic> {
        let mut name = String::new();
        name.push(first);
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            name.push(self.advance());
        }

        let kind = match name.as_str() {
            "fn" => TokenKind::Fn,
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "int" => TokenKind::KwInt,
            "float" => TokenKind::KwFloat,
            "bool" => TokenKind::KwBool,
            "char" => TokenKind::KwChar,
            "string" => TokenKind::KwString,
            "if" => TokenKind::If,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            _ => TokenKind::Identifier(name),
        };
        self.add_token(kind)
    }

    // ── Character-level helpers ──────────────────────────────────────

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        self.byte_pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.current + 1]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            return false;
        }
        self.advance();
        true
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn add_token(&mut self, kind: TokenKind) -> Result<(), Diagnostic> {
        let span = Span::new(self.start, self.byte_pos, self.start_line, self.start_col);
        let lexeme = &self.source[self.start..self.byte_pos];
        self.tokens.push(Token::new(kind, lexeme, span));
        Ok(())
    }

    fn error_at_start(&self, code: ErrorCode, args: Vec<String>) -> Diagnostic {
        Diagnostic::error(
            code,
            &self.file,
            Span::new(self.start, self.byte_pos, self.start_line, self.start_col),
            args,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source, "test.coal")
            .expect("lexer errors")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
        assert_eq!(
            kinds("1_000_000"),
            vec![TokenKind::Int(1_000_000), TokenKind::Eof]
        );
        assert_eq!(
            kinds("1_0.2_5"),
            vec![TokenKind::Float(10.25), TokenKind::Eof]
        );
    }

    #[test]
    fn test_int_then_dotdot_is_not_a_float() {
        assert_eq!(
            kinds("1..5"),
            vec![
                TokenKind::Int(1),
                TokenKind::DotDot,
                TokenKind::Int(5),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_method_call_on_int_literal() {
        assert_eq!(
            kinds("7.toString"),
            vec![
                TokenKind::Int(7),
                TokenKind::Dot,
                TokenKind::Identifier("toString".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#""hello""#),
            vec![TokenKind::Str("hello".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds(r#""line\nbreak \"q\" \\""#),
            vec![TokenKind::Str("line\nbreak \"q\" \\".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_lexeme_keeps_quotes() {
        let tokens = lex(r#""abc""#, "test.coal").unwrap();
        assert_eq!(tokens[0].lexeme, r#""abc""#);
        assert_eq!(tokens[0].span.start, 0);
        assert_eq!(tokens[0].span.end, 5);
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(kinds("'a'"), vec![TokenKind::Char('a'), TokenKind::Eof]);
        assert_eq!(kinds(r"'\n'"), vec![TokenKind::Char('\n'), TokenKind::Eof]);
        assert_eq!(kinds(r"'\''"), vec![TokenKind::Char('\''), TokenKind::Eof]);
    }

    #[test]
    fn test_char_errors() {
        let err = lex("''", "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCharLiteral);
        let err = lex("'a", "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedChar);
        let err = lex("'ab'", "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedChar);
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("\"abc", "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedString);
        // A raw newline inside a string is also an error.
        let err = lex("\"abc\ndef\"", "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedString);
    }

    #[test]
    fn test_unknown_escape() {
        let err = lex(r#""a\qb""#, "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownEscapeSequence);
        assert_eq!(err.args, vec!["q".to_string()]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != <= >= && || += .. ^"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::PlusEq,
                TokenKind::DotDot,
                TokenKind::Caret,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_ampersand_and_pipe() {
        let err = lex("a & b", "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedChar);
        let err = lex("a | b", "t").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedChar);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("fn var const if elif else while true false"),
            vec![
                TokenKind::Fn,
                TokenKind::Var,
                TokenKind::Const,
                TokenKind::If,
                TokenKind::Elif,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_semicolons_are_trivia() {
        assert_eq!(
            kinds("var x = 1;"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier("x".into()),
                TokenKind::Eq,
                TokenKind::Int(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("42 // this is a comment\n7"),
            vec![TokenKind::Int(42), TokenKind::Int(7), TokenKind::Eof]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = lex("fn main\nvar x", "t").unwrap();
        assert_eq!((tokens[0].span.line, tokens[0].span.col), (1, 1));
        assert_eq!((tokens[1].span.line, tokens[1].span.col), (1, 4));
        assert_eq!((tokens[2].span.line, tokens[2].span.col), (2, 1));
        assert_eq!((tokens[3].span.line, tokens[3].span.col), (2, 5));
    }

    #[test]
    fn test_eof_span_is_source_length() {
        let source = "var x = 1";
        let tokens = lex(source, "t").unwrap();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span.start, source.len());
        assert_eq!(eof.span.end, source.len());
    }

    #[test]
    fn test_lexeme_matches_source_slice() {
        let source = r#"fn main() { println("hi \n") 1_2.5 }"#;
        for token in lex(source, "t").unwrap() {
            assert_eq!(token.lexeme, &source[token.span.start..token.span.end]);
        }
    }
}

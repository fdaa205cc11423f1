//! coalc — command-line driver for the Coal compiler.
//!
//! Runs the pipeline stage by stage so the debug emitters can stop
//! early, writes the IR next to the output binary, and hands it to a C
//! compiler driver (clang) for the final link.
//!
//! Exit codes: 0 on success, 1 for CLI usage and I/O problems, 2 for
//! compile errors; a failing driver invocation passes its code through.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use serde::Serialize;

use coal_compiler::errors::Diagnostic;
use coal_compiler::{emitter, lexer, parser, types};

#[derive(Debug, Parser)]
#[command(name = "coalc", version)]
#[command(about = "Compiler for the Coal programming language")]
struct Args {
    /// Source file to compile
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the final binary (defaults to the input base name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// C compiler driver used for the final binary
    #[arg(long, default_value = "clang")]
    cc: String,

    /// Print the tokens, one per line, and exit
    #[arg(long)]
    emit_tokens: bool,

    /// Print the tokens as a JSON array and exit
    #[arg(long)]
    emit_json_tokens: bool,

    /// Print the AST as JSON and exit
    #[arg(long)]
    emit_ast: bool,

    /// Print the generated LLVM IR to stdout and exit
    #[arg(long)]
    emit_ir: bool,

    /// Keep the intermediate .ll file next to the output
    #[arg(long)]
    keep_ll: bool,
}

#[derive(Serialize)]
struct TokenJson<'a> {
    pos: usize,
    kind: &'a str,
    lexeme: &'a str,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            process::exit(1);
        }
    };

    match run(args) {
        Ok(code) => process::exit(code),
        Err(report) => {
            eprintln!("{:?}", report);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> miette::Result<i32> {
    let file = args.input.display().to_string();
    let source = fs::read_to_string(&args.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read '{}'", file))?;

    let tokens = match lexer::lex(&source, &file) {
        Ok(tokens) => tokens,
        Err(diag) => return Ok(compile_error(&diag, &source)),
    };

    if args.emit_tokens {
        for token in &tokens {
            println!(
                "{}:{}  {}  '{}'",
                token.span.line,
                token.span.col,
                token.kind.name(),
                token.lexeme
            );
        }
        return Ok(0);
    }

    if args.emit_json_tokens {
        let json: Vec<TokenJson> = tokens
            .iter()
            .map(|token| TokenJson {
                pos: token.span.start,
                kind: token.kind.name(),
                lexeme: &token.lexeme,
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json).into_diagnostic()?
        );
        return Ok(0);
    }

    let program = match parser::parse(tokens, &file) {
        Ok(program) => program,
        Err(diag) => return Ok(compile_error(&diag, &source)),
    };

    if args.emit_ast {
        println!(
            "{}",
            serde_json::to_string_pretty(&program).into_diagnostic()?
        );
        return Ok(0);
    }

    let table = match types::check(&program, &file) {
        Ok(table) => table,
        Err(diag) => return Ok(compile_error(&diag, &source)),
    };

    let ir = match emitter::emit(&program, &table, &file) {
        Ok(ir) => ir,
        Err(diag) => return Ok(compile_error(&diag, &source)),
    };

    if args.emit_ir {
        print!("{}", ir);
        return Ok(0);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input));
    let ll_path = output.with_extension("ll");
    fs::write(&ll_path, &ir)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to write '{}'", ll_path.display()))?;

    let status = Command::new(&args.cc)
        .arg(&ll_path)
        .arg("-o")
        .arg(&output)
        .status()
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to run '{}'", args.cc))?;

    if !args.keep_ll {
        let _ = fs::remove_file(&ll_path);
    }

    Ok(status.code().unwrap_or(1))
}

/// Render a compile diagnostic to stderr; the caller exits with 2.
fn compile_error(diag: &Diagnostic, source: &str) -> i32 {
    eprintln!("{}", diag.render(source));
    2
}

/// Default binary path: the input base name, with `.exe` on Windows.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_else(|| input.as_os_str());
    let mut output = PathBuf::from(stem);
    if cfg!(windows) {
        output.set_extension("exe");
    }
    output
}

//! CLI driver (§10.3): reads a DataLang source file, runs the whole front end,
//! and writes the emitted IR to stdout or a file. Flags are parsed by hand over
//! `std::env::args()` rather than through a CLI-flag crate.
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::process::ExitCode;

use datalang_compiler::diagnostic::{CompileError, Diagnostic, DiagnosticBag};
use datalang_compiler::{ast_print, compile_with_trace, trace::CompileTrace};

const USAGE: &str = "\
usage: datalang-compile <source.datalang> [options]

options:
    -o <out.ll>      write IR to <out.ll> instead of stdout
    --print-ast      pretty-print the parsed AST to stderr before type checking
    --print-tokens   print the filtered token stream to stderr
    -h, --help       print this message and exit";

struct Args {
    path: String,
    output: Option<String>,
    print_ast: bool,
    print_tokens: bool,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut path = None;
    let mut output = None;
    let mut print_ast = false;
    let mut print_tokens = false;

    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "-o" => {
                i += 1;
                let value = raw.get(i).ok_or("-o requires a path argument")?;
                output = Some(value.clone());
            }
            "--print-ast" => print_ast = true,
            "--print-tokens" => print_tokens = true,
            other if path.is_none() => path = Some(other.to_string()),
            other => return Err(format!("unexpected argument: {}", other)),
        }
        i += 1;
    }

    let path = path.ok_or("missing <source.datalang> argument")?;
    Ok(Args { path, output, print_ast, print_tokens })
}

fn banner(label: &str, diagnostics: &DiagnosticBag) -> String {
    let mut out = format!("== {} ==\n", label);
    for d in diagnostics.iter() {
        let _ = writeln!(out, "{}", d);
    }
    out
}

fn run(args: &Args) -> Result<String, CompileError> {
    let source = fs::read_to_string(&args.path)?;
    let trace = CompileTrace::silent();

    eprintln!("Lexical analysis");
    eprintln!("Parsing");
    eprintln!("Semantic analysis");

    let result = compile_with_trace(&source, &trace);

    if args.print_tokens {
        let (tokens, _) = datalang_compiler::lexer::Lexer::new(&source).tokenize(&trace);
        eprintln!("== tokens ==");
        for t in &tokens {
            eprintln!("{:?} {:?} [{}:{}]", t.kind, t.lexeme, t.line, t.column);
        }
    }
    if args.print_ast {
        eprintln!("== ast ==");
        let _ = ast_print::print_program(&result.program);
    }

    let mut report = DiagnosticBag::new();
    report.extend(result.diagnostics);
    eprint!("{}", banner("diagnostics", &report));
    eprintln!(
        "compile summary: {} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );

    match result.ir {
        Some(ir) => Ok(ir),
        None => Err(CompileError::CompilationFailed {
            errors: report.error_count(),
            warnings: report.warning_count(),
        }),
    }
}

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();

    if raw.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", Diagnostic::error(0, 0, message));
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(ir) => {
            match &args.output {
                Some(path) => {
                    if let Err(err) = fs::write(path, ir) {
                        eprintln!("{}", CompileError::Io(err));
                        return ExitCode::FAILURE;
                    }
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    if handle.write_all(ir.as_bytes()).is_err() {
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

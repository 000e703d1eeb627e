//! DataLang compiler front-end: a whole-program lexer, recursive-descent
//! parser, two-phase semantic analyzer, and LLVM textual IR emitter for a
//! small statically-typed language oriented toward tabular data pipelines
//! (`filter`/`map`/`reduce`/`select`/`groupby`/aggregate over a DataFrame-like
//! value, plus integers, floats, strings, booleans, arrays, ranges, records,
//! and first-class functions).
//!
//! # Pipeline
//!
//! [`compile`] runs the whole front-end on one source file: lexing, parsing,
//! semantic analysis, then IR emission. Each phase collects its own
//! diagnostics rather than aborting on the first error; IR is only emitted
//! once lexing, parsing, and analysis together recorded no error-severity
//! diagnostic.
//!
//! ```
//! use datalang_compiler::compile;
//!
//! let result = compile("let x: Int = 42;\nprint(x);\n");
//! assert!(result.diagnostics.is_empty());
//! assert!(result.ir.unwrap().contains("@user_main"));
//! ```
pub mod ast;
pub mod ast_print;
pub mod automaton;
pub mod diagnostic;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod sema;
pub mod token;
pub mod trace;
pub mod types;
pub mod unify;
pub mod util;

use ast::Program;
use diagnostic::{Diagnostic, DiagnosticBag};
use trace::CompileTrace;

/// The outcome of running the whole pipeline over one source file: the parsed
/// `Program` (always produced, possibly containing `Error` placeholders at
/// recovered spots), every diagnostic collected across all phases, and the
/// emitted IR text if and only if no phase reported an error.
pub struct CompileResult {
    pub program: Program,
    pub diagnostics: DiagnosticBag,
    pub ir: Option<String>,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Run the lexer, parser, analyzer, and (if no errors so far) the IR emitter
/// over `source`, in that order (§4 data flow: source → tokens → AST →
/// checked AST → IR text). Every phase's diagnostics are merged into one bag;
/// IR emission is skipped once an earlier phase already failed (§4.E
/// "Contract", §7 "Propagation policy").
pub fn compile(source: &str) -> CompileResult {
    compile_with_trace(source, &CompileTrace::silent())
}

pub fn compile_with_trace(source: &str, trace: &CompileTrace) -> CompileResult {
    let mut diagnostics = DiagnosticBag::new();

    let (tokens, lex_diagnostics) = lexer::Lexer::new(source).tokenize(trace);
    diagnostics.extend(lex_diagnostics);

    let (program, parse_diagnostics) = parser::Parser::new(tokens).parse(trace);
    diagnostics.extend(parse_diagnostics);

    let analysis = sema::analyze(&program, trace);
    diagnostics.extend(analysis.diagnostics);

    let ir = if diagnostics.has_errors() {
        None
    } else {
        trace_phase!(trace, "IR emission starting");
        let emitted = ir::emit_program(&program, &analysis.globals, trace);
        let fn_count = program.items.iter().filter(|item| matches!(item, ast::TopItem::Fn(_))).count();
        trace_phase!(trace, "IR emission wrote {} function(s)", fn_count);
        Some(emitted)
    };

    CompileResult { program, diagnostics, ir }
}

/// Render a diagnostic group banner the way the CLI driver does (§6
/// "Diagnostics", §10.5 "compiler phase banners"): `label` names the phase,
/// `diagnostics` is every diagnostic recorded within it.
pub fn format_diagnostic_banner(label: &str, diagnostics: &[&Diagnostic]) -> String {
    let mut out = format!("== {} ==\n", label);
    for d in diagnostics {
        out.push_str(&d.to_string());
        out.push('\n');
    }
    out
}

//! LLVM textual IR emission (§4.E "IR Emitter"). Given a checked [`Program`]
//! and the analyzer's [`SymbolTable`] of globals, [`emit_program`] produces a
//! complete module: the fixed runtime preamble, one `define` per source
//! function (`main` renamed to `user_main`), a wrapper `@main` running any
//! top-level statements, and a trailing string-literal section.
mod context;
mod expr;
mod infer;
mod stmt;
pub mod types;

use crate::ast::*;
use crate::sema::SymbolTable;
use crate::trace::CompileTrace;
use context::EmitterContext;

const PREAMBLE: &str = r#"declare i32 @printf(i8*, ...)
declare i8* @malloc(i64)
declare void @free(i8*)

declare i8* @datalang_load(i8*)
declare void @datalang_save(i8*, i8*)
declare i8* @datalang_select(i8*, i8**, i64)
declare i8* @datalang_groupby(i8*, i8**, i64)
declare i8* @datalang_df_filter_numeric(i8*)
declare i8* @datalang_df_filter_string(i8*)
declare double @datalang_df_column_double(i8*, i8*)
declare void @datalang_print_dataframe(i8*)
declare i8* @datalang_df_create()
declare void @datalang_df_add_row(i8*, i8*)
declare i8* @datalang_format_int(i64)
declare i8* @datalang_format_float(double)
declare i8* @datalang_format_bool(i1)
declare void @datalang_free_dataframe(i8*)
declare i8* @__str_concat(i8*, i8*)

@.fmt.int = private unnamed_addr constant [4 x i8] c"%ld\00"
@.fmt.float = private unnamed_addr constant [4 x i8] c"%f\0A\00"
@.fmt.str = private unnamed_addr constant [4 x i8] c"%s\0A\00"
@.fmt.true = private unnamed_addr constant [5 x i8] c"true\00"
@.fmt.false = private unnamed_addr constant [6 x i8] c"false\00"

define void @print_int(i64 %v) {
entry:
  %fmt = getelementptr inbounds [4 x i8], [4 x i8]* @.fmt.int, i64 0, i64 0
  call i32 (i8*, ...) @printf(i8* %fmt, i64 %v)
  ret void
}

define void @print_float(double %v) {
entry:
  %fmt = getelementptr inbounds [4 x i8], [4 x i8]* @.fmt.float, i64 0, i64 0
  call i32 (i8*, ...) @printf(i8* %fmt, double %v)
  ret void
}

define void @print_string(i8* %v) {
entry:
  %fmt = getelementptr inbounds [4 x i8], [4 x i8]* @.fmt.str, i64 0, i64 0
  call i32 (i8*, ...) @printf(i8* %fmt, i8* %v)
  ret void
}

define void @print_bool(i1 %v) {
entry:
  %s = select i1 %v, i8* getelementptr inbounds ([5 x i8], [5 x i8]* @.fmt.true, i64 0, i64 0), i8* getelementptr inbounds ([6 x i8], [6 x i8]* @.fmt.false, i64 0, i64 0)
  call void @print_string(i8* %s)
  ret void
}

define i64 @sum(i64 %a, i64 %b) {
entry:
  %r = add i64 %a, %b
  ret i64 %r
}

define i64 @min(i64 %a, i64 %b) {
entry:
  %c = icmp slt i64 %a, %b
  %r = select i1 %c, i64 %a, i64 %b
  ret i64 %r
}

define i64 @max(i64 %a, i64 %b) {
entry:
  %c = icmp sgt i64 %a, %b
  %r = select i1 %c, i64 %a, i64 %b
  ret i64 %r
}

define double @mean(double %a, double %b) {
entry:
  %r = fadd double %a, %b
  ret double %r
}

define i64 @count({ i64, i64* } %arr) {
entry:
  %len = extractvalue { i64, i64* } %arr, 0
  ret i64 %len
}
"#;

/// Produce the full textual IR module for a type-checked `program`.
pub fn emit_program(program: &Program, globals: &SymbolTable, trace: &CompileTrace) -> String {
    let mut ctx = EmitterContext::new().with_trace(*trace);
    let mut functions = String::new();

    for item in &program.items {
        if let TopItem::Fn(decl) = item {
            functions.push_str(&stmt::emit_function(&mut ctx, globals, decl));
            functions.push('\n');
        }
    }

    let wrapper = emit_wrapper_main(&mut ctx, globals, program);

    let mut module = String::new();
    module.push_str(PREAMBLE);
    module.push('\n');
    module.push_str(&functions);
    module.push_str(&wrapper);
    module.push('\n');
    module.push_str(&emit_string_section(&ctx));
    module
}

/// `@main` walks every top-level `let`/statement in source order (function
/// and record declarations contribute no code of their own) and returns `0`
/// (§4.E "Wrapper main").
fn emit_wrapper_main(ctx: &mut EmitterContext, globals: &SymbolTable, program: &Program) -> String {
    ctx.begin_function();
    let mut body = String::new();
    ctx.enter_scope();
    for item in &program.items {
        match item {
            TopItem::Let(decl) => stmt::emit_let(ctx, globals, &mut body, decl),
            TopItem::Stmt(s) => stmt::emit_stmt(ctx, globals, &mut body, s),
            _ => {}
        }
    }
    ctx.exit_scope();
    let mut rendered = String::new();
    rendered.push_str("define i32 @main() {\n");
    rendered.push_str("entry:\n");
    rendered.push_str(&body);
    rendered.push_str("  ret i32 0\n");
    rendered.push_str("}\n");
    for lambda in ctx.take_lambda_defs() {
        rendered.push_str(&lambda);
    }
    rendered
}

fn emit_string_section(ctx: &EmitterContext) -> String {
    let mut out = String::new();
    for (i, s) in ctx.string_table().iter().enumerate() {
        let escaped = escape_for_ir(s);
        let len = s.as_bytes().len() + 1;
        out.push_str(&format!(
            "@.str.{} = private unnamed_addr constant [{} x i8] c\"{}\\00\"\n",
            i, len, escaped
        ));
    }
    out
}

fn escape_for_ir(s: &str) -> String {
    let mut out = String::new();
    for byte in s.as_bytes() {
        match byte {
            b'\\' => out.push_str("\\5C"),
            b'"' => out.push_str("\\22"),
            0x20..=0x7e => out.push(*byte as char),
            other => out.push_str(&format!("\\{:02X}", other)),
        }
    }
    out
}

//! Whole-pipeline integration tests (§10.4): source text in, diagnostics/IR out.
//! Mirrors the split this lineage already draws between parsing-level and
//! production-level tests, but exercised end to end through [`compile`].
use datalang_compiler::compile;

#[test]
fn typed_let_compiles_clean_and_emits_alloca() {
    let result = compile("let x: Int = 42;\n");
    assert!(result.diagnostics.is_empty());
    let ir = result.ir.expect("no errors means IR must be emitted");
    assert!(ir.contains("alloca i64"));
    assert!(ir.contains("store i64 42"));
}

#[test]
fn mismatched_initializer_is_one_type_error() {
    let result = compile("let x: Int = \"hi\";\n");
    assert!(result.diagnostics.has_errors());
    assert_eq!(result.diagnostics.error_count(), 1);
    assert!(result.ir.is_none());
}

#[test]
fn function_call_compiles_and_emits_definition() {
    let src = "fn add(a: Int, b: Int) -> Int { return a + b; }\nlet r = add(1, 2);\n";
    let result = compile(src);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.iter().collect::<Vec<_>>());
    let ir = result.ir.expect("no errors means IR must be emitted");
    assert!(ir.contains("define i64 @add(i64"));
    assert!(ir.contains("call i64 @add"));
}

#[test]
fn missing_return_path_is_an_error() {
    let src = "fn f(x: Int) -> Int { let y = x * 2; }\n";
    let result = compile(src);
    assert!(result.diagnostics.has_errors());
    let messages: Vec<String> = result.diagnostics.iter().map(|d| d.to_string()).collect();
    assert!(messages.iter().any(|m| m.contains("retorna") || m.contains("return")));
}

#[test]
fn non_homogeneous_array_literal_is_an_error() {
    let result = compile("let xs = [1, \"two\", 3];\n");
    assert!(result.diagnostics.has_errors());
}

#[test]
fn range_for_loop_compiles_and_emits_index_slot() {
    let src = "let n = 10;\nfor i in 1..n {\n  print(i);\n}\n";
    let result = compile(src);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.iter().collect::<Vec<_>>());
    let ir = result.ir.expect("no errors means IR must be emitted");
    assert!(ir.contains("alloca i64"));
}

#[test]
fn undeclared_identifier_is_a_name_error() {
    let result = compile("let x = y + 1;\n");
    assert!(result.diagnostics.has_errors());
}

#[test]
fn redeclaration_in_same_scope_is_an_error() {
    let result = compile("let x = 1;\nlet x = 2;\n");
    assert!(result.diagnostics.has_errors());
}

#[test]
fn unused_variable_is_a_warning_not_an_error() {
    let src = "fn f() {\n  let unused = 1;\n}\n";
    let result = compile(src);
    assert!(!result.diagnostics.has_errors());
    assert!(result.diagnostics.warning_count() >= 1);
}

#[test]
fn parser_recovers_from_one_spurious_token() {
    let src = "let a = 1; ) let b = 2;\n";
    let result = compile(src);
    assert_eq!(result.diagnostics.error_count(), 1);
    assert_eq!(result.program.items.len(), 3);
}

#[test]
fn pipeline_of_transforms_compiles() {
    let src = "let df = load(\"data.csv\");\nlet out = df |> filter(|row| true) |> select(a, b);\n";
    let result = compile(src);
    assert!(!result.diagnostics.has_errors(), "{:?}", result.diagnostics.iter().collect::<Vec<_>>());
    let ir = result.ir.expect("no errors means IR must be emitted");
    assert!(ir.contains("datalang_load"));
}

#[test]
fn record_type_declares_cleanly() {
    let src = "data Point {\n  x: Int;\n  y: Int;\n}\n";
    let result = compile(src);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn wrapper_main_wraps_top_level_statements() {
    let result = compile("print(1);\n");
    let ir = result.ir.expect("no errors means IR must be emitted");
    assert!(ir.contains("define i32 @main()"));
    assert!(ir.contains("ret i32 0"));
}

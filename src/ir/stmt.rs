//! Statement and function-body lowering (§4.E "Variable storage", "Wrapper
//! main"). `emit_function` renders one source function as one IR `define`
//! block; `emit_block`/`emit_stmt` walk the checked statement tree.
use crate::ast::*;
use crate::ir::context::EmitterContext;
use crate::ir::expr::emit_expr;
use crate::ir::types::lower_type;
use crate::sema::SymbolTable;
use crate::types::Type;

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str("  ");
    out.push_str(text.as_ref());
    out.push('\n');
}

pub fn type_node_to_type(tn: &TypeNode) -> Type {
    match tn {
        TypeNode::Int => Type::Int,
        TypeNode::Float => Type::Float,
        TypeNode::String => Type::String,
        TypeNode::Bool => Type::Bool,
        TypeNode::DataFrame => Type::DataFrame,
        TypeNode::Vector => Type::Vector,
        TypeNode::Series => Type::Series,
        TypeNode::Named(name) => Type::Custom(name.clone()),
        TypeNode::Array(inner) => Type::Array(Box::new(type_node_to_type(inner))),
        TypeNode::Tuple(items) => Type::Tuple(items.iter().map(type_node_to_type).collect()),
    }
}

/// Render `decl` as `define <ret> @name(<params>) { ... }`, including a final
/// `ret` for any fall-through path (§4.E "Return").
pub fn emit_function(ctx: &mut EmitterContext, globals: &SymbolTable, decl: &FnDecl) -> String {
    ctx.begin_function();
    let ir_name = if decl.name == "main" { "user_main".to_string() } else { decl.name.clone() };
    let ret_ty = decl
        .return_type
        .as_ref()
        .map(type_node_to_type)
        .unwrap_or(Type::Void);

    let mut header = String::new();
    let mut params_ir = Vec::new();
    for param in &decl.params {
        let ty = param.declared_type.as_ref().map(type_node_to_type).unwrap_or(Type::Int);
        let lowered = lower_type(&ty);
        let arg_name = format!("%arg.{}", param.name);
        params_ir.push(format!("{} {}", lowered, arg_name));
        let slot = ctx.fresh_temp();
        line(&mut header, format!("{} = alloca {}", slot, lowered));
        line(&mut header, format!("store {} {}, {}* {}", lowered, arg_name, lowered, slot));
        ctx.declare_var(param.name.clone(), slot, ty);
    }

    let mut body_out = String::new();
    emit_block(ctx, globals, &mut body_out, &decl.body);

    let mut rendered = String::new();
    rendered.push_str(&format!("define {} @{}({}) {{\n", lower_type(&ret_ty), ir_name, params_ir.join(", ")));
    rendered.push_str("entry:\n");
    rendered.push_str(&header);
    rendered.push_str(&body_out);
    if !ends_with_terminator(&body_out) {
        if matches!(ret_ty, Type::Void) {
            rendered.push_str("  ret void\n");
        } else {
            rendered.push_str(&format!("  ret {} {}\n", lower_type(&ret_ty), zero_literal(&ret_ty)));
        }
    }
    rendered.push_str("}\n");
    for lambda in ctx.take_lambda_defs() {
        rendered.push_str(&lambda);
    }
    rendered
}

fn zero_literal(ty: &Type) -> &'static str {
    match ty {
        Type::Float => "0.0",
        Type::Bool => "false",
        Type::String | Type::DataFrame | Type::Vector | Type::Series | Type::Custom(_) | Type::Function(..) => "null",
        _ => "0",
    }
}

fn ends_with_terminator(out: &str) -> bool {
    out.trim_end()
        .lines()
        .last()
        .map(|l| {
            let l = l.trim();
            l.starts_with("ret ") || l == "ret void" || l.starts_with("br ") || l.starts_with("unreachable")
        })
        .unwrap_or(false)
}

pub fn emit_block(ctx: &mut EmitterContext, globals: &SymbolTable, out: &mut String, block: &Block) {
    ctx.enter_scope();
    for stmt in &block.stmts {
        emit_stmt(ctx, globals, out, stmt);
    }
    ctx.exit_scope();
}

pub(crate) fn emit_stmt(ctx: &mut EmitterContext, globals: &SymbolTable, out: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::Let(decl) => emit_let(ctx, globals, out, decl),
        Stmt::If(s) => emit_if(ctx, globals, out, s),
        Stmt::For(s) => emit_for(ctx, globals, out, s),
        Stmt::Return { value, .. } => emit_return(ctx, globals, out, value.as_ref()),
        Stmt::Print { value, .. } => {
            emit_expr(ctx, globals, out, &Expr::Call {
                callee: Box::new(Expr::Identifier { name: "print".to_string(), span: value.span() }),
                args: vec![value.clone()],
                span: value.span(),
            });
        }
        Stmt::ExprStmt { expr, .. } => {
            emit_expr(ctx, globals, out, expr);
        }
        Stmt::Block(b) => emit_block(ctx, globals, out, b),
        // A panic-mode recovery placeholder never reaches emission: the
        // compile step only emits IR when earlier phases recorded no errors.
        Stmt::Error(_) => {}
    }
}

pub(crate) fn emit_let(ctx: &mut EmitterContext, globals: &SymbolTable, out: &mut String, decl: &LetDecl) {
    let (val, inferred_ty) = emit_expr(ctx, globals, out, &decl.init);
    let ty = decl
        .declared_type
        .as_ref()
        .map(type_node_to_type)
        .unwrap_or(inferred_ty.clone());
    let lowered = lower_type(&ty);
    let val = if matches!(ty, Type::Float) && !matches!(inferred_ty, Type::Float) {
        let temp = ctx.fresh_temp();
        line(out, format!("{} = sitofp i64 {} to double", temp, val));
        temp
    } else {
        val
    };
    let slot = ctx.fresh_temp();
    line(out, format!("{} = alloca {}", slot, lowered));
    line(out, format!("store {} {}, {}* {}", lowered, val, lowered, slot));
    ctx.declare_var(decl.name.clone(), slot, ty);
}

fn emit_if(ctx: &mut EmitterContext, globals: &SymbolTable, out: &mut String, s: &IfStmt) {
    let (cond, _) = emit_expr(ctx, globals, out, &s.cond);
    let then_label = ctx.fresh_label("if.then");
    let else_label = ctx.fresh_label("if.else");
    let end_label = ctx.fresh_label("if.end");
    line(out, format!("br i1 {}, label %{}, label %{}", cond, then_label, else_label));
    out.push_str(&format!("{}:\n", then_label));
    let mut then_out = String::new();
    emit_block(ctx, globals, &mut then_out, &s.then_block);
    out.push_str(&then_out);
    if !ends_with_terminator(&then_out) {
        line(out, format!("br label %{}", end_label));
    }
    out.push_str(&format!("{}:\n", else_label));
    match &s.else_branch {
        Some(ElseBranch::Block(b)) => {
            let mut else_out = String::new();
            emit_block(ctx, globals, &mut else_out, b);
            out.push_str(&else_out);
            if !ends_with_terminator(&else_out) {
                line(out, format!("br label %{}", end_label));
            }
        }
        Some(ElseBranch::If(inner)) => {
            let mut else_out = String::new();
            emit_if(ctx, globals, &mut else_out, inner);
            out.push_str(&else_out);
            if !ends_with_terminator(&else_out) {
                line(out, format!("br label %{}", end_label));
            }
        }
        None => {
            line(out, format!("br label %{}", end_label));
        }
    }
    out.push_str(&format!("{}:\n", end_label));
}

/// A `for x in iterable { ... }` loop over an `Array τ` value (§4.E "For-loops
/// over Array τ"): extract `len`/`data*`, run an `i64` index slot from `0` to
/// `len`, bind the loop variable to the loaded element in the body's scope.
fn emit_for(ctx: &mut EmitterContext, globals: &SymbolTable, out: &mut String, s: &ForStmt) {
    let (iter_val, iter_ty) = emit_expr(ctx, globals, out, &s.iterable);
    let elem_ty = match iter_ty {
        Type::Array(inner) => *inner,
        other => other,
    };
    let lowered_elem = lower_type(&elem_ty);
    let agg_ty = format!("{{ i64, {}* }}", lowered_elem);
    let len = ctx.fresh_temp();
    line(out, format!("{} = extractvalue {} {}, 0", len, agg_ty, iter_val));
    let data = ctx.fresh_temp();
    line(out, format!("{} = extractvalue {} {}, 1", data, agg_ty, iter_val));
    let idx_slot = ctx.fresh_temp();
    line(out, format!("{} = alloca i64", idx_slot));
    line(out, format!("store i64 0, i64* {}", idx_slot));

    let cond_label = ctx.fresh_label("for.cond");
    let body_label = ctx.fresh_label("for.body");
    let end_label = ctx.fresh_label("for.end");
    line(out, format!("br label %{}", cond_label));
    out.push_str(&format!("{}:\n", cond_label));
    let idx = ctx.fresh_temp();
    line(out, format!("{} = load i64, i64* {}", idx, idx_slot));
    let test = ctx.fresh_temp();
    line(out, format!("{} = icmp slt i64 {}, {}", test, idx, len));
    line(out, format!("br i1 {}, label %{}, label %{}", test, body_label, end_label));
    out.push_str(&format!("{}:\n", body_label));

    let elem_ptr = ctx.fresh_temp();
    line(out, format!("{} = getelementptr {}, {}* {}, i64 {}", elem_ptr, lowered_elem, lowered_elem, data, idx));
    let elem_slot = ctx.fresh_temp();
    line(out, format!("{} = alloca {}", elem_slot, lowered_elem));
    let elem_val = ctx.fresh_temp();
    line(out, format!("{} = load {}, {}* {}", elem_val, lowered_elem, lowered_elem, elem_ptr));
    line(out, format!("store {} {}, {}* {}", lowered_elem, elem_val, lowered_elem, elem_slot));

    ctx.enter_scope();
    ctx.declare_var(s.iter_name.clone(), elem_slot, elem_ty);
    let mut body_out = String::new();
    for stmt in &s.body.stmts {
        emit_stmt(ctx, globals, &mut body_out, stmt);
    }
    ctx.exit_scope();
    out.push_str(&body_out);

    let next_idx = ctx.fresh_temp();
    line(out, format!("{} = add i64 {}, 1", next_idx, idx));
    line(out, format!("store i64 {}, i64* {}", next_idx, idx_slot));
    if !ends_with_terminator(&body_out) {
        line(out, format!("br label %{}", cond_label));
    }
    out.push_str(&format!("{}:\n", end_label));
}

fn emit_return(ctx: &mut EmitterContext, globals: &SymbolTable, out: &mut String, value: Option<&Expr>) {
    match value {
        Some(expr) => {
            let (val, ty) = emit_expr(ctx, globals, out, expr);
            if matches!(ty, Type::Void) {
                line(out, "ret void");
            } else {
                line(out, format!("ret {} {}", lower_type(&ty), val));
            }
        }
        None => line(out, "ret void"),
    }
}

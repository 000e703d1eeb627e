//! The emitter's own, independent re-derivation of expression types (doc comment
//! on [`crate::sema::AnalysisResult::globals`]: "the IR emitter consults it for
//! function signatures and record layouts; it re-derives local variable types
//! itself while it walks the already-checked AST"). This mirrors the shape of
//! the analyzer's `typeof_expr`, minus diagnostics: the program already passed
//! semantic analysis, so every case below assumes it is well-typed and never
//! reports an error of its own (§4.E "Failure handling").
use crate::ast::*;
use crate::ir::context::EmitterContext;
use crate::sema::{SymbolKind, SymbolTable};
use crate::types::Type;

pub fn expr_type(ctx: &EmitterContext, globals: &SymbolTable, expr: &Expr) -> Type {
    match expr {
        Expr::Literal { value, .. } => match value {
            LiteralValue::Int(_) => Type::Int,
            LiteralValue::Float(_) => Type::Float,
            LiteralValue::Str(_) => Type::String,
            LiteralValue::Bool(_) => Type::Bool,
        },
        Expr::Identifier { name, .. } => identifier_type(ctx, globals, name),
        Expr::Binary { op, left, right, .. } => binary_type(ctx, globals, *op, left, right),
        Expr::Unary { op, operand, .. } => match op {
            UnOp::Neg => expr_type(ctx, globals, operand),
            UnOp::Not => Type::Bool,
        },
        Expr::Call { callee, .. } => call_type(ctx, globals, callee),
        Expr::Index { obj, .. } => match expr_type(ctx, globals, obj) {
            Type::Array(inner) => *inner,
            other => other,
        },
        Expr::Member { obj, field, .. } => member_type(ctx, globals, obj, field),
        Expr::Assign { target, .. } => expr_type(ctx, globals, target),
        Expr::Lambda { params, body, .. } => {
            ctx_with_lambda_params(ctx, globals, params, |ctx| expr_type(ctx, globals, body))
        }
        Expr::Pipeline { stages, .. } => stages
            .last()
            .map(|s| expr_type(ctx, globals, s))
            .unwrap_or(Type::Void),
        Expr::ArrayLiteral { elems, .. } => {
            let inner = elems
                .first()
                .map(|e| expr_type(ctx, globals, e))
                .unwrap_or(Type::Int);
            Type::Array(Box::new(inner))
        }
        Expr::Range { .. } => Type::Array(Box::new(Type::Int)),
        Expr::Load { .. } => Type::DataFrame,
        Expr::Save { .. } => Type::Void,
        Expr::Filter { .. } | Expr::Map { .. } => Type::Vector,
        Expr::Reduce { reducer, .. } => match expr_type(ctx, globals, reducer) {
            Type::Function(_, ret) => *ret,
            other => other,
        },
        Expr::Select { .. } | Expr::GroupBy { .. } => Type::DataFrame,
        Expr::Aggregate { kind, .. } => aggregate_return_type(*kind),
        Expr::Error { .. } => Type::Error,
    }
}

fn identifier_type(ctx: &EmitterContext, globals: &SymbolTable, name: &str) -> Type {
    if let Some(slot) = ctx.lookup_var(name) {
        return slot.ty.clone();
    }
    match globals.lookup(name) {
        Some(sym) if sym.kind == SymbolKind::Function => {
            Type::Function(sym.param_types.clone(), Box::new(sym.ty.clone()))
        }
        Some(sym) => sym.ty.clone(),
        None => Type::Error,
    }
}

fn binary_type(ctx: &EmitterContext, globals: &SymbolTable, op: BinOp, left: &Expr, right: &Expr) -> Type {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
            expr_type(ctx, globals, left).widen_numeric(&expr_type(ctx, globals, right))
        }
        BinOp::Mod => Type::Int,
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::EqEq | BinOp::NotEq | BinOp::And | BinOp::Or => {
            Type::Bool
        }
    }
}

fn call_type(ctx: &EmitterContext, globals: &SymbolTable, callee: &Expr) -> Type {
    if let Expr::Identifier { name, .. } = callee {
        if name == "print" {
            return Type::Void;
        }
        if let Some(sym) = globals.lookup(name) {
            if sym.kind == SymbolKind::Function {
                return sym.ty.clone();
            }
        }
    }
    match expr_type(ctx, globals, callee) {
        Type::Function(_, ret) => *ret,
        other => other,
    }
}

fn member_type(ctx: &EmitterContext, globals: &SymbolTable, obj: &Expr, field: &str) -> Type {
    match expr_type(ctx, globals, obj) {
        Type::Custom(name) => match globals.lookup(&name) {
            Some(sym) => sym
                .fields
                .iter()
                .find(|(n, _)| n == field)
                .map(|(_, ty)| ty.clone())
                .unwrap_or(Type::Error),
            None => Type::Error,
        },
        // A dataframe row's field access always yields a numeric column in this
        // emitter's simplified runtime binding (§4.E preamble: `datalang_df_column_double`).
        Type::DataFrame => Type::Float,
        other => other,
    }
}

fn aggregate_return_type(kind: AggKind) -> Type {
    match kind {
        AggKind::Sum | AggKind::Count | AggKind::Min | AggKind::Max => Type::Int,
        AggKind::Mean => Type::Float,
    }
}

/// Run `f` with `params` visible in a scratch scope, without mutating the
/// caller's `ctx`. A DataLang lambda is only ever immediately applied by
/// `filter`/`map`/`reduce`, never stored or returned, so its body cannot read a
/// variable captured from an enclosing scope — a fresh, empty scope plus the
/// parameters themselves is a complete environment for it.
fn ctx_with_lambda_params<R>(
    _ctx: &EmitterContext,
    globals: &SymbolTable,
    params: &[Param],
    f: impl FnOnce(&mut EmitterContext) -> R,
) -> R {
    let mut scratch = EmitterContext::new();
    for param in params {
        // An unannotated lambda parameter's real type was a fresh unifier
        // variable the analyzer already resolved away before the checked AST
        // reached the emitter; `Float` is this emitter's default row-field type
        // (§4.E preamble: `datalang_df_column_double`), the common case for an
        // unannotated filter/map parameter bound to a dataframe row.
        let ty = param
            .declared_type
            .as_ref()
            .map(super::stmt::type_node_to_type)
            .unwrap_or(Type::Float);
        scratch.declare_var(param.name.clone(), "%unused", ty);
    }
    let _ = globals;
    f(&mut scratch)
}

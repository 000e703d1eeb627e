//! The two-phase semantic analyzer (§4.D "Two-phase program analysis"): hoist
//! every top-level `Fn`/`Data` into the global scope, then walk every body with a
//! fully-populated global scope so forward references just work.
use crate::ast::*;
use crate::diagnostic::{Diagnostic, DiagnosticBag};
use crate::sema::symbol::{Symbol, SymbolKind, SymbolTable};
use crate::trace::CompileTrace;
use crate::trace_phase;
use crate::types::Type;

pub struct AnalysisResult {
    pub diagnostics: DiagnosticBag,
    /// The symbol table as it stands once analysis completes: every local scope
    /// has been popped, so only the global scope (built-ins, declared functions
    /// and records) remains. The IR emitter consults it for function signatures
    /// and record layouts; it re-derives local variable types itself while it
    /// walks the already-checked AST.
    pub globals: SymbolTable,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

struct Analyzer {
    table: SymbolTable,
    diagnostics: DiagnosticBag,
    current_return_type: Option<Type>,
    next_var: usize,
}

pub fn analyze(program: &Program, trace: &CompileTrace) -> AnalysisResult {
    let mut analyzer = Analyzer {
        table: SymbolTable::new(),
        diagnostics: DiagnosticBag::new(),
        current_return_type: None,
        next_var: 0,
    };
    analyzer.declare_builtins();
    analyzer.hoist(program);
    let hoisted = program
        .items
        .iter()
        .filter(|item| matches!(item, TopItem::Fn(_) | TopItem::Data(_)))
        .count();
    trace_phase!(trace, "phase 1 hoisted {} declaration(s)", hoisted);
    analyzer.check_bodies(program);
    trace_phase!(trace, "phase 2 analyzed {} item(s)", program.items.len());
    AnalysisResult {
        diagnostics: analyzer.diagnostics,
        globals: analyzer.table,
    }
}

fn type_node_to_type(tn: &TypeNode) -> Type {
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

fn block_returns(block: &Block) -> bool {
    block.stmts.iter().any(stmt_returns)
}

fn stmt_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return { .. } => true,
        Stmt::Block(b) => block_returns(b),
        Stmt::If(s) => {
            let then_returns = block_returns(&s.then_block);
            match &s.else_branch {
                Some(ElseBranch::Block(b)) => then_returns && block_returns(b),
                Some(ElseBranch::If(inner)) => then_returns && stmt_returns(&Stmt::If((**inner).clone())),
                None => false,
            }
        }
        _ => false,
    }
}

impl Analyzer {
    fn error(&mut self, line: usize, column: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(line, column, message));
    }

    fn warn(&mut self, line: usize, column: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(line, column, message));
    }

    fn fresh_var(&mut self) -> Type {
        let id = self.next_var;
        self.next_var += 1;
        Type::Var(id)
    }

    /// Declares the fixed built-in surface (§4.D "Built-in functions") before
    /// hoisting so user declarations that happen to reuse a built-in name are
    /// reported exactly like any other redeclaration.
    fn declare_builtins(&mut self) {
        let int_array = Type::Array(Box::new(Type::Int));
        self.table
            .declare_global(Symbol::function("print", vec![Type::Error], Type::Void, 0, 0));
        self.table
            .declare_global(Symbol::function("sum", vec![int_array.clone()], Type::Int, 0, 0));
        self.table
            .declare_global(Symbol::function("min", vec![int_array.clone()], Type::Int, 0, 0));
        self.table
            .declare_global(Symbol::function("max", vec![int_array.clone()], Type::Int, 0, 0));
        self.table
            .declare_global(Symbol::function("count", vec![int_array.clone()], Type::Int, 0, 0));
        self.table
            .declare_global(Symbol::function("mean", vec![int_array], Type::Float, 0, 0));
    }

    // --- phase 1 ---

    fn hoist(&mut self, program: &Program) {
        for item in &program.items {
            match item {
                TopItem::Fn(f) => {
                    let param_types = f.params.iter().map(|p| self.resolve_param_type(p)).collect();
                    let return_type = f
                        .return_type
                        .as_ref()
                        .map(type_node_to_type)
                        .unwrap_or(Type::Void);
                    let symbol = Symbol::function(f.name.clone(), param_types, return_type, f.span.line, f.span.column);
                    if !self.table.declare_global(symbol) {
                        self.error(f.span.line, f.span.column, format!("'{}' is already declared", f.name));
                    }
                }
                TopItem::Data(d) => {
                    let fields = d
                        .fields
                        .iter()
                        .map(|field| (field.name.clone(), type_node_to_type(&field.field_type)))
                        .collect();
                    let symbol = Symbol::record(d.name.clone(), fields, d.span.line, d.span.column);
                    if !self.table.declare_global(symbol) {
                        self.error(d.span.line, d.span.column, format!("'{}' is already declared", d.name));
                    }
                }
                _ => {}
            }
        }
    }

    fn resolve_param_type(&self, param: &Param) -> Type {
        param.declared_type.as_ref().map(type_node_to_type).unwrap_or(Type::Error)
    }

    // --- phase 2 ---

    fn check_bodies(&mut self, program: &Program) {
        for item in &program.items {
            match item {
                TopItem::Let(decl) => self.analyze_let_decl(decl),
                TopItem::Fn(f) => self.check_fn_body(f),
                TopItem::Data(d) => self.verify_data_decl(d),
                TopItem::Import(_) | TopItem::Export(_) => {}
                TopItem::Stmt(s) => self.analyze_stmt(s),
            }
        }
    }

    fn verify_data_decl(&mut self, d: &DataDecl) {
        for field in &d.fields {
            self.verify_type_resolves(&field.field_type, field.span);
        }
    }

    fn verify_type_resolves(&mut self, tn: &TypeNode, span: Span) {
        match tn {
            TypeNode::Named(name) => {
                let resolves = matches!(
                    self.table.lookup(name),
                    Some(sym) if sym.kind == SymbolKind::Record
                );
                if !resolves {
                    self.error(span.line, span.column, format!("unknown type '{}'", name));
                }
            }
            TypeNode::Array(inner) => self.verify_type_resolves(inner, span),
            TypeNode::Tuple(items) => {
                for item in items {
                    self.verify_type_resolves(item, span);
                }
            }
            _ => {}
        }
    }

    fn check_fn_body(&mut self, f: &FnDecl) {
        self.table.enter_scope();
        let return_type = f.return_type.as_ref().map(type_node_to_type).unwrap_or(Type::Void);
        let previous_return = self.current_return_type.replace(return_type.clone());
        for param in &f.params {
            let ty = self.resolve_param_type(param);
            self.table
                .declare(Symbol::variable(param.name.clone(), ty, param.span.line, param.span.column, true));
        }
        self.analyze_block(&f.body);
        if !matches!(return_type, Type::Void) && !block_returns(&f.body) {
            self.error(
                f.span.line,
                f.span.column,
                format!(
                    "function '{}' does not return a value of type {} on every path",
                    f.name, return_type
                ),
            );
        }
        self.current_return_type = previous_return;
        self.close_scope();
    }

    /// Pop the innermost scope and turn any unused-variable findings into warnings.
    fn close_scope(&mut self) {
        for (name, line, column) in self.table.exit_scope() {
            self.warn(line, column, format!("unused variable '{}'", name));
        }
    }

    fn analyze_let_decl(&mut self, decl: &LetDecl) {
        let value_ty = self.typeof_expr(&decl.init);
        let declared_ty = decl.declared_type.as_ref().map(type_node_to_type);
        let final_ty = match &declared_ty {
            Some(t) => {
                if !t.compatible(&value_ty) {
                    self.error(
                        decl.span.line,
                        decl.span.column,
                        format!("cannot assign a value of type {} to '{}' of declared type {}", value_ty, decl.name, t),
                    );
                }
                t.clone()
            }
            None => value_ty,
        };
        let symbol = Symbol::variable(decl.name.clone(), final_ty, decl.span.line, decl.span.column, true);
        if !self.table.declare(symbol) {
            self.error(decl.span.line, decl.span.column, format!("'{}' is already declared in this scope", decl.name));
        }
    }

    fn analyze_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.analyze_stmt(stmt);
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(decl) => self.analyze_let_decl(decl),
            Stmt::If(s) => self.analyze_if_stmt(s),
            Stmt::For(s) => self.analyze_for_stmt(s),
            Stmt::Return { value, span } => self.analyze_return(value.as_ref(), *span),
            Stmt::Print { value, .. } => self.analyze_print(value),
            Stmt::ExprStmt { expr, .. } => {
                self.typeof_expr(expr);
            }
            Stmt::Block(b) => {
                self.table.enter_scope();
                self.analyze_block(b);
                self.close_scope();
            }
            Stmt::Error(_) => {}
        }
    }

    fn analyze_if_stmt(&mut self, s: &IfStmt) {
        let cond_ty = self.typeof_expr(&s.cond);
        if !Type::Bool.compatible(&cond_ty) {
            self.error(s.span.line, s.span.column, format!("if condition must be Bool, found {}", cond_ty));
        }
        self.table.enter_scope();
        self.analyze_block(&s.then_block);
        self.close_scope();
        match &s.else_branch {
            Some(ElseBranch::Block(b)) => {
                self.table.enter_scope();
                self.analyze_block(b);
                self.close_scope();
            }
            Some(ElseBranch::If(inner)) => self.analyze_if_stmt(inner),
            None => {}
        }
    }

    fn analyze_for_stmt(&mut self, s: &ForStmt) {
        let iter_ty = self.typeof_expr(&s.iterable);
        let elem_ty = match iter_ty {
            Type::Array(inner) => *inner,
            Type::Error => Type::Error,
            other => {
                self.error(s.span.line, s.span.column, format!("for-loop target must be an array, found {}", other));
                Type::Error
            }
        };
        self.table.enter_scope();
        self.table
            .declare(Symbol::variable(s.iter_name.clone(), elem_ty, s.span.line, s.span.column, true));
        self.analyze_block(&s.body);
        self.close_scope();
    }

    fn analyze_return(&mut self, value: Option<&Expr>, span: Span) {
        let value_ty = value.map(|e| self.typeof_expr(e)).unwrap_or(Type::Void);
        match self.current_return_type.clone() {
            None => self.error(span.line, span.column, "'return' used outside of a function"),
            Some(expected) => {
                if !expected.compatible(&value_ty) {
                    self.error(span.line, span.column, format!("expected a return value of type {}, found {}", expected, value_ty));
                }
            }
        }
    }

    fn analyze_print(&mut self, value: &Expr) {
        let ty = self.typeof_expr(value);
        match &ty {
            Type::Int | Type::Float | Type::String | Type::Bool | Type::Error => {}
            Type::Array(inner) if matches!(**inner, Type::Int | Type::Float | Type::String | Type::Bool) => {
                self.warn(value.span().line, value.span().column, "printing an array formats its elements one by one");
            }
            other => {
                self.warn(value.span().line, value.span().column, format!("printing a value of type {}: formatting is best-effort", other));
            }
        }
    }

    fn typeof_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Literal { value, .. } => match value {
                LiteralValue::Int(_) => Type::Int,
                LiteralValue::Float(_) => Type::Float,
                LiteralValue::Str(_) => Type::String,
                LiteralValue::Bool(_) => Type::Bool,
            },
            Expr::Identifier { name, span } => self.typeof_identifier(name, *span),
            Expr::Binary { op, left, right, span } => self.typeof_binary(*op, left, right, *span),
            Expr::Unary { op, operand, span } => self.typeof_unary(*op, operand, *span),
            Expr::Call { callee, args, span } => self.typeof_call(callee, args, *span),
            Expr::Index { obj, index, span } => self.typeof_index(obj, index, *span),
            Expr::Member { obj, field, span } => self.typeof_member(obj, field, *span),
            Expr::Assign { target, value, span } => self.typeof_assign(target, value, *span),
            Expr::Lambda { params, body, .. } => self.typeof_lambda(params, body),
            Expr::Pipeline { stages, .. } => {
                let mut last = Type::Void;
                for stage in stages {
                    last = self.typeof_expr(stage);
                }
                last
            }
            Expr::ArrayLiteral { elems, span } => self.typeof_array_literal(elems, *span),
            Expr::Range { lo, hi, span } => self.typeof_range(lo, hi, *span),
            Expr::Load { .. } => Type::DataFrame,
            Expr::Save { data, .. } => {
                self.typeof_expr(data);
                Type::Void
            }
            Expr::Filter { predicate, .. } => {
                self.typeof_expr(predicate);
                Type::Vector
            }
            Expr::Map { function, .. } => {
                self.typeof_expr(function);
                Type::Vector
            }
            Expr::Reduce { init, reducer, .. } => self.typeof_reduce(init, reducer),
            Expr::Select { .. } => Type::DataFrame,
            Expr::GroupBy { .. } => Type::DataFrame,
            Expr::Aggregate { kind, args, span } => self.typeof_aggregate(*kind, args, *span),
            Expr::Error { .. } => Type::Error,
        }
    }

    fn typeof_identifier(&mut self, name: &str, span: Span) -> Type {
        match self.table.lookup(name).cloned() {
            Some(sym) => {
                if sym.kind == SymbolKind::Variable && !sym.initialized {
                    self.warn(span.line, span.column, format!("'{}' may be used before it is initialized", name));
                }
                self.table.mark_used(name);
                match sym.kind {
                    SymbolKind::Function => Type::Function(sym.param_types, Box::new(sym.ty)),
                    _ => sym.ty,
                }
            }
            None => {
                self.error(span.line, span.column, format!("undeclared identifier '{}'", name));
                Type::Error
            }
        }
    }

    fn typeof_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> Type {
        let lt = self.typeof_expr(left);
        let rt = self.typeof_expr(right);
        let has_error = matches!(lt, Type::Error) || matches!(rt, Type::Error);
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                if lt.is_numeric() && rt.is_numeric() {
                    lt.widen_numeric(&rt)
                } else if has_error {
                    Type::Error
                } else {
                    self.error(span.line, span.column, format!("arithmetic requires numeric operands, found {} and {}", lt, rt));
                    Type::Error
                }
            }
            BinOp::Mod => {
                if matches!(lt, Type::Int) && matches!(rt, Type::Int) {
                    Type::Int
                } else if has_error {
                    Type::Error
                } else {
                    self.error(span.line, span.column, format!("'%' requires Int operands, found {} and {}", lt, rt));
                    Type::Error
                }
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                if !has_error && !(lt.is_numeric() && rt.is_numeric() && (lt.compatible(&rt) || rt.compatible(&lt))) {
                    self.error(span.line, span.column, format!("cannot compare {} and {}", lt, rt));
                }
                Type::Bool
            }
            BinOp::EqEq | BinOp::NotEq => {
                if !has_error && !lt.compatible(&rt) && !rt.compatible(&lt) {
                    self.error(span.line, span.column, format!("incompatible operands for equality: {} and {}", lt, rt));
                }
                Type::Bool
            }
            BinOp::And | BinOp::Or => {
                if !matches!(lt, Type::Bool | Type::Error) {
                    self.error(span.line, span.column, format!("left operand of a logical operator must be Bool, found {}", lt));
                }
                if !matches!(rt, Type::Bool | Type::Error) {
                    self.error(span.line, span.column, format!("right operand of a logical operator must be Bool, found {}", rt));
                }
                Type::Bool
            }
        }
    }

    fn typeof_unary(&mut self, op: UnOp, operand: &Expr, span: Span) -> Type {
        let ty = self.typeof_expr(operand);
        match op {
            UnOp::Neg => {
                if ty.is_numeric() {
                    ty
                } else if matches!(ty, Type::Error) {
                    Type::Error
                } else {
                    self.error(span.line, span.column, format!("unary '-' requires a numeric operand, found {}", ty));
                    Type::Error
                }
            }
            UnOp::Not => {
                if !matches!(ty, Type::Bool | Type::Error) {
                    self.error(span.line, span.column, format!("unary '!' requires a Bool operand, found {}", ty));
                }
                Type::Bool
            }
        }
    }

    fn typeof_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        if let Expr::Identifier { name, .. } = callee {
            if name == "print" {
                self.table.mark_used("print");
                if args.len() != 1 {
                    self.error(span.line, span.column, format!("'print' takes exactly 1 argument, found {}", args.len()));
                } else {
                    self.typeof_expr(&args[0]);
                }
                return Type::Void;
            }
            return self.typeof_named_call(name, args, span);
        }
        let callee_ty = self.typeof_expr(callee);
        for arg in args {
            self.typeof_expr(arg);
        }
        match callee_ty {
            Type::Function(params, ret) => {
                if params.len() != args.len() {
                    self.error(span.line, span.column, format!("expected {} argument(s), found {}", params.len(), args.len()));
                }
                *ret
            }
            Type::Error => Type::Error,
            other => {
                self.error(span.line, span.column, format!("value of type {} is not callable", other));
                Type::Error
            }
        }
    }

    fn typeof_named_call(&mut self, name: &str, args: &[Expr], span: Span) -> Type {
        match self.table.lookup(name).cloned() {
            Some(sym) if sym.kind == SymbolKind::Function => {
                self.table.mark_used(name);
                if args.len() != sym.param_types.len() {
                    self.error(
                        span.line,
                        span.column,
                        format!("'{}' expects {} argument(s), found {}", name, sym.param_types.len(), args.len()),
                    );
                    for arg in args {
                        self.typeof_expr(arg);
                    }
                } else {
                    for (param_ty, arg) in sym.param_types.iter().zip(args.iter()) {
                        let arg_ty = self.typeof_expr(arg);
                        if !param_ty.compatible(&arg_ty) && !matches!(arg_ty, Type::Error) {
                            self.error(span.line, span.column, format!("argument of type {} is not compatible with parameter type {}", arg_ty, param_ty));
                        }
                    }
                }
                sym.ty
            }
            Some(_) => {
                self.error(span.line, span.column, format!("'{}' is not callable", name));
                for arg in args {
                    self.typeof_expr(arg);
                }
                Type::Error
            }
            None => {
                self.error(span.line, span.column, format!("undeclared function '{}'", name));
                for arg in args {
                    self.typeof_expr(arg);
                }
                Type::Error
            }
        }
    }

    fn typeof_index(&mut self, obj: &Expr, index: &Expr, span: Span) -> Type {
        let index_ty = self.typeof_expr(index);
        if !matches!(index_ty, Type::Int | Type::Error) {
            self.error(span.line, span.column, format!("index must be Int, found {}", index_ty));
        }
        let obj_ty = self.typeof_expr(obj);
        match obj_ty {
            Type::Array(inner) => *inner,
            Type::Error => Type::Error,
            other => {
                self.error(span.line, span.column, format!("cannot index into a value of type {}", other));
                Type::Error
            }
        }
    }

    fn typeof_member(&mut self, obj: &Expr, field: &str, span: Span) -> Type {
        let obj_ty = self.typeof_expr(obj);
        match obj_ty {
            Type::Custom(name) => match self.table.lookup(&name).cloned() {
                Some(sym) if sym.kind == SymbolKind::Record => {
                    match sym.fields.iter().find(|(n, _)| n == field) {
                        Some((_, ty)) => ty.clone(),
                        None => {
                            self.error(span.line, span.column, format!("'{}' has no field '{}'", name, field));
                            Type::Error
                        }
                    }
                }
                _ => Type::Error,
            },
            Type::DataFrame => self.fresh_var(),
            Type::Error => Type::Error,
            other => {
                self.error(span.line, span.column, format!("cannot access field '{}' on a value of type {}", field, other));
                Type::Error
            }
        }
    }

    fn typeof_assign(&mut self, target: &Expr, value: &Expr, span: Span) -> Type {
        if !target.is_lvalue() {
            self.error(span.line, span.column, "the left-hand side of an assignment must be a variable, field, or index expression");
            self.typeof_expr(value);
            return Type::Error;
        }
        let target_ty = self.typeof_expr(target);
        let value_ty = self.typeof_expr(value);
        if !target_ty.compatible(&value_ty) {
            self.error(span.line, span.column, format!("cannot assign a value of type {} to a target of type {}", value_ty, target_ty));
        }
        if let Expr::Identifier { name, .. } = target {
            self.table.mark_initialized(name);
        }
        target_ty
    }

    fn typeof_lambda(&mut self, params: &[Param], body: &Expr) -> Type {
        self.table.enter_scope();
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            let ty = match &param.declared_type {
                Some(tn) => type_node_to_type(tn),
                None => self.fresh_var(),
            };
            self.table
                .declare(Symbol::variable(param.name.clone(), ty.clone(), param.span.line, param.span.column, true));
            param_types.push(ty);
        }
        let body_ty = self.typeof_expr(body);
        self.close_scope();
        Type::Function(param_types, Box::new(body_ty))
    }

    fn typeof_array_literal(&mut self, elems: &[Expr], _span: Span) -> Type {
        if elems.is_empty() {
            return Type::Array(Box::new(self.fresh_var()));
        }
        let first_ty = self.typeof_expr(&elems[0]);
        for elem in &elems[1..] {
            let elem_ty = self.typeof_expr(elem);
            if !first_ty.compatible(&elem_ty) && !matches!(elem_ty, Type::Error) && !matches!(first_ty, Type::Error) {
                self.error(
                    elem.span().line,
                    elem.span().column,
                    format!("array elements must share a compatible type: expected {}, found {}", first_ty, elem_ty),
                );
            }
        }
        Type::Array(Box::new(first_ty))
    }

    fn typeof_range(&mut self, lo: &Expr, hi: &Expr, span: Span) -> Type {
        let lo_ty = self.typeof_expr(lo);
        let hi_ty = self.typeof_expr(hi);
        if !matches!(lo_ty, Type::Int | Type::Error) {
            self.error(span.line, span.column, format!("range start must be Int, found {}", lo_ty));
        }
        if !matches!(hi_ty, Type::Int | Type::Error) {
            self.error(span.line, span.column, format!("range end must be Int, found {}", hi_ty));
        }
        Type::Array(Box::new(Type::Int))
    }

    fn typeof_reduce(&mut self, init: &Expr, reducer: &Expr) -> Type {
        let init_ty = self.typeof_expr(init);
        let reducer_ty = self.typeof_expr(reducer);
        match reducer_ty {
            Type::Function(_, ret) => *ret,
            _ => init_ty,
        }
    }

    fn typeof_aggregate(&mut self, kind: AggKind, args: &[Expr], span: Span) -> Type {
        let name = match kind {
            AggKind::Sum => "sum",
            AggKind::Mean => "mean",
            AggKind::Count => "count",
            AggKind::Min => "min",
            AggKind::Max => "max",
        };
        self.typeof_named_call(name, args, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::trace::CompileTrace;

    fn analyze_source(src: &str) -> AnalysisResult {
        let (tokens, lex_diags) = Lexer::new(src).tokenize(&CompileTrace::silent());
        assert!(lex_diags.is_empty());
        let (program, parse_diags) = Parser::new(tokens).parse(&CompileTrace::silent());
        assert!(parse_diags.is_empty(), "unexpected parse errors: {:?}", parse_diags.iter().collect::<Vec<_>>());
        analyze(&program, &CompileTrace::silent())
    }

    #[test]
    fn well_typed_let_produces_no_diagnostics() {
        let result = analyze_source("let x: Int = 1 + 2;");
        assert!(!result.has_errors());
    }

    #[test]
    fn type_mismatch_on_declared_let_is_an_error() {
        let result = analyze_source("let x: Int = \"hi\";");
        assert!(result.has_errors());
    }

    #[test]
    fn function_forward_reference_is_allowed() {
        let result = analyze_source("fn caller() -> Int { return callee(); } fn callee() -> Int { return 1; }");
        assert!(!result.has_errors());
    }

    #[test]
    fn non_void_function_missing_return_on_every_path_is_an_error() {
        let result = analyze_source("fn f() -> Int { if true { return 1; } }");
        assert!(result.has_errors());
    }

    #[test]
    fn non_void_function_returning_on_every_branch_is_fine() {
        let result = analyze_source("fn f(x: Bool) -> Int { if x { return 1; } else { return 2; } }");
        assert!(!result.has_errors());
    }

    #[test]
    fn non_homogeneous_array_literal_is_an_error() {
        let result = analyze_source("let xs = [1, \"two\", 3];");
        assert!(result.has_errors());
    }

    #[test]
    fn for_loop_over_int_range_binds_int_element() {
        let result = analyze_source("for i in 0..10 { print(i); }");
        assert!(!result.has_errors());
    }

    #[test]
    fn unused_variable_is_a_warning_not_an_error() {
        let result = analyze_source("fn f() { let unused = 1; }");
        assert!(!result.has_errors());
        assert!(result.diagnostics.warning_count() >= 1);
    }

    #[test]
    fn undeclared_identifier_is_an_error() {
        let result = analyze_source("let x = y + 1;");
        assert!(result.has_errors());
    }

    #[test]
    fn record_field_access_resolves_declared_type() {
        let result = analyze_source("data Row { a: Int; } fn f(r: Row) -> Int { return r.a; }");
        assert!(!result.has_errors());
    }

    #[test]
    fn unknown_field_type_is_an_error() {
        let result = analyze_source("data Row { a: Nope; }");
        assert!(result.has_errors());
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let result = analyze_source("return 1;");
        assert!(result.has_errors());
    }

    #[test]
    fn assignment_to_non_lvalue_is_an_error() {
        let result = analyze_source("let x = 1; fn f() { 1 + 2 = 3; }");
        assert!(result.has_errors());
    }
}

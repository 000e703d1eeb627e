//! Recursive-descent parser (§4.C) with Pratt-style precedence climbing for
//! expressions and panic-mode error recovery at statement boundaries. ≈20% of the
//! front-end's share of the core.
use crate::ast::*;
use crate::diagnostic::{Diagnostic, DiagnosticBag};
use crate::token::{Token, TokenKind};
use crate::trace::CompileTrace;
use crate::trace_phase;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: DiagnosticBag,
    panic_mode: bool,
}

const SYNC_KEYWORDS: &[TokenKind] = &[
    TokenKind::Let,
    TokenKind::Fn,
    TokenKind::Data,
    TokenKind::If,
    TokenKind::For,
    TokenKind::Return,
    TokenKind::Import,
    TokenKind::Export,
];

fn span_of(tok: &Token) -> Span {
    Span::new(tok.line, tok.column)
}

/// String-literal content processing (§4.C, grounded on
/// `original_source/src/parser/parser_expr.c`): strips the outer quotes and rewrites
/// recognized escapes to runtime bytes; an unknown escape preserves the backslash.
pub fn process_string_literal(raw: &str) -> String {
    let inner = &raw[1..raw.len().saturating_sub(1)];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: DiagnosticBag::new(),
            panic_mode: false,
        }
    }

    pub fn parse(mut self, trace: &CompileTrace) -> (Program, DiagnosticBag) {
        let mut items = Vec::new();
        while !self.at_eof() {
            items.push(self.parse_top_item());
        }
        trace_phase!(
            trace,
            "parser: produced {} top-level item(s), {} diagnostic(s)",
            items.len(),
            self.diagnostics.len()
        );
        (Program { items }, self.diagnostics)
    }

    // --- token stream primitives ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_span(&self) -> Span {
        span_of(self.peek())
    }

    fn at_eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    /// Consume a token of `kind`, or record a diagnostic and return `None`.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error(format!("expected {}", what));
            None
        }
    }

    fn error(&mut self, message: String) {
        if !self.panic_mode {
            self.panic_mode = true;
            let tok = self.peek();
            self.diagnostics.push(
                Diagnostic::error(tok.line, tok.column, message).with_lexeme(tok.lexeme.clone()),
            );
        }
    }

    /// Skip tokens until the next `;` is consumed, or until the next token is a
    /// synchronization keyword, then reset panic mode (§4.C "Error recovery").
    fn synchronize(&mut self) {
        while !self.at_eof() {
            if self.check(TokenKind::Semicolon) {
                self.advance();
                break;
            }
            if SYNC_KEYWORDS.contains(&self.peek_kind()) {
                break;
            }
            self.advance();
        }
        self.panic_mode = false;
    }

    // --- top level ---

    fn parse_top_item(&mut self) -> TopItem {
        let item = match self.peek_kind() {
            TokenKind::Let => TopItem::Let(self.parse_let_decl()),
            TokenKind::Fn => TopItem::Fn(self.parse_fn_decl()),
            TokenKind::Data => TopItem::Data(self.parse_data_decl()),
            TokenKind::Import => TopItem::Import(self.parse_import_decl()),
            TokenKind::Export => TopItem::Export(self.parse_export_decl()),
            _ => TopItem::Stmt(self.parse_stmt()),
        };
        if self.panic_mode {
            self.synchronize();
        }
        item
    }

    fn parse_let_decl(&mut self) -> LetDecl {
        let tok = self.advance(); // `let`
        let name = self
            .expect(TokenKind::Identifier, "a variable name")
            .map(|t| t.lexeme)
            .unwrap_or_default();
        let mut declared_type = None;
        if self.check(TokenKind::Colon) {
            self.advance();
            declared_type = Some(self.parse_type());
        }
        self.expect(TokenKind::Eq, "'=' in let declaration");
        let init = self.parse_expr();
        self.expect(TokenKind::Semicolon, "';' to terminate let declaration");
        LetDecl {
            name,
            declared_type,
            init,
            span: span_of(&tok),
        }
    }

    fn parse_fn_decl(&mut self) -> FnDecl {
        let tok = self.advance(); // `fn`
        let name = self
            .expect(TokenKind::Identifier, "a function name")
            .map(|t| t.lexeme)
            .unwrap_or_default();
        self.expect(TokenKind::LParen, "'(' after function name");
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.parse_param());
            while self.check(TokenKind::Comma) {
                self.advance();
                params.push(self.parse_param());
            }
        }
        self.expect(TokenKind::RParen, "')' to close parameter list");
        let mut return_type = None;
        if self.check(TokenKind::Arrow) {
            self.advance();
            return_type = Some(self.parse_type());
        }
        let body = self.parse_block();
        FnDecl {
            name,
            params,
            return_type,
            body,
            span: span_of(&tok),
        }
    }

    fn parse_param(&mut self) -> Param {
        let tok = self.peek().clone();
        let name = self
            .expect(TokenKind::Identifier, "a parameter name")
            .map(|t| t.lexeme)
            .unwrap_or_default();
        self.expect(TokenKind::Colon, "':' after parameter name");
        let declared_type = Some(self.parse_type());
        Param {
            name,
            declared_type,
            span: span_of(&tok),
        }
    }

    fn parse_lambda_param(&mut self) -> Param {
        let tok = self.peek().clone();
        let name = self
            .expect(TokenKind::Identifier, "a lambda parameter name")
            .map(|t| t.lexeme)
            .unwrap_or_default();
        let mut declared_type = None;
        if self.check(TokenKind::Colon) {
            self.advance();
            declared_type = Some(self.parse_type());
        }
        Param {
            name,
            declared_type,
            span: span_of(&tok),
        }
    }

    fn parse_data_decl(&mut self) -> DataDecl {
        let tok = self.advance(); // `data`
        let name = self
            .expect(TokenKind::Identifier, "a record type name")
            .map(|t| t.lexeme)
            .unwrap_or_default();
        self.expect(TokenKind::LBrace, "'{' to open record body");
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            let field_tok = self.peek().clone();
            let fname = self
                .expect(TokenKind::Identifier, "a field name")
                .map(|t| t.lexeme)
                .unwrap_or_default();
            self.expect(TokenKind::Colon, "':' after field name");
            let field_type = self.parse_type();
            self.expect(TokenKind::Semicolon, "';' to terminate field declaration");
            fields.push(FieldDecl {
                name: fname,
                field_type,
                span: span_of(&field_tok),
            });
        }
        self.expect(TokenKind::RBrace, "'}' to close record body");
        DataDecl {
            name,
            fields,
            span: span_of(&tok),
        }
    }

    fn parse_import_decl(&mut self) -> ImportDecl {
        let tok = self.advance(); // `import`
        let path = self
            .expect(TokenKind::StringLit, "a module path string")
            .map(|t| process_string_literal(&t.lexeme))
            .unwrap_or_default();
        let mut alias = None;
        if self.check(TokenKind::As) {
            self.advance();
            alias = self
                .expect(TokenKind::Identifier, "an alias name")
                .map(|t| t.lexeme);
        }
        self.expect(TokenKind::Semicolon, "';' to terminate import");
        ImportDecl {
            path,
            alias,
            span: span_of(&tok),
        }
    }

    fn parse_export_decl(&mut self) -> ExportDecl {
        let tok = self.advance(); // `export`
        let name = self
            .expect(TokenKind::Identifier, "a name to export")
            .map(|t| t.lexeme)
            .unwrap_or_default();
        self.expect(TokenKind::Semicolon, "';' to terminate export");
        ExportDecl {
            name,
            span: span_of(&tok),
        }
    }

    fn parse_type(&mut self) -> TypeNode {
        match self.peek_kind() {
            TokenKind::TypeInt => {
                self.advance();
                TypeNode::Int
            }
            TokenKind::TypeFloat => {
                self.advance();
                TypeNode::Float
            }
            TokenKind::TypeString => {
                self.advance();
                TypeNode::String
            }
            TokenKind::TypeBool => {
                self.advance();
                TypeNode::Bool
            }
            TokenKind::TypeDataFrame => {
                self.advance();
                TypeNode::DataFrame
            }
            TokenKind::TypeVector => {
                self.advance();
                TypeNode::Vector
            }
            TokenKind::TypeSeries => {
                self.advance();
                TypeNode::Series
            }
            TokenKind::Identifier => TypeNode::Named(self.advance().lexeme),
            TokenKind::LBracket => {
                self.advance();
                let inner = self.parse_type();
                self.expect(TokenKind::RBracket, "']' to close array type");
                TypeNode::Array(Box::new(inner))
            }
            TokenKind::LParen => {
                self.advance();
                let mut types = vec![self.parse_type()];
                while self.check(TokenKind::Comma) {
                    self.advance();
                    types.push(self.parse_type());
                }
                self.expect(TokenKind::RParen, "')' to close tuple type");
                TypeNode::Tuple(types)
            }
            _ => {
                self.error("expected a type".to_string());
                TypeNode::Named(String::new())
            }
        }
    }

    // --- statements ---

    fn parse_stmt(&mut self) -> Stmt {
        match self.peek_kind() {
            TokenKind::Let => Stmt::Let(self.parse_let_decl()),
            TokenKind::If => Stmt::If(self.parse_if_stmt()),
            TokenKind::For => Stmt::For(self.parse_for_stmt()),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::LBrace => Stmt::Block(self.parse_block()),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_if_stmt(&mut self) -> IfStmt {
        let tok = self.advance(); // `if`
        let cond = self.parse_expr();
        let then_block = self.parse_block();
        let mut else_branch = None;
        if self.check(TokenKind::Else) {
            self.advance();
            else_branch = Some(if self.check(TokenKind::If) {
                ElseBranch::If(Box::new(self.parse_if_stmt()))
            } else {
                ElseBranch::Block(self.parse_block())
            });
        }
        IfStmt {
            cond,
            then_block,
            else_branch,
            span: span_of(&tok),
        }
    }

    fn parse_for_stmt(&mut self) -> ForStmt {
        let tok = self.advance(); // `for`
        let iter_name = self
            .expect(TokenKind::Identifier, "a loop variable name")
            .map(|t| t.lexeme)
            .unwrap_or_default();
        self.expect(TokenKind::In, "'in' in for statement");
        let iterable = self.parse_expr();
        let body = self.parse_block();
        ForStmt {
            iter_name,
            iterable,
            body,
            span: span_of(&tok),
        }
    }

    fn parse_return_stmt(&mut self) -> Stmt {
        let tok = self.advance(); // `return`
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(TokenKind::Semicolon, "';' to terminate return statement");
        Stmt::Return {
            value,
            span: span_of(&tok),
        }
    }

    fn parse_block(&mut self) -> Block {
        let open = self.expect(TokenKind::LBrace, "'{' to open block");
        let span = open.as_ref().map(span_of).unwrap_or_else(|| self.peek_span());
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            stmts.push(self.parse_stmt());
        }
        self.expect(TokenKind::RBrace, "'}' to close block");
        Block { stmts, span }
    }

    /// `print(e);` is syntactic sugar recognized at parse time over an ordinary
    /// call expression — `print` has no dedicated grammar production, only a
    /// built-in function binding (§4.D "Built-in functions"); rewriting the call
    /// into a dedicated `Stmt::Print` here keeps the statement-level AST shape the
    /// data model describes while the grammar stays a plain `ExprStmt`.
    fn parse_expr_stmt(&mut self) -> Stmt {
        let span = self.peek_span();
        let expr = self.parse_expr();
        self.expect(TokenKind::Semicolon, "';' to terminate statement");
        if let Expr::Call { callee, mut args, .. } = expr {
            if let Expr::Identifier { name, .. } = callee.as_ref() {
                if name == "print" && args.len() == 1 {
                    return Stmt::Print {
                        value: args.pop().unwrap(),
                        span,
                    };
                }
            }
            return Stmt::ExprStmt {
                expr: Expr::Call { callee, args, span },
                span,
            };
        }
        Stmt::ExprStmt { expr, span }
    }

    // --- expressions ---

    fn parse_expr(&mut self) -> Expr {
        self.parse_pipeline()
    }

    fn parse_pipeline(&mut self) -> Expr {
        let span = self.peek_span();
        let mut stages = vec![self.parse_transform()];
        while self.check(TokenKind::PipeGt) {
            self.advance();
            stages.push(self.parse_transform());
        }
        if stages.len() == 1 {
            stages.pop().unwrap()
        } else {
            Expr::Pipeline { stages, span }
        }
    }

    fn parse_transform(&mut self) -> Expr {
        match self.peek_kind() {
            TokenKind::Filter => self.parse_filter(),
            TokenKind::Map => self.parse_map(),
            TokenKind::Reduce => self.parse_reduce(),
            TokenKind::Select => self.parse_select(),
            TokenKind::GroupBy => self.parse_groupby(),
            TokenKind::Sum
            | TokenKind::Mean
            | TokenKind::Count
            | TokenKind::Min
            | TokenKind::Max => self.parse_aggregate(),
            _ => self.parse_assign(),
        }
    }

    fn parse_filter(&mut self) -> Expr {
        let tok = self.advance(); // `filter`
        self.expect(TokenKind::LParen, "'(' after filter");
        let predicate = self.parse_lambda();
        self.expect(TokenKind::RParen, "')' to close filter");
        Expr::Filter {
            predicate: Box::new(predicate),
            span: span_of(&tok),
        }
    }

    fn parse_map(&mut self) -> Expr {
        let tok = self.advance(); // `map`
        self.expect(TokenKind::LParen, "'(' after map");
        let function = self.parse_lambda();
        self.expect(TokenKind::RParen, "')' to close map");
        Expr::Map {
            function: Box::new(function),
            span: span_of(&tok),
        }
    }

    fn parse_reduce(&mut self) -> Expr {
        let tok = self.advance(); // `reduce`
        self.expect(TokenKind::LParen, "'(' after reduce");
        let init = self.parse_expr();
        self.expect(TokenKind::Comma, "',' between reduce init and reducer");
        let reducer = self.parse_lambda();
        self.expect(TokenKind::RParen, "')' to close reduce");
        Expr::Reduce {
            init: Box::new(init),
            reducer: Box::new(reducer),
            span: span_of(&tok),
        }
    }

    fn parse_identifier_list(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(t) = self.expect(TokenKind::Identifier, "a column name") {
            names.push(t.lexeme);
        }
        while self.check(TokenKind::Comma) {
            self.advance();
            if let Some(t) = self.expect(TokenKind::Identifier, "a column name") {
                names.push(t.lexeme);
            }
        }
        names
    }

    fn parse_select(&mut self) -> Expr {
        let tok = self.advance(); // `select`
        self.expect(TokenKind::LParen, "'(' after select");
        let columns = self.parse_identifier_list();
        self.expect(TokenKind::RParen, "')' to close select");
        Expr::Select {
            columns,
            span: span_of(&tok),
        }
    }

    fn parse_groupby(&mut self) -> Expr {
        let tok = self.advance(); // `groupby`
        self.expect(TokenKind::LParen, "'(' after groupby");
        let columns = self.parse_identifier_list();
        self.expect(TokenKind::RParen, "')' to close groupby");
        Expr::GroupBy {
            columns,
            span: span_of(&tok),
        }
    }

    fn parse_aggregate(&mut self) -> Expr {
        let tok = self.advance();
        let kind = match tok.kind {
            TokenKind::Sum => AggKind::Sum,
            TokenKind::Mean => AggKind::Mean,
            TokenKind::Count => AggKind::Count,
            TokenKind::Min => AggKind::Min,
            TokenKind::Max => AggKind::Max,
            _ => unreachable!("caller only dispatches aggregate-name tokens"),
        };
        self.expect(TokenKind::LParen, "'(' after aggregate name");
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr());
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr());
            }
        }
        self.expect(TokenKind::RParen, "')' to close aggregate call");
        Expr::Aggregate {
            kind,
            args,
            span: span_of(&tok),
        }
    }

    /// Right-associative: `a = b = c` parses as `Assign(a, Assign(b, c))`.
    fn parse_assign(&mut self) -> Expr {
        let left = self.parse_logic_or();
        if self.check(TokenKind::Eq) {
            let tok = self.advance();
            let value = self.parse_assign();
            return Expr::Assign {
                target: Box::new(left),
                value: Box::new(value),
                span: span_of(&tok),
            };
        }
        left
    }

    fn parse_logic_or(&mut self) -> Expr {
        let mut left = self.parse_logic_and();
        while self.check(TokenKind::OrOr) {
            let tok = self.advance();
            let right = self.parse_logic_and();
            left = Expr::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                span: span_of(&tok),
            };
        }
        left
    }

    fn parse_logic_and(&mut self) -> Expr {
        let mut left = self.parse_equality();
        while self.check(TokenKind::AndAnd) {
            let tok = self.advance();
            let right = self.parse_equality();
            left = Expr::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
                span: span_of(&tok),
            };
        }
        left
    }

    fn parse_equality(&mut self) -> Expr {
        let mut left = self.parse_relational();
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::EqEq,
                TokenKind::NotEq => BinOp::NotEq,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_relational();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: span_of(&tok),
            };
        }
        left
    }

    fn parse_relational(&mut self) -> Expr {
        let mut left = self.parse_range();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_range();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: span_of(&tok),
            };
        }
        left
    }

    fn parse_range(&mut self) -> Expr {
        let lo = self.parse_add();
        if self.check(TokenKind::DotDot) {
            let tok = self.advance();
            let hi = self.parse_add();
            return Expr::Range {
                lo: Box::new(lo),
                hi: Box::new(hi),
                span: span_of(&tok),
            };
        }
        lo
    }

    fn parse_add(&mut self) -> Expr {
        let mut left = self.parse_mult();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_mult();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: span_of(&tok),
            };
        }
        left
    }

    fn parse_mult(&mut self) -> Expr {
        let mut left = self.parse_unary();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let tok = self.advance();
            let right = self.parse_unary();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: span_of(&tok),
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let tok = self.advance();
            let operand = self.parse_unary();
            return Expr::Unary {
                op,
                operand: Box::new(operand),
                span: span_of(&tok),
            };
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            if self.check(TokenKind::LParen) {
                let tok = self.advance();
                let mut args = Vec::new();
                if !self.check(TokenKind::RParen) {
                    args.push(self.parse_expr());
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        args.push(self.parse_expr());
                    }
                }
                self.expect(TokenKind::RParen, "')' to close call arguments");
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span: span_of(&tok),
                };
            } else if self.check(TokenKind::LBracket) {
                let tok = self.advance();
                let index = self.parse_expr();
                self.expect(TokenKind::RBracket, "']' to close index expression");
                expr = Expr::Index {
                    obj: Box::new(expr),
                    index: Box::new(index),
                    span: span_of(&tok),
                };
            } else if self.check(TokenKind::Dot) {
                let tok = self.advance();
                let field = self
                    .expect(TokenKind::Identifier, "a field name after '.'")
                    .map(|t| t.lexeme)
                    .unwrap_or_default();
                expr = Expr::Member {
                    obj: Box::new(expr),
                    field,
                    span: span_of(&tok),
                };
            } else {
                break;
            }
        }
        expr
    }

    fn parse_lambda(&mut self) -> Expr {
        let open = self.expect(TokenKind::Pipe, "'|' to start lambda parameters");
        let span = open.as_ref().map(span_of).unwrap_or_else(|| self.peek_span());
        let mut params = Vec::new();
        if !self.check(TokenKind::Pipe) {
            params.push(self.parse_lambda_param());
            while self.check(TokenKind::Comma) {
                self.advance();
                params.push(self.parse_lambda_param());
            }
        }
        self.expect(TokenKind::Pipe, "'|' to close lambda parameters");
        let body = self.parse_expr();
        Expr::Lambda {
            params,
            body: Box::new(body),
            span,
        }
    }

    fn parse_load(&mut self) -> Expr {
        let tok = self.advance(); // `load`
        self.expect(TokenKind::LParen, "'(' after load");
        let path = self
            .expect(TokenKind::StringLit, "a string path")
            .map(|t| process_string_literal(&t.lexeme))
            .unwrap_or_default();
        self.expect(TokenKind::RParen, "')' to close load");
        Expr::Load {
            path,
            span: span_of(&tok),
        }
    }

    fn parse_save(&mut self) -> Expr {
        let tok = self.advance(); // `save`
        self.expect(TokenKind::LParen, "'(' after save");
        let data = self.parse_expr();
        self.expect(TokenKind::Comma, "',' between save data and path");
        let path = self
            .expect(TokenKind::StringLit, "a string path")
            .map(|t| process_string_literal(&t.lexeme))
            .unwrap_or_default();
        self.expect(TokenKind::RParen, "')' to close save");
        Expr::Save {
            data: Box::new(data),
            path,
            span: span_of(&tok),
        }
    }

    fn parse_primary(&mut self) -> Expr {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Integer => {
                self.advance();
                let value = tok.lexeme.parse::<i64>().unwrap_or(0);
                Expr::Literal {
                    value: LiteralValue::Int(value),
                    span: span_of(&tok),
                }
            }
            TokenKind::Float => {
                self.advance();
                let value = tok.lexeme.parse::<f64>().unwrap_or(0.0);
                Expr::Literal {
                    value: LiteralValue::Float(value),
                    span: span_of(&tok),
                }
            }
            TokenKind::StringLit => {
                self.advance();
                Expr::Literal {
                    value: LiteralValue::Str(process_string_literal(&tok.lexeme)),
                    span: span_of(&tok),
                }
            }
            TokenKind::Boolean => {
                self.advance();
                Expr::Literal {
                    value: LiteralValue::Bool(tok.lexeme == "true"),
                    span: span_of(&tok),
                }
            }
            TokenKind::Identifier => {
                self.advance();
                Expr::Identifier {
                    name: tok.lexeme,
                    span: span_of(&tok),
                }
            }
            TokenKind::Pipe => self.parse_lambda(),
            TokenKind::Load => self.parse_load(),
            TokenKind::Save => self.parse_save(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen, "')' to close parenthesized expression");
                inner
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                if !self.check(TokenKind::RBracket) {
                    elems.push(self.parse_expr());
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        elems.push(self.parse_expr());
                    }
                }
                self.expect(TokenKind::RBracket, "']' to close array literal");
                Expr::ArrayLiteral {
                    elems,
                    span: span_of(&tok),
                }
            }
            _ => {
                self.error(format!("expected an expression, found {:?}", tok.kind));
                Expr::Error { span: span_of(&tok) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Program {
        let (tokens, lex_diags) = Lexer::new(src).tokenize(&CompileTrace::silent());
        assert!(lex_diags.is_empty(), "unexpected lexical errors: {:?}", lex_diags.iter().collect::<Vec<_>>());
        Parser::new(tokens).parse(&CompileTrace::silent()).0
    }

    fn only_expr(src: &str) -> Expr {
        let program = parse(&format!("let __t = {};", src));
        match program.items.into_iter().next().unwrap() {
            TopItem::Let(d) => d.init,
            _ => panic!("expected a let declaration"),
        }
    }

    #[test]
    fn precedence_mul_binds_tighter_than_add() {
        let expr = only_expr("a + b * c");
        match expr {
            Expr::Binary { op: BinOp::Add, right, .. } => match *right {
                Expr::Binary { op: BinOp::Mul, .. } => {}
                other => panic!("expected nested Mul, got {:?}", other),
            },
            other => panic!("expected top-level Add, got {:?}", other),
        }
    }

    #[test]
    fn relational_binds_tighter_than_equality() {
        let expr = only_expr("a < b == c");
        match expr {
            Expr::Binary { op: BinOp::EqEq, left, .. } => match *left {
                Expr::Binary { op: BinOp::Lt, .. } => {}
                other => panic!("expected nested Lt, got {:?}", other),
            },
            other => panic!("expected top-level EqEq, got {:?}", other),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = only_expr("a = b = c");
        match expr {
            Expr::Assign { value, .. } => match *value {
                Expr::Assign { .. } => {}
                other => panic!("expected nested Assign, got {:?}", other),
            },
            other => panic!("expected top-level Assign, got {:?}", other),
        }
    }

    #[test]
    fn well_formed_program_round_trips_top_level_shape() {
        let program = parse("let x = 1; fn f() { return x; } data Row { a: Int; }");
        assert_eq!(program.items.len(), 3);
        assert!(matches!(program.items[0], TopItem::Let(_)));
        assert!(matches!(program.items[1], TopItem::Fn(_)));
        assert!(matches!(program.items[2], TopItem::Data(_)));
    }

    #[test]
    fn error_recovery_reports_exactly_one_diagnostic_and_keeps_next_statement() {
        let (tokens, _) = Lexer::new("let x = 1; ) let y = 2;").tokenize(&CompileTrace::silent());
        let (program, diagnostics) = Parser::new(tokens).parse(&CompileTrace::silent());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(program.items.len(), 3);
        match &program.items[2] {
            TopItem::Let(d) => assert_eq!(d.name, "y"),
            other => panic!("expected second let to survive recovery, got {:?}", other),
        }
    }

    #[test]
    fn print_call_statement_becomes_print_node() {
        let program = parse("print(1);");
        match &program.items[0] {
            TopItem::Stmt(Stmt::Print { .. }) => {}
            other => panic!("expected Print statement, got {:?}", other),
        }
    }

    #[test]
    fn pipeline_stages_collect_in_order() {
        let expr = only_expr("rows |> filter(|r| r.x) |> select(x)");
        match expr {
            Expr::Pipeline { stages, .. } => assert_eq!(stages.len(), 3),
            other => panic!("expected Pipeline, got {:?}", other),
        }
    }
}

//! Pretty-printing for the AST via `ptree`: a plain tree of labeled nodes
//! implementing [`ptree::TreeItem`], walked with [`ptree::print_tree`].
use crate::ast::*;
use ptree::TreeItem;
use std::borrow::Cow;
use std::io::Write;

#[derive(Clone)]
pub struct PrintNode {
    label: String,
    children: Vec<PrintNode>,
}

impl PrintNode {
    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn with_children(label: impl Into<String>, children: Vec<PrintNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl TreeItem for PrintNode {
    type Child = Self;

    fn write_self<W: Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.children)
    }
}

pub fn print_program(program: &Program) -> std::io::Result<()> {
    ptree::print_tree(&program_node(program))
}

fn program_node(program: &Program) -> PrintNode {
    PrintNode::with_children(
        "Program",
        program.items.iter().map(top_item_node).collect(),
    )
}

fn top_item_node(item: &TopItem) -> PrintNode {
    match item {
        TopItem::Let(d) => let_node(d),
        TopItem::Fn(d) => fn_node(d),
        TopItem::Data(d) => data_node(d),
        TopItem::Import(d) => PrintNode::leaf(format!(
            "Import({}{})",
            d.path,
            d.alias.as_deref().map(|a| format!(" as {}", a)).unwrap_or_default()
        )),
        TopItem::Export(d) => PrintNode::leaf(format!("Export({})", d.name)),
        TopItem::Stmt(s) => stmt_node(s),
    }
}

fn let_node(d: &LetDecl) -> PrintNode {
    PrintNode::with_children(format!("Let({})", d.name), vec![expr_node(&d.init)])
}

fn fn_node(d: &FnDecl) -> PrintNode {
    let mut children: Vec<PrintNode> = d
        .params
        .iter()
        .map(|p| PrintNode::leaf(format!("Param({})", p.name)))
        .collect();
    children.push(block_node(&d.body));
    PrintNode::with_children(format!("Fn({})", d.name), children)
}

fn data_node(d: &DataDecl) -> PrintNode {
    PrintNode::with_children(
        format!("Data({})", d.name),
        d.fields
            .iter()
            .map(|f| PrintNode::leaf(format!("Field({})", f.name)))
            .collect(),
    )
}

fn block_node(block: &Block) -> PrintNode {
    PrintNode::with_children("Block", block.stmts.iter().map(stmt_node).collect())
}

fn stmt_node(stmt: &Stmt) -> PrintNode {
    match stmt {
        Stmt::Let(d) => let_node(d),
        Stmt::If(s) => {
            let mut children = vec![expr_node(&s.cond), block_node(&s.then_block)];
            if let Some(branch) = &s.else_branch {
                children.push(match branch {
                    ElseBranch::If(inner) => stmt_node(&Stmt::If((**inner).clone())),
                    ElseBranch::Block(b) => block_node(b),
                });
            }
            PrintNode::with_children("If", children)
        }
        Stmt::For(s) => PrintNode::with_children(
            format!("For({})", s.iter_name),
            vec![expr_node(&s.iterable), block_node(&s.body)],
        ),
        Stmt::Return { value, .. } => PrintNode::with_children(
            "Return",
            value.iter().map(expr_node).collect(),
        ),
        Stmt::Print { value, .. } => PrintNode::with_children("Print", vec![expr_node(value)]),
        Stmt::ExprStmt { expr, .. } => PrintNode::with_children("ExprStmt", vec![expr_node(expr)]),
        Stmt::Block(b) => block_node(b),
        Stmt::Error(_) => PrintNode::leaf("<recovered>"),
    }
}

fn expr_node(expr: &Expr) -> PrintNode {
    match expr {
        Expr::Literal { value, .. } => PrintNode::leaf(format!("Literal({:?})", value)),
        Expr::Identifier { name, .. } => PrintNode::leaf(format!("Identifier({})", name)),
        Expr::Binary { op, left, right, .. } => PrintNode::with_children(
            format!("Binary({:?})", op),
            vec![expr_node(left), expr_node(right)],
        ),
        Expr::Unary { op, operand, .. } => {
            PrintNode::with_children(format!("Unary({:?})", op), vec![expr_node(operand)])
        }
        Expr::Call { callee, args, .. } => {
            let mut children = vec![expr_node(callee)];
            children.extend(args.iter().map(expr_node));
            PrintNode::with_children("Call", children)
        }
        Expr::Index { obj, index, .. } => {
            PrintNode::with_children("Index", vec![expr_node(obj), expr_node(index)])
        }
        Expr::Member { obj, field, .. } => {
            PrintNode::with_children(format!("Member(.{})", field), vec![expr_node(obj)])
        }
        Expr::Assign { target, value, .. } => {
            PrintNode::with_children("Assign", vec![expr_node(target), expr_node(value)])
        }
        Expr::Lambda { params, body, .. } => {
            let mut children: Vec<PrintNode> = params
                .iter()
                .map(|p| PrintNode::leaf(format!("Param({})", p.name)))
                .collect();
            children.push(expr_node(body));
            PrintNode::with_children("Lambda", children)
        }
        Expr::Pipeline { stages, .. } => {
            PrintNode::with_children("Pipeline", stages.iter().map(expr_node).collect())
        }
        Expr::ArrayLiteral { elems, .. } => {
            PrintNode::with_children("ArrayLiteral", elems.iter().map(expr_node).collect())
        }
        Expr::Range { lo, hi, .. } => {
            PrintNode::with_children("Range", vec![expr_node(lo), expr_node(hi)])
        }
        Expr::Load { path, .. } => PrintNode::leaf(format!("Load({})", path)),
        Expr::Save { data, path, .. } => {
            PrintNode::with_children(format!("Save({})", path), vec![expr_node(data)])
        }
        Expr::Filter { predicate, .. } => {
            PrintNode::with_children("Filter", vec![expr_node(predicate)])
        }
        Expr::Map { function, .. } => PrintNode::with_children("Map", vec![expr_node(function)]),
        Expr::Reduce { init, reducer, .. } => {
            PrintNode::with_children("Reduce", vec![expr_node(init), expr_node(reducer)])
        }
        Expr::Select { columns, .. } => PrintNode::leaf(format!("Select({})", columns.join(", "))),
        Expr::GroupBy { columns, .. } => {
            PrintNode::leaf(format!("GroupBy({})", columns.join(", ")))
        }
        Expr::Aggregate { kind, args, .. } => {
            PrintNode::with_children(format!("Aggregate({:?})", kind), args.iter().map(expr_node).collect())
        }
        Expr::Error { .. } => PrintNode::leaf("<recovered>"),
    }
}

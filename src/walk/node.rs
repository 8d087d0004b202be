use crate::ast::{
    Block, CaseClause, CommClause, Decl, Expr, ExprKind, FuncDecl, SourceFile, Stmt, ValueSpec,
};
use std::ptr;

/// Borrowed reference to any node the walkers visit.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    File(&'a SourceFile),
    Func(&'a FuncDecl),
    ValueSpec(&'a ValueSpec),
    Block(&'a Block),
    Clause(&'a CaseClause),
    CommClause(&'a CommClause),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

/// Syntactic kind of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    File,
    Func,
    ValueSpec,
    Block,
    CaseClause,
    CommClause,
    ExprStmt,
    Assign,
    IncDec,
    VarDecl,
    If,
    For,
    Range,
    Switch,
    TypeSwitch,
    Select,
    Go,
    Defer,
    Return,
    Labeled,
    Send,
    Branch,
    Empty,
    Ident,
    BasicLit,
    CompositeLit,
    FuncLit,
    Paren,
    Selector,
    Index,
    SliceExpr,
    TypeAssert,
    Call,
    Star,
    Unary,
    Binary,
    KeyValue,
    ArrayType,
    TypeExpr,
}

/// A set of node kinds, one bit per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindSet(u64);

impl KindSet {
    pub const ALL: KindSet = KindSet(u64::MAX);

    pub const fn of(kinds: &[NodeKind]) -> KindSet {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << kinds[i] as u8;
            i += 1;
        }
        KindSet(bits)
    }

    pub fn contains(self, kind: NodeKind) -> bool {
        self.0 & (1 << kind as u8) != 0
    }
}

impl<'a> Node<'a> {
    /// Node for a statement; a nested block statement is its block.
    pub fn from_stmt(stmt: &'a Stmt) -> Node<'a> {
        match stmt {
            Stmt::Block(block) => Node::Block(block),
            other => Node::Stmt(other),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Func(_) => NodeKind::Func,
            Node::ValueSpec(_) => NodeKind::ValueSpec,
            Node::Block(_) => NodeKind::Block,
            Node::Clause(_) => NodeKind::CaseClause,
            Node::CommClause(_) => NodeKind::CommClause,
            Node::Stmt(stmt) => match stmt {
                Stmt::Expr { .. } => NodeKind::ExprStmt,
                Stmt::Assign { .. } => NodeKind::Assign,
                Stmt::IncDec { .. } => NodeKind::IncDec,
                Stmt::Var(_) => NodeKind::VarDecl,
                Stmt::Block(_) => NodeKind::Block,
                Stmt::If(_) => NodeKind::If,
                Stmt::For(_) => NodeKind::For,
                Stmt::Range(_) => NodeKind::Range,
                Stmt::Switch(_) => NodeKind::Switch,
                Stmt::TypeSwitch(_) => NodeKind::TypeSwitch,
                Stmt::Select(_) => NodeKind::Select,
                Stmt::Go { .. } => NodeKind::Go,
                Stmt::Defer { .. } => NodeKind::Defer,
                Stmt::Return { .. } => NodeKind::Return,
                Stmt::Labeled { .. } => NodeKind::Labeled,
                Stmt::Send { .. } => NodeKind::Send,
                Stmt::Branch { .. } => NodeKind::Branch,
                Stmt::Empty { .. } => NodeKind::Empty,
            },
            Node::Expr(expr) => match &expr.node {
                ExprKind::Ident { .. } => NodeKind::Ident,
                ExprKind::BasicLit { .. } => NodeKind::BasicLit,
                ExprKind::CompositeLit { .. } => NodeKind::CompositeLit,
                ExprKind::FuncLit { .. } => NodeKind::FuncLit,
                ExprKind::Paren { .. } => NodeKind::Paren,
                ExprKind::Selector { .. } => NodeKind::Selector,
                ExprKind::Index { .. } => NodeKind::Index,
                ExprKind::SliceExpr { .. } => NodeKind::SliceExpr,
                ExprKind::TypeAssert { .. } => NodeKind::TypeAssert,
                ExprKind::Call { .. } => NodeKind::Call,
                ExprKind::Star { .. } => NodeKind::Star,
                ExprKind::Unary { .. } => NodeKind::Unary,
                ExprKind::Binary { .. } => NodeKind::Binary,
                ExprKind::KeyValue { .. } => NodeKind::KeyValue,
                ExprKind::ArrayType { .. } => NodeKind::ArrayType,
                ExprKind::TypeExpr { .. } => NodeKind::TypeExpr,
            },
        }
    }

    /// Identity comparison: both refer to the same tree node.
    pub fn same(&self, other: &Node<'_>) -> bool {
        match (self, other) {
            (Node::File(a), Node::File(b)) => ptr::eq(*a, *b),
            (Node::Func(a), Node::Func(b)) => ptr::eq(*a, *b),
            (Node::ValueSpec(a), Node::ValueSpec(b)) => ptr::eq(*a, *b),
            (Node::Block(a), Node::Block(b)) => ptr::eq(*a, *b),
            (Node::Clause(a), Node::Clause(b)) => ptr::eq(*a, *b),
            (Node::CommClause(a), Node::CommClause(b)) => ptr::eq(*a, *b),
            (Node::Stmt(a), Node::Stmt(b)) => ptr::eq(*a, *b),
            (Node::Expr(a), Node::Expr(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }

    /// Function declarations and function literals.
    pub fn is_function(&self) -> bool {
        match self {
            Node::Func(_) => true,
            Node::Expr(expr) => matches!(expr.node, ExprKind::FuncLit { .. }),
            _ => false,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match *self {
            Node::File(file) => {
                for decl in &file.decls {
                    match decl {
                        Decl::Func(func) => out.push(Node::Func(func)),
                        Decl::Var(var) => out.extend(var.specs.iter().map(Node::ValueSpec)),
                    }
                }
            }
            Node::Func(func) => out.extend(func.body.as_ref().map(Node::Block)),
            Node::ValueSpec(spec) => out.extend(spec.values.iter().map(Node::Expr)),
            Node::Block(block) => out.extend(block.stmts.iter().map(Node::from_stmt)),
            Node::Clause(clause) => {
                out.extend(clause.exprs.iter().map(Node::Expr));
                out.extend(clause.body.iter().map(Node::from_stmt));
            }
            Node::CommClause(clause) => {
                out.extend(clause.comm.as_deref().map(Node::from_stmt));
                out.extend(clause.body.iter().map(Node::from_stmt));
            }
            Node::Stmt(stmt) => stmt_children(stmt, &mut out),
            Node::Expr(expr) => expr_children(expr, &mut out),
        }
        out
    }
}

fn stmt_children<'a>(stmt: &'a Stmt, out: &mut Vec<Node<'a>>) {
    match stmt {
        Stmt::Expr { expr } => out.push(Node::Expr(expr)),
        Stmt::Assign { lhs, rhs, .. } => {
            out.extend(lhs.iter().map(Node::Expr));
            out.extend(rhs.iter().map(Node::Expr));
        }
        Stmt::IncDec { target, .. } => out.push(Node::Expr(target)),
        Stmt::Var(decl) => out.extend(decl.specs.iter().map(Node::ValueSpec)),
        Stmt::Block(block) => out.extend(block.stmts.iter().map(Node::from_stmt)),
        Stmt::If(s) => {
            out.extend(s.init.as_deref().map(Node::from_stmt));
            out.push(Node::Expr(&s.cond));
            out.push(Node::Block(&s.then));
            out.extend(s.else_branch.as_deref().map(Node::from_stmt));
        }
        Stmt::For(s) => {
            out.extend(s.init.as_deref().map(Node::from_stmt));
            out.extend(s.cond.as_ref().map(Node::Expr));
            out.extend(s.post.as_deref().map(Node::from_stmt));
            out.push(Node::Block(&s.body));
        }
        Stmt::Range(s) => {
            out.extend(s.key.as_ref().map(Node::Expr));
            out.extend(s.value.as_ref().map(Node::Expr));
            out.push(Node::Expr(&s.subject));
            out.push(Node::Block(&s.body));
        }
        Stmt::Switch(s) => {
            out.extend(s.init.as_deref().map(Node::from_stmt));
            out.extend(s.tag.as_ref().map(Node::Expr));
            out.extend(s.clauses.iter().map(Node::Clause));
        }
        Stmt::TypeSwitch(s) => {
            out.extend(s.init.as_deref().map(Node::from_stmt));
            out.push(Node::from_stmt(&s.assign));
            out.extend(s.clauses.iter().map(Node::Clause));
        }
        Stmt::Select(s) => out.extend(s.clauses.iter().map(Node::CommClause)),
        Stmt::Go { call, .. } | Stmt::Defer { call, .. } => out.push(Node::Expr(call)),
        Stmt::Return { results, .. } => out.extend(results.iter().map(Node::Expr)),
        Stmt::Labeled { stmt, .. } => out.push(Node::from_stmt(stmt)),
        Stmt::Send { channel, value, .. } => {
            out.push(Node::Expr(channel));
            out.push(Node::Expr(value));
        }
        Stmt::Branch { .. } | Stmt::Empty { .. } => {}
    }
}

fn expr_children<'a>(expr: &'a Expr, out: &mut Vec<Node<'a>>) {
    match &expr.node {
        ExprKind::Ident { .. } | ExprKind::BasicLit { .. } | ExprKind::TypeExpr { .. } => {}
        ExprKind::CompositeLit { elts } => out.extend(elts.iter().map(Node::Expr)),
        ExprKind::FuncLit { body } => out.push(Node::Block(body)),
        ExprKind::Paren { inner } | ExprKind::Star { inner } => out.push(Node::Expr(inner)),
        ExprKind::Selector { base, .. } | ExprKind::TypeAssert { base, .. } => {
            out.push(Node::Expr(base))
        }
        ExprKind::Index { base, index } => {
            out.push(Node::Expr(base));
            out.push(Node::Expr(index));
        }
        ExprKind::SliceExpr {
            base,
            low,
            high,
            max,
        } => {
            out.push(Node::Expr(base));
            for part in [low, high, max].into_iter().flatten() {
                out.push(Node::Expr(part));
            }
        }
        ExprKind::Call { func, args, .. } => {
            out.push(Node::Expr(func));
            out.extend(args.iter().map(Node::Expr));
        }
        ExprKind::Unary { operand, .. } => out.push(Node::Expr(operand)),
        ExprKind::Binary { lhs, rhs, .. } => {
            out.push(Node::Expr(lhs));
            out.push(Node::Expr(rhs));
        }
        ExprKind::KeyValue { key, value } => {
            out.push(Node::Expr(key));
            out.push(Node::Expr(value));
        }
        ExprKind::ArrayType { len, elem } => {
            out.extend(len.as_deref().map(Node::Expr));
            out.push(Node::Expr(elem));
        }
    }
}

//! Constructors for syntax trees.
//!
//! Front ends written in Rust and the test suites use these instead of
//! spelling out struct literals. Positions default to `0:0`; chain
//! [`Expr::at`] / [`Stmt::at`] to set them.

use super::*;

fn boxed(expr: Expr) -> Box<Expr> {
    Box::new(expr)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// A local variable or parameter.
pub fn ident(name: &str, ty: Type) -> Expr {
    Expr::new(ExprKind::Ident {
        name: name.to_string(),
        object: None,
    })
    .typed(ty)
}

/// A package-level object, e.g. `os.Stdout`.
pub fn pkg_ident(package: &str, name: &str, ty: Type) -> Expr {
    Expr::new(ExprKind::Selector {
        base: boxed(Expr::new(ExprKind::Ident {
            name: last_segment(package).to_string(),
            object: None,
        })),
        name: name.to_string(),
        object: Some(ObjectRef {
            package: Some(package.to_string()),
            name: name.to_string(),
        }),
        recv: None,
    })
    .typed(ty)
}

pub fn int_lit(value: &str) -> Expr {
    Expr::new(ExprKind::BasicLit {
        lit: LitKind::Int,
        value: value.to_string(),
    })
    .typed(Type::basic(BasicKind::UntypedInt))
}

pub fn string_lit(value: &str) -> Expr {
    Expr::new(ExprKind::BasicLit {
        lit: LitKind::String,
        value: value.to_string(),
    })
    .typed(Type::basic(BasicKind::UntypedString))
}

pub fn char_lit(value: &str) -> Expr {
    Expr::new(ExprKind::BasicLit {
        lit: LitKind::Char,
        value: value.to_string(),
    })
    .typed(Type::basic(BasicKind::UntypedRune))
}

pub fn nil() -> Expr {
    Expr::new(ExprKind::Ident {
        name: "nil".to_string(),
        object: None,
    })
    .typed(Type::basic(BasicKind::UntypedNil))
}

/// A type written in expression position, e.g. the first argument of `make`.
pub fn type_expr(text: &str) -> Expr {
    Expr::new(ExprKind::TypeExpr {
        text: text.to_string(),
    })
}

pub fn call(func: Expr, args: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Call {
        func: boxed(func),
        args,
        ellipsis: false,
    })
}

/// Call to a predeclared function such as `append` or `make`.
pub fn builtin(name: &str, args: Vec<Expr>) -> Expr {
    call(
        Expr::new(ExprKind::Ident {
            name: name.to_string(),
            object: None,
        }),
        args,
    )
}

/// Call to a package-level function, e.g. `regexp.MustCompile(p)`.
pub fn pkg_call(package: &str, name: &str, args: Vec<Expr>) -> Expr {
    call(pkg_ident(package, name, Type::Func), args)
}

/// Call to a method whose receiver type is `recv`.
pub fn method_call(receiver: Expr, name: &str, recv: Type, args: Vec<Expr>) -> Expr {
    let object = recv.package().map(|package| ObjectRef {
        package: Some(package.to_string()),
        name: name.to_string(),
    });
    call(
        Expr::new(ExprKind::Selector {
            base: boxed(receiver),
            name: name.to_string(),
            object,
            recv: Some(recv),
        })
        .typed(Type::Func),
        args,
    )
}

/// Struct field access.
pub fn field(base: Expr, name: &str, ty: Type) -> Expr {
    Expr::new(ExprKind::Selector {
        base: boxed(base),
        name: name.to_string(),
        object: None,
        recv: None,
    })
    .typed(ty)
}

pub fn index(base: Expr, idx: Expr) -> Expr {
    let elem = base
        .ty
        .as_ref()
        .and_then(|ty| match ty.underlying() {
            Type::Slice { elem } | Type::Array { elem, .. } => Some((**elem).clone()),
            Type::Map { value, .. } => Some((**value).clone()),
            _ => None,
        });
    let expr = Expr::new(ExprKind::Index {
        base: boxed(base),
        index: boxed(idx),
    });
    match elem {
        Some(ty) => expr.typed(ty),
        None => expr,
    }
}

pub fn paren(inner: Expr) -> Expr {
    let ty = inner.ty.clone();
    Expr {
        node: ExprKind::Paren {
            inner: boxed(inner),
        },
        ty,
        pos: Position::default(),
    }
}

/// `&x`, typed as a pointer to `x`'s type.
pub fn addr_of(operand: Expr) -> Expr {
    let ty = operand.ty.clone().map(Type::pointer_to);
    Expr {
        node: ExprKind::Unary {
            op: UnaryOp::Addr,
            operand: boxed(operand),
        },
        ty,
        pos: Position::default(),
    }
}

pub fn unary(op: UnaryOp, operand: Expr, ty: Type) -> Expr {
    Expr::new(ExprKind::Unary {
        op,
        operand: boxed(operand),
    })
    .typed(ty)
}

pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, ty: Type) -> Expr {
    Expr::new(ExprKind::Binary {
        op,
        lhs: boxed(lhs),
        rhs: boxed(rhs),
    })
    .typed(ty)
}

/// `T{elts...}` of type `ty`.
pub fn composite(ty: Type, elts: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::CompositeLit { elts }).typed(ty)
}

pub fn key_value(key: Expr, value: Expr) -> Expr {
    Expr::new(ExprKind::KeyValue {
        key: boxed(key),
        value: boxed(value),
    })
}

/// `x.(T)`
pub fn type_assert(base: Expr, asserted: Type) -> Expr {
    Expr::new(ExprKind::TypeAssert {
        base: boxed(base),
        asserted: Some(asserted.clone()),
    })
    .typed(asserted)
}

/// `T(x)` where `T` is written as text.
pub fn conversion(ty_text: &str, ty: Type, arg: Expr) -> Expr {
    call(type_expr(ty_text), vec![arg]).typed(ty)
}

pub fn func_lit(stmts: Vec<Stmt>) -> Expr {
    Expr::new(ExprKind::FuncLit { body: block(stmts) }).typed(Type::Func)
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block {
        stmts,
        pos: Position::default(),
    }
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr { expr }
}

pub fn assign_op(lhs: Expr, op: AssignOp, rhs: Expr) -> Stmt {
    Stmt::Assign {
        lhs: vec![lhs],
        op,
        rhs: vec![rhs],
        pos: Position::default(),
    }
}

/// `lhs = rhs`
pub fn assign(lhs: Expr, rhs: Expr) -> Stmt {
    assign_op(lhs, AssignOp::Assign, rhs)
}

/// `lhs := rhs`
pub fn define(lhs: Expr, rhs: Expr) -> Stmt {
    assign_op(lhs, AssignOp::Define, rhs)
}

pub fn inc(target: Expr) -> Stmt {
    Stmt::IncDec {
        target,
        increment: true,
        pos: Position::default(),
    }
}

pub fn dec(target: Expr) -> Stmt {
    Stmt::IncDec {
        target,
        increment: false,
        pos: Position::default(),
    }
}

fn var_decl(name: &str, ty: Option<Type>, value: Option<Expr>) -> VarDecl {
    VarDecl {
        specs: vec![ValueSpec {
            names: vec![name.to_string()],
            ty,
            values: value.into_iter().collect(),
            pos: Position::default(),
        }],
        pos: Position::default(),
    }
}

/// `var name ty = value`
pub fn var(name: &str, ty: Option<Type>, value: Option<Expr>) -> Stmt {
    Stmt::Var(var_decl(name, ty, value))
}

pub fn block_stmt(stmts: Vec<Stmt>) -> Stmt {
    Stmt::Block(block(stmts))
}

pub fn if_stmt(cond: Expr, then: Vec<Stmt>, else_branch: Option<Stmt>) -> Stmt {
    Stmt::If(IfStmt {
        init: None,
        cond,
        then: block(then),
        else_branch: else_branch.map(Box::new),
        pos: Position::default(),
    })
}

pub fn for_loop(
    init: Option<Stmt>,
    cond: Option<Expr>,
    post: Option<Stmt>,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::For(ForStmt {
        init: init.map(Box::new),
        cond,
        post: post.map(Box::new),
        body: block(body),
        pos: Position::default(),
    })
}

/// `for i := 0; i < n; i++ { body }`
pub fn counted_loop(var_name: &str, bound: Expr, body: Vec<Stmt>) -> Stmt {
    let i = || ident(var_name, Type::int());
    for_loop(
        Some(define(i(), int_lit("0"))),
        Some(binary(BinaryOp::Lt, i(), bound, Type::bool())),
        Some(inc(i())),
        body,
    )
}

/// `for key, value := range subject { body }`
pub fn range(key: Option<Expr>, value: Option<Expr>, subject: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Range(RangeStmt {
        define: key.is_some() || value.is_some(),
        key,
        value,
        subject,
        body: block(body),
        pos: Position::default(),
    })
}

pub fn switch(tag: Option<Expr>, clauses: Vec<CaseClause>) -> Stmt {
    Stmt::Switch(SwitchStmt {
        init: None,
        tag,
        clauses,
        pos: Position::default(),
    })
}

pub fn case(exprs: Vec<Expr>, body: Vec<Stmt>) -> CaseClause {
    CaseClause {
        exprs,
        body,
        pos: Position::default(),
    }
}

pub fn select(clauses: Vec<CommClause>) -> Stmt {
    Stmt::Select(SelectStmt {
        clauses,
        pos: Position::default(),
    })
}

pub fn comm(comm: Option<Stmt>, body: Vec<Stmt>) -> CommClause {
    CommClause {
        comm: comm.map(Box::new),
        body,
        pos: Position::default(),
    }
}

pub fn go_stmt(call: Expr) -> Stmt {
    Stmt::Go {
        call,
        pos: Position::default(),
    }
}

pub fn defer_stmt(call: Expr) -> Stmt {
    Stmt::Defer {
        call,
        pos: Position::default(),
    }
}

pub fn ret(results: Vec<Expr>) -> Stmt {
    Stmt::Return {
        results,
        pos: Position::default(),
    }
}

pub fn func(name: &str, body: Vec<Stmt>) -> Decl {
    Decl::Func(FuncDecl {
        name: name.to_string(),
        body: Some(block(body)),
        pos: Position::default(),
    })
}

/// Package-level `var name ty = value`.
pub fn global_var(name: &str, ty: Option<Type>, value: Option<Expr>) -> Decl {
    Decl::Var(var_decl(name, ty, value))
}

pub fn file(path: &str, decls: Vec<Decl>) -> SourceFile {
    SourceFile {
        path: PathBuf::from(path),
        decls,
    }
}

pub fn unit(files: Vec<SourceFile>) -> SourceUnit {
    SourceUnit {
        package: "main".to_string(),
        language: default_language(),
        files,
        layouts: LayoutTable::default(),
    }
}

/// Commonly used standard-library types.
pub mod types {
    use super::{BasicKind, Type};

    fn opaque_struct() -> Type {
        Type::struct_of(&[("state", Type::basic(BasicKind::Uint64))])
    }

    pub fn mutex() -> Type {
        Type::named(Some("sync"), "Mutex", opaque_struct())
    }

    pub fn rw_mutex() -> Type {
        Type::named(Some("sync"), "RWMutex", opaque_struct())
    }

    pub fn pool() -> Type {
        Type::named(Some("sync"), "Pool", opaque_struct())
    }

    pub fn regexp() -> Type {
        Type::named(Some("regexp"), "Regexp", opaque_struct())
    }

    pub fn list() -> Type {
        Type::named(Some("container/list"), "List", opaque_struct())
    }

    pub fn bufio_writer() -> Type {
        Type::named(Some("bufio"), "Writer", opaque_struct())
    }

    pub fn bytes_buffer() -> Type {
        Type::named(Some("bytes"), "Buffer", opaque_struct())
    }

    pub fn strings_builder() -> Type {
        Type::named(Some("strings"), "Builder", opaque_struct())
    }

    pub fn os_file() -> Type {
        Type::named(Some("os"), "File", opaque_struct())
    }

    pub fn io_writer() -> Type {
        Type::named(
            Some("io"),
            "Writer",
            Type::Interface {
                methods: vec!["Write".to_string()],
            },
        )
    }

    pub fn reflect_type() -> Type {
        Type::named(
            Some("reflect"),
            "Type",
            Type::Interface {
                methods: vec!["Name".to_string()],
            },
        )
    }

    pub fn bytes() -> Type {
        Type::slice_of(Type::byte())
    }
}

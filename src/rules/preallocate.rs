//! Slice growth inside loops without reserved capacity.
//!
//! Each function and closure body is scanned statement by statement while a
//! [`ScopeEnv`] tracks which destinations were created by a sized `make`.
//! Every nested block, branch and loop body gets its own copy, so a
//! reservation made inside one branch never covers code after it.

use super::{Diagnostic, Rule};
use crate::ast::{expr_string, AssignOp, Block, Expr, ExprKind, IfStmt, Stmt, VarDecl};
use crate::engine::AnalysisContext;
use crate::error::Result;
use crate::reporter::Reporter;
use crate::walk::{preorder, KindSet, Node, NodeKind, ScopeEnv};

pub struct PreallocateCollectionsRule;

impl Rule for PreallocateCollectionsRule {
    fn id(&self) -> &'static str {
        "perf_preallocate_collections"
    }

    fn name(&self) -> &'static str {
        "Append Without Preallocation"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let reporter = ctx.reporter(self.id())?;
        let mut scanner = Scanner { reporter };

        preorder(ctx.file, KindSet::of(&[NodeKind::Func, NodeKind::FuncLit]), |node| {
            let body = match node {
                Node::Func(func) => func.body.as_ref(),
                Node::Expr(Expr {
                    node: ExprKind::FuncLit { body },
                    ..
                }) => Some(body),
                _ => None,
            };
            if let Some(body) = body {
                scanner.block(body, &mut ScopeEnv::new(), false);
            }
        });

        Ok(scanner.reporter.finish())
    }
}

/// True if a `make` call reserves room up front.
///
/// `make(T, n, c)` always does; `make(T, n)` does unless `n` is the literal
/// `0`; `make(T)` never does.
pub fn is_prealloc_make(args: &[Expr]) -> bool {
    match args {
        [_, _, _, ..] => true,
        [_, len] => !len.is_int_literal("0"),
        _ => false,
    }
}

struct Scanner<'a> {
    reporter: Reporter<'a>,
}

impl Scanner<'_> {
    fn block(&mut self, block: &Block, env: &mut ScopeEnv, in_loop: bool) {
        self.stmts(&block.stmts, env, in_loop);
    }

    fn stmts(&mut self, stmts: &[Stmt], env: &mut ScopeEnv, in_loop: bool) {
        for stmt in stmts {
            self.stmt(stmt, env, in_loop);
        }
    }

    fn stmt(&mut self, stmt: &Stmt, env: &mut ScopeEnv, in_loop: bool) {
        match stmt {
            Stmt::Assign { lhs, op, rhs, .. } => {
                if in_loop {
                    self.check_append(lhs, rhs, env);
                }
                if lhs.len() == rhs.len() {
                    for (target, value) in lhs.iter().zip(rhs) {
                        let key = expr_string(target);
                        if let Some(args) = value.builtin_call("make") {
                            env.set(key, is_prealloc_make(args));
                        } else if *op == AssignOp::Define {
                            env.set(key, false);
                        }
                    }
                }
            }
            Stmt::Var(decl) => reserve_declared(decl, env),
            Stmt::Block(block) => self.block(block, &mut env.child(), in_loop),
            Stmt::If(s) => self.if_stmt(s, env, in_loop),
            Stmt::For(s) => {
                let mut body_env = env.child();
                if let Some(init) = &s.init {
                    self.stmt(init, &mut body_env, in_loop);
                }
                self.block(&s.body, &mut body_env, true);
                if let Some(post) = &s.post {
                    self.stmt(post, &mut body_env, true);
                }
            }
            Stmt::Range(s) => {
                let repeats = in_loop
                    || s.subject.ty.as_ref().is_some_and(|ty| ty.is_indexable());
                self.block(&s.body, &mut env.child(), repeats);
            }
            Stmt::Switch(s) => {
                let mut init_env = env.child();
                if let Some(init) = &s.init {
                    self.stmt(init, &mut init_env, in_loop);
                }
                for clause in &s.clauses {
                    self.stmts(&clause.body, &mut init_env.child(), in_loop);
                }
            }
            Stmt::TypeSwitch(s) => {
                let mut init_env = env.child();
                if let Some(init) = &s.init {
                    self.stmt(init, &mut init_env, in_loop);
                }
                for clause in &s.clauses {
                    self.stmts(&clause.body, &mut init_env.child(), in_loop);
                }
            }
            Stmt::Select(s) => {
                for clause in &s.clauses {
                    let mut clause_env = env.child();
                    if let Some(comm) = &clause.comm {
                        self.stmt(comm, &mut clause_env, in_loop);
                    }
                    self.stmts(&clause.body, &mut clause_env, in_loop);
                }
            }
            Stmt::Labeled { stmt, .. } => self.stmt(stmt, env, in_loop),
            _ => {}
        }
    }

    fn if_stmt(&mut self, s: &IfStmt, env: &mut ScopeEnv, in_loop: bool) {
        let mut init_env = env.child();
        if let Some(init) = &s.init {
            self.stmt(init, &mut init_env, in_loop);
        }
        self.block(&s.then, &mut init_env.child(), in_loop);
        match s.else_branch.as_deref() {
            Some(Stmt::If(chained)) => self.if_stmt(chained, &mut init_env, in_loop),
            Some(other) => self.stmt(other, &mut init_env.child(), in_loop),
            None => {}
        }
    }

    /// `dst = append(dst, ...)` on an unreserved slice.
    fn check_append(&mut self, lhs: &[Expr], rhs: &[Expr], env: &ScopeEnv) {
        let ([target], [value]) = (lhs, rhs) else {
            return;
        };
        let Some(first) = value.builtin_call("append").and_then(<[Expr]>::first) else {
            return;
        };
        let key = expr_string(target);
        if expr_string(first) != key || env.is_reserved(&key) {
            return;
        }
        if target.ty.as_ref().is_some_and(|ty| ty.is_slice()) {
            self.reporter
                .report(value.pos, "append inside loop without preallocated capacity");
        }
    }
}

/// `var a, b = make(...), x` reserves or clears each name it initializes.
fn reserve_declared(decl: &VarDecl, env: &mut ScopeEnv) {
    for spec in &decl.specs {
        if spec.values.len() != spec.names.len() {
            continue;
        }
        for (name, value) in spec.names.iter().zip(&spec.values) {
            let reserved = value.builtin_call("make").is_some_and(is_prealloc_make);
            env.set(name.as_str(), reserved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::Type;
    use crate::rules::test_support::{check_decls, check_stmts};

    fn ints() -> Type {
        Type::slice_of(Type::int())
    }

    fn out() -> Expr {
        ident("out", ints())
    }

    fn make_ints(args: &[&str]) -> Expr {
        let mut all = vec![type_expr("[]int")];
        all.extend(args.iter().map(|a| int_lit(a)));
        builtin("make", all).typed(ints())
    }

    fn push() -> Stmt {
        assign(out(), builtin("append", vec![out(), ident("v", Type::int())]).typed(ints()).at(6, 9))
    }

    fn fill(prelude: Vec<Stmt>) -> Vec<Diagnostic> {
        let mut stmts = prelude;
        stmts.push(range(
            None,
            Some(ident("v", Type::int())),
            ident("src", ints()),
            vec![push()],
        ));
        check_stmts(&PreallocateCollectionsRule, stmts)
    }

    #[test]
    fn test_unsized_destination_flags_once() {
        let diags = fill(vec![var("out", Some(ints()), None)]);
        assert_eq!(diags.len(), 1);
        assert_eq!((diags[0].line, diags[0].column), (6, 9));
        assert!(diags[0].message.starts_with("[perf_preallocate_collections] append inside loop"));
    }

    #[test]
    fn test_three_argument_make_reserves() {
        assert!(fill(vec![define(out(), make_ints(&["0", "10"]))]).is_empty());
    }

    #[test]
    fn test_two_argument_make_reserves_unless_zero() {
        assert!(fill(vec![define(out(), make_ints(&["8"]))]).is_empty());
        assert_eq!(fill(vec![define(out(), make_ints(&["0"]))]).len(), 1);
        assert_eq!(fill(vec![define(out(), make_ints(&[]))]).len(), 1);
    }

    /// `a, b := x, y`
    fn define_pair(lhs: [Expr; 2], rhs: [Expr; 2]) -> Stmt {
        Stmt::Assign {
            lhs: Vec::from(lhs),
            op: AssignOp::Define,
            rhs: Vec::from(rhs),
            pos: Default::default(),
        }
    }

    #[test]
    fn test_parallel_define_reserves_each_target() {
        let both = define_pair(
            [out(), ident("other", ints())],
            [make_ints(&["0", "8"]), make_ints(&["0", "8"])],
        );
        let diags = check_stmts(
            &PreallocateCollectionsRule,
            vec![both, counted_loop("i", int_lit("8"), vec![push()])],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_parallel_define_clears_unsized_target() {
        let redefine = || {
            define_pair(
                [ident("n", Type::int()), out()],
                [int_lit("0"), builtin("load", vec![]).typed(ints())],
            )
        };
        let diags = fill(vec![define(out(), make_ints(&["0", "8"])), redefine()]);
        assert_eq!(diags.len(), 1);

        let diags = fill(vec![define(out(), make_ints(&["0", "8"])), block_stmt(vec![redefine()])]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_loop_init_reserves_for_body() {
        let diags = check_stmts(
            &PreallocateCollectionsRule,
            vec![for_loop(
                Some(define(out(), make_ints(&["0", "8"]))),
                Some(ident("more", Type::bool())),
                None,
                vec![push()],
            )],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_loop_body_reservation_does_not_leak() {
        let diags = fill(vec![
            var("out", Some(ints()), None),
            counted_loop("i", int_lit("1"), vec![assign(out(), make_ints(&["0", "64"]))]),
        ]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_var_declaration_reserves() {
        assert!(fill(vec![var("out", None, Some(make_ints(&["0", "4"])))]).is_empty());
    }

    #[test]
    fn test_redefinition_clears_reservation() {
        let diags = fill(vec![
            define(out(), make_ints(&["0", "4"])),
            define(out(), builtin("load", vec![]).typed(ints())),
        ]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_reservation_in_branch_does_not_leak() {
        let diags = fill(vec![
            var("out", Some(ints()), None),
            if_stmt(ident("big", Type::bool()), vec![assign(out(), make_ints(&["0", "64"]))], None),
        ]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_range_over_map_is_not_a_sized_loop() {
        let diags = check_stmts(
            &PreallocateCollectionsRule,
            vec![range(
                Some(ident("k", Type::string())),
                None,
                ident("m", Type::map_of(Type::string(), Type::int())),
                vec![push()],
            )],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_counted_loop_and_nested_blocks() {
        let diags = check_stmts(
            &PreallocateCollectionsRule,
            vec![counted_loop(
                "i",
                int_lit("10"),
                vec![if_stmt(ident("ok", Type::bool()), vec![], Some(block_stmt(vec![push()])))],
            )],
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_append_outside_loop_or_to_other_slice() {
        let other = builtin("append", vec![ident("prev", ints()), int_lit("1")]).typed(ints());
        let diags = check_stmts(
            &PreallocateCollectionsRule,
            vec![
                push(),
                counted_loop("i", int_lit("3"), vec![assign(out(), other)]),
            ],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_closure_bodies_scanned_independently() {
        let closure = func_lit(vec![counted_loop("i", int_lit("3"), vec![push()])]);
        let diags = check_decls(
            &PreallocateCollectionsRule,
            vec![func(
                "run",
                vec![
                    define(out(), make_ints(&["0", "3"])),
                    define(ident("f", Type::Func), closure),
                ],
            )],
        );
        assert_eq!(diags.len(), 1, "closure starts from an empty environment");
    }

    #[test]
    fn test_is_prealloc_make() {
        assert!(is_prealloc_make(&[type_expr("[]int"), int_lit("0"), int_lit("0")]));
        assert!(is_prealloc_make(&[type_expr("[]int"), ident("n", Type::int())]));
        assert!(!is_prealloc_make(&[type_expr("[]int"), int_lit("0")]));
        assert!(!is_prealloc_make(&[type_expr("[]int")]));
    }
}

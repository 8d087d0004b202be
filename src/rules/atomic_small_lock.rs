//! Lock/unlock pairs that guard a single primitive update.
//!
//! Looks for the narrowest critical section only:
//!
//! ```go
//! c.mu.Lock()
//! c.hits++
//! c.mu.Unlock()
//! ```
//!
//! Lock and unlock receivers are matched by their printed text, so `c.mu`
//! and an alias of it are never paired. Sections with more than one guarded
//! statement are left alone.

use super::{Diagnostic, Rule};
use crate::ast::{expr_string, AssignOp, Expr, ExprKind, MethodCall, Stmt, Type};
use crate::engine::AnalysisContext;
use crate::error::Result;
use crate::reporter::Reporter;
use crate::walk::{preorder, KindSet, Node, NodeKind};

const MUTEX_TYPES: [&str; 2] = ["Mutex", "RWMutex"];

pub struct AtomicSmallLockRule;

impl Rule for AtomicSmallLockRule {
    fn id(&self) -> &'static str {
        "perf_atomic_for_small_lock"
    }

    fn name(&self) -> &'static str {
        "Mutex Guarding One Primitive"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;
        let lists = KindSet::of(&[NodeKind::Block, NodeKind::CaseClause, NodeKind::CommClause]);

        preorder(ctx.file, lists, |node| {
            let stmts = match node {
                Node::Block(block) => &block.stmts,
                Node::Clause(clause) => &clause.body,
                Node::CommClause(clause) => &clause.body,
                _ => return,
            };
            scan_window(stmts, &mut reporter);
        });

        Ok(reporter.finish())
    }
}

/// Slide a lock / update / unlock window over one statement list.
fn scan_window(stmts: &[Stmt], reporter: &mut Reporter<'_>) {
    let mut i = 0;
    while i + 2 < stmts.len() {
        match guarded_update(&stmts[i], &stmts[i + 1], &stmts[i + 2]) {
            Some((mutex, target)) => {
                reporter.report(
                    target.pos,
                    &format!(
                        "mutex {} guards primitive {}; use sync/atomic",
                        mutex,
                        expr_string(target)
                    ),
                );
                i += 3;
            }
            None => i += 1,
        }
    }
}

/// Printed mutex receiver and the updated target of a matching window.
fn guarded_update<'a>(lock: &'a Stmt, update: &'a Stmt, unlock: &'a Stmt) -> Option<(String, &'a Expr)> {
    let acquire = mutex_call(lock, &["Lock"])?;
    if !acquire.receiver_type().is_some_and(is_mutex) {
        return None;
    }
    let target = primitive_target(update)?;

    let release = mutex_call(unlock, &["Unlock", "RUnlock"])?;
    if release.receiver_type().is_some_and(|ty| !is_mutex(ty)) {
        return None;
    }

    let mutex = expr_string(acquire.receiver);
    (mutex == expr_string(release.receiver)).then_some((mutex, target))
}

fn mutex_call<'a>(stmt: &'a Stmt, methods: &[&str]) -> Option<MethodCall<'a>> {
    let Stmt::Expr { expr } = stmt else {
        return None;
    };
    expr.method_call()
        .filter(|call| methods.contains(&call.method))
}

fn is_mutex(ty: &Type) -> bool {
    ty.is_named_in("sync", &MUTEX_TYPES)
}

/// Target of `x = v`, `x += v`, `x -= v`, `x := v` or `x++`/`x--` when it is
/// a plain variable or field of primitive type.
fn primitive_target(stmt: &Stmt) -> Option<&Expr> {
    let target = match stmt {
        Stmt::Assign { lhs, op, rhs, .. } => match (lhs.as_slice(), rhs.len()) {
            ([target], 1)
                if matches!(
                    op,
                    AssignOp::Assign | AssignOp::Add | AssignOp::Sub | AssignOp::Define
                ) =>
            {
                target
            }
            _ => return None,
        },
        Stmt::IncDec { target, .. } => target,
        _ => return None,
    };

    let simple = matches!(
        target.unparen().node,
        ExprKind::Ident { .. } | ExprKind::Selector { .. }
    );
    (simple && target.ty.as_ref().is_some_and(Type::is_primitive)).then_some(target)
}

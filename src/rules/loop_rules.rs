//! Detectors for work repeated on every iteration of a loop.

use super::{Diagnostic, Rule};
use crate::ast::{expr_string, AssignOp, BinaryOp, Expr, ExprKind, Stmt, Type};
use crate::engine::AnalysisContext;
use crate::error::Result;
use crate::walk::{in_loop, preorder_with_stack, KindSet, LoopScope, Node, NodeKind};

/// Detects `s += x` and `s = s + x` on strings inside loops
pub struct StringConcatLoopRule;

impl Rule for StringConcatLoopRule {
    fn id(&self) -> &'static str {
        "perf_avoid_string_concat_loop"
    }

    fn name(&self) -> &'static str {
        "String Concatenation in Loop"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder_with_stack(ctx.file, KindSet::of(&[NodeKind::Assign]), |node, stack| {
            let Node::Stmt(Stmt::Assign { lhs, op, rhs, .. }) = node else {
                return;
            };
            let [target] = lhs.as_slice() else {
                return;
            };
            if !is_string(target) || !in_loop(stack, node, LoopScope::Lexical) {
                return;
            }

            match (op, rhs.as_slice()) {
                (AssignOp::Add, _) => {
                    reporter.report(target.pos, "string concatenation using '+=' inside loop");
                }
                (AssignOp::Assign, [value]) if extends_itself(target, value) => {
                    reporter.report(
                        target.pos,
                        "string concatenation using '=', consider strings.Builder",
                    );
                }
                _ => {}
            }
        });

        Ok(reporter.finish())
    }
}

fn is_string(expr: &Expr) -> bool {
    expr.ty.as_ref().is_some_and(Type::is_string)
}

/// `x = x + y`
fn extends_itself(target: &Expr, value: &Expr) -> bool {
    match &value.unparen().node {
        ExprKind::Binary {
            op: BinaryOp::Add,
            lhs,
            ..
        } => expr_string(lhs) == expr_string(target),
        _ => false,
    }
}

const REGEX_COMPILERS: [&str; 4] = ["Compile", "MustCompile", "CompilePOSIX", "MustCompilePOSIX"];

/// Detects regexp compilation inside loops
pub struct RegexCompileLoopRule;

impl Rule for RegexCompileLoopRule {
    fn id(&self) -> &'static str {
        "perf_regex_compile_once"
    }

    fn name(&self) -> &'static str {
        "Regex Compilation in Loop"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder_with_stack(ctx.file, KindSet::of(&[NodeKind::Call]), |node, stack| {
            let Node::Expr(expr) = node else {
                return;
            };
            if expr.package_call("regexp", &REGEX_COMPILERS).is_some()
                && in_loop(stack, node, LoopScope::Lexical)
            {
                reporter.report(expr.pos, "compile regexp outside loops to avoid repeated parsing");
            }
        });

        Ok(reporter.finish())
    }
}

/// Detects reflection calls and concrete type assertions inside loops
pub struct ReflectionLoopRule;

impl Rule for ReflectionLoopRule {
    fn id(&self) -> &'static str {
        "perf_avoid_reflection_dynamic"
    }

    fn name(&self) -> &'static str {
        "Reflection in Loop"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;
        let kinds = KindSet::of(&[NodeKind::Call, NodeKind::TypeAssert]);

        preorder_with_stack(ctx.file, kinds, |node, stack| {
            let Node::Expr(expr) = node else {
                return;
            };
            let Some(detail) = reflective_detail(expr) else {
                return;
            };
            if !in_loop(stack, node, LoopScope::Lexical) || under_flagged(stack) {
                return;
            }
            reporter.report(expr.pos, detail);
        });

        Ok(reporter.finish())
    }
}

fn reflective_detail(expr: &Expr) -> Option<&'static str> {
    match &expr.node {
        ExprKind::Call { func, .. } => {
            let object = func.unparen().object()?;
            let is_reflect = matches!(func.unparen().node, ExprKind::Selector { .. })
                && object.package.as_deref() == Some("reflect");
            is_reflect.then_some("reflection call inside loop")
        }
        ExprKind::TypeAssert {
            asserted: Some(ty), ..
        } if !ty.is_interface() => Some("type assertion inside loop triggers dynamic dispatch"),
        _ => None,
    }
}

/// True if some ancestor is itself a reflective expression that was flagged.
fn under_flagged(stack: &[Node<'_>]) -> bool {
    stack.iter().enumerate().any(|(depth, ancestor)| match ancestor {
        Node::Expr(expr) => {
            reflective_detail(expr).is_some()
                && in_loop(&stack[..depth], *ancestor, LoopScope::Lexical)
        }
        _ => false,
    })
}

/// Detects `go` statements spawned once per loop iteration
pub struct BoundConcurrencyRule;

impl Rule for BoundConcurrencyRule {
    fn id(&self) -> &'static str {
        "perf_bound_concurrency"
    }

    fn name(&self) -> &'static str {
        "Unbounded Goroutines in Loop"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder_with_stack(ctx.file, KindSet::of(&[NodeKind::Go]), |node, stack| {
            if let Node::Stmt(stmt) = node {
                if in_loop(stack, node, LoopScope::Lexical) {
                    reporter.report(stmt.pos(), "goroutine spawned inside loop without bounds");
                }
            }
        });

        Ok(reporter.finish())
    }
}

/// Detects `defer` lexically nested inside a loop
pub struct DeferInLoopRule;

impl Rule for DeferInLoopRule {
    fn id(&self) -> &'static str {
        "perf_no_defer_in_loop"
    }

    fn name(&self) -> &'static str {
        "Defer in Loop"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder_with_stack(ctx.file, KindSet::of(&[NodeKind::Defer]), |node, stack| {
            if let Node::Stmt(stmt) = node {
                if in_loop(stack, node, LoopScope::Lexical) {
                    reporter.report(
                        stmt.pos(),
                        "defer inside loop delays cleanup until function exit",
                    );
                }
            }
        });

        Ok(reporter.finish())
    }
}

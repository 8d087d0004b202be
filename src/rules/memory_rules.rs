use super::{Diagnostic, Rule};
use crate::ast::{BinaryOp, Expr, ExprKind, Stmt, Type};
use crate::engine::AnalysisContext;
use crate::error::Result;
use crate::walk::{preorder, KindSet, Node, NodeKind};

/// Detects `pool.Put(v)` where `v` is not pointer-shaped
pub struct SyncPoolPointerRule;

impl Rule for SyncPoolPointerRule {
    fn id(&self) -> &'static str {
        "perf_syncpool_store_pointers"
    }

    fn name(&self) -> &'static str {
        "sync.Pool Stores Values"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder(ctx.file, KindSet::of(&[NodeKind::Call]), |node| {
            let Node::Expr(expr) = node else {
                return;
            };
            let Some(call) = expr.method_call() else {
                return;
            };
            let [value] = call.args else {
                return;
            };
            if call.method != "Put" || !is_sync_pool(expr, call.receiver_type()) {
                return;
            }
            // Interface boxing of a non-pointer allocates on every Put.
            if value.ty.as_ref().is_some_and(|ty| !ty.is_pointer_like()) {
                reporter.report(
                    value.pos,
                    "store pointer types in sync.Pool to avoid interface allocations",
                );
            }
        });

        Ok(reporter.finish())
    }
}

fn is_sync_pool(call: &Expr, receiver: Option<&Type>) -> bool {
    let from_object = call
        .as_call()
        .and_then(|(func, _)| func.object())
        .is_some_and(|object| object.package.as_deref() == Some("sync"));
    from_object || receiver.is_some_and(|ty| ty.is_named_in("sync", &["Pool"]))
}

const LIST_PACKAGE: &str = "container/list";

/// Detects use of `container/list`, once per file
pub struct LinkedListRule;

impl Rule for LinkedListRule {
    fn id(&self) -> &'static str {
        "perf_avoid_linked_list"
    }

    fn name(&self) -> &'static str {
        "Linked List Usage"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;
        let mut reported = false;

        preorder(
            ctx.file,
            KindSet::of(&[NodeKind::Selector, NodeKind::ValueSpec]),
            |node| {
                if reported {
                    return;
                }
                let hit = match node {
                    Node::Expr(expr) => uses_list(expr).then_some(expr.pos),
                    Node::ValueSpec(spec) => spec
                        .ty
                        .as_ref()
                        .is_some_and(|ty| ty.package() == Some(LIST_PACKAGE))
                        .then_some(spec.pos),
                    _ => None,
                };
                if let Some(pos) = hit {
                    reporter.report(pos, "linked list usage via container/list");
                    reported = true;
                }
            },
        );

        Ok(reporter.finish())
    }
}

fn uses_list(selector: &Expr) -> bool {
    let ExprKind::Selector { object, recv, .. } = &selector.node else {
        return false;
    };
    object
        .as_ref()
        .is_some_and(|object| object.package.as_deref() == Some(LIST_PACKAGE))
        || recv
            .as_ref()
            .is_some_and(|ty| ty.package() == Some(LIST_PACKAGE))
}

/// Detects `for _, r := range []rune(s)`
pub struct RuneConversionRule;

impl Rule for RuneConversionRule {
    fn id(&self) -> &'static str {
        "perf_avoid_rune_conversion"
    }

    fn name(&self) -> &'static str {
        "Rune Slice Conversion for Iteration"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder(ctx.file, KindSet::of(&[NodeKind::Range]), |node| {
            let Node::Stmt(Stmt::Range(range)) = node else {
                return;
            };
            let subject = range.subject.unparen();
            if is_rune_conversion(subject) {
                reporter.report(
                    subject.pos,
                    "convert string to []rune only once; iterate the string directly",
                );
            }
        });

        Ok(reporter.finish())
    }
}

fn is_rune_conversion(expr: &Expr) -> bool {
    let Some((func, [arg])) = expr.as_call() else {
        return false;
    };
    let rune_slice = match &func.node {
        ExprKind::ArrayType { len: None, elem } => elem.ident_name() == Some("rune"),
        ExprKind::TypeExpr { text } => text == "[]rune",
        _ => false,
    };
    rune_slice && arg.ty.as_ref().is_some_and(|ty| ty.is_string())
}

/// Detects `strings.ToLower(a) == b` style comparisons
pub struct EqualFoldRule;

impl Rule for EqualFoldRule {
    fn id(&self) -> &'static str {
        "perf_equal_fold_compare"
    }

    fn name(&self) -> &'static str {
        "Case Folding Comparison"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder(ctx.file, KindSet::of(&[NodeKind::Binary]), |node| {
            let Node::Expr(expr) = node else {
                return;
            };
            let ExprKind::Binary { op, lhs, rhs } = &expr.node else {
                return;
            };
            if matches!(op, BinaryOp::Eq | BinaryOp::Ne) && (is_case_fold(lhs) || is_case_fold(rhs)) {
                reporter.report(expr.pos, "use strings.EqualFold for case-insensitive comparison");
            }
        });

        Ok(reporter.finish())
    }
}

fn is_case_fold(expr: &Expr) -> bool {
    expr.package_call("strings", &["ToLower", "ToUpper"])
        .is_some_and(|args| args.len() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::rules::test_support::{check_decls, check_stmts};

    fn put(value: Expr) -> Stmt {
        expr_stmt(method_call(
            ident("pool", Type::pointer_to(types::pool())),
            "Put",
            types::pool(),
            vec![value],
        ))
    }

    #[test]
    fn test_pool_put_value_flags() {
        let diags = check_stmts(
            &SyncPoolPointerRule,
            vec![put(ident("buf", Type::array_of(64, Type::byte())).at(3, 11))],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!((diags[0].line, diags[0].column), (3, 11));
        assert!(diags[0].message.contains("store pointer types in sync.Pool"));
    }

    #[test]
    fn test_pool_put_pointer_like_ok() {
        let diags = check_stmts(
            &SyncPoolPointerRule,
            vec![
                put(ident("buf", Type::pointer_to(types::bytes_buffer()))),
                put(ident("scratch", types::bytes())),
                put(ident("any", Type::empty_interface())),
            ],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_put_on_other_types_ignored() {
        let cache = Type::named(Some("example.com/cache"), "Cache", Type::struct_of(&[]));
        let diags = check_stmts(
            &SyncPoolPointerRule,
            vec![expr_stmt(method_call(ident("c", cache.clone()), "Put", cache, vec![int_lit("1")]))],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_linked_list_reported_once() {
        let new_list = pkg_call(LIST_PACKAGE, "New", vec![]);
        let push = method_call(
            ident("l", Type::pointer_to(types::list())),
            "PushBack",
            Type::pointer_to(types::list()),
            vec![int_lit("1")],
        );
        let diags = check_stmts(
            &LinkedListRule,
            vec![define(ident("l", Type::pointer_to(types::list())), new_list), expr_stmt(push)],
        );
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("container/list"));
    }

    #[test]
    fn test_linked_list_var_declaration() {
        let diags = check_decls(&LinkedListRule, vec![global_var("queue", Some(types::list()), None)]);
        assert_eq!(diags.len(), 1);

        let diags = check_decls(&LinkedListRule, vec![global_var("xs", Some(types::bytes()), None)]);
        assert!(diags.is_empty());
    }

    fn rune_slice_of(arg: Expr) -> Expr {
        let rune_slice = Expr::new(ExprKind::ArrayType {
            len: None,
            elem: Box::new(ident("rune", Type::rune())),
        });
        call(rune_slice, vec![arg]).typed(Type::slice_of(Type::rune()))
    }

    #[test]
    fn test_range_over_rune_conversion() {
        let diags = check_stmts(
            &RuneConversionRule,
            vec![range(
                None,
                Some(ident("r", Type::rune())),
                rune_slice_of(ident("s", Type::string())).at(2, 17),
                vec![],
            )],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].column, 17);
    }

    #[test]
    fn test_range_over_string_or_other_conversion_ok() {
        let bytes_of = conversion("[]byte", types::bytes(), ident("s", Type::string()));
        let diags = check_stmts(
            &RuneConversionRule,
            vec![
                range(None, Some(ident("r", Type::rune())), ident("s", Type::string()), vec![]),
                range(None, Some(ident("b", Type::byte())), bytes_of, vec![]),
                define(ident("rs", Type::slice_of(Type::rune())), rune_slice_of(ident("s", Type::string()))),
            ],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_text_form_rune_conversion() {
        let conv = conversion("[]rune", Type::slice_of(Type::rune()), ident("s", Type::string()));
        let diags = check_stmts(
            &RuneConversionRule,
            vec![range(Some(ident("i", Type::int())), None, conv, vec![])],
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_equal_fold_comparisons() {
        let lower = |name: &str| pkg_call("strings", "ToLower", vec![ident(name, Type::string())]);
        let upper = pkg_call("strings", "ToUpper", vec![ident("b", Type::string())]);
        let diags = check_stmts(
            &EqualFoldRule,
            vec![
                if_stmt(
                    binary(BinaryOp::Eq, lower("a"), string_lit("\"yes\""), Type::bool()).at(4, 5),
                    vec![],
                    None,
                ),
                if_stmt(binary(BinaryOp::Ne, ident("a", Type::string()), upper, Type::bool()), vec![], None),
                define(
                    ident("joined", Type::string()),
                    binary(BinaryOp::Add, lower("a"), lower("b"), Type::string()),
                ),
            ],
        );
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].line, 4);
    }
}

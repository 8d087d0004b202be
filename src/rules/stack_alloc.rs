use super::{Diagnostic, Rule};
use crate::ast::{Expr, ExprKind, Type, UnaryOp};
use crate::engine::AnalysisContext;
use crate::error::Result;
use crate::layout::SizeOracle;
use crate::walk::{preorder, KindSet, Node, NodeKind};

/// Objects at or below this many bytes are cheap to keep by value.
pub const SMALL_OBJECT_THRESHOLD: u64 = 32;

/// Detects `&T{...}` and `new(T)` for tiny value types
///
/// Sizes come from the unit's layout table; a type the front end did not
/// size is never flagged.
pub struct StackAllocRule;

impl Rule for StackAllocRule {
    fn id(&self) -> &'static str {
        "perf_prefer_stack_alloc"
    }

    fn name(&self) -> &'static str {
        "Tiny Heap Allocation"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder(ctx.file, KindSet::of(&[NodeKind::Unary, NodeKind::Call]), |node| {
            let Node::Expr(expr) = node else {
                return;
            };
            if let Some((ty, size)) = address_of_literal(expr, ctx.sizes) {
                reporter.report(expr.pos, &format!("{} is {}B; prefer stack allocation", ty, size));
            } else if let Some((ty, size)) = new_of_small(expr, ctx.sizes) {
                reporter.report(
                    expr.pos,
                    &format!("new({}) allocates {}B on heap; store it by value", ty, size),
                );
            }
        });

        Ok(reporter.finish())
    }
}

/// `&T{...}` or `&lit`
fn address_of_literal<'a>(expr: &'a Expr, sizes: &dyn SizeOracle) -> Option<(&'a Type, u64)> {
    let ExprKind::Unary {
        op: UnaryOp::Addr,
        operand,
    } = &expr.node
    else {
        return None;
    };
    let operand = operand.unparen();
    if !matches!(
        operand.node,
        ExprKind::CompositeLit { .. } | ExprKind::BasicLit { .. }
    ) {
        return None;
    }
    small_value(operand.ty.as_ref()?, sizes)
}

/// `new(T)`
fn new_of_small<'a>(expr: &'a Expr, sizes: &dyn SizeOracle) -> Option<(&'a Type, u64)> {
    let args = expr.builtin_call("new")?;
    if args.len() != 1 {
        return None;
    }
    match expr.ty.as_ref()? {
        Type::Pointer { elem } => small_value(elem, sizes),
        _ => None,
    }
}

fn small_value<'a>(ty: &'a Type, sizes: &dyn SizeOracle) -> Option<(&'a Type, u64)> {
    if !ty.is_value_shape() {
        return None;
    }
    let size = sizes.size_of(ty)?;
    (size > 0 && size <= SMALL_OBJECT_THRESHOLD).then_some((ty, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::BasicKind;
    use crate::layout::LayoutTable;
    use crate::rules::test_support::{check_file, file_with};
    use pretty_assertions::assert_eq;

    fn point() -> Type {
        Type::named(
            Some("example.com/geo"),
            "Point",
            Type::struct_of(&[
                ("x", Type::basic(BasicKind::Float64)),
                ("y", Type::basic(BasicKind::Float64)),
            ]),
        )
    }

    fn matrix() -> Type {
        Type::named(
            Some("example.com/geo"),
            "Matrix",
            Type::array_of(32, Type::basic(BasicKind::Float64)),
        )
    }

    fn sizes() -> LayoutTable {
        LayoutTable::new().with(&point(), 16).with(&matrix(), 256)
    }

    #[test]
    fn test_address_of_small_struct_literal() {
        let file = file_with(vec![define(
            ident("p", Type::pointer_to(point())),
            addr_of(composite(point(), vec![int_lit("1"), int_lit("2")])).at(3, 7),
        )]);
        let diags = check_file(&StackAllocRule, &file, &sizes());
        assert_eq!(diags.len(), 1);
        assert_eq!((diags[0].line, diags[0].column), (3, 7));
        assert!(diags[0]
            .message
            .starts_with("[perf_prefer_stack_alloc] example.com/geo.Point is 16B; prefer stack allocation."));
    }

    #[test]
    fn test_large_struct_not_flagged() {
        let file = file_with(vec![define(
            ident("m", Type::pointer_to(matrix())),
            addr_of(composite(matrix(), vec![])),
        )]);
        assert!(check_file(&StackAllocRule, &file, &sizes()).is_empty());
    }

    #[test]
    fn test_unsized_or_addressed_variable_not_flagged() {
        let unsized_ty = Type::named(Some("example.com/geo"), "Unknown", Type::struct_of(&[]));
        let file = file_with(vec![
            define(ident("u", Type::pointer_to(unsized_ty.clone())), addr_of(composite(unsized_ty, vec![]))),
            define(ident("q", Type::pointer_to(point())), addr_of(ident("p", point()))),
        ]);
        assert!(check_file(&StackAllocRule, &file, &sizes()).is_empty());
    }

    #[test]
    fn test_new_of_small_type() {
        let new_point = builtin("new", vec![type_expr("geo.Point")])
            .typed(Type::pointer_to(point()))
            .at(5, 9);
        let new_matrix = builtin("new", vec![type_expr("geo.Matrix")]).typed(Type::pointer_to(matrix()));
        let file = file_with(vec![
            define(ident("p", Type::pointer_to(point())), new_point),
            define(ident("m", Type::pointer_to(matrix())), new_matrix),
        ]);
        let diags = check_file(&StackAllocRule, &file, &sizes());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 5);
        assert!(diags[0].message.contains("new(example.com/geo.Point) allocates 16B on heap"));
    }

    #[test]
    fn test_zero_sized_type_not_flagged() {
        let empty = Type::named(Some("example.com/geo"), "Empty", Type::struct_of(&[]));
        let file = file_with(vec![define(
            ident("e", Type::pointer_to(empty.clone())),
            addr_of(composite(empty.clone(), vec![])),
        )]);
        let sizes = LayoutTable::new().with(&empty, 0);
        assert!(check_file(&StackAllocRule, &file, &sizes).is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let key = Type::array_of(32, Type::byte());
        let file = file_with(vec![define(
            ident("k", Type::pointer_to(key.clone())),
            addr_of(composite(key.clone(), vec![])),
        )]);
        let sizes = LayoutTable::new().with(&key, SMALL_OBJECT_THRESHOLD);
        assert_eq!(check_file(&StackAllocRule, &file, &sizes).len(), 1);
    }
}

use super::{Expr, ExprKind};
use std::fmt::Write;

/// Structural source text of an expression.
///
/// Two expressions print the same exactly when they are spelled the same
/// modulo whitespace, which is what lock-pairing and growth-target keys
/// compare. Function literal bodies are elided.
pub fn expr_string(expr: &Expr) -> String {
    let mut out = String::with_capacity(16);
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expr) {
    match &expr.node {
        ExprKind::Ident { name, .. } => out.push_str(name),
        ExprKind::BasicLit { value, .. } => out.push_str(value),
        ExprKind::CompositeLit { .. } => {
            if let Some(ty) = &expr.ty {
                let _ = write!(out, "{}", ty);
            }
            out.push_str("{…}");
        }
        ExprKind::FuncLit { .. } => out.push_str("func(){…}"),
        ExprKind::Paren { inner } => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
        ExprKind::Selector { base, name, .. } => {
            write_expr(out, base);
            out.push('.');
            out.push_str(name);
        }
        ExprKind::Index { base, index } => {
            write_expr(out, base);
            out.push('[');
            write_expr(out, index);
            out.push(']');
        }
        ExprKind::SliceExpr {
            base,
            low,
            high,
            max,
        } => {
            write_expr(out, base);
            out.push('[');
            if let Some(low) = low {
                write_expr(out, low);
            }
            out.push(':');
            if let Some(high) = high {
                write_expr(out, high);
            }
            if let Some(max) = max {
                out.push(':');
                write_expr(out, max);
            }
            out.push(']');
        }
        ExprKind::TypeAssert { base, asserted } => {
            write_expr(out, base);
            match asserted {
                Some(ty) => {
                    let _ = write!(out, ".({})", ty);
                }
                None => out.push_str(".(type)"),
            }
        }
        ExprKind::Call {
            func,
            args,
            ellipsis,
        } => {
            write_expr(out, func);
            out.push('(');
            write_list(out, args);
            if *ellipsis {
                out.push_str("...");
            }
            out.push(')');
        }
        ExprKind::Star { inner } => {
            out.push('*');
            write_expr(out, inner);
        }
        ExprKind::Unary { op, operand } => {
            out.push_str(op.token());
            write_expr(out, operand);
        }
        ExprKind::Binary { op, lhs, rhs } => {
            write_expr(out, lhs);
            out.push(' ');
            out.push_str(op.token());
            out.push(' ');
            write_expr(out, rhs);
        }
        ExprKind::KeyValue { key, value } => {
            write_expr(out, key);
            out.push_str(": ");
            write_expr(out, value);
        }
        ExprKind::ArrayType { len, elem } => {
            out.push('[');
            if let Some(len) = len {
                write_expr(out, len);
            }
            out.push(']');
            write_expr(out, elem);
        }
        ExprKind::TypeExpr { text } => out.push_str(text),
    }
}

fn write_list(out: &mut String, exprs: &[Expr]) {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, expr);
    }
}

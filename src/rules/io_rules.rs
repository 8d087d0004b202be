//! Writer and I/O detectors.

use super::{Diagnostic, Rule};
use crate::ast::{BasicKind, Expr, ExprKind, LitKind, Type};
use crate::engine::AnalysisContext;
use crate::error::Result;
use crate::walk::{in_loop, preorder, preorder_with_stack, KindSet, LoopScope, Node, NodeKind};

/// Largest byte payload still considered a "tiny" write.
const TINY_WRITE_BYTES: u64 = 4;

/// Detects `w.Write([]byte)` round trips through `string(b)`
pub struct WriterPreferBytesRule;

impl Rule for WriterPreferBytesRule {
    fn id(&self) -> &'static str {
        "perf_writer_prefer_bytes"
    }

    fn name(&self) -> &'static str {
        "Byte Slice Converted for Writing"
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
            let payload = match call.method {
                "WriteString" => call.args.last(),
                "Write" => call.args.first(),
                _ => None,
            };
            if let Some(arg) = payload.filter(|arg| is_bytes_to_string(arg)) {
                reporter.report(
                    arg.pos,
                    "avoid converting []byte to string when writing; use byte-oriented writes",
                );
            }
        });

        Ok(reporter.finish())
    }
}

/// `string(b)` with `b` a byte slice.
fn is_bytes_to_string(expr: &Expr) -> bool {
    let Some((func, [inner])) = expr.unparen().as_call() else {
        return false;
    };
    let names_string = match &func.node {
        ExprKind::TypeExpr { text } => text == "string",
        _ => expr.unparen().builtin_call("string").is_some(),
    };
    let yields_string = matches!(
        expr.unparen().ty,
        Some(Type::Basic {
            name: BasicKind::String
        })
    );
    names_string && yields_string && is_byte_slice(inner)
}

fn is_byte_slice(expr: &Expr) -> bool {
    expr.ty
        .as_ref()
        .and_then(Type::slice_elem)
        .and_then(Type::basic_kind)
        == Some(BasicKind::Uint8)
}

/// Detects small unbuffered writes issued once per loop iteration
pub struct BufferedIoRule;

impl Rule for BufferedIoRule {
    fn id(&self) -> &'static str {
        "perf_use_buffered_io"
    }

    fn name(&self) -> &'static str {
        "Unbuffered I/O in Loop"
    }

    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>> {
        let mut reporter = ctx.reporter(self.id())?;

        preorder_with_stack(ctx.file, KindSet::of(&[NodeKind::Call]), |node, stack| {
            let Node::Expr(expr) = node else {
                return;
            };
            let Some(detail) = unbuffered_write(expr) else {
                return;
            };
            if in_loop(stack, node, LoopScope::Lexical) {
                reporter.report(expr.pos, detail);
            }
        });

        Ok(reporter.finish())
    }
}

fn unbuffered_write(expr: &Expr) -> Option<&'static str> {
    if let Some(args) = expr.package_call("fmt", &["Fprint", "Fprintf", "Fprintln"]) {
        let dest = args.first()?;
        return (!is_buffered(dest.ty.as_ref()))
            .then_some("fmt.Fprint inside loop performs unbuffered writes");
    }
    if expr.package_call("fmt", &["Print", "Printf", "Println"]).is_some() {
        return Some("fmt.Print inside loop performs unbuffered writes to stdout");
    }
    if let Some(args) = expr.package_call("io", &["WriteString"]) {
        let dest = args.first()?;
        return (!is_buffered(dest.ty.as_ref()))
            .then_some("io.WriteString inside loop is unbuffered; wrap the writer with bufio");
    }

    let call = expr.method_call()?;
    let receiver = call.receiver_type()?;
    if is_buffered(Some(receiver)) {
        return None;
    }
    let tiny = match (call.method, call.args) {
        ("WriteByte" | "WriteRune", _) => true,
        ("Write", [payload]) => is_tiny_payload(payload),
        _ => false,
    };
    tiny.then_some("loop writes tiny byte slices without buffering")
}

/// Types that already batch writes in memory.
fn is_buffered(ty: Option<&Type>) -> bool {
    ty.is_some_and(|ty| {
        ty.is_named_in("bufio", &["Writer", "Reader"])
            || ty.is_named_in("bytes", &["Buffer"])
            || ty.is_named_in("strings", &["Builder"])
    })
}

/// A byte slice of at most [`TINY_WRITE_BYTES`] bytes built in place.
fn is_tiny_payload(expr: &Expr) -> bool {
    if !is_byte_slice(expr) {
        return false;
    }
    let tiny = |n: u64| (1..=TINY_WRITE_BYTES).contains(&n);
    let expr = expr.unparen();

    if let ExprKind::CompositeLit { elts } = &expr.node {
        return tiny(elts.len() as u64);
    }
    if let Some(args) = expr.builtin_call("make") {
        return args.get(1).and_then(Expr::int_literal_value).is_some_and(tiny);
    }
    // []byte("ab")
    match expr.as_call() {
        Some((func, [lit])) if is_byte_slice_type(func) => string_literal_len(lit).is_some_and(tiny),
        _ => false,
    }
}

fn is_byte_slice_type(func: &Expr) -> bool {
    match &func.node {
        ExprKind::TypeExpr { text } => text == "[]byte",
        ExprKind::ArrayType { len: None, elem } => {
            matches!(elem.ident_name(), Some("byte" | "uint8"))
        }
        _ => false,
    }
}

/// Byte length of the value a string literal denotes.
///
/// Interpreted literals decode escapes (`\n`, `\x7f`, `\101`, `\u00e9`,
/// `\U0001F600`) and count UTF-8 bytes; raw literals drop carriage returns.
/// Malformed literals yield `None`.
fn string_literal_len(expr: &Expr) -> Option<u64> {
    let ExprKind::BasicLit {
        lit: LitKind::String,
        value,
    } = &expr.unparen().node
    else {
        return None;
    };
    if let Some(raw) = value.strip_prefix('`').and_then(|v| v.strip_suffix('`')) {
        return Some(raw.bytes().filter(|&b| b != b'\r').count() as u64);
    }

    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    let mut len = 0;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            len += c.len_utf8() as u64;
            continue;
        }
        len += match chars.next()? {
            'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' | '\'' | '"' => 1,
            'x' => escape_digits(&mut chars, 2, 16).map(|_| 1)?,
            'u' => char::from_u32(escape_digits(&mut chars, 4, 16)?)?.len_utf8() as u64,
            'U' => char::from_u32(escape_digits(&mut chars, 8, 16)?)?.len_utf8() as u64,
            first @ '0'..='7' => {
                let high = first.to_digit(8)?;
                let low = escape_digits(&mut chars, 2, 8)?;
                (high * 64 + low <= 0xFF).then_some(1)?
            }
            _ => return None,
        };
    }
    Some(len)
}

/// Value of exactly `count` digits in `radix` taken from `chars`.
fn escape_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    let mut value: u32 = 0;
    for _ in 0..count {
        value = value.checked_mul(radix)? + chars.next()?.to_digit(radix)?;
    }
    Some(value)
}

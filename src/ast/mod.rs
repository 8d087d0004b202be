//! Typed syntax tree handed over by a language front end.
//!
//! Nothing here parses source text. A front end serialises one package as a
//! [`SourceUnit`] (JSON, `*.unit.json`) with every expression annotated with
//! its resolved static type; tests and embedders build the same values with
//! [`build`].

pub mod build;
mod printer;
mod types;

pub use printer::expr_string;
pub use types::{BasicKind, StructField, Type};

use crate::layout::LayoutTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 1-based source position.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

fn default_language() -> String {
    "go".to_string()
}

/// One type-checked package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub package: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
    /// Byte sizes the front end computed for value types.
    #[serde(default)]
    pub layouts: LayoutTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decl {
    Func(FuncDecl),
    Var(VarDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    /// `None` for external (assembly or linkname) declarations.
    #[serde(default)]
    pub body: Option<Block>,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub specs: Vec<ValueSpec>,
    #[serde(default)]
    pub pos: Position,
}

/// `var a, b T = x, y`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<String>,
    /// Declared type, when written.
    #[serde(default)]
    pub ty: Option<Type>,
    #[serde(default)]
    pub values: Vec<Expr>,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub stmts: Vec<Stmt>,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = ":=")]
    Define,
    #[serde(rename = "+=")]
    Add,
    #[serde(rename = "-=")]
    Sub,
    #[serde(rename = "*=")]
    Mul,
    #[serde(rename = "/=")]
    Quo,
    #[serde(rename = "%=")]
    Rem,
    #[serde(rename = "&=")]
    And,
    #[serde(rename = "|=")]
    Or,
    #[serde(rename = "^=")]
    Xor,
    #[serde(rename = "<<=")]
    Shl,
    #[serde(rename = ">>=")]
    Shr,
    #[serde(rename = "&^=")]
    AndNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "&")]
    Addr,
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "^")]
    Xor,
    #[serde(rename = "<-")]
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Quo,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "&")]
    And,
    #[serde(rename = "|")]
    Or,
    #[serde(rename = "^")]
    Xor,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = "&^")]
    AndNot,
    #[serde(rename = "&&")]
    LogAnd,
    #[serde(rename = "||")]
    LogOr,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl UnaryOp {
    pub fn token(self) -> &'static str {
        match self {
            UnaryOp::Addr => "&",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::Xor => "^",
            UnaryOp::Recv => "<-",
        }
    }
}

impl BinaryOp {
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Quo => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AndNot => "&^",
            BinaryOp::LogAnd => "&&",
            BinaryOp::LogOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// Declaring package and name of the object an identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Import path; `None` for builtins and universe objects.
    #[serde(default)]
    pub package: Option<String>,
    pub name: String,
}

impl ObjectRef {
    pub fn is(&self, package: &str, name: &str) -> bool {
        self.package.as_deref() == Some(package) && self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Expr {
        expr: Expr,
    },
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
        #[serde(default)]
        pos: Position,
    },
    IncDec {
        target: Expr,
        increment: bool,
        #[serde(default)]
        pos: Position,
    },
    Var(VarDecl),
    Block(Block),
    If(IfStmt),
    For(ForStmt),
    Range(RangeStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    Select(SelectStmt),
    Go {
        call: Expr,
        #[serde(default)]
        pos: Position,
    },
    Defer {
        call: Expr,
        #[serde(default)]
        pos: Position,
    },
    Return {
        #[serde(default)]
        results: Vec<Expr>,
        #[serde(default)]
        pos: Position,
    },
    Labeled {
        label: String,
        stmt: Box<Stmt>,
        #[serde(default)]
        pos: Position,
    },
    Send {
        channel: Expr,
        value: Expr,
        #[serde(default)]
        pos: Position,
    },
    Branch {
        keyword: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        pos: Position,
    },
    Empty {
        #[serde(default)]
        pos: Position,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then: Block,
    /// Either another `if` or a block.
    #[serde(default, rename = "else")]
    pub else_branch: Option<Box<Stmt>>,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    #[serde(default)]
    pub cond: Option<Expr>,
    #[serde(default)]
    pub post: Option<Box<Stmt>>,
    pub body: Block,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStmt {
    #[serde(default)]
    pub key: Option<Expr>,
    #[serde(default)]
    pub value: Option<Expr>,
    /// `:=` rather than `=`.
    #[serde(default)]
    pub define: bool,
    pub subject: Expr,
    pub body: Block,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    #[serde(default)]
    pub tag: Option<Expr>,
    #[serde(default)]
    pub clauses: Vec<CaseClause>,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSwitchStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    /// `x := y.(type)` or `y.(type)`.
    pub assign: Box<Stmt>,
    #[serde(default)]
    pub clauses: Vec<CaseClause>,
    #[serde(default)]
    pub pos: Position,
}

/// `case a, b:` (empty `exprs` for `default:`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    #[serde(default)]
    pub exprs: Vec<Expr>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    #[serde(default)]
    pub clauses: Vec<CommClause>,
    #[serde(default)]
    pub pos: Position,
}

/// `case v := <-ch:` (no `comm` for `default:`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommClause {
    #[serde(default)]
    pub comm: Option<Box<Stmt>>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub pos: Position,
}

impl Stmt {
    pub fn pos(&self) -> Position {
        match self {
            Stmt::Expr { expr } => expr.pos,
            Stmt::Var(decl) => decl.pos,
            Stmt::Block(block) => block.pos,
            Stmt::If(s) => s.pos,
            Stmt::For(s) => s.pos,
            Stmt::Range(s) => s.pos,
            Stmt::Switch(s) => s.pos,
            Stmt::TypeSwitch(s) => s.pos,
            Stmt::Select(s) => s.pos,
            Stmt::Assign { pos, .. }
            | Stmt::IncDec { pos, .. }
            | Stmt::Go { pos, .. }
            | Stmt::Defer { pos, .. }
            | Stmt::Return { pos, .. }
            | Stmt::Labeled { pos, .. }
            | Stmt::Send { pos, .. }
            | Stmt::Branch { pos, .. }
            | Stmt::Empty { pos } => *pos,
        }
    }

    fn pos_mut(&mut self) -> &mut Position {
        match self {
            Stmt::Expr { expr } => &mut expr.pos,
            Stmt::Var(decl) => &mut decl.pos,
            Stmt::Block(block) => &mut block.pos,
            Stmt::If(s) => &mut s.pos,
            Stmt::For(s) => &mut s.pos,
            Stmt::Range(s) => &mut s.pos,
            Stmt::Switch(s) => &mut s.pos,
            Stmt::TypeSwitch(s) => &mut s.pos,
            Stmt::Select(s) => &mut s.pos,
            Stmt::Assign { pos, .. }
            | Stmt::IncDec { pos, .. }
            | Stmt::Go { pos, .. }
            | Stmt::Defer { pos, .. }
            | Stmt::Return { pos, .. }
            | Stmt::Labeled { pos, .. }
            | Stmt::Send { pos, .. }
            | Stmt::Branch { pos, .. }
            | Stmt::Empty { pos } => pos,
        }
    }

    /// Set the position, builder style.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        *self.pos_mut() = Position::new(line, column);
        self
    }
}

/// An expression with its resolved static type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub node: ExprKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprKind {
    Ident {
        name: String,
        #[serde(default)]
        object: Option<ObjectRef>,
    },
    BasicLit {
        lit: LitKind,
        /// Source text, quotes included for strings.
        value: String,
    },
    CompositeLit {
        #[serde(default)]
        elts: Vec<Expr>,
    },
    FuncLit {
        body: Block,
    },
    Paren {
        inner: Box<Expr>,
    },
    Selector {
        base: Box<Expr>,
        name: String,
        #[serde(default)]
        object: Option<ObjectRef>,
        /// Type of the receiver expression when the selector picks a method.
        #[serde(default)]
        recv: Option<Type>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    SliceExpr {
        base: Box<Expr>,
        #[serde(default)]
        low: Option<Box<Expr>>,
        #[serde(default)]
        high: Option<Box<Expr>>,
        #[serde(default)]
        max: Option<Box<Expr>>,
    },
    TypeAssert {
        base: Box<Expr>,
        /// `None` for the `.(type)` of a type switch.
        #[serde(default)]
        asserted: Option<Type>,
    },
    Call {
        func: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        ellipsis: bool,
    },
    Star {
        inner: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayType {
        #[serde(default)]
        len: Option<Box<Expr>>,
        elem: Box<Expr>,
    },
    /// Any other type written in expression position (`map[K]V`, `chan T`).
    TypeExpr {
        text: String,
    },
}

impl Expr {
    pub fn new(node: ExprKind) -> Self {
        Self {
            node,
            ty: None,
            pos: Position::default(),
        }
    }

    /// Set the static type, builder style.
    pub fn typed(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Set the position, builder style.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.pos = Position::new(line, column);
        self
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        match &self.node {
            ExprKind::Paren { inner } => inner.unparen(),
            _ => self,
        }
    }

    pub fn ident_name(&self) -> Option<&str> {
        match &self.unparen().node {
            ExprKind::Ident { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Callee and arguments if this is a call.
    pub fn as_call(&self) -> Option<(&Expr, &[Expr])> {
        match &self.unparen().node {
            ExprKind::Call { func, args, .. } => Some((func.unparen(), args)),
            _ => None,
        }
    }

    /// Resolved object of an identifier or selector.
    pub fn object(&self) -> Option<&ObjectRef> {
        match &self.unparen().node {
            ExprKind::Ident { object, .. } | ExprKind::Selector { object, .. } => object.as_ref(),
            _ => None,
        }
    }

    /// Arguments of a call to the predeclared function `name`.
    pub fn builtin_call(&self, name: &str) -> Option<&[Expr]> {
        let (func, args) = self.as_call()?;
        match &func.node {
            ExprKind::Ident { name: callee, object } if callee == name => {
                let universe = object.as_ref().is_none_or(|obj| obj.package.is_none());
                universe.then_some(args)
            }
            _ => None,
        }
    }

    /// Arguments of a call to package-level function `package.name`.
    pub fn package_call(&self, package: &str, names: &[&str]) -> Option<&[Expr]> {
        let (func, args) = self.as_call()?;
        let object = func.object()?;
        (object.package.as_deref() == Some(package) && names.contains(&object.name.as_str()))
            .then_some(args)
    }

    /// Receiver, method name and arguments of a method call.
    pub fn method_call(&self) -> Option<MethodCall<'_>> {
        let (func, args) = self.as_call()?;
        match &func.node {
            ExprKind::Selector {
                base, name, recv, ..
            } => Some(MethodCall {
                receiver: base.unparen(),
                method: name,
                recv: recv.as_ref(),
                args,
            }),
            _ => None,
        }
    }

    /// True for an integer literal with exactly this source text.
    pub fn is_int_literal(&self, text: &str) -> bool {
        matches!(
            &self.unparen().node,
            ExprKind::BasicLit { lit: LitKind::Int, value } if value == text
        )
    }

    /// Integer value of an integer literal written in decimal, hex, octal or binary.
    pub fn int_literal_value(&self) -> Option<u64> {
        match &self.unparen().node {
            ExprKind::BasicLit {
                lit: LitKind::Int,
                value,
            } => parse_int_literal(value),
            _ => None,
        }
    }
}

/// A call through a selector, `receiver.method(args)`.
#[derive(Debug, Clone, Copy)]
pub struct MethodCall<'a> {
    pub receiver: &'a Expr,
    pub method: &'a str,
    /// Receiver type recorded by the front end, if any.
    pub recv: Option<&'a Type>,
    pub args: &'a [Expr],
}

impl<'a> MethodCall<'a> {
    /// Resolved receiver type, falling back to the receiver expression's type.
    pub fn receiver_type(&self) -> Option<&'a Type> {
        self.recv.or(self.receiver.ty.as_ref())
    }
}

fn parse_int_literal(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

//! Traversal primitives shared by the detectors.
//!
//! The engine owns the walk: a depth-first preorder over [`Node`]s that keeps
//! its own ancestor stack, so "is this inside a loop" is answered from the
//! stack instead of re-walking from the root.

mod node;
mod scope;

pub use node::{KindSet, Node, NodeKind};
pub use scope::ScopeEnv;

use crate::ast::{SourceFile, Stmt};
use tracing::debug;

/// Maximum nesting depth the walkers descend into.
/// Protects against maliciously crafted deeply-nested trees.
pub const MAX_RECURSION_DEPTH: usize = 512;

/// Visit every node of the requested kinds in source order.
pub fn preorder<'a, F>(file: &'a SourceFile, kinds: KindSet, mut visit: F)
where
    F: FnMut(Node<'a>),
{
    preorder_with_stack(file, kinds, |node, _| visit(node));
}

/// Like [`preorder`], also passing the chain of enclosing nodes
/// (outermost first, the visited node excluded).
pub fn preorder_with_stack<'a, F>(file: &'a SourceFile, kinds: KindSet, visit: F)
where
    F: FnMut(Node<'a>, &[Node<'a>]),
{
    walk_from(Node::File(file), kinds, visit);
}

/// Ancestor-stack walk rooted at an arbitrary node.
pub fn walk_from<'a, F>(root: Node<'a>, kinds: KindSet, visit: F)
where
    F: FnMut(Node<'a>, &[Node<'a>]),
{
    let mut walker = Walker {
        kinds,
        stack: Vec::with_capacity(32),
        visit,
        bailed: false,
    };
    walker.walk(root);
}

struct Walker<'a, F> {
    kinds: KindSet,
    stack: Vec<Node<'a>>,
    visit: F,
    bailed: bool,
}

impl<'a, F> Walker<'a, F>
where
    F: FnMut(Node<'a>, &[Node<'a>]),
{
    fn walk(&mut self, node: Node<'a>) {
        if self.stack.len() >= MAX_RECURSION_DEPTH {
            if !self.bailed {
                debug!(depth = self.stack.len(), "syntax tree too deep, skipping subtree");
                self.bailed = true;
            }
            return;
        }

        if self.kinds.contains(node.kind()) {
            (self.visit)(node, &self.stack);
        }

        self.stack.push(node);
        for child in node.children() {
            self.walk(child);
        }
        self.stack.pop();
    }
}

/// How far up the ancestor chain a loop may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopScope {
    /// Any enclosing loop, across closure boundaries.
    Lexical,
    /// Only loops within the innermost enclosing function or closure.
    Function,
}

/// Innermost loop whose repeated part (body, condition, post statement)
/// contains `node`. A range subject and a loop's init run once and do not
/// count.
pub fn enclosing_loop<'a>(
    ancestors: &[Node<'a>],
    node: Node<'a>,
    scope: LoopScope,
) -> Option<&'a Stmt> {
    let mut child = node;
    for &ancestor in ancestors.iter().rev() {
        if let Node::Stmt(stmt) = ancestor {
            if repeats(stmt, &child) {
                return Some(stmt);
            }
        }
        if scope == LoopScope::Function && ancestor.is_function() {
            return None;
        }
        child = ancestor;
    }
    None
}

/// True if `node` runs once per iteration of some enclosing loop.
pub fn in_loop(ancestors: &[Node<'_>], node: Node<'_>, scope: LoopScope) -> bool {
    enclosing_loop(ancestors, node, scope).is_some()
}

fn repeats(stmt: &Stmt, child: &Node<'_>) -> bool {
    match stmt {
        Stmt::For(s) => {
            Node::Block(&s.body).same(child)
                || s.cond.as_ref().is_some_and(|c| Node::Expr(c).same(child))
                || s.post.as_deref().is_some_and(|p| Node::from_stmt(p).same(child))
        }
        Stmt::Range(s) => Node::Block(&s.body).same(child),
        _ => false,
    }
}

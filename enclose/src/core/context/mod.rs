//! Read-only access to math expressions
//!
//! Evaluation never builds or edits expressions; it only walks them through
//! the [`Expression`] trait, which exposes each node's kind, operator, and
//! children.  [`Tree`] is the expression type provided by this crate, but any
//! other representation (e.g. a handle into an external arena) can be
//! evaluated by implementing the trait.
//!
//! ```
//! use enclose::context::{Expression, Node, Tree};
//!
//! let t = Tree::var("x") + 1.0;
//! assert!(matches!(t.node(), Node::Binary(..)));
//! assert_eq!(t.vars().into_iter().collect::<Vec<_>>(), ["x"]);
//! ```
mod op;
mod tree;

pub use op::{BinaryOpcode, UnaryOpcode};
pub use tree::{Tree, TreeOp};

use std::collections::BTreeSet;

/// A single node of an expression, borrowed from its owner
#[derive(Debug)]
pub enum Node<'a, E: ?Sized> {
    /// Constant value
    Const(f64),
    /// Named variable
    Var(&'a str),
    /// Operation with one child
    Unary(UnaryOpcode, &'a E),
    /// Operation with two children
    Binary(BinaryOpcode, &'a E, &'a E),
}

/// Node-visitor capability required to evaluate an expression
///
/// Implementations must be pure: calling `node` repeatedly on the same value
/// returns the same node.
pub trait Expression {
    /// Returns the root node of this expression
    fn node(&self) -> Node<'_, Self>;

    /// Returns the set of variable names used in this expression
    ///
    /// The default implementation walks every path through the expression;
    /// implementations with shared nodes may override it to skip repeats.
    fn vars(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        let mut todo = vec![self];
        while let Some(e) = todo.pop() {
            match e.node() {
                Node::Const(..) => (),
                Node::Var(v) => {
                    out.insert(v);
                }
                Node::Unary(_, a) => todo.push(a),
                Node::Binary(_, a, b) => {
                    todo.push(a);
                    todo.push(b);
                }
            }
        }
        out
    }
}

//! Standalone math trees
use super::{
    Expression, Node,
    op::{BinaryOpcode, UnaryOpcode},
};
use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

/// Opcode type for trees
#[derive(Debug)]
#[allow(missing_docs)]
pub enum TreeOp {
    /// Named variable, bound to an interval at evaluation time
    Var(Arc<str>),
    Const(f64),
    Binary(BinaryOpcode, Tree, Tree),
    Unary(UnaryOpcode, Tree),
}

impl From<f64> for Tree {
    fn from(v: f64) -> Tree {
        Tree::constant(v)
    }
}

impl From<f32> for Tree {
    fn from(v: f32) -> Tree {
        Tree::constant(v as f64)
    }
}

impl From<i32> for Tree {
    fn from(v: i32) -> Tree {
        Tree::constant(v as f64)
    }
}

/// Owned handle for a standalone math tree
///
/// Subtrees are reference-counted, so cloning a `Tree` is cheap and the same
/// subtree may appear at several places in an expression.  Evaluation visits
/// a shared subtree once per appearance, so its cost is that of the fully
/// expanded expression.
#[derive(Clone, Debug)]
pub struct Tree(Arc<TreeOp>);

static_assertions::assert_impl_all!(Tree: Send, Sync);

impl std::ops::Deref for Tree {
    type Target = TreeOp;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for Tree {
    /// Shallow (pointer) comparison
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.as_ptr(), other.as_ptr())
    }
}
impl Eq for Tree {}

impl Expression for Tree {
    fn node(&self) -> Node<'_, Self> {
        match &*self.0 {
            TreeOp::Var(v) => Node::Var(v),
            TreeOp::Const(c) => Node::Const(*c),
            TreeOp::Unary(op, a) => Node::Unary(*op, a),
            TreeOp::Binary(op, a, b) => Node::Binary(*op, a, b),
        }
    }

    /// Collects variable names, visiting each shared subtree once
    fn vars(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        let mut seen = HashSet::new();
        let mut todo = vec![self];
        while let Some(t) = todo.pop() {
            if !seen.insert(t.as_ptr()) {
                continue;
            }
            match &*t.0 {
                TreeOp::Var(v) => {
                    out.insert(&**v);
                }
                TreeOp::Const(..) => (),
                TreeOp::Unary(_, a) => todo.push(a),
                TreeOp::Binary(_, a, b) => {
                    todo.push(a);
                    todo.push(b);
                }
            }
        }
        out
    }
}

#[allow(missing_docs)]
impl Tree {
    /// Builds a named variable
    pub fn var(name: &str) -> Self {
        Tree(Arc::new(TreeOp::Var(name.into())))
    }
    pub fn constant(f: f64) -> Self {
        Tree(Arc::new(TreeOp::Const(f)))
    }
    fn op_unary(a: Tree, op: UnaryOpcode) -> Self {
        Tree(Arc::new(TreeOp::Unary(op, a)))
    }
    fn op_binary(a: Tree, b: Tree, op: BinaryOpcode) -> Self {
        Tree(Arc::new(TreeOp::Binary(op, a, b)))
    }
    pub fn square(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Square)
    }
    pub fn sqrt(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Sqrt)
    }
    pub fn abs(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Abs)
    }
    pub fn recip(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Recip)
    }
    pub fn max<T: Into<Tree>>(&self, other: T) -> Self {
        Self::op_binary(self.clone(), other.into(), BinaryOpcode::Max)
    }
    pub fn min<T: Into<Tree>>(&self, other: T) -> Self {
        Self::op_binary(self.clone(), other.into(), BinaryOpcode::Min)
    }
    /// Raises the tree to a power, which may itself be an expression
    pub fn pow<T: Into<Tree>>(&self, other: T) -> Self {
        Self::op_binary(self.clone(), other.into(), BinaryOpcode::Pow)
    }
    pub fn neg(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Neg)
    }
    pub fn sin(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Sin)
    }
    pub fn cos(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Cos)
    }
    pub fn tan(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Tan)
    }
    pub fn exp(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Exp)
    }
    pub fn ln(&self) -> Self {
        Self::op_unary(self.clone(), UnaryOpcode::Ln)
    }

    /// Returns a pointer to the inner [`TreeOp`]
    ///
    /// This can be used as a strong (but not unique) identity.
    pub fn as_ptr(&self) -> *const TreeOp {
        Arc::as_ptr(&self.0)
    }
}

impl std::ops::Neg for Tree {
    type Output = Tree;
    fn neg(self) -> Tree {
        Tree::op_unary(self, UnaryOpcode::Neg)
    }
}

macro_rules! impl_binary {
    ($op:ident, $op_assign:ident, $base_fn:ident, $assign_fn:ident) => {
        impl<A: Into<Tree>> std::ops::$op<A> for Tree {
            type Output = Self;

            fn $base_fn(self, other: A) -> Self {
                Self::op_binary(self, other.into(), BinaryOpcode::$op)
            }
        }
        impl<A: Into<Tree>> std::ops::$op_assign<A> for Tree {
            fn $assign_fn(&mut self, other: A) {
                use std::ops::$op;
                self.0 = self.clone().$base_fn(other.into()).0
            }
        }
        impl std::ops::$op<Tree> for f32 {
            type Output = Tree;
            fn $base_fn(self, other: Tree) -> Tree {
                Tree::op_binary(self.into(), other, BinaryOpcode::$op)
            }
        }
        impl std::ops::$op<Tree> for f64 {
            type Output = Tree;
            fn $base_fn(self, other: Tree) -> Tree {
                Tree::op_binary(self.into(), other, BinaryOpcode::$op)
            }
        }
    };
}

impl_binary!(Add, AddAssign, add, add_assign);
impl_binary!(Sub, SubAssign, sub, sub_assign);
impl_binary!(Mul, MulAssign, mul, mul_assign);
impl_binary!(Div, DivAssign, div, div_assign);

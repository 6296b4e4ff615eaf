//! Single-point evaluation
use crate::{
    Error,
    context::{Expression, Node},
};
use std::collections::BTreeMap;

/// Evaluates an expression at a single point
///
/// This uses ordinary floating-point semantics: undefined operations (e.g.
/// `sqrt(-1)`) produce `NaN` or infinities rather than errors.  The only
/// error is [`Error::UnboundVariable`].
///
/// ```
/// # use std::collections::BTreeMap;
/// use enclose::{context::Tree, eval::eval_point};
///
/// let f = Tree::var("x") * 2.0 + Tree::var("y");
/// let p = BTreeMap::from([("x", 1.0), ("y", 0.5)]);
/// assert_eq!(eval_point(&f, &p)?, 2.5);
/// # Ok::<(), enclose::Error>(())
/// ```
pub fn eval_point<E: Expression + ?Sized>(
    expr: &E,
    point: &BTreeMap<&str, f64>,
) -> Result<f64, Error> {
    Ok(match expr.node() {
        Node::Const(c) => c,
        Node::Var(v) => *point
            .get(v)
            .ok_or_else(|| Error::UnboundVariable(v.to_owned()))?,
        Node::Unary(op, a) => op.apply_f64(eval_point(a, point)?),
        Node::Binary(op, a, b) => {
            op.apply_f64(eval_point(a, point)?, eval_point(b, point)?)
        }
    })
}

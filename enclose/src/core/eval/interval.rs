//! Interval evaluation of expressions
use super::{ThreadPool, map_ordered};
use crate::{
    Error,
    context::{Expression, Node},
    types::Interval,
    var::Domain,
};

/// Evaluates an expression over a domain, returning a sound enclosure
///
/// Constants become degenerate intervals and variables are looked up in the
/// domain; the result contains every value the expression takes for any
/// assignment within the domain.
///
/// # Errors
/// - [`Error::UnboundVariable`] if the expression uses a variable that is
///   missing from `domain`
/// - [`Error::DivisionByZero`] or [`Error::DomainError`] if an intermediate
///   operation is undefined over its input intervals
/// - [`Error::BadInterval`] if the expression contains a `NaN` constant
///
/// Shared subtrees are evaluated once per appearance, so deeply nested
/// self-composition (e.g. `t = t.clone() + t` in a loop) takes time
/// exponential in the nesting depth.
pub fn eval_eq<E: Expression + ?Sized>(
    expr: &E,
    domain: &Domain,
) -> Result<Interval, Error> {
    Ok(match expr.node() {
        Node::Const(c) => Interval::try_new(c, c)?,
        Node::Var(v) => domain
            .get(v)
            .ok_or_else(|| Error::UnboundVariable(v.to_owned()))?,
        Node::Unary(op, a) => op.apply(eval_eq(a, domain)?)?,
        Node::Binary(op, a, b) => {
            op.apply(eval_eq(a, domain)?, eval_eq(b, domain)?)?
        }
    })
}

/// Evaluates a batch of expressions, each over its own domain
///
/// Pairs are evaluated independently (in parallel on the global Rayon pool)
/// and results are returned in input order.
///
/// # Errors
/// Returns [`Error::LengthMismatch`] if `exprs` and `domains` have different
/// lengths; otherwise, returns the first error produced by [`eval_eq`].
pub fn eval_eqs<E: Expression + Sync>(
    exprs: &[E],
    domains: &[Domain],
) -> Result<Vec<Interval>, Error> {
    eval_eqs_with(exprs, domains, Some(&ThreadPool::Global))
}

/// Evaluates a batch of expressions using the given thread pool
///
/// If `threads` is `None`, evaluation is done in the calling thread.
pub fn eval_eqs_with<E: Expression + Sync>(
    exprs: &[E],
    domains: &[Domain],
    threads: Option<&ThreadPool>,
) -> Result<Vec<Interval>, Error> {
    if exprs.len() != domains.len() {
        return Err(Error::LengthMismatch(exprs.len(), domains.len()));
    }
    let tasks = exprs.iter().zip(domains).collect::<Vec<_>>();
    map_ordered(threads, tasks, |(e, d)| eval_eq(e, d))
}

//! Refined enclosures by branch-and-bound subdivision
//!
//! A single interval evaluation (see [`eval_eq`]) over-approximates the range
//! of an expression, sometimes badly when a variable appears more than once.
//! The functions in this module tighten that enclosure by splitting the
//! domain into sub-boxes, evaluating each one, and discarding boxes which
//! cannot contain the minimum (or maximum).
//!
//! The result is always sound (it contains the true range) and never wider
//! than the single-shot enclosure.  Smaller tolerances give results which are
//! at least as tight as larger ones.
//!
//! ```
//! use enclose::{bound::BoundConfig, context::Tree, var::Domain};
//!
//! let x = Tree::var("x");
//! let y = Tree::var("y");
//! let f = x.clone() * x.clone() - 2.0 * x + y;
//! let d = Domain::from([("x", (1.0, 2.0)), ("y", (-1.0, 0.0))]);
//!
//! let cfg = BoundConfig {
//!     tolerance: Some(0.01),
//!     ..BoundConfig::default()
//! };
//! let out = cfg.run(&[f], &[d])?;
//! assert!(out[0].lower() <= -2.0 && out[0].lower() >= -2.01);
//! assert!(out[0].upper() >= 0.0 && out[0].upper() <= 0.01);
//! # Ok::<(), enclose::Error>(())
//! ```
use crate::{
    Error,
    context::Expression,
    eval::{ThreadPool, eval_eq, map_ordered},
    types::Interval,
    var::Domain,
};

mod search;
use search::{Side, refine};

/// Default cap on splits per bound when a tolerance is given
pub const DEFAULT_MAX_ITERATIONS: usize = 4096;

/// Default number of splits per bound when no tolerance is given
pub const DEFAULT_ROUNDS: usize = 256;

/// Default width below which a sub-box is no longer split
pub const DEFAULT_MIN_WIDTH: f64 = 1e-9;

/// Settings for refined evaluation
pub struct BoundConfig<'a> {
    /// Target gap between each refined bound and the best value found at a
    /// sample point
    ///
    /// If this is `None`, [`rounds`](Self::rounds) splits are done instead.
    /// A negative tolerance is never met, so refinement runs until
    /// [`max_iterations`](Self::max_iterations).
    pub tolerance: Option<f64>,

    /// Whether to refine the upper bound as well as the lower bound
    ///
    /// If `false`, the upper bound is exactly the single-shot upper bound.
    pub refine_upper: bool,

    /// Maximum number of splits per bound when a tolerance is given
    pub max_iterations: usize,

    /// Number of splits per bound when no tolerance is given
    pub rounds: usize,

    /// Sub-boxes whose widest variable is at most this wide are not split
    pub min_width: f64,

    /// Thread pool to use for batches
    ///
    /// If this is `None`, tasks are evaluated in the calling thread.
    pub threads: Option<&'a ThreadPool>,
}

impl Default for BoundConfig<'_> {
    fn default() -> Self {
        Self {
            tolerance: None,
            refine_upper: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            rounds: DEFAULT_ROUNDS,
            min_width: DEFAULT_MIN_WIDTH,
            threads: Some(&ThreadPool::Global),
        }
    }
}

impl BoundConfig<'_> {
    /// Computes a refined enclosure for each `(expression, domain)` pair
    ///
    /// Results are returned in input order.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] if `exprs` and `domains` have
    /// different lengths; otherwise, returns the first error (by position)
    /// from any task.
    pub fn run<E: Expression + Sync>(
        &self,
        exprs: &[E],
        domains: &[Domain],
    ) -> Result<Vec<Interval>, Error> {
        if exprs.len() != domains.len() {
            return Err(Error::LengthMismatch(exprs.len(), domains.len()));
        }
        let tasks = exprs.iter().zip(domains).collect::<Vec<_>>();
        map_ordered(self.threads, tasks, |(e, d)| self.bound(e, d))
    }

    /// Computes a refined enclosure for a single expression
    pub fn bound<E: Expression + ?Sized>(
        &self,
        expr: &E,
        domain: &Domain,
    ) -> Result<Interval, Error> {
        let base = eval_eq(expr, domain)?;
        let vars: Vec<&str> = expr.vars().into_iter().collect();

        let clamp = |v: f64| v.clamp(base.lower(), base.upper());
        let lower =
            clamp(refine(expr, domain, &vars, base, Side::Lower, self)?);
        let upper = if self.refine_upper {
            clamp(refine(expr, domain, &vars, base, Side::Upper, self)?)
        } else {
            base.upper()
        };
        // Point samples and box evaluations round differently, so the two
        // bounds can cross by an ulp on (nearly) constant expressions
        Ok(Interval::new(lower.min(upper), upper))
    }
}

/// Computes refined enclosures on the global thread pool
///
/// This is shorthand for a [`BoundConfig`] with the given `tolerance` and
/// `refine_upper` flag and default settings otherwise.
pub fn eval_eqs_bounded<E: Expression + Sync>(
    exprs: &[E],
    domains: &[Domain],
    tolerance: Option<f64>,
    refine_upper: bool,
) -> Result<Vec<Interval>, Error> {
    BoundConfig {
        tolerance,
        refine_upper,
        ..BoundConfig::default()
    }
    .run(exprs, domains)
}

//! Multi-start local minimization
//!
//! This is a validation tool rather than a source of guarantees: it searches
//! for low values of a plain numeric function, and its answers can be checked
//! against the (sound) enclosures from [`bound`](crate::bound).
//!
//! Each task is a function and a sampling box.  Starting points are the
//! center of the box followed by seeded uniform samples from it; an
//! unconstrained Nelder-Mead search runs from each one, and the best result
//! wins.  The box is **not** a constraint: the returned point may lie outside
//! of it.
//!
//! ```
//! use enclose::{solver::opt_multi, types::Interval};
//!
//! let f = |x: &[f64]| (x[0] - 0.25).powi(2) + (x[1] + 3.0).powi(2);
//! let out = opt_multi(&[(f, vec![Interval::new(0.0, 1.0); 2])])?;
//! assert!((out[0][0] - 0.25).abs() < 1e-4);
//! assert!((out[0][1] + 3.0).abs() < 1e-4); // outside the box
//! # Ok::<(), enclose::Error>(())
//! ```
use crate::{
    Error,
    context::Expression,
    eval::{ThreadPool, eval_point, map_ordered},
    types::Interval,
};
use log::debug;
use nalgebra::DVector;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::BTreeMap;

mod simplex;
use simplex::nelder_mead;

/// Function to be minimized
///
/// This is implemented for any `Fn(&[f64]) -> f64 + Sync` closure, and for
/// expressions through [`ExprObjective`].
pub trait Objective: Sync {
    /// Evaluates the function at a point
    fn eval(&self, x: &[f64]) -> Result<f64, Error>;
}

impl<F: Fn(&[f64]) -> f64 + Sync> Objective for F {
    fn eval(&self, x: &[f64]) -> Result<f64, Error> {
        Ok(self(x))
    }
}

/// Adapter which minimizes an [`Expression`] over named variables
///
/// Coordinates of each point are bound to `vars` in order.
pub struct ExprObjective<'a, E: ?Sized> {
    expr: &'a E,
    vars: Vec<&'a str>,
}

impl<'a, E: Expression + ?Sized> ExprObjective<'a, E> {
    /// Builds a new objective
    pub fn new(expr: &'a E, vars: &[&'a str]) -> Self {
        Self {
            expr,
            vars: vars.to_vec(),
        }
    }

    /// Returns the variable names, in coordinate order
    pub fn vars(&self) -> &[&'a str] {
        &self.vars
    }
}

impl<E: Expression + Sync + ?Sized> Objective for ExprObjective<'_, E> {
    fn eval(&self, x: &[f64]) -> Result<f64, Error> {
        if x.len() != self.vars.len() {
            return Err(Error::DimensionMismatch(x.len(), self.vars.len()));
        }
        let point: BTreeMap<&str, f64> =
            self.vars.iter().copied().zip(x.iter().copied()).collect();
        eval_point(self.expr, &point)
    }
}

/// Result of a local minimization
#[derive(Clone, Debug, PartialEq)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at [`point`](Self::point)
    pub value: f64,
    /// Number of simplex iterations used
    pub iterations: usize,
}

/// Settings for multi-start minimization
pub struct MultiStartConfig<'a> {
    /// Number of starting points, including the box center
    ///
    /// The center is always used, so `0` behaves like `1`.
    pub starts: usize,

    /// Seed for sampling starting points
    pub seed: u64,

    /// Maximum number of simplex iterations per start
    pub max_iterations: usize,

    /// Convergence threshold on the spread of simplex values
    pub ftol: f64,

    /// Convergence threshold on the simplex diameter (max-norm)
    pub xtol: f64,

    /// Size of the initial simplex, as a fraction of each box dimension
    ///
    /// Degenerate dimensions use this value as an absolute step instead.
    pub initial_step: f64,

    /// Thread pool to use for tasks and starts
    ///
    /// If this is `None`, everything runs in the calling thread.
    pub threads: Option<&'a ThreadPool>,
}

impl Default for MultiStartConfig<'_> {
    fn default() -> Self {
        Self {
            starts: 8,
            seed: 0,
            max_iterations: 2000,
            ftol: 1e-10,
            xtol: 1e-10,
            initial_step: 0.1,
            threads: Some(&ThreadPool::Global),
        }
    }
}

impl MultiStartConfig<'_> {
    /// Minimizes each `(objective, box)` task, returning results in order
    ///
    /// # Errors
    /// Returns the first failing task's error (by position); see
    /// [`minimize`](Self::minimize).
    pub fn run<F: Objective>(
        &self,
        tasks: &[(F, Vec<Interval>)],
    ) -> Result<Vec<Minimum>, Error> {
        let tasks = tasks.iter().collect::<Vec<_>>();
        map_ordered(self.threads, tasks, |(f, b)| self.minimize(f, b))
    }

    /// Minimizes a single objective, sampling starts from `bbox`
    ///
    /// Ties between starts go to the earliest start.
    ///
    /// # Errors
    /// - [`Error::EmptyBox`] or [`Error::UnboundedBox`] if `bbox` cannot be
    ///   sampled
    /// - If every start fails, the error from the last one
    pub fn minimize<F: Objective + ?Sized>(
        &self,
        f: &F,
        bbox: &[Interval],
    ) -> Result<Minimum, Error> {
        let starts = self.starting_points(bbox)?;
        let step = DVector::from_iterator(
            bbox.len(),
            bbox.iter().map(|i| {
                let s = i.width() * self.initial_step;
                if s > 0.0 { s } else { self.initial_step }
            }),
        );

        let runs = map_ordered(self.threads, starts, |x0| {
            Ok(nelder_mead(f, x0, &step, self))
        })?;

        let mut best: Option<Minimum> = None;
        let mut err = None;
        for (i, r) in runs.into_iter().enumerate() {
            match r {
                Ok(m) => {
                    debug!(
                        "start {i}: {} at {:?} after {} iterations",
                        m.value, m.point, m.iterations
                    );
                    if best.as_ref().is_none_or(|b| m.value < b.value) {
                        best = Some(m);
                    }
                }
                Err(e) => {
                    debug!("start {i} failed: {e}");
                    err = Some(e);
                }
            }
        }
        match (best, err) {
            (Some(m), _) => Ok(m),
            (None, Some(e)) => Err(e),
            (None, None) => Err(Error::EmptyBox),
        }
    }

    /// Returns the box center followed by seeded samples from the box
    fn starting_points(
        &self,
        bbox: &[Interval],
    ) -> Result<Vec<DVector<f64>>, Error> {
        if bbox.is_empty() {
            return Err(Error::EmptyBox);
        }
        if let Some((i, b)) =
            bbox.iter().enumerate().find(|(_, b)| !b.is_bounded())
        {
            return Err(Error::UnboundedBox(i, *b));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let center = DVector::from_iterator(
            bbox.len(),
            bbox.iter().map(|i| i.midpoint()),
        );
        let mut out = vec![center];
        for _ in 1..self.starts {
            out.push(DVector::from_iterator(
                bbox.len(),
                bbox.iter()
                    .map(|i| rng.gen_range(i.lower()..=i.upper())),
            ));
        }
        Ok(out)
    }
}

/// Minimizes each task with default settings, returning the best points
///
/// This is shorthand for [`MultiStartConfig::run`] with the default
/// configuration, keeping only the argument vectors.
pub fn opt_multi<F: Objective>(
    tasks: &[(F, Vec<Interval>)],
) -> Result<Vec<Vec<f64>>, Error> {
    let out = MultiStartConfig::default().run(tasks)?;
    Ok(out.into_iter().map(|m| m.point).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::Tree;
    use approx::assert_relative_eq;

    fn unit_box(n: usize) -> Vec<Interval> {
        vec![Interval::new(0.0, 1.0); n]
    }

    #[test]
    fn starting_points() {
        let cfg = MultiStartConfig {
            starts: 5,
            seed: 7,
            ..MultiStartConfig::default()
        };
        let b = [Interval::new(0.0, 2.0), Interval::new(-1.0, -1.0)];
        let pts = cfg.starting_points(&b).unwrap();
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0].as_slice(), &[1.0, -1.0]);
        for p in &pts[1..] {
            assert!(b[0].contains(p[0]));
            assert_eq!(p[1], -1.0);
        }
        assert_eq!(pts, cfg.starting_points(&b).unwrap());

        let cfg = MultiStartConfig {
            starts: 0,
            ..MultiStartConfig::default()
        };
        assert_eq!(cfg.starting_points(&b).unwrap().len(), 1);
    }

    #[test]
    fn scenario_out_of_box() {
        // Unbounded below; descent leaves the sampling box
        let f = |x: &[f64]| (1.0 - x[0] * x[0]) * x[1] - x[0];
        let out = opt_multi(&[(f, unit_box(2))]).unwrap();
        assert_eq!(out[0].len(), 2);
        // f >= -1 everywhere in the unit box
        assert!(f(&out[0]) < -1.0, "{:?}", out[0]);
        assert!(out[0].iter().any(|v| !(0.0..=1.0).contains(v)));
    }

    #[test]
    fn multiple_tasks() {
        type Task = (Box<dyn Fn(&[f64]) -> f64 + Sync>, Vec<Interval>);
        let tasks: Vec<Task> = vec![
            (Box::new(|x: &[f64]| (x[0] - 0.5).powi(2)), unit_box(1)),
            (
                Box::new(|x: &[f64]| (x[0] + 2.0).powi(2) + x[1].powi(2)),
                unit_box(2),
            ),
            (
                Box::new(|x: &[f64]| {
                    (x[0] - x[1]).powi(2) + (x[2] - 0.1).powi(2)
                }),
                unit_box(3),
            ),
        ];
        let out = MultiStartConfig {
            threads: None,
            ..MultiStartConfig::default()
        }
        .run(&tasks)
        .unwrap();
        assert_eq!(out.len(), 3);
        assert_relative_eq!(out[0].point[0], 0.5, epsilon = 1e-4);
        assert_relative_eq!(out[1].point[0], -2.0, epsilon = 1e-4);
        assert_relative_eq!(out[1].point[1], 0.0, epsilon = 1e-4);
        assert_eq!(out[2].point.len(), 3);
        assert!(out[2].value < 1e-8);

        let par = MultiStartConfig::default().run(&tasks).unwrap();
        assert_eq!(out, par);
    }

    #[test]
    fn global_basin() {
        // Double well, tilted so the left basin is lower; the box center
        // descends into the right basin
        let f = |x: &[f64]| (x[0] * x[0] - 1.0).powi(2) + 0.3 * x[0];
        let b = vec![Interval::new(-1.5, 2.0)];
        let center = MultiStartConfig {
            starts: 1,
            ..MultiStartConfig::default()
        }
        .minimize(&f, &b)
        .unwrap();
        assert!(center.point[0] > 0.0);

        let multi = MultiStartConfig {
            starts: 16,
            ..MultiStartConfig::default()
        }
        .minimize(&f, &b)
        .unwrap();
        assert!(multi.value < center.value);
        assert_relative_eq!(multi.point[0], -1.0356, epsilon = 1e-3);
    }

    #[test]
    fn failing_starts() {
        // Undefined at and below the box center
        let f = |x: &[f64]| {
            if x[0] <= 0.5 {
                f64::NAN
            } else {
                (x[0] - 0.8).powi(2)
            }
        };
        let cfg = MultiStartConfig {
            starts: 32,
            ..MultiStartConfig::default()
        };
        let m = cfg.minimize(&f, &unit_box(1)).unwrap();
        assert_relative_eq!(m.point[0], 0.8, epsilon = 1e-4);

        let g = |_: &[f64]| f64::NAN;
        let r = cfg.minimize(&g, &unit_box(2));
        assert!(matches!(r, Err(Error::NonFiniteObjective(..))));
    }

    #[test]
    fn bad_boxes() {
        let f = |x: &[f64]| x.iter().sum::<f64>();
        let cfg = MultiStartConfig::default();
        assert!(matches!(cfg.minimize(&f, &[]), Err(Error::EmptyBox)));
        let b = [Interval::new(0.0, 1.0), Interval::entire()];
        let r = cfg.minimize(&f, &b);
        assert!(matches!(r, Err(Error::UnboundedBox(1, _))));
    }

    #[test]
    fn expression_objective() {
        let x = Tree::var("x");
        let y = Tree::var("y");
        let f = x.clone() * x.clone() - 2.0 * x + y.clone() * y.clone() - y;
        let obj = ExprObjective::new(&f, &["x", "y"]);
        assert_eq!(obj.vars(), ["x", "y"]);
        let m = MultiStartConfig::default()
            .minimize(&obj, &[Interval::new(0.0, 2.0), Interval::new(0.0, 1.0)])
            .unwrap();
        assert_relative_eq!(m.value, -1.25, epsilon = 1e-8);
        assert_relative_eq!(m.point[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(m.point[1], 0.5, epsilon = 1e-4);

        let r = obj.eval(&[1.0]);
        assert!(matches!(r, Err(Error::DimensionMismatch(1, 2))));

        let obj = ExprObjective::new(&f, &["x", "z"]);
        let r = MultiStartConfig::default().minimize(&obj, &unit_box(2));
        assert!(matches!(r, Err(Error::UnboundVariable(ref v)) if v == "y"));
    }
}

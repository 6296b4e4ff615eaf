//! Evaluation of expressions over intervals and points
//!
//! [`eval_eq`] computes a sound enclosure of an expression over a single
//! [`Domain`](crate::var::Domain); [`eval_eqs`] does the same for a batch of
//! independent `(expression, domain)` pairs.
//!
//! ```
//! use enclose::{context::Tree, eval::eval_eq, var::Domain};
//!
//! let x = Tree::var("x");
//! let f = x.clone() * x + 1.0;
//! let out = eval_eq(&f, &Domain::from([("x", (-1.0, 2.0))]))?;
//! assert_eq!(out, [-1.0, 5.0].into()); // interval arithmetic is pessimistic
//! # Ok::<(), enclose::Error>(())
//! ```
mod interval;
mod point;

pub use interval::{eval_eq, eval_eqs, eval_eqs_with};
pub use point::eval_point;

/// Thread pool to use for batch evaluation
///
/// Most users will use the global Rayon pool, but it's possible to provide your
/// own as well.
pub enum ThreadPool {
    /// User-provided pool
    Custom(rayon::ThreadPool),
    /// Global Rayon pool
    Global,
}

impl ThreadPool {
    /// Runs a function across the thread pool
    pub fn run<F: FnOnce() -> V + Send, V: Send>(&self, f: F) -> V {
        match self {
            ThreadPool::Custom(p) => p.install(f),
            ThreadPool::Global => f(),
        }
    }

    /// Returns the number of threads in the pool
    pub fn thread_count(&self) -> usize {
        match self {
            ThreadPool::Custom(p) => p.current_num_threads(),
            ThreadPool::Global => rayon::current_num_threads(),
        }
    }
}

/// Maps `f` over `items`, in parallel if a pool is provided
///
/// Results are returned in input order; the first error (by position) is
/// returned if any item fails.
pub(crate) fn map_ordered<T, V, F>(
    threads: Option<&ThreadPool>,
    items: Vec<T>,
    f: F,
) -> Result<Vec<V>, crate::Error>
where
    T: Send,
    V: Send,
    F: Fn(T) -> Result<V, crate::Error> + Send + Sync,
{
    use rayon::prelude::*;
    match threads {
        None => items.into_iter().map(f).collect(),
        Some(p) => {
            let out: Vec<Result<V, _>> =
                p.run(|| items.into_par_iter().map(f).collect());
            out.into_iter().collect()
        }
    }
}

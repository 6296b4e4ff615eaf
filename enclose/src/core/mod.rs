//! Core infrastructure for interval evaluation of math expressions
//!
//! ```
//! use enclose::{context::Tree, eval::eval_eq, var::Domain};
//!
//! let x = Tree::var("x");
//! let y = Tree::var("y");
//! let f = x.square() + y.square() - 1.0;
//!
//! let d = Domain::from([("x", (-1.0, 1.0)), ("y", (0.5, 2.0))]);
//! let out = eval_eq(&f, &d)?;
//! assert_eq!(out, [-0.75, 4.0].into());
//!
//! // Every point in the domain evaluates to a value within the enclosure
//! for i in 0..=10 {
//!     let x = -1.0 + i as f64 / 5.0;
//!     let v = x * x + 0.5 * 0.5 - 1.0;
//!     assert!(out.contains(v));
//! }
//! # Ok::<(), enclose::Error>(())
//! ```
pub mod context;
pub mod eval;
pub mod types;
pub mod var;

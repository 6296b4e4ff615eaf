//! Enclose is a library for computing guaranteed bounds on the range of a
//! math expression over a box of variable values.
//!
//! An **enclosure** of an expression `f` over a **domain** (a map from each
//! variable to an interval) is an interval `[lo, hi]` such that every
//! assignment of variables within the domain gives `lo <= f <= hi`.
//! Enclosures are computed with interval arithmetic, so they are always
//! sound, but they may be loose: interval arithmetic doesn't know that two
//! occurrences of `x` are the same value.
//!
//! The rest of this page is a quick tour through the library APIs.
//!
//! # Expression construction
//! Expressions are anything that implements the
//! [`Expression`](crate::context::Expression) trait.  The library provides
//! [`Tree`](crate::context::Tree), a reference-counted expression tree with
//! operator overloading:
//! ```
//! use enclose::context::Tree;
//!
//! let x = Tree::var("x");
//! let y = Tree::var("y");
//! let f = x.clone() * x - 2.0 * y.sin();
//! ```
//!
//! As an alternative, the [`enclose::rhai` namespace](crate::rhai) includes
//! bindings to [Rhai](https://rhai.rs), which build a tree from a script:
//! ```
//! # #[cfg(feature = "rhai")]
//! # {
//! let f = enclose::rhai::eval("x * x - 2 * sin(y)", &["x", "y"])?;
//! # }
//! # Ok::<(), enclose::Error>(())
//! ```
//!
//! # Single-shot evaluation
//! [`eval::eval_eq`] walks the expression once, substituting each variable
//! with its interval:
//! ```
//! use enclose::{context::Tree, eval::eval_eq, var::Domain};
//!
//! let x = Tree::var("x");
//! let y = Tree::var("y");
//! let f = x.clone() * x.clone() - 2.0 * x + y;
//! let d = Domain::from([("x", (1.0, 2.0)), ("y", (1.0, 2.0))]);
//! assert_eq!(eval_eq(&f, &d)?, [-2.0, 4.0].into()); // true range is [0, 2]
//! # Ok::<(), enclose::Error>(())
//! ```
//!
//! # Refinement
//! [`bound`] tightens an enclosure by splitting the domain into smaller
//! boxes and discarding those which cannot hold the minimum or maximum.  The
//! `tolerance` controls how close each refined bound must be to a value
//! which is actually attained:
//! ```
//! use enclose::{bound::eval_eqs_bounded, context::Tree, var::Domain};
//!
//! let x = Tree::var("x");
//! let y = Tree::var("y");
//! let f = x.clone() * x.clone() - 2.0 * x + y;
//! let d = Domain::from([("x", (1.0, 2.0)), ("y", (1.0, 2.0))]);
//! let out = eval_eqs_bounded(&[f], &[d], Some(0.01), true)?;
//! assert!(out[0].lower() >= -0.01 && out[0].lower() <= 0.0);
//! assert!(out[0].upper() >= 2.0 && out[0].upper() <= 2.01);
//! # Ok::<(), enclose::Error>(())
//! ```
//!
//! # Cross-validation
//! [`solver`] contains a multi-start local minimizer.  It offers no
//! guarantees, but any value it finds must lie within a sound enclosure,
//! which makes it useful for checking the other half of the library.
//!
//! # Feature flags
#![doc = document_features::document_features!()]
#![warn(missing_docs)]

// Re-export everything from enclose::core into the top-level namespace
mod core;
pub use crate::core::*;

mod error;
pub use error::Error;

pub mod bound;
pub mod solver;

#[cfg(feature = "rhai")]
pub mod rhai;

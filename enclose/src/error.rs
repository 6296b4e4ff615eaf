//! Module containing the universal error type
use crate::types::Interval;
use thiserror::Error;

/// Universal error type for `enclose`
#[derive(Error, Debug)]
pub enum Error {
    /// Expression references a variable that is missing from the domain
    #[error("variable `{0}` is not bound in the domain")]
    UnboundVariable(String),

    /// Batch expression and domain lists have different lengths
    #[error("expression count ({0}) does not match domain count ({1})")]
    LengthMismatch(usize, usize),

    /// Interval division by a divisor which contains zero
    #[error("division by an interval containing zero: {0}")]
    DivisionByZero(Interval),

    /// Function applied outside of its real domain
    #[error("`{op}` is undefined over {input}")]
    DomainError {
        /// Name of the operation
        op: &'static str,
        /// Offending input interval
        input: Interval,
    },

    /// Interval bounds are out of order (or `NaN`)
    #[error("invalid interval bounds [{0}, {1}]")]
    BadInterval(f64, f64),

    /// Objective function produced a non-finite value at a starting point
    #[error("objective is not finite at the starting point {0:?}")]
    NonFiniteObjective(Vec<f64>),

    /// Sampling box has no dimensions
    #[error("sampling box must have at least one dimension")]
    EmptyBox,

    /// Sampling box has an unbounded dimension
    #[error("sampling box dimension {0} is unbounded: {1}")]
    UnboundedBox(usize, Interval),

    /// Point length does not match the expected dimension
    #[error("point has {0} coordinates, expected {1}")]
    DimensionMismatch(usize, usize),

    /// Rhai error; see inner code for details
    #[cfg(feature = "rhai")]
    #[error("Rhai parse error")]
    RhaiParseError(#[from] rhai::ParseError),

    /// Rhai error; see inner code for details
    #[cfg(feature = "rhai")]
    #[error("Rhai evaluation error")]
    RhaiEvalError(#[from] rhai::EvalAltResult),
}

#[cfg(feature = "rhai")]
impl From<Box<rhai::EvalAltResult>> for Error {
    fn from(e: Box<rhai::EvalAltResult>) -> Self {
        Error::RhaiEvalError(*e)
    }
}

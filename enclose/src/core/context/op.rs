use crate::{Error, types::Interval};

/// A one-argument math operation
#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum UnaryOpcode {
    Neg,
    Abs,
    Recip,
    Sqrt,
    Square,
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
}

/// A two-argument math operation
#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    Pow,
}

impl UnaryOpcode {
    /// Applies the operation to an interval
    pub fn apply(self, a: Interval) -> Result<Interval, Error> {
        Ok(match self {
            UnaryOpcode::Neg => -a,
            UnaryOpcode::Abs => a.abs(),
            UnaryOpcode::Recip => a.recip()?,
            UnaryOpcode::Sqrt => a.sqrt()?,
            UnaryOpcode::Square => a.square(),
            UnaryOpcode::Sin => a.sin(),
            UnaryOpcode::Cos => a.cos(),
            UnaryOpcode::Tan => a.tan(),
            UnaryOpcode::Exp => a.exp(),
            UnaryOpcode::Ln => a.ln()?,
        })
    }

    /// Applies the operation to a single value
    pub fn apply_f64(self, a: f64) -> f64 {
        match self {
            UnaryOpcode::Neg => -a,
            UnaryOpcode::Abs => a.abs(),
            UnaryOpcode::Recip => 1.0 / a,
            UnaryOpcode::Sqrt => a.sqrt(),
            UnaryOpcode::Square => a * a,
            UnaryOpcode::Sin => a.sin(),
            UnaryOpcode::Cos => a.cos(),
            UnaryOpcode::Tan => a.tan(),
            UnaryOpcode::Exp => a.exp(),
            UnaryOpcode::Ln => a.ln(),
        }
    }
}

impl BinaryOpcode {
    /// Applies the operation to a pair of intervals
    pub fn apply(self, a: Interval, b: Interval) -> Result<Interval, Error> {
        Ok(match self {
            BinaryOpcode::Add => a + b,
            BinaryOpcode::Sub => a - b,
            BinaryOpcode::Mul => a * b,
            BinaryOpcode::Div => a.try_div(b)?,
            BinaryOpcode::Min => a.min(b),
            BinaryOpcode::Max => a.max(b),
            BinaryOpcode::Pow => a.pow(b)?,
        })
    }

    /// Applies the operation to a pair of values
    pub fn apply_f64(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOpcode::Add => a + b,
            BinaryOpcode::Sub => a - b,
            BinaryOpcode::Mul => a * b,
            BinaryOpcode::Div => a / b,
            // Undefined inputs stay undefined (`f64::min` and `powi` drop them)
            _ if a.is_nan() || b.is_nan() => f64::NAN,
            BinaryOpcode::Min => a.min(b),
            BinaryOpcode::Max => a.max(b),
            BinaryOpcode::Pow => {
                if b.fract() == 0.0 && b.abs() <= i32::MAX as f64 {
                    a.powi(b as i32)
                } else {
                    a.powf(b)
                }
            }
        }
    }
}

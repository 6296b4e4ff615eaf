use crate::Error;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Stores a range, with conservative calculations to guarantee that it always
/// contains the actual value.
///
/// Bounds may be infinite, e.g. after taking the tangent across a pole.  If an
/// arithmetic operation would produce a `NaN` bound (such as `∞ - ∞`), that
/// bound is widened to the matching infinity instead.
///
/// # Warning
/// This implementation does not set rounding modes, so it may not be _perfect_.
#[derive(Copy, Clone, PartialEq)]
pub struct Interval {
    lower: f64,
    upper: f64,
}

static_assertions::assert_impl_all!(Interval: Send, Sync);

impl std::fmt::Debug for Interval {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> Result<(), std::fmt::Error> {
        f.debug_tuple("")
            .field(&self.lower)
            .field(&self.upper)
            .finish()
    }
}

/// Product of two bounds, where `0 × ∞` is taken to be `0`
#[inline]
fn mul_bound(a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 { 0.0 } else { a * b }
}

impl Interval {
    /// Builds a new interval
    ///
    /// # Panics
    /// Panics if `lower > upper` or either bound is `NaN`; use
    /// [`Interval::try_new`] to check untrusted bounds.
    #[inline]
    pub fn new(lower: f64, upper: f64) -> Self {
        assert!(upper >= lower, "invalid interval [{lower}, {upper}]");
        Self { lower, upper }
    }

    /// Builds a new interval, returning an error if the bounds are invalid
    pub fn try_new(lower: f64, upper: f64) -> Result<Self, Error> {
        if upper >= lower {
            Ok(Self { lower, upper })
        } else {
            Err(Error::BadInterval(lower, upper))
        }
    }

    /// Builds an interval from computed bounds, widening `NaN` bounds
    #[inline]
    fn widened(lower: f64, upper: f64) -> Self {
        let lower = if lower.is_nan() { f64::NEG_INFINITY } else { lower };
        let upper = if upper.is_nan() { f64::INFINITY } else { upper };
        Self::new(lower, upper)
    }

    /// Returns the interval covering the entire real line
    pub fn entire() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Returns the lower bound of the interval
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }
    /// Returns the upper bound of the interval
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }
    /// Checks whether the given value is contained in the (closed) interval
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }
    /// Checks whether `other` lies entirely within this interval
    pub fn encloses(&self, other: Interval) -> bool {
        other.lower >= self.lower && other.upper <= self.upper
    }
    /// Returns `true` if the interval is a single point
    pub fn is_degenerate(&self) -> bool {
        self.lower == self.upper
    }
    /// Returns `true` if both bounds are finite
    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Calculates the absolute value of the interval
    pub fn abs(self) -> Self {
        if self.lower < 0.0 {
            if self.upper > 0.0 {
                Interval::new(0.0, self.upper.max(-self.lower))
            } else {
                Interval::new(-self.upper, -self.lower)
            }
        } else {
            self
        }
    }

    /// Squares the interval
    ///
    /// Note that this has tighter bounds than multiplication, because we know
    /// that both sides of the multiplication are the same value.
    pub fn square(self) -> Self {
        if self.upper < 0.0 {
            Interval::new(self.upper.powi(2), self.lower.powi(2))
        } else if self.lower > 0.0 {
            Interval::new(self.lower.powi(2), self.upper.powi(2))
        } else {
            Interval::new(0.0, self.lower.abs().max(self.upper.abs()).powi(2))
        }
    }

    /// Raises the interval to an integer power
    ///
    /// Even powers of an interval which straddles zero have a lower bound of
    /// zero.  Negative powers are the reciprocal of the positive power, and
    /// fail with [`Error::DivisionByZero`] if that power contains zero.
    pub fn powi(self, n: i32) -> Result<Self, Error> {
        if n < 0 {
            return self.powu(n.unsigned_abs() as f64).recip();
        }
        Ok(self.powu(n as f64))
    }

    /// Raises the interval to a non-negative integer-valued power
    fn powu(self, n: f64) -> Self {
        let p = |v: f64| {
            if n <= i32::MAX as f64 {
                v.powi(n as i32)
            } else {
                v.powf(n)
            }
        };
        if n == 0.0 {
            Interval::from(1.0)
        } else if n % 2.0 == 1.0 {
            Interval::widened(p(self.lower), p(self.upper))
        } else if self.lower >= 0.0 {
            Interval::new(p(self.lower), p(self.upper))
        } else if self.upper <= 0.0 {
            Interval::new(p(self.upper), p(self.lower))
        } else {
            Interval::new(0.0, p(self.lower).max(p(self.upper)))
        }
    }

    /// Raises the interval to a real power
    ///
    /// Integer-valued exponents follow the parity rules of
    /// [`Interval::powi`], even beyond the range of `i32`; otherwise, the
    /// interval must be non-negative.
    pub fn powf(self, e: f64) -> Result<Self, Error> {
        if e.fract() == 0.0 {
            return if e.abs() <= i32::MAX as f64 {
                self.powi(e as i32)
            } else if e < 0.0 {
                self.powu(-e).recip()
            } else {
                Ok(self.powu(e))
            };
        }
        if self.lower < 0.0 || e.is_nan() {
            return Err(Error::DomainError {
                op: "pow",
                input: self,
            });
        }
        let (a, b) = (self.lower.powf(e), self.upper.powf(e));
        Ok(if e > 0.0 {
            Interval::new(a, b)
        } else {
            Interval::new(b, a)
        })
    }

    /// Raises the interval to an interval-valued power
    ///
    /// For a positive base, `a^b = exp(b · ln a)` and `b · ln a` is bilinear,
    /// so the extrema lie at the corners.  A zero lower bound is only allowed
    /// when the exponent is strictly positive.
    pub fn pow(self, rhs: Interval) -> Result<Self, Error> {
        if rhs.is_degenerate() {
            return self.powf(rhs.lower);
        }
        if self.lower < 0.0 || (self.lower == 0.0 && rhs.lower <= 0.0) {
            return Err(Error::DomainError {
                op: "pow",
                input: self,
            });
        }
        let mut lower = f64::INFINITY;
        let mut upper = f64::NEG_INFINITY;
        for a in [self.lower, self.upper] {
            for b in [rhs.lower, rhs.upper] {
                let v = a.powf(b);
                lower = lower.min(v);
                upper = upper.max(v);
            }
        }
        Ok(Interval::widened(lower, upper))
    }

    /// Calculates the square root of the interval
    ///
    /// Negative lower bounds are clamped to zero; an interval that is entirely
    /// negative fails with [`Error::DomainError`].
    pub fn sqrt(self) -> Result<Self, Error> {
        if self.upper < 0.0 {
            Err(Error::DomainError {
                op: "sqrt",
                input: self,
            })
        } else {
            Ok(Interval::new(self.lower.max(0.0).sqrt(), self.upper.sqrt()))
        }
    }

    /// Calculates the reciprocal of the interval
    ///
    /// If the interval includes 0, returns [`Error::DivisionByZero`]
    pub fn recip(self) -> Result<Self, Error> {
        if self.lower > 0.0 || self.upper < 0.0 {
            Ok(Interval::new(1.0 / self.upper, 1.0 / self.lower))
        } else {
            Err(Error::DivisionByZero(self))
        }
    }

    /// Divides by another interval, via multiplication by its reciprocal
    ///
    /// Fails with [`Error::DivisionByZero`] whenever `rhs` contains zero; an
    /// unbounded result is never returned in that case.
    pub fn try_div(self, rhs: Interval) -> Result<Self, Error> {
        Ok(self * rhs.recip()?)
    }

    /// Shared implementation of `sin` and `cos`
    ///
    /// `peak` is the position of a maximum; minima are offset by `π`.
    fn periodic(self, f: fn(f64) -> f64, peak: f64) -> Self {
        if !self.is_bounded() || self.width() >= TAU {
            return Interval::new(-1.0, 1.0);
        }
        let spans = |p: f64| {
            let k = ((self.lower - p) / TAU).floor();
            [k, k + 1.0]
                .into_iter()
                .any(|k| self.contains(p + k * TAU))
        };
        let (a, b) = (f(self.lower), f(self.upper));
        let lower = if spans(peak + PI) { -1.0 } else { a.min(b) };
        let upper = if spans(peak) { 1.0 } else { a.max(b) };
        Interval::new(lower, upper)
    }

    /// Computes the sine of the interval
    ///
    /// Each bound is `±1` if the interval spans the matching extremum, and is
    /// otherwise taken from the endpoints (where the function is monotonic).
    pub fn sin(self) -> Self {
        self.periodic(f64::sin, FRAC_PI_2)
    }

    /// Computes the cosine of the interval
    ///
    /// See [`Interval::sin`] for details.
    pub fn cos(self) -> Self {
        self.periodic(f64::cos, 0.0)
    }

    /// Computes the tangent of the interval
    ///
    /// Returns the entire real line if the interval contains a pole
    pub fn tan(self) -> Self {
        if !self.is_bounded() || self.width() >= PI {
            return Interval::entire();
        }
        let k = ((self.lower - FRAC_PI_2) / PI).floor();
        let pole = [k, k + 1.0]
            .into_iter()
            .any(|k| self.contains(FRAC_PI_2 + k * PI));
        let (a, b) = (self.lower.tan(), self.upper.tan());
        if pole || b < a {
            Interval::entire()
        } else {
            Interval::new(a, b)
        }
    }

    /// Computes the exponent function applied to the interval
    pub fn exp(self) -> Self {
        Interval::new(self.lower.exp(), self.upper.exp())
    }

    /// Computes the natural log of the input interval
    ///
    /// The lower bound is `-∞` if the interval touches zero; an interval with
    /// no positive values fails with [`Error::DomainError`].
    pub fn ln(self) -> Result<Self, Error> {
        if self.upper <= 0.0 {
            Err(Error::DomainError {
                op: "ln",
                input: self,
            })
        } else if self.lower <= 0.0 {
            Ok(Interval::new(f64::NEG_INFINITY, self.upper.ln()))
        } else {
            Ok(Interval::new(self.lower.ln(), self.upper.ln()))
        }
    }

    /// Calculates the minimum of two intervals
    pub fn min(self, rhs: Self) -> Self {
        Interval::new(self.lower.min(rhs.lower), self.upper.min(rhs.upper))
    }

    /// Calculates the maximum of two intervals
    pub fn max(self, rhs: Self) -> Self {
        Interval::new(self.lower.max(rhs.lower), self.upper.max(rhs.upper))
    }

    /// Returns the smallest interval containing both inputs
    pub fn hull(self, rhs: Self) -> Self {
        Interval::new(self.lower.min(rhs.lower), self.upper.max(rhs.upper))
    }

    /// Returns the overlap of two intervals, or `None` if they are disjoint
    pub fn intersect(self, rhs: Self) -> Option<Self> {
        let lower = self.lower.max(rhs.lower);
        let upper = self.upper.min(rhs.upper);
        (lower <= upper).then(|| Interval::new(lower, upper))
    }

    /// Returns the midpoint of the interval
    ///
    /// This is always a finite point within the interval (unless the interval
    /// is a single infinite point).  Half-infinite intervals use the largest
    /// finite value on the unbounded side, and the entire real line uses zero.
    pub fn midpoint(self) -> f64 {
        match (self.lower.is_finite(), self.upper.is_finite()) {
            (true, true) => (0.5 * self.lower + 0.5 * self.upper)
                .clamp(self.lower, self.upper),
            _ if self.is_degenerate() => self.lower,
            (false, false) => 0.0,
            (false, true) => f64::MIN.min(self.upper),
            (true, false) => f64::MAX.max(self.lower),
        }
    }

    /// Splits the interval at the midpoint
    ///
    /// Intervals which are too small (or too large) to shrink will return one
    /// half that is equal to the input.
    ///
    /// ```
    /// # use enclose::types::Interval;
    /// let a = Interval::new(0.0, 1.0);
    /// let (lo, hi) = a.split();
    /// assert_eq!(lo, Interval::new(0.0, 0.5));
    /// assert_eq!(hi, Interval::new(0.5, 1.0));
    /// ```
    pub fn split(self) -> (Self, Self) {
        let mid = self.midpoint();
        (
            Interval::new(self.lower, mid),
            Interval::new(mid, self.upper),
        )
    }

    /// Calculates the width of the interval
    ///
    /// ```
    /// # use enclose::types::Interval;
    /// let a = Interval::new(2.0, 3.0);
    /// assert_eq!(a.width(), 1.0);
    /// let b = Interval::new(2.0, 5.0);
    /// assert_eq!(b.width(), 3.0);
    /// ```
    pub fn width(self) -> f64 {
        self.upper - self.lower
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lower, self.upper)
    }
}

impl From<[f64; 2]> for Interval {
    fn from(i: [f64; 2]) -> Interval {
        Interval::new(i[0], i[1])
    }
}

impl From<(f64, f64)> for Interval {
    fn from((lower, upper): (f64, f64)) -> Interval {
        Interval::new(lower, upper)
    }
}

impl From<f64> for Interval {
    fn from(f: f64) -> Self {
        Interval::new(f, f)
    }
}

impl From<Interval> for (f64, f64) {
    fn from(i: Interval) -> (f64, f64) {
        (i.lower, i.upper)
    }
}

impl std::ops::Add<Interval> for Interval {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Interval::widened(self.lower + rhs.lower, self.upper + rhs.upper)
    }
}

impl std::ops::Mul<Interval> for Interval {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut lower = f64::INFINITY;
        let mut upper = f64::NEG_INFINITY;
        for i in [self.lower, self.upper] {
            for j in [rhs.lower, rhs.upper] {
                let v = mul_bound(i, j);
                lower = lower.min(v);
                upper = upper.max(v);
            }
        }
        Interval::new(lower, upper)
    }
}

impl std::ops::Mul<f64> for Interval {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self * Interval::from(rhs)
    }
}

impl std::ops::Sub<Interval> for Interval {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

impl std::ops::Neg for Interval {
    type Output = Self;
    fn neg(self) -> Self {
        Interval::new(-self.upper, -self.lower)
    }
}

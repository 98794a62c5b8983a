use crate::error::EvaluationError;
use crate::node::Domain;
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// A trait for the scalar types an expression tree can be evaluated over.
/// `f64` backs the Real domain and `Complex64` the Complex domain.
///
/// Operations that are undefined for a particular input (a logarithm of a
/// non-positive real, a non-integer power of a negative real) return `None`
/// instead of a NaN so the evaluator can report them at the failing point.
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The domain tag carried by every node evaluated over this scalar.
    const DOMAIN: Domain;

    fn from_real(x: f64) -> Self;
    /// Projects a stored constant payload into this scalar type.
    /// Real constants are validated at construction, so only `re` is kept.
    fn from_complex(c: Complex64) -> Self;
    fn to_complex(self) -> Complex64;

    fn magnitude(self) -> f64;
    fn is_finite(self) -> bool;
    /// Unchecked quotient. Callers test the divisor with `is_zero` first.
    fn quotient(self, rhs: Self) -> Self;

    fn exp(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn sinh(self) -> Self;
    fn cosh(self) -> Self;
    fn tanh(self) -> Self;
    fn ln(self) -> Option<Self>;
    fn powi(self, n: i32) -> Self;
    fn pow(self, exponent: Self) -> Option<Self>;
    fn sqrt(self) -> Self;

    fn re(self) -> Self;
    fn im(self) -> Self;
    fn conj(self) -> Self;

    /// Returns the value as an `i32` when it is an exact (real) integer.
    fn as_integer(self) -> Option<i32>;
}

/// A complex-valued integrand of one real variable.
pub trait Integrand {
    /// Samples the integrand at `t`. Failures mark the sample non-finite.
    fn sample(&self, t: f64) -> Result<Complex64, EvaluationError>;
}

impl<F> Integrand for F
where
    F: Fn(f64) -> Result<Complex64, EvaluationError>,
{
    fn sample(&self, t: f64) -> Result<Complex64, EvaluationError> {
        self(t)
    }
}

fn exact_integer(x: f64) -> Option<i32> {
    if x.fract() == 0.0 && x.abs() <= i32::MAX as f64 {
        Some(x as i32)
    } else {
        None
    }
}

impl Scalar for f64 {
    const DOMAIN: Domain = Domain::Real;

    fn from_real(x: f64) -> Self {
        x
    }
    fn from_complex(c: Complex64) -> Self {
        c.re
    }
    fn to_complex(self) -> Complex64 {
        Complex64::new(self, 0.0)
    }

    fn magnitude(self) -> f64 {
        f64::abs(self)
    }
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
    fn quotient(self, rhs: Self) -> Self {
        self / rhs
    }

    fn exp(self) -> Self {
        f64::exp(self)
    }
    fn sin(self) -> Self {
        f64::sin(self)
    }
    fn cos(self) -> Self {
        f64::cos(self)
    }
    fn tan(self) -> Self {
        f64::tan(self)
    }
    fn sinh(self) -> Self {
        f64::sinh(self)
    }
    fn cosh(self) -> Self {
        f64::cosh(self)
    }
    fn tanh(self) -> Self {
        f64::tanh(self)
    }
    fn ln(self) -> Option<Self> {
        if self > 0.0 {
            Some(f64::ln(self))
        } else {
            None
        }
    }
    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }
    fn pow(self, exponent: Self) -> Option<Self> {
        if self < 0.0 && exact_integer(exponent).is_none() {
            return None;
        }
        Some(f64::powf(self, exponent))
    }
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn re(self) -> Self {
        self
    }
    fn im(self) -> Self {
        0.0
    }
    fn conj(self) -> Self {
        self
    }

    fn as_integer(self) -> Option<i32> {
        exact_integer(self)
    }
}

impl Scalar for Complex64 {
    const DOMAIN: Domain = Domain::Complex;

    fn from_real(x: f64) -> Self {
        Complex64::new(x, 0.0)
    }
    fn from_complex(c: Complex64) -> Self {
        c
    }
    fn to_complex(self) -> Complex64 {
        self
    }

    fn magnitude(self) -> f64 {
        self.norm()
    }
    fn is_finite(self) -> bool {
        Complex64::is_finite(self)
    }
    fn quotient(self, rhs: Self) -> Self {
        // Real divisors skip the norm-squared path, which overflows early.
        if rhs.im == 0.0 {
            return Complex64::new(self.re / rhs.re, self.im / rhs.re);
        }
        // Smith's algorithm: scale by the larger component of the divisor.
        let (a, b) = (self.re, self.im);
        if rhs.re.abs() >= rhs.im.abs() {
            let r = rhs.im / rhs.re;
            let den = rhs.re + rhs.im * r;
            Complex64::new((a + b * r) / den, (b - a * r) / den)
        } else {
            let r = rhs.re / rhs.im;
            let den = rhs.re * r + rhs.im;
            Complex64::new((a * r + b) / den, (b * r - a) / den)
        }
    }

    fn exp(self) -> Self {
        Complex64::exp(self)
    }
    fn sin(self) -> Self {
        Complex64::sin(self)
    }
    fn cos(self) -> Self {
        Complex64::cos(self)
    }
    fn tan(self) -> Self {
        Complex64::tan(self)
    }
    fn sinh(self) -> Self {
        Complex64::sinh(self)
    }
    fn cosh(self) -> Self {
        Complex64::cosh(self)
    }
    fn tanh(self) -> Self {
        Complex64::tanh(self)
    }
    fn ln(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Complex64::ln(self))
        }
    }
    fn powi(self, n: i32) -> Self {
        Complex64::powi(&self, n)
    }
    fn pow(self, exponent: Self) -> Option<Self> {
        // Principal branch: exp(w ln z).
        Scalar::ln(self).map(|log| Complex64::exp(exponent * log))
    }
    fn sqrt(self) -> Self {
        Complex64::sqrt(self)
    }

    fn re(self) -> Self {
        Complex64::new(self.re, 0.0)
    }
    fn im(self) -> Self {
        Complex64::new(self.im, 0.0)
    }
    fn conj(self) -> Self {
        Complex64::conj(&self)
    }

    fn as_integer(self) -> Option<i32> {
        if self.im == 0.0 {
            exact_integer(self.re)
        } else {
            None
        }
    }
}

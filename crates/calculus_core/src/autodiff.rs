use crate::error::EvaluationError;
use crate::node::{BinaryOp, Elementary, Kind, Node, Op};
use crate::traits::Scalar;
use std::ops::{Add, Mul, Neg, Sub};

/// Dual number for forward-mode differentiation.
/// val: value of the expression
/// eps: derivative along the seed direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual<S: Scalar> {
    pub val: S,
    pub eps: S,
}

impl<S: Scalar> Dual<S> {
    pub fn new(val: S, eps: S) -> Self {
        Self { val, eps }
    }

    pub fn constant(val: S) -> Self {
        Self::new(val, S::zero())
    }

    /// The input pair for a derivative along the real direction.
    pub fn variable(val: S) -> Self {
        Self::new(val, S::one())
    }

    /// Quotient rule. Fails when the divisor's value is exactly zero.
    pub fn checked_div(self, rhs: Self, kind: Kind) -> Result<Self, EvaluationError> {
        if rhs.val.is_zero() {
            return Err(EvaluationError::DivisionByZero {
                kind,
                at: rhs.val.to_complex(),
            });
        }
        let val = self.val.quotient(rhs.val);
        // Dividing twice by r instead of once by r² keeps large divisors finite.
        let numerator = self.eps * rhs.val - self.val * rhs.eps;
        let eps = numerator.quotient(rhs.val).quotient(rhs.val);
        Ok(Self::new(val, eps))
    }
}

impl<S: Scalar> Add for Dual<S> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl<S: Scalar> Sub for Dual<S> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl<S: Scalar> Mul for Dual<S> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl<S: Scalar> Neg for Dual<S> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

/// Evaluates `node` at `input` in a single pass, returning the value and
/// the derivative along `input.eps`.
///
/// Identity returns the input pair unchanged, so seeding `eps = 1` yields
/// the derivative with respect to the variable. Composition evaluates the
/// outer tree at the inner value with a unit seed and multiplies the two
/// derivatives: (f ∘ g)′ = f′(g)·g′.
pub fn forward<S: Scalar>(node: &Node, input: Dual<S>) -> Result<Dual<S>, EvaluationError> {
    let result = match node.op() {
        Op::Constant(value) => return Ok(Dual::constant(S::from_complex(*value))),
        Op::Identity => return Ok(input),
        Op::Unary(function, child) => {
            let arg = forward(child, input)?;
            apply_elementary(*function, arg)?
        }
        Op::Neg(child) => -forward(child, input)?,
        Op::Binary(BinaryOp::Compose, outer, inner) => {
            let g = forward(inner, input)?;
            let f = forward(outer, Dual::variable(g.val))?;
            Dual::new(f.val, f.eps * g.eps)
        }
        Op::Binary(op, left, right) => {
            let lhs = forward(left, input)?;
            match op {
                BinaryOp::Add => lhs + forward(right, input)?,
                BinaryOp::Sub => lhs - forward(right, input)?,
                BinaryOp::Mul => lhs * forward(right, input)?,
                BinaryOp::Div => lhs.checked_div(forward(right, input)?, Kind::Div)?,
                BinaryOp::Pow => power(lhs, right, input)?,
                BinaryOp::Compose => unreachable!("composition is handled above"),
            }
        }
    };
    ensure_finite(node.kind(), input, result)
}

fn ensure_finite<S: Scalar>(
    kind: Kind,
    input: Dual<S>,
    result: Dual<S>,
) -> Result<Dual<S>, EvaluationError> {
    if result.val.is_finite() && result.eps.is_finite() {
        Ok(result)
    } else {
        Err(EvaluationError::Overflow {
            kind,
            at: input.val.to_complex(),
        })
    }
}

fn reciprocal<S: Scalar>(value: S, kind: Kind, at: S) -> Result<S, EvaluationError> {
    if value.is_zero() {
        return Err(EvaluationError::DivisionByZero {
            kind,
            at: at.to_complex(),
        });
    }
    Ok(S::one().quotient(value))
}

fn apply_elementary<S: Scalar>(
    function: Elementary,
    arg: Dual<S>,
) -> Result<Dual<S>, EvaluationError> {
    let kind = function.kind();
    let u = arg.val;
    // (value, d value / d u); the chain factor arg.eps is applied at the end.
    let (val, slope) = match function {
        Elementary::Exp => {
            let e = u.exp();
            (e, e)
        }
        Elementary::Sin => (u.sin(), u.cos()),
        Elementary::Cos => (u.cos(), -u.sin()),
        Elementary::Tan => {
            let sec = reciprocal(u.cos(), kind, u)?;
            (u.tan(), sec * sec)
        }
        Elementary::Sec => {
            let sec = reciprocal(u.cos(), kind, u)?;
            (sec, sec * u.tan())
        }
        Elementary::Csc => {
            let csc = reciprocal(u.sin(), kind, u)?;
            let cot = u.cos() * csc;
            (csc, -csc * cot)
        }
        Elementary::Cot => {
            let csc = reciprocal(u.sin(), kind, u)?;
            (u.cos() * csc, -csc * csc)
        }
        Elementary::Sinh => (u.sinh(), u.cosh()),
        Elementary::Cosh => (u.cosh(), u.sinh()),
        Elementary::Tanh => {
            let sech = reciprocal(u.cosh(), kind, u)?;
            (u.tanh(), sech * sech)
        }
        Elementary::Sech => {
            let sech = reciprocal(u.cosh(), kind, u)?;
            (sech, -sech * u.tanh())
        }
        Elementary::Csch => {
            let csch = reciprocal(u.sinh(), kind, u)?;
            let coth = u.cosh() * csch;
            (csch, -csch * coth)
        }
        Elementary::Coth => {
            let csch = reciprocal(u.sinh(), kind, u)?;
            (u.cosh() * csch, -csch * csch)
        }
        // Re, Im and Conj are real-linear: they act on the tangent directly.
        Elementary::Re => return Ok(Dual::new(u.re(), arg.eps.re())),
        Elementary::Im => return Ok(Dual::new(u.im(), arg.eps.im())),
        Elementary::Conj => return Ok(Dual::new(u.conj(), arg.eps.conj())),
        Elementary::Abs => return absolute(arg),
    };
    Ok(Dual::new(val, slope * arg.eps))
}

/// |u| = sqrt(u * conj(u)); its directional derivative is Re(conj(u) u') / |u|.
fn absolute<S: Scalar>(arg: Dual<S>) -> Result<Dual<S>, EvaluationError> {
    let u = arg.val;
    let modulus = S::from_real(u.magnitude());
    if modulus.is_zero() {
        if arg.eps.is_zero() {
            return Ok(Dual::constant(modulus));
        }
        return Err(EvaluationError::Singularity {
            kind: Kind::Abs,
            at: u.to_complex(),
        });
    }
    let eps = (u.conj().quotient(modulus) * arg.eps).re();
    Ok(Dual::new(modulus, eps))
}

/// u^v with the generalized power rule. A constant exponent skips the
/// ln(u) term entirely, so integer powers of negative or zero bases never
/// touch a branch cut.
fn power<S: Scalar>(
    base: Dual<S>,
    exponent: &Node,
    input: Dual<S>,
) -> Result<Dual<S>, EvaluationError> {
    let u = base.val;
    if let Some(payload) = exponent.payload() {
        let c = S::from_complex(payload);
        return constant_power(base, c);
    }

    let v = forward(exponent, input)?;
    if u.is_zero() {
        return Err(EvaluationError::Singularity {
            kind: Kind::Pow,
            at: u.to_complex(),
        });
    }
    let val = u.pow(v.val).ok_or(EvaluationError::Singularity {
        kind: Kind::Pow,
        at: u.to_complex(),
    })?;
    // With v' = 0 the logarithm drops out, which keeps real integer powers
    // of negative bases differentiable.
    let log_term = if v.eps.is_zero() {
        S::zero()
    } else {
        let log = u.ln().ok_or(EvaluationError::Singularity {
            kind: Kind::Pow,
            at: u.to_complex(),
        })?;
        v.eps * log
    };
    let eps = val * (log_term + (v.val * base.eps).quotient(u));
    Ok(Dual::new(val, eps))
}

fn constant_power<S: Scalar>(base: Dual<S>, c: S) -> Result<Dual<S>, EvaluationError> {
    let u = base.val;
    if c.is_zero() {
        return Ok(Dual::constant(S::one()));
    }
    if let Some(n) = c.as_integer() {
        if u.is_zero() && n < 0 {
            return Err(EvaluationError::DivisionByZero {
                kind: Kind::Pow,
                at: u.to_complex(),
            });
        }
        let val = u.powi(n);
        let slope = c * u.powi(n - 1);
        return Ok(Dual::new(val, slope * base.eps));
    }

    if u.is_zero() {
        if c.to_complex().re <= 0.0 {
            return Err(EvaluationError::DivisionByZero {
                kind: Kind::Pow,
                at: u.to_complex(),
            });
        }
        if c.to_complex().re <= 1.0 && !base.eps.is_zero() {
            return Err(EvaluationError::Singularity {
                kind: Kind::Pow,
                at: u.to_complex(),
            });
        }
        return Ok(Dual::constant(S::zero()));
    }

    let singular = EvaluationError::Singularity {
        kind: Kind::Pow,
        at: u.to_complex(),
    };
    let val = u.pow(c).ok_or(singular)?;
    let slope = c * val.quotient(u);
    Ok(Dual::new(val, slope * base.eps))
}

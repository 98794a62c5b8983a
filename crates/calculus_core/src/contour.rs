//! Parametrized curves t ↦ γ(t).
//!
//! A contour is a complex-valued tree evaluated at real parameters, plus the
//! interval it is integrated over by default. The interval is metadata of
//! the contour object, not of its expression: algebra on contours builds a
//! new tree with the default interval.

use crate::algebra::{link, negate, Compose, IntoOperand};
use crate::autodiff::{forward, Dual};
use crate::error::EvaluationError;
use crate::function::{constant_node, ComplexFunction};
use crate::node::{Elementary, Kind, Node};
use crate::render::render;
use num_complex::Complex64;
use std::f64::consts::TAU;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::Arc;

pub const DEFAULT_START: f64 = 0.0;
pub const DEFAULT_END: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    curve: ComplexFunction,
    pub start: f64,
    pub end: f64,
}

impl Contour {
    /// Treats `curve` as a function of the real parameter, on the default
    /// interval [0, 1].
    pub fn new(curve: ComplexFunction) -> Self {
        Self {
            curve,
            start: DEFAULT_START,
            end: DEFAULT_END,
        }
    }

    pub fn with_interval(mut self, start: f64, end: f64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn constant(value: Complex64) -> Self {
        Self::new(ComplexFunction::constant(value))
    }

    pub fn identity() -> Self {
        Self::new(ComplexFunction::identity())
    }

    pub fn elementary(function: Elementary) -> Self {
        // Every elementary kind exists in the complex domain.
        Self::new(
            ComplexFunction::elementary(function)
                .unwrap_or_else(|err| panic!("complex {function:?} must exist: {err}")),
        )
    }

    pub fn exp() -> Self {
        Self::new(ComplexFunction::exp())
    }
    pub fn sin() -> Self {
        Self::new(ComplexFunction::sin())
    }
    pub fn cos() -> Self {
        Self::new(ComplexFunction::cos())
    }
    pub fn tan() -> Self {
        Self::new(ComplexFunction::tan())
    }
    pub fn sec() -> Self {
        Self::new(ComplexFunction::sec())
    }
    pub fn csc() -> Self {
        Self::new(ComplexFunction::csc())
    }
    pub fn cot() -> Self {
        Self::new(ComplexFunction::cot())
    }
    pub fn sinh() -> Self {
        Self::new(ComplexFunction::sinh())
    }
    pub fn cosh() -> Self {
        Self::new(ComplexFunction::cosh())
    }
    pub fn tanh() -> Self {
        Self::new(ComplexFunction::tanh())
    }
    pub fn sech() -> Self {
        Self::new(ComplexFunction::sech())
    }
    pub fn csch() -> Self {
        Self::new(ComplexFunction::csch())
    }
    pub fn coth() -> Self {
        Self::new(ComplexFunction::coth())
    }
    pub fn re() -> Self {
        Self::new(ComplexFunction::re())
    }
    pub fn im() -> Self {
        Self::new(ComplexFunction::im())
    }
    pub fn conj() -> Self {
        Self::new(ComplexFunction::conj())
    }
    pub fn abs() -> Self {
        Self::new(ComplexFunction::abs())
    }

    /// center + radius·e^{i t}, once around on [0, 2π].
    pub fn circular(radius: f64, center: Complex64) -> Self {
        let angle = Complex64::i() * ComplexFunction::identity();
        let curve = center + radius * ComplexFunction::exp().compose(angle);
        Self::new(curve).with_interval(0.0, TAU)
    }

    pub fn unit_circle() -> Self {
        Self::circular(1.0, Complex64::new(0.0, 0.0))
    }

    /// from + (to - from)·t on [0, 1].
    pub fn line(from: Complex64, to: Complex64) -> Self {
        Self::new(from + (to - from) * ComplexFunction::identity())
    }

    pub fn curve(&self) -> &ComplexFunction {
        &self.curve
    }

    pub fn root(&self) -> &Arc<Node> {
        self.curve.root()
    }

    /// (γ(t), γ′(t)); the derivative comes from the forward pass.
    pub fn value_and_derivative(
        &self,
        t: f64,
    ) -> Result<(Complex64, Complex64), EvaluationError> {
        let d = forward(self.root(), Dual::variable(Complex64::new(t, 0.0)))?;
        Ok((d.val, d.eps))
    }

    pub fn evaluate(&self, t: f64) -> Result<Complex64, EvaluationError> {
        self.value_and_derivative(t).map(|(value, _)| value)
    }

    pub fn derivative(&self, t: f64) -> Result<Complex64, EvaluationError> {
        self.value_and_derivative(t).map(|(_, slope)| slope)
    }

    /// Structural clone of the curve, keeping this contour's interval.
    pub fn copy(&self) -> Self {
        Self {
            curve: self.curve.copy(),
            start: self.start,
            end: self.end,
        }
    }

    pub fn render(&self) -> String {
        render(self.root(), "t")
    }

    pub fn pow<R: ContourOperand>(&self, exponent: R) -> Self {
        Self::from_root(link(
            Kind::Pow,
            Arc::clone(self.root()),
            exponent.into_contour_operand(),
        ))
    }

    fn from_root(root: Arc<Node>) -> Self {
        Self::new(ComplexFunction::wrap(root))
    }
}

impl fmt::Display for Contour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Operands of contour arithmetic: contours and complex or real scalars.
pub trait ContourOperand {
    fn into_contour_operand(self) -> Arc<Node>;
}

impl ContourOperand for Contour {
    fn into_contour_operand(self) -> Arc<Node> {
        Arc::clone(self.root())
    }
}

impl ContourOperand for &Contour {
    fn into_contour_operand(self) -> Arc<Node> {
        Arc::clone(self.root())
    }
}

impl ContourOperand for Complex64 {
    fn into_contour_operand(self) -> Arc<Node> {
        Arc::new(constant_node(self))
    }
}

impl ContourOperand for f64 {
    fn into_contour_operand(self) -> Arc<Node> {
        IntoOperand::<Complex64>::into_operand(self)
    }
}

/// f ∘ γ is again a contour, on the default interval.
impl Compose<&Contour> for ComplexFunction {
    type Output = Contour;

    fn compose(&self, inner: &Contour) -> Contour {
        Contour::from_root(link(
            Kind::Compose,
            Arc::clone(self.root()),
            Arc::clone(inner.root()),
        ))
    }
}

impl Compose<Contour> for ComplexFunction {
    type Output = Contour;

    fn compose(&self, inner: Contour) -> Contour {
        self.compose(&inner)
    }
}

macro_rules! contour_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $kind:expr) => {
        impl<R: ContourOperand> $trait<R> for Contour {
            type Output = Contour;
            fn $method(self, rhs: R) -> Contour {
                Contour::from_root(link(
                    $kind,
                    self.into_contour_operand(),
                    rhs.into_contour_operand(),
                ))
            }
        }

        impl<R: ContourOperand> $trait<R> for &Contour {
            type Output = Contour;
            fn $method(self, rhs: R) -> Contour {
                Contour::from_root(link(
                    $kind,
                    self.into_contour_operand(),
                    rhs.into_contour_operand(),
                ))
            }
        }

        // Keeps the interval: only the handle's tree is rebound.
        impl<R: ContourOperand> $assign_trait<R> for Contour {
            fn $assign_method(&mut self, rhs: R) {
                let root = link($kind, Arc::clone(self.root()), rhs.into_contour_operand());
                self.curve = ComplexFunction::wrap(root);
            }
        }

        impl $trait<Contour> for Complex64 {
            type Output = Contour;
            fn $method(self, rhs: Contour) -> Contour {
                Contour::from_root(link(
                    $kind,
                    self.into_contour_operand(),
                    rhs.into_contour_operand(),
                ))
            }
        }

        impl $trait<&Contour> for Complex64 {
            type Output = Contour;
            fn $method(self, rhs: &Contour) -> Contour {
                Contour::from_root(link(
                    $kind,
                    self.into_contour_operand(),
                    rhs.into_contour_operand(),
                ))
            }
        }

        impl $trait<Contour> for f64 {
            type Output = Contour;
            fn $method(self, rhs: Contour) -> Contour {
                Contour::from_root(link(
                    $kind,
                    self.into_contour_operand(),
                    rhs.into_contour_operand(),
                ))
            }
        }

        impl $trait<&Contour> for f64 {
            type Output = Contour;
            fn $method(self, rhs: &Contour) -> Contour {
                Contour::from_root(link(
                    $kind,
                    self.into_contour_operand(),
                    rhs.into_contour_operand(),
                ))
            }
        }
    };
}

contour_binary_op!(Add, add, AddAssign, add_assign, Kind::Add);
contour_binary_op!(Sub, sub, SubAssign, sub_assign, Kind::Sub);
contour_binary_op!(Mul, mul, MulAssign, mul_assign, Kind::Mul);
contour_binary_op!(Div, div, DivAssign, div_assign, Kind::Div);

impl Neg for Contour {
    type Output = Contour;
    fn neg(self) -> Contour {
        Contour::from_root(negate(self.into_contour_operand()))
    }
}

impl Neg for &Contour {
    type Output = Contour;
    fn neg(self) -> Contour {
        Contour::from_root(negate(self.into_contour_operand()))
    }
}

//! Operator-level construction of new trees.
//!
//! Every operation allocates one new root and adopts its operands' roots as
//! children. Operands are immutable, so adopting a shared tree (including a
//! singleton) never exposes it to mutation; `copy()` remains available for
//! callers that want structurally independent trees.

use crate::function::{constant_node, Function};
use crate::node::{Kind, Node};
use crate::traits::Scalar;
use num_complex::Complex64;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::Arc;

/// Anything usable as an operand of a `Function<S>` operation: another
/// function of the same domain or a scalar, which becomes a Constant leaf.
pub trait IntoOperand<S: Scalar> {
    fn into_operand(self) -> Arc<Node>;
}

impl<S: Scalar> IntoOperand<S> for Function<S> {
    fn into_operand(self) -> Arc<Node> {
        Arc::clone(self.root())
    }
}

impl<S: Scalar> IntoOperand<S> for &Function<S> {
    fn into_operand(self) -> Arc<Node> {
        Arc::clone(self.root())
    }
}

impl<S: Scalar> IntoOperand<S> for S {
    fn into_operand(self) -> Arc<Node> {
        Arc::new(constant_node(self))
    }
}

impl IntoOperand<Complex64> for f64 {
    fn into_operand(self) -> Arc<Node> {
        Arc::new(constant_node(Complex64::new(self, 0.0)))
    }
}

/// Links two same-domain roots under a new binary node.
pub(crate) fn link(kind: Kind, left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
    let node = Node::binary(kind, left, right)
        .unwrap_or_else(|err| panic!("operands of one domain always link: {err}"));
    Arc::new(node)
}

pub(crate) fn negate(root: Arc<Node>) -> Arc<Node> {
    let node = Node::unary(Kind::Neg, root)
        .unwrap_or_else(|err| panic!("negation exists in every domain: {err}"));
    Arc::new(node)
}

/// Composition, `outer ∘ inner`. The receiver is the outer function:
/// `f.compose(g)` evaluates as f(g(z)).
pub trait Compose<Inner> {
    type Output;
    fn compose(&self, inner: Inner) -> Self::Output;
}

impl<S: Scalar, R: IntoOperand<S>> Compose<R> for Function<S> {
    type Output = Function<S>;

    fn compose(&self, inner: R) -> Function<S> {
        Function::wrap(link(
            Kind::Compose,
            Arc::clone(self.root()),
            inner.into_operand(),
        ))
    }
}

/// `outer ∘ inner` as a free function.
pub fn compose<F: Compose<I>, I>(outer: &F, inner: I) -> F::Output {
    outer.compose(inner)
}

impl<S: Scalar> Function<S> {
    /// `self ** exponent`.
    pub fn pow<R: IntoOperand<S>>(&self, exponent: R) -> Self {
        Function::wrap(link(
            Kind::Pow,
            Arc::clone(self.root()),
            exponent.into_operand(),
        ))
    }

    /// `1 / self`.
    pub fn reciprocal(&self) -> Self {
        let one = IntoOperand::<S>::into_operand(S::one());
        Function::wrap(link(Kind::Div, one, self.into_operand()))
    }
}

macro_rules! function_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $kind:expr) => {
        impl<S: Scalar, R: IntoOperand<S>> $trait<R> for Function<S> {
            type Output = Function<S>;
            fn $method(self, rhs: R) -> Function<S> {
                Function::wrap(link($kind, self.into_operand(), rhs.into_operand()))
            }
        }

        impl<S: Scalar, R: IntoOperand<S>> $trait<R> for &Function<S> {
            type Output = Function<S>;
            fn $method(self, rhs: R) -> Function<S> {
                Function::wrap(link($kind, self.into_operand(), rhs.into_operand()))
            }
        }

        // Rebinds the handle; the previous tree is left untouched.
        impl<S: Scalar, R: IntoOperand<S>> $assign_trait<R> for Function<S> {
            fn $assign_method(&mut self, rhs: R) {
                *self = Function::wrap(link($kind, Arc::clone(self.root()), rhs.into_operand()));
            }
        }
    };
}

function_binary_op!(Add, add, AddAssign, add_assign, Kind::Add);
function_binary_op!(Sub, sub, SubAssign, sub_assign, Kind::Sub);
function_binary_op!(Mul, mul, MulAssign, mul_assign, Kind::Mul);
function_binary_op!(Div, div, DivAssign, div_assign, Kind::Div);

/// Scalar on the left-hand side: `2.0 * f`, `c - f`.
macro_rules! scalar_lhs_op {
    ($scalar:ty, $target:ty, $trait:ident, $method:ident, $kind:expr) => {
        impl $trait<Function<$target>> for $scalar {
            type Output = Function<$target>;
            fn $method(self, rhs: Function<$target>) -> Function<$target> {
                let lhs = IntoOperand::<$target>::into_operand(self);
                Function::wrap(link($kind, lhs, rhs.into_operand()))
            }
        }

        impl $trait<&Function<$target>> for $scalar {
            type Output = Function<$target>;
            fn $method(self, rhs: &Function<$target>) -> Function<$target> {
                let lhs = IntoOperand::<$target>::into_operand(self);
                Function::wrap(link($kind, lhs, rhs.into_operand()))
            }
        }
    };
}

macro_rules! scalar_lhs_ops {
    ($scalar:ty, $target:ty) => {
        scalar_lhs_op!($scalar, $target, Add, add, Kind::Add);
        scalar_lhs_op!($scalar, $target, Sub, sub, Kind::Sub);
        scalar_lhs_op!($scalar, $target, Mul, mul, Kind::Mul);
        scalar_lhs_op!($scalar, $target, Div, div, Kind::Div);
    };
}

scalar_lhs_ops!(f64, f64);
scalar_lhs_ops!(f64, Complex64);
scalar_lhs_ops!(Complex64, Complex64);

impl<S: Scalar> Neg for Function<S> {
    type Output = Function<S>;
    fn neg(self) -> Function<S> {
        Function::wrap(negate(self.into_operand()))
    }
}

impl<S: Scalar> Neg for &Function<S> {
    type Output = Function<S>;
    fn neg(self) -> Function<S> {
        Function::wrap(negate(self.into_operand()))
    }
}

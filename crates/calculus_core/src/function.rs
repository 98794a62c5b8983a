//! Function handles over expression trees.
//!
//! A `Function<S>` owns the root of an immutable tree whose domain matches
//! the scalar type `S`. Handles are cheap to clone (the tree is shared) and
//! every algebra operation produces a new root.

use crate::autodiff::{forward, Dual};
use crate::error::{ConstructionError, EvaluationError};
use crate::node::{Domain, Elementary, Kind, Node};
use crate::render::render;
use crate::traits::Scalar;
use num_complex::Complex64;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub type ComplexFunction = Function<Complex64>;
pub type RealFunction = Function<f64>;

#[derive(Debug)]
pub struct Function<S: Scalar> {
    root: Arc<Node>,
    _scalar: PhantomData<S>,
}

impl<S: Scalar> Clone for Function<S> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            _scalar: PhantomData,
        }
    }
}

impl<S: Scalar> PartialEq for Function<S> {
    /// Structural equality of the trees.
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl<S: Scalar> Function<S> {
    /// Wraps an existing tree. Fails if the tree's domain differs from `S`.
    pub fn from_node(node: impl Into<Arc<Node>>) -> Result<Self, ConstructionError> {
        let root = node.into();
        if root.domain() != S::DOMAIN {
            return Err(ConstructionError::DomainMismatch {
                kind: root.kind(),
                domain: S::DOMAIN,
            });
        }
        Ok(Self::wrap(root))
    }

    /// Wraps a root known to be in this domain.
    pub(crate) fn wrap(root: Arc<Node>) -> Self {
        debug_assert_eq!(root.domain(), S::DOMAIN);
        Self {
            root,
            _scalar: PhantomData,
        }
    }

    pub fn constant(value: S) -> Self {
        Self::wrap(Arc::new(constant_node::<S>(value)))
    }

    pub fn identity() -> Self {
        Self::wrap(Arc::new(Node::identity(S::DOMAIN)))
    }

    /// `function(z)`. Fails for kinds that do not exist in this domain
    /// (Re, Im and Conj on the reals).
    pub fn elementary(function: Elementary) -> Result<Self, ConstructionError> {
        let node = Node::unary(function.kind(), Node::identity(S::DOMAIN))?;
        Ok(Self::wrap(Arc::new(node)))
    }

    fn total(function: Elementary) -> Self {
        let node = Node::unary(function.kind(), Node::identity(S::DOMAIN))
            .unwrap_or_else(|err| panic!("{function:?} must exist in every domain: {err}"));
        Self::wrap(Arc::new(node))
    }

    pub fn exp() -> Self {
        Self::total(Elementary::Exp)
    }
    pub fn sin() -> Self {
        Self::total(Elementary::Sin)
    }
    pub fn cos() -> Self {
        Self::total(Elementary::Cos)
    }
    pub fn tan() -> Self {
        Self::total(Elementary::Tan)
    }
    pub fn sec() -> Self {
        Self::total(Elementary::Sec)
    }
    pub fn csc() -> Self {
        Self::total(Elementary::Csc)
    }
    pub fn cot() -> Self {
        Self::total(Elementary::Cot)
    }
    pub fn sinh() -> Self {
        Self::total(Elementary::Sinh)
    }
    pub fn cosh() -> Self {
        Self::total(Elementary::Cosh)
    }
    pub fn tanh() -> Self {
        Self::total(Elementary::Tanh)
    }
    pub fn sech() -> Self {
        Self::total(Elementary::Sech)
    }
    pub fn csch() -> Self {
        Self::total(Elementary::Csch)
    }
    pub fn coth() -> Self {
        Self::total(Elementary::Coth)
    }
    pub fn abs() -> Self {
        Self::total(Elementary::Abs)
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn domain(&self) -> Domain {
        self.root.domain()
    }

    /// Value and derivative at `z` in one pass.
    pub fn value_and_derivative(&self, z: S) -> Result<(S, S), EvaluationError> {
        let d = forward(&self.root, Dual::variable(z))?;
        Ok((d.val, d.eps))
    }

    pub fn evaluate(&self, z: S) -> Result<S, EvaluationError> {
        self.value_and_derivative(z).map(|(value, _)| value)
    }

    pub fn derivative(&self, z: S) -> Result<S, EvaluationError> {
        self.value_and_derivative(z).map(|(_, slope)| slope)
    }

    /// Full structural clone: the result shares no node with `self`.
    pub fn copy(&self) -> Self {
        Self::wrap(Arc::new(self.root.deep_clone()))
    }

    /// LaTeX rendering with the domain's conventional variable name.
    pub fn render(&self) -> String {
        render(&self.root, default_variable(S::DOMAIN))
    }

    pub fn render_with(&self, variable: &str) -> String {
        render(&self.root, variable)
    }
}

impl ComplexFunction {
    pub fn re() -> Self {
        Self::total(Elementary::Re)
    }
    pub fn im() -> Self {
        Self::total(Elementary::Im)
    }
    pub fn conj() -> Self {
        Self::total(Elementary::Conj)
    }
}

impl<S: Scalar> fmt::Display for Function<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

pub(crate) fn constant_node<S: Scalar>(value: S) -> Node {
    Node::constant(S::DOMAIN, value.to_complex())
        .unwrap_or_else(|err| panic!("scalar of the domain is always a valid constant: {err}"))
}

pub(crate) fn default_variable(domain: Domain) -> &'static str {
    match domain {
        Domain::Complex => "z",
        Domain::Real => "x",
    }
}

/// Evaluates `f` at `z`.
pub fn evaluate<S: Scalar>(f: &Function<S>, z: S) -> Result<S, EvaluationError> {
    f.evaluate(z)
}

/// Derivative of `f` at `z`.
pub fn derivative<S: Scalar>(f: &Function<S>, z: S) -> Result<S, EvaluationError> {
    f.derivative(z)
}

impl<S: Scalar> TryFrom<Node> for Function<S> {
    type Error = ConstructionError;

    fn try_from(node: Node) -> Result<Self, Self::Error> {
        Self::from_node(node)
    }
}

impl Kind {
    /// Zero-argument factory for this kind, if it has one in `S`'s domain.
    pub fn factory<S: Scalar>(self) -> Option<Function<S>> {
        match self {
            Kind::Identity => Some(Function::identity()),
            _ => self
                .as_elementary()
                .and_then(|function| Function::elementary(function).ok()),
        }
    }
}

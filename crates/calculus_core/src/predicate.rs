//! Pointwise comparisons between functions and their boolean combinations.

use crate::algebra::IntoOperand;
use crate::autodiff::{forward, Dual};
use crate::error::EvaluationError;
use crate::function::{default_variable, Function, RealFunction};
use crate::node::Node;
use crate::render::render;
use crate::traits::Scalar;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

/// Two sides closer than this compare equal.
pub const EQ_TOL: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Close,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Relation {
    fn symbol(self) -> &'static str {
        match self {
            Relation::Close => "=",
            Relation::Less => "<",
            Relation::LessEqual => "\\leq",
            Relation::Greater => ">",
            Relation::GreaterEqual => "\\geq",
        }
    }
}

#[derive(Debug)]
enum Clause {
    Compare(Relation, Arc<Node>, Arc<Node>),
    Not(Arc<Clause>),
    And(Arc<Clause>, Arc<Clause>),
    Or(Arc<Clause>, Arc<Clause>),
}

#[derive(Debug)]
pub struct Predicate<S: Scalar> {
    clause: Arc<Clause>,
    _scalar: PhantomData<S>,
}

impl<S: Scalar> Clone for Predicate<S> {
    fn clone(&self) -> Self {
        Self::wrap(Arc::clone(&self.clause))
    }
}

impl<S: Scalar> Predicate<S> {
    fn wrap(clause: Arc<Clause>) -> Self {
        Self {
            clause,
            _scalar: PhantomData,
        }
    }

    fn compare<R: IntoOperand<S>>(relation: Relation, lhs: &Function<S>, rhs: R) -> Self {
        Self::wrap(Arc::new(Clause::Compare(
            relation,
            Arc::clone(lhs.root()),
            rhs.into_operand(),
        )))
    }

    /// |f(z) - g(z)| < `EQ_TOL`.
    pub fn close<R: IntoOperand<S>>(lhs: &Function<S>, rhs: R) -> Self {
        Self::compare(Relation::Close, lhs, rhs)
    }

    /// Whether the predicate holds at `z`. Both sides of a comparison are
    /// evaluated; `&` and `|` stop at the first decisive operand.
    pub fn holds(&self, z: S) -> Result<bool, EvaluationError> {
        holds(&self.clause, z)
    }

    pub fn render(&self) -> String {
        render_clause(&self.clause, default_variable(S::DOMAIN))
    }
}

impl Predicate<f64> {
    pub fn less<R: IntoOperand<f64>>(lhs: &RealFunction, rhs: R) -> Self {
        Self::compare(Relation::Less, lhs, rhs)
    }

    pub fn less_equal<R: IntoOperand<f64>>(lhs: &RealFunction, rhs: R) -> Self {
        Self::compare(Relation::LessEqual, lhs, rhs)
    }

    pub fn greater<R: IntoOperand<f64>>(lhs: &RealFunction, rhs: R) -> Self {
        Self::compare(Relation::Greater, lhs, rhs)
    }

    pub fn greater_equal<R: IntoOperand<f64>>(lhs: &RealFunction, rhs: R) -> Self {
        Self::compare(Relation::GreaterEqual, lhs, rhs)
    }
}

impl<S: Scalar> Function<S> {
    pub fn close_to<R: IntoOperand<S>>(&self, rhs: R) -> Predicate<S> {
        Predicate::close(self, rhs)
    }
}

impl RealFunction {
    pub fn less_than<R: IntoOperand<f64>>(&self, rhs: R) -> Predicate<f64> {
        Predicate::less(self, rhs)
    }

    pub fn at_most<R: IntoOperand<f64>>(&self, rhs: R) -> Predicate<f64> {
        Predicate::less_equal(self, rhs)
    }

    pub fn greater_than<R: IntoOperand<f64>>(&self, rhs: R) -> Predicate<f64> {
        Predicate::greater(self, rhs)
    }

    pub fn at_least<R: IntoOperand<f64>>(&self, rhs: R) -> Predicate<f64> {
        Predicate::greater_equal(self, rhs)
    }
}

fn value_at<S: Scalar>(node: &Node, z: S) -> Result<S, EvaluationError> {
    forward(node, Dual::variable(z)).map(|d| d.val)
}

fn holds<S: Scalar>(clause: &Clause, z: S) -> Result<bool, EvaluationError> {
    match clause {
        Clause::Compare(relation, lhs, rhs) => {
            let l = value_at(lhs, z)?;
            let r = value_at(rhs, z)?;
            Ok(match relation {
                Relation::Close => (l - r).magnitude() < EQ_TOL,
                // Ordering clauses are only built over the reals.
                Relation::Less => l.to_complex().re < r.to_complex().re,
                Relation::LessEqual => l.to_complex().re <= r.to_complex().re,
                Relation::Greater => l.to_complex().re > r.to_complex().re,
                Relation::GreaterEqual => l.to_complex().re >= r.to_complex().re,
            })
        }
        Clause::Not(inner) => holds(inner, z).map(|b| !b),
        Clause::And(a, b) => Ok(holds(a, z)? && holds(b, z)?),
        Clause::Or(a, b) => Ok(holds(a, z)? || holds(b, z)?),
    }
}

fn render_clause(clause: &Clause, variable: &str) -> String {
    match clause {
        Clause::Compare(relation, lhs, rhs) => format!(
            "{} {} {}",
            render(lhs, variable),
            relation.symbol(),
            render(rhs, variable)
        ),
        Clause::Not(inner) => format!("\\neg\\left({}\\right)", render_clause(inner, variable)),
        Clause::And(a, b) => format!(
            "\\left({}\\right)\\wedge\\left({}\\right)",
            render_clause(a, variable),
            render_clause(b, variable)
        ),
        Clause::Or(a, b) => format!(
            "\\left({}\\right)\\vee\\left({}\\right)",
            render_clause(a, variable),
            render_clause(b, variable)
        ),
    }
}

impl<S: Scalar> fmt::Display for Predicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<S: Scalar> Not for Predicate<S> {
    type Output = Predicate<S>;
    fn not(self) -> Predicate<S> {
        Predicate::wrap(Arc::new(Clause::Not(self.clause)))
    }
}

impl<S: Scalar> Not for &Predicate<S> {
    type Output = Predicate<S>;
    fn not(self) -> Predicate<S> {
        !self.clone()
    }
}

macro_rules! predicate_connective {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl<S: Scalar> $trait for Predicate<S> {
            type Output = Predicate<S>;
            fn $method(self, rhs: Predicate<S>) -> Predicate<S> {
                Predicate::wrap(Arc::new(Clause::$variant(self.clause, rhs.clause)))
            }
        }

        impl<S: Scalar> $trait<&Predicate<S>> for &Predicate<S> {
            type Output = Predicate<S>;
            fn $method(self, rhs: &Predicate<S>) -> Predicate<S> {
                Predicate::wrap(Arc::new(Clause::$variant(
                    Arc::clone(&self.clause),
                    Arc::clone(&rhs.clause),
                )))
            }
        }
    };
}

predicate_connective!(BitAnd, bitand, And);
predicate_connective!(BitOr, bitor, Or);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ComplexFunction;
    use crate::node::Kind;
    use num_complex::Complex64;

    #[test]
    fn closeness_uses_the_equality_tolerance() {
        let z = ComplexFunction::identity();
        let p = z.close_to(Complex64::new(1.0, 1.0));
        assert!(p.holds(Complex64::new(1.0, 1.0 + 5e-7)).unwrap());
        assert!(!p.holds(Complex64::new(1.0, 1.0 + 5e-6)).unwrap());

        let pythagoras =
            (ComplexFunction::sin().pow(2.0) + ComplexFunction::cos().pow(2.0)).close_to(1.0);
        assert!(pythagoras.holds(Complex64::new(0.4, -1.2)).unwrap());
    }

    #[test]
    fn real_orderings() {
        let x = RealFunction::identity();
        assert!(x.less_than(1.0).holds(0.5).unwrap());
        assert!(!x.less_than(1.0).holds(1.0).unwrap());
        assert!(x.at_most(1.0).holds(1.0).unwrap());
        assert!(x.greater_than(&RealFunction::sin()).holds(0.5).unwrap());
        assert!(x.at_least(0.0).holds(0.0).unwrap());
        assert!(Predicate::greater(&RealFunction::exp(), 0.0).holds(-30.0).unwrap());
    }

    #[test]
    fn connectives_combine_truth_values() {
        let x = RealFunction::identity();
        let inside = x.greater_than(-1.0) & x.less_than(1.0);
        let outside = !&inside;
        let either = &inside | &x.close_to(5.0);
        for (point, expected) in [(-2.0, false), (0.0, true), (0.99, true), (5.0, false)] {
            assert_eq!(inside.holds(point).unwrap(), expected);
            assert_eq!(outside.holds(point).unwrap(), !expected);
        }
        assert!(either.holds(5.0).unwrap());
        assert!(!either.holds(3.0).unwrap());
    }

    #[test]
    fn evaluation_failures_propagate() {
        let p = RealFunction::identity().reciprocal().less_than(1.0);
        let err = p.holds(0.0).expect_err("division by zero should surface");
        assert_eq!(err.kind(), Kind::Div);

        // The right operand of `|` is not evaluated once the left one holds.
        let guarded = RealFunction::identity().less_than(1.0) | p;
        assert!(guarded.holds(0.0).unwrap());
    }

    #[test]
    fn renders_with_logical_connectives() {
        let x = RealFunction::identity();
        assert_eq!(x.less_than(1.0).render(), "x < 1");
        assert_eq!(x.at_most(&RealFunction::cos()).render(), "x \\leq \\cos(x)");
        let both = x.greater_than(0.0) & !x.close_to(2.0);
        assert_eq!(
            both.render(),
            "\\left(x > 0\\right)\\wedge\\left(\\neg\\left(x = 2\\right)\\right)"
        );
        let either =
            ComplexFunction::exp().close_to(1.0) | ComplexFunction::identity().close_to(0.0);
        assert_eq!(either.to_string(), "\\left(e^{z} = 1\\right)\\vee\\left(z = 0\\right)");
    }
}

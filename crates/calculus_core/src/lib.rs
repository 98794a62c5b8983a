//! The `calculus_core` crate builds real and complex functions as immutable
//! expression trees and evaluates, differentiates, renders and integrates them.
//!
//! Key components:
//! - **Nodes**: the closed `Kind` taxonomy and the `Node` tree, tagged with a `Domain`.
//! - **Autodiff**: dual numbers and the forward pass that yields value and derivative together.
//! - **Functions & Algebra**: `Function<S>` handles, operator overloads and composition.
//! - **Contours**: parametrized curves with an integration interval.
//! - **Solvers**: adaptive Gauss–Kronrod quadrature behind `integrate`.
//! - **Render**: LaTeX output for functions, contours and predicates.
pub mod algebra;
pub mod autodiff;
pub mod contour;
pub mod error;
pub mod function;
pub mod integrate;
pub mod node;
pub mod predicate;
pub mod render;
pub mod singletons;
pub mod solvers;
pub mod traits;

pub use algebra::compose;
pub use function::{derivative, evaluate};
pub use integrate::{integrate, integrate_real, integrate_real_with, integrate_with};

pub mod prelude {
    pub use crate::algebra::{compose, Compose, IntoOperand};
    pub use crate::contour::{Contour, ContourOperand};
    pub use crate::error::{ConstructionError, EvaluationError};
    pub use crate::function::{derivative, evaluate, ComplexFunction, Function, RealFunction};
    pub use crate::integrate::{
        integrate, integrate_real, integrate_real_with, integrate_with, Integral,
        IntegrationDiagnostic, DEFAULT_TOLERANCE,
    };
    pub use crate::node::{Domain, Elementary, Kind, Node};
    pub use crate::predicate::Predicate;
    pub use crate::singletons;
    pub use crate::solvers::IntegrationSettings;
    pub use num_complex::Complex64;
}

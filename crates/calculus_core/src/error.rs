//! Error types for tree construction and point evaluation.
//!
//! Construction errors are precondition violations and are never recovered
//! internally. Evaluation errors belong to a single evaluation point: the
//! same expression may evaluate fine elsewhere.

use crate::node::{Domain, Kind};
use num_complex::Complex64;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("{kind:?} is not defined on the {domain:?} domain")]
    DomainMismatch { kind: Kind, domain: Domain },
    #[error("children of {kind:?} mix the {left:?} and {right:?} domains")]
    MixedDomains {
        kind: Kind,
        left: Domain,
        right: Domain,
    },
    #[error("{kind:?} expects {expected}, got {got}")]
    InvalidArity {
        kind: Kind,
        expected: &'static str,
        got: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum EvaluationError {
    #[error("division by zero in {kind:?} at argument {at}")]
    DivisionByZero { kind: Kind, at: Complex64 },
    #[error("{kind:?} is singular at argument {at}")]
    Singularity { kind: Kind, at: Complex64 },
    #[error("{kind:?} overflowed at argument {at}")]
    Overflow { kind: Kind, at: Complex64 },
}

impl EvaluationError {
    /// The node kind at which evaluation failed.
    pub fn kind(&self) -> Kind {
        match self {
            EvaluationError::DivisionByZero { kind, .. }
            | EvaluationError::Singularity { kind, .. }
            | EvaluationError::Overflow { kind, .. } => *kind,
        }
    }
}

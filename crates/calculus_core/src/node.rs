//! Node taxonomy for expression trees.
//!
//! A tree is built bottom-up from immutable nodes. Children are held in
//! `Arc`s, so a finished subtree can be adopted by any number of parents
//! without copying and without any way to mutate it afterwards.

use crate::error::ConstructionError;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether a node's variable and values are real or complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Complex,
    Real,
}

/// Flat tag naming every node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Constant,
    Identity,
    Exp,
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Sinh,
    Cosh,
    Tanh,
    Sech,
    Csch,
    Coth,
    Re,
    Im,
    Conj,
    Abs,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    Compose,
}

/// Elementary single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Elementary {
    Exp,
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Sinh,
    Cosh,
    Tanh,
    Sech,
    Csch,
    Coth,
    Re,
    Im,
    Conj,
    Abs,
}

impl Elementary {
    pub const ALL: [Elementary; 17] = [
        Elementary::Exp,
        Elementary::Sin,
        Elementary::Cos,
        Elementary::Tan,
        Elementary::Sec,
        Elementary::Csc,
        Elementary::Cot,
        Elementary::Sinh,
        Elementary::Cosh,
        Elementary::Tanh,
        Elementary::Sech,
        Elementary::Csch,
        Elementary::Coth,
        Elementary::Re,
        Elementary::Im,
        Elementary::Conj,
        Elementary::Abs,
    ];

    pub fn kind(self) -> Kind {
        match self {
            Elementary::Exp => Kind::Exp,
            Elementary::Sin => Kind::Sin,
            Elementary::Cos => Kind::Cos,
            Elementary::Tan => Kind::Tan,
            Elementary::Sec => Kind::Sec,
            Elementary::Csc => Kind::Csc,
            Elementary::Cot => Kind::Cot,
            Elementary::Sinh => Kind::Sinh,
            Elementary::Cosh => Kind::Cosh,
            Elementary::Tanh => Kind::Tanh,
            Elementary::Sech => Kind::Sech,
            Elementary::Csch => Kind::Csch,
            Elementary::Coth => Kind::Coth,
            Elementary::Re => Kind::Re,
            Elementary::Im => Kind::Im,
            Elementary::Conj => Kind::Conj,
            Elementary::Abs => Kind::Abs,
        }
    }

    /// Re, Im and Conj are trivial on the reals and excluded from that domain.
    pub fn allowed_in(self, domain: Domain) -> bool {
        match domain {
            Domain::Complex => true,
            Domain::Real => !matches!(self, Elementary::Re | Elementary::Im | Elementary::Conj),
        }
    }
}

/// Two-argument operations. Operand order is significant for all but
/// `Add` and `Mul`; for `Compose` the left operand is the outer function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Compose,
}

impl BinaryOp {
    pub fn kind(self) -> Kind {
        match self {
            BinaryOp::Add => Kind::Add,
            BinaryOp::Sub => Kind::Sub,
            BinaryOp::Mul => Kind::Mul,
            BinaryOp::Div => Kind::Div,
            BinaryOp::Pow => Kind::Pow,
            BinaryOp::Compose => Kind::Compose,
        }
    }
}

impl Kind {
    pub fn as_elementary(self) -> Option<Elementary> {
        Elementary::ALL.into_iter().find(|e| e.kind() == self)
    }

    pub fn as_binary(self) -> Option<BinaryOp> {
        match self {
            Kind::Add => Some(BinaryOp::Add),
            Kind::Sub => Some(BinaryOp::Sub),
            Kind::Mul => Some(BinaryOp::Mul),
            Kind::Div => Some(BinaryOp::Div),
            Kind::Pow => Some(BinaryOp::Pow),
            Kind::Compose => Some(BinaryOp::Compose),
            _ => None,
        }
    }

    fn arity_name(self) -> &'static str {
        match self {
            Kind::Constant => "a payload",
            Kind::Identity => "no payload",
            Kind::Neg => "one child",
            _ if self.as_elementary().is_some() => "one child",
            _ => "two children",
        }
    }
}

/// The structural part of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Constant(Complex64),
    Identity,
    Unary(Elementary, Arc<Node>),
    Neg(Arc<Node>),
    Binary(BinaryOp, Arc<Node>, Arc<Node>),
}

/// One vertex of an expression tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    domain: Domain,
    op: Op,
}

impl Node {
    /// Builds a leaf. Constants require a payload, Identity must not get one.
    pub fn leaf(
        kind: Kind,
        domain: Domain,
        payload: Option<Complex64>,
    ) -> Result<Node, ConstructionError> {
        let op = match (kind, payload) {
            (Kind::Constant, Some(value)) => {
                if domain == Domain::Real && value.im != 0.0 {
                    return Err(ConstructionError::DomainMismatch { kind, domain });
                }
                Op::Constant(value)
            }
            (Kind::Identity, None) => Op::Identity,
            (Kind::Constant, None) => {
                return Err(ConstructionError::InvalidArity {
                    kind,
                    expected: "a payload",
                    got: "no payload",
                })
            }
            (_, payload) => {
                return Err(ConstructionError::InvalidArity {
                    kind,
                    expected: kind.arity_name(),
                    got: if payload.is_some() {
                        "a payload"
                    } else {
                        "no payload"
                    },
                })
            }
        };
        Ok(Node { domain, op })
    }

    /// Builds an elementary function or negation node over `child`.
    /// The node inherits the child's domain.
    pub fn unary(kind: Kind, child: impl Into<Arc<Node>>) -> Result<Node, ConstructionError> {
        let child = child.into();
        let domain = child.domain;
        let op = if kind == Kind::Neg {
            Op::Neg(child)
        } else if let Some(function) = kind.as_elementary() {
            if !function.allowed_in(domain) {
                return Err(ConstructionError::DomainMismatch { kind, domain });
            }
            Op::Unary(function, child)
        } else {
            return Err(ConstructionError::InvalidArity {
                kind,
                expected: kind.arity_name(),
                got: "one child",
            });
        };
        Ok(Node { domain, op })
    }

    /// Builds a binary node. Both children must share a domain.
    pub fn binary(
        kind: Kind,
        left: impl Into<Arc<Node>>,
        right: impl Into<Arc<Node>>,
    ) -> Result<Node, ConstructionError> {
        let Some(op) = kind.as_binary() else {
            return Err(ConstructionError::InvalidArity {
                kind,
                expected: kind.arity_name(),
                got: "two children",
            });
        };
        let (left, right) = (left.into(), right.into());
        if left.domain != right.domain {
            return Err(ConstructionError::MixedDomains {
                kind,
                left: left.domain,
                right: right.domain,
            });
        }
        Ok(Node {
            domain: left.domain,
            op: Op::Binary(op, left, right),
        })
    }

    pub fn constant(domain: Domain, value: Complex64) -> Result<Node, ConstructionError> {
        Node::leaf(Kind::Constant, domain, Some(value))
    }

    pub fn identity(domain: Domain) -> Node {
        Node {
            domain,
            op: Op::Identity,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn kind(&self) -> Kind {
        match &self.op {
            Op::Constant(_) => Kind::Constant,
            Op::Identity => Kind::Identity,
            Op::Unary(function, _) => function.kind(),
            Op::Neg(_) => Kind::Neg,
            Op::Binary(op, _, _) => op.kind(),
        }
    }

    /// Returns the constant payload for Constant nodes.
    pub fn payload(&self) -> Option<Complex64> {
        match self.op {
            Op::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Children in operand order.
    pub fn children(&self) -> Vec<&Arc<Node>> {
        match &self.op {
            Op::Constant(_) | Op::Identity => Vec::new(),
            Op::Unary(_, child) | Op::Neg(child) => vec![child],
            Op::Binary(_, left, right) => vec![left, right],
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|c| c.size()).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|c| c.depth())
            .max()
            .unwrap_or(0)
    }

    /// Rebuilds the whole tree with fresh allocations, sharing nothing with
    /// `self`.
    pub fn deep_clone(&self) -> Node {
        let op = match &self.op {
            Op::Constant(value) => Op::Constant(*value),
            Op::Identity => Op::Identity,
            Op::Unary(function, child) => Op::Unary(*function, Arc::new(child.deep_clone())),
            Op::Neg(child) => Op::Neg(Arc::new(child.deep_clone())),
            Op::Binary(op, left, right) => Op::Binary(
                *op,
                Arc::new(left.deep_clone()),
                Arc::new(right.deep_clone()),
            ),
        };
        Node {
            domain: self.domain,
            op,
        }
    }

    /// Returns true when no node of the tree shares an allocation with
    /// `other`'s tree.
    pub fn shares_nothing_with(&self, other: &Node) -> bool {
        let mut mine = Vec::new();
        self.collect_children(&mut mine);
        let mut theirs = Vec::new();
        other.collect_children(&mut theirs);
        !mine
            .iter()
            .any(|a| theirs.iter().any(|b| std::ptr::eq(*a, *b)))
    }

    fn collect_children(&self, out: &mut Vec<*const Node>) {
        for child in self.children() {
            out.push(Arc::as_ptr(child));
            child.collect_children(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z() -> Arc<Node> {
        Arc::new(Node::identity(Domain::Complex))
    }

    #[test]
    fn leaf_validates_payload() {
        let c = Node::leaf(Kind::Constant, Domain::Complex, Some(Complex64::new(1.0, 2.0)))
            .expect("complex constant should build");
        assert_eq!(c.kind(), Kind::Constant);
        assert_eq!(c.payload(), Some(Complex64::new(1.0, 2.0)));

        assert!(matches!(
            Node::leaf(Kind::Constant, Domain::Complex, None),
            Err(ConstructionError::InvalidArity { .. })
        ));
        assert!(matches!(
            Node::leaf(Kind::Identity, Domain::Real, Some(Complex64::new(1.0, 0.0))),
            Err(ConstructionError::InvalidArity { .. })
        ));
        assert!(matches!(
            Node::leaf(Kind::Sin, Domain::Real, None),
            Err(ConstructionError::InvalidArity { .. })
        ));
    }

    #[test]
    fn real_constants_must_be_real() {
        let err = Node::constant(Domain::Real, Complex64::new(1.0, 1.0))
            .expect_err("imaginary payload should be rejected");
        assert_eq!(
            err,
            ConstructionError::DomainMismatch {
                kind: Kind::Constant,
                domain: Domain::Real
            }
        );
    }

    #[test]
    fn real_domain_excludes_re_im_conj() {
        let x = Arc::new(Node::identity(Domain::Real));
        for kind in [Kind::Re, Kind::Im, Kind::Conj] {
            assert!(matches!(
                Node::unary(kind, x.clone()),
                Err(ConstructionError::DomainMismatch { .. })
            ));
            assert!(Node::unary(kind, z()).is_ok());
        }
        assert!(Node::unary(Kind::Abs, x).is_ok());
    }

    #[test]
    fn unary_and_binary_check_arity() {
        assert!(matches!(
            Node::unary(Kind::Add, z()),
            Err(ConstructionError::InvalidArity { .. })
        ));
        assert!(matches!(
            Node::binary(Kind::Sin, z(), z()),
            Err(ConstructionError::InvalidArity { .. })
        ));
        assert!(matches!(
            Node::unary(Kind::Identity, z()),
            Err(ConstructionError::InvalidArity { .. })
        ));
    }

    #[test]
    fn binary_rejects_mixed_domains() {
        let x = Node::identity(Domain::Real);
        let err = Node::binary(Kind::Add, z(), x).expect_err("mixed domains should fail");
        assert!(format!("{err}").contains("mix"));
    }

    #[test]
    fn binary_preserves_operand_order() {
        let c = Arc::new(Node::constant(Domain::Complex, Complex64::new(2.0, 0.0)).unwrap());
        let node = Node::binary(Kind::Compose, c.clone(), z()).expect("compose should build");
        let children = node.children();
        assert_eq!(children[0].kind(), Kind::Constant);
        assert_eq!(children[1].kind(), Kind::Identity);
        assert_eq!(node.size(), 3);
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn deep_clone_shares_no_allocation() {
        let sin = Arc::new(Node::unary(Kind::Sin, z()).unwrap());
        let sum = Node::binary(Kind::Add, sin.clone(), sin).unwrap();
        let copy = sum.deep_clone();
        assert_eq!(copy, sum);
        assert!(copy.shares_nothing_with(&sum));
        assert!(!sum.shares_nothing_with(&sum));
    }
}

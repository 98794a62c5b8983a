//! LaTeX rendering of expression trees.
//!
//! Rendering is a pure recursive traversal. Every node reports the
//! precedence of its outermost operator so parents can decide whether a
//! child needs `\left(…\right)`.

use crate::node::{BinaryOp, Elementary, Node, Op};
use num_complex::Complex64;

/// Binding strength of a rendered fragment, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Sum,
    Product,
    Negation,
    Power,
    Atom,
}

#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    precedence: Precedence,
}

impl Fragment {
    fn new(text: String, precedence: Precedence) -> Self {
        Self { text, precedence }
    }

    fn atom(text: String) -> Self {
        Self::new(text, Precedence::Atom)
    }

    /// Wraps in parentheses when weaker than `required`.
    fn at_least(self, required: Precedence) -> String {
        if self.precedence < required {
            parenthesize(&self.text)
        } else {
            self.text
        }
    }

    /// Operands after the first never start with a bare minus sign.
    fn trailing(self, required: Precedence) -> String {
        if self.precedence == Precedence::Negation {
            parenthesize(&self.text)
        } else {
            self.at_least(required)
        }
    }
}

fn parenthesize(text: &str) -> String {
    format!("\\left({text}\\right)")
}

/// Renders `node` with Identity printed as `variable`.
pub fn render(node: &Node, variable: &str) -> String {
    render_fragment(node, &Fragment::atom(variable.to_string())).text
}

fn render_fragment(node: &Node, variable: &Fragment) -> Fragment {
    match node.op() {
        Op::Constant(value) => format_constant(*value),
        Op::Identity => variable.clone(),
        Op::Unary(function, child) => {
            let arg = render_fragment(child, variable).text;
            render_elementary(*function, &arg)
        }
        Op::Neg(child) => {
            let inner = render_fragment(child, variable);
            let text = if inner.precedence <= Precedence::Negation {
                parenthesize(&inner.text)
            } else {
                inner.text
            };
            Fragment::new(format!("-{text}"), Precedence::Negation)
        }
        Op::Binary(BinaryOp::Compose, outer, inner) => {
            let substituted = render_fragment(inner, variable);
            render_fragment(outer, &substituted)
        }
        Op::Binary(op, left, right) => {
            let lhs = render_fragment(left, variable);
            let rhs = render_fragment(right, variable);
            match op {
                BinaryOp::Add => Fragment::new(
                    format!("{} + {}", lhs.text, rhs.trailing(Precedence::Sum)),
                    Precedence::Sum,
                ),
                BinaryOp::Sub => Fragment::new(
                    format!("{} - {}", lhs.text, rhs.trailing(Precedence::Product)),
                    Precedence::Sum,
                ),
                BinaryOp::Mul => Fragment::new(
                    format!(
                        "{} \\cdot {}",
                        lhs.at_least(Precedence::Product),
                        rhs.trailing(Precedence::Product)
                    ),
                    Precedence::Product,
                ),
                BinaryOp::Div => Fragment::new(
                    format!("\\frac{{{}}}{{{}}}", lhs.text, rhs.text),
                    Precedence::Product,
                ),
                BinaryOp::Pow => Fragment::new(
                    format!("{{{}}}^{{{}}}", lhs.at_least(Precedence::Atom), rhs.text),
                    Precedence::Power,
                ),
                BinaryOp::Compose => unreachable!("composition is rendered by substitution"),
            }
        }
    }
}

fn render_elementary(function: Elementary, arg: &str) -> Fragment {
    let named = |name: &str| Fragment::atom(format!("{name}({arg})"));
    match function {
        Elementary::Exp => Fragment::new(format!("e^{{{arg}}}"), Precedence::Power),
        Elementary::Sin => named("\\sin"),
        Elementary::Cos => named("\\cos"),
        Elementary::Tan => named("\\tan"),
        Elementary::Sec => named("\\sec"),
        Elementary::Csc => named("\\csc"),
        Elementary::Cot => named("\\cot"),
        Elementary::Sinh => named("\\sinh"),
        Elementary::Cosh => named("\\cosh"),
        Elementary::Tanh => named("\\tanh"),
        Elementary::Sech => named("\\operatorname{sech}"),
        Elementary::Csch => named("\\operatorname{csch}"),
        Elementary::Coth => named("\\coth"),
        Elementary::Re => named("\\Re"),
        Elementary::Im => named("\\Im"),
        Elementary::Conj => Fragment::atom(format!("\\overline{{{arg}}}")),
        Elementary::Abs => Fragment::atom(format!("\\left|{arg}\\right|")),
    }
}

fn imaginary_part(im: f64) -> String {
    if im == 1.0 {
        "i".to_string()
    } else if im == -1.0 {
        "-i".to_string()
    } else {
        format!("{im}i")
    }
}

/// Formats a constant, omitting zero components.
fn format_constant(value: Complex64) -> Fragment {
    let (re, im) = (value.re, value.im);
    if im == 0.0 {
        let precedence = if re < 0.0 {
            Precedence::Negation
        } else {
            Precedence::Atom
        };
        // Normalize -0 so it prints as 0.
        return Fragment::new(format!("{}", re + 0.0), precedence);
    }
    if re == 0.0 {
        let precedence = if im < 0.0 {
            Precedence::Negation
        } else if im == 1.0 {
            Precedence::Atom
        } else {
            Precedence::Product
        };
        return Fragment::new(imaginary_part(im), precedence);
    }
    let sign = if im < 0.0 { '-' } else { '+' };
    Fragment::new(
        format!("{re} {sign} {}", imaginary_part(im.abs())),
        Precedence::Sum,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Domain, Kind};
    use std::sync::Arc;

    fn z() -> Arc<Node> {
        Arc::new(Node::identity(Domain::Complex))
    }

    fn c(re: f64, im: f64) -> Arc<Node> {
        Arc::new(Node::constant(Domain::Complex, Complex64::new(re, im)).unwrap())
    }

    fn unary(kind: Kind, child: Arc<Node>) -> Arc<Node> {
        Arc::new(Node::unary(kind, child).unwrap())
    }

    fn binary(kind: Kind, left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
        Arc::new(Node::binary(kind, left, right).unwrap())
    }

    #[test]
    fn constants_omit_zero_components() {
        assert_eq!(render(&c(5.0, 0.0), "z"), "5");
        assert_eq!(render(&c(0.0, 3.0), "z"), "3i");
        assert_eq!(render(&c(5.0, 3.0), "z"), "5 + 3i");
        assert_eq!(render(&c(2.0, -1.5), "z"), "2 - 1.5i");
        assert_eq!(render(&c(0.0, 0.0), "z"), "0");
        assert_eq!(render(&c(-0.0, 0.0), "z"), "0");
        assert_eq!(render(&c(0.0, -1.0), "z"), "-i");
        assert_eq!(render(&c(-2.5, 0.0), "z"), "-2.5");
    }

    #[test]
    fn elementary_templates() {
        assert_eq!(render(&unary(Kind::Sin, z()), "z"), "\\sin(z)");
        assert_eq!(render(&unary(Kind::Exp, z()), "z"), "e^{z}");
        assert_eq!(render(&unary(Kind::Sech, z()), "z"), "\\operatorname{sech}(z)");
        assert_eq!(render(&unary(Kind::Conj, z()), "z"), "\\overline{z}");
        assert_eq!(render(&unary(Kind::Abs, z()), "z"), "\\left|z\\right|");
    }

    #[test]
    fn binary_templates() {
        assert_eq!(render(&binary(Kind::Div, c(1.0, 0.0), z()), "z"), "\\frac{1}{z}");
        assert_eq!(render(&binary(Kind::Pow, z(), c(2.0, 0.0)), "z"), "{z}^{2}");
        assert_eq!(render(&binary(Kind::Mul, c(2.0, 0.0), z()), "z"), "2 \\cdot z");
    }

    #[test]
    fn lower_precedence_children_are_parenthesized() {
        let sum = binary(Kind::Add, z(), c(1.0, 0.0));
        let product = binary(Kind::Mul, sum.clone(), z());
        assert_eq!(render(&product, "z"), "\\left(z + 1\\right) \\cdot z");

        let power = binary(Kind::Pow, sum.clone(), c(2.0, 0.0));
        assert_eq!(render(&power, "z"), "{\\left(z + 1\\right)}^{2}");

        let negated = unary(Kind::Neg, sum.clone());
        assert_eq!(render(&negated, "z"), "-\\left(z + 1\\right)");

        let difference = binary(Kind::Sub, z(), sum);
        assert_eq!(render(&difference, "z"), "z - \\left(z + 1\\right)");

        let sum_of_negation = binary(Kind::Add, z(), unary(Kind::Neg, z()));
        assert_eq!(render(&sum_of_negation, "z"), "z + \\left(-z\\right)");
    }

    #[test]
    fn higher_precedence_children_stay_bare() {
        let product = binary(Kind::Mul, z(), z());
        let sum = binary(Kind::Add, product.clone(), product);
        assert_eq!(render(&sum, "z"), "z \\cdot z + z \\cdot z");
    }

    #[test]
    fn compose_substitutes_the_inner_rendering() {
        let f = binary(Kind::Compose, unary(Kind::Sin, z()), c(5.0, 3.0));
        assert_eq!(render(&f, "z"), "\\sin(5 + 3i)");

        let square = binary(Kind::Pow, z(), c(2.0, 0.0));
        let shifted = binary(Kind::Add, z(), c(1.0, 0.0));
        let g = binary(Kind::Compose, square, shifted);
        assert_eq!(render(&g, "z"), "{\\left(z + 1\\right)}^{2}");
    }

    #[test]
    fn variable_name_is_configurable() {
        assert_eq!(render(&unary(Kind::Cos, z()), "t"), "\\cos(t)");
    }
}

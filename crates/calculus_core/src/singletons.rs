//! Prebuilt instances of every zero-argument factory, built on first use.
//!
//! The instances are immutable and may be adopted directly into new trees.
//! Call `copy()` for a structurally independent tree.

use std::sync::LazyLock;

macro_rules! singletons {
    ($ty:ty => $($name:ident = $factory:ident),* $(,)?) => {
        $(
            pub static $name: LazyLock<$ty> = LazyLock::new(<$ty>::$factory);
        )*
    };
}

pub mod complex {
    use super::*;
    use crate::function::ComplexFunction;

    singletons!(ComplexFunction =>
        IDENTITY = identity,
        EXP = exp, SIN = sin, COS = cos, TAN = tan, SEC = sec, CSC = csc, COT = cot,
        SINH = sinh, COSH = cosh, TANH = tanh, SECH = sech, CSCH = csch, COTH = coth,
        RE = re, IM = im, CONJ = conj, ABS = abs,
    );
}

pub mod real {
    use super::*;
    use crate::function::RealFunction;

    singletons!(RealFunction =>
        IDENTITY = identity,
        EXP = exp, SIN = sin, COS = cos, TAN = tan, SEC = sec, CSC = csc, COT = cot,
        SINH = sinh, COSH = cosh, TANH = tanh, SECH = sech, CSCH = csch, COTH = coth,
        ABS = abs,
    );
}

pub mod contour {
    use super::*;
    use crate::contour::Contour;

    singletons!(Contour =>
        IDENTITY = identity,
        EXP = exp, SIN = sin, COS = cos, TAN = tan, SEC = sec, CSC = csc, COT = cot,
        SINH = sinh, COSH = cosh, TANH = tanh, SECH = sech, CSCH = csch, COTH = coth,
        RE = re, IM = im, CONJ = conj, ABS = abs,
        UNIT_CIRCLE = unit_circle,
    );
}

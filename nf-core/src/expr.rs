//! Symbolic expressions in the single complex variable `z`.
//!
//! This is the narrow interface the rest of the crate uses to get from user text to numbers:
//! [`parse`] text into an [`Expr`], [`Expr::derive`] it, [`Expr::compile`] it into an
//! [`Evaluator`], or view it as a [`Polynomial`] for root finding.

use std::fmt;

use num::complex::Complex64;
use num::Zero;

mod compile;
mod derive;
mod parse;
mod polynomial;

pub use compile::Evaluator;
pub use parse::{parse, ParseError, MAX_DEPTH};
pub use polynomial::Polynomial;

/// Largest integer exponent expanded when viewing an expression as a polynomial.
pub const MAX_POLYNOMIAL_POWER: u32 = 1024;

/// Largest degree of an expanded polynomial, numerator or denominator.
pub const MAX_POLYNOMIAL_DEGREE: usize = 1024;

/// Named functions that may be applied to a sub-expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Sqrt,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Func> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "exp" => Func::Exp,
            "log" | "ln" => Func::Log,
            "sqrt" => Func::Sqrt,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sqrt => "sqrt",
        }
    }

    /// Principal-branch value of the function.
    pub fn apply(self, z: Complex64) -> Complex64 {
        match self {
            Func::Sin => z.sin(),
            Func::Cos => z.cos(),
            Func::Tan => z.tan(),
            Func::Sinh => z.sinh(),
            Func::Cosh => z.cosh(),
            Func::Tanh => z.tanh(),
            Func::Exp => z.exp(),
            Func::Log => z.ln(),
            Func::Sqrt => z.sqrt(),
        }
    }
}

/// A parsed expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Complex64),
    /// The variable `z`.
    Var,
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    pub fn real(v: f64) -> Expr {
        Expr::Const(Complex64::new(v, 0.0))
    }

    /// True if `z` appears anywhere in the tree.
    pub fn contains_var(&self) -> bool {
        match self {
            Expr::Const(_) => false,
            Expr::Var => true,
            Expr::Neg(a) | Expr::Call(_, a) => a.contains_var(),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => a.contains_var() || b.contains_var(),
        }
    }

    /// Evaluates the tree directly at `z`.
    ///
    /// Used for constant folding; hot loops should [`compile`](Expr::compile) instead.
    pub fn eval(&self, z: Complex64) -> Complex64 {
        match self {
            Expr::Const(c) => *c,
            Expr::Var => z,
            Expr::Neg(a) => -a.eval(z),
            Expr::Add(a, b) => a.eval(z) + b.eval(z),
            Expr::Sub(a, b) => a.eval(z) - b.eval(z),
            Expr::Mul(a, b) => a.eval(z) * b.eval(z),
            Expr::Div(a, b) => a.eval(z) / b.eval(z),
            Expr::Pow(a, b) => power(a.eval(z), b.eval(z)),
            Expr::Call(f, a) => f.apply(a.eval(z)),
        }
    }

    /// The value of an expression without `z`, or None if it depends on `z`.
    pub fn constant_value(&self) -> Option<Complex64> {
        if self.contains_var() {
            None
        } else {
            Some(self.eval(Complex64::zero()))
        }
    }

    /// Binding strength, used to decide where `Display` needs parentheses.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(..) => 3,
            Expr::Const(c) if c.im == 0.0 && c.re.is_sign_negative() => 3,
            Expr::Pow(..) => 4,
            _ => 5,
        }
    }
}

/// `base ** exponent`, exact for integer exponents.
pub(crate) fn power(base: Complex64, exponent: Complex64) -> Complex64 {
    match integer_exponent(exponent) {
        Some(n) => base.powi(n),
        None => base.powc(exponent),
    }
}

/// The exponent as an `i32`, if it is a real integer in range.
pub(crate) fn integer_exponent(exponent: Complex64) -> Option<i32> {
    let re = exponent.re;
    if exponent.im == 0.0 && re.fract() == 0.0 && re.abs() <= i32::MAX as f64 {
        Some(re as i32)
    } else {
        None
    }
}

struct Child<'a>(&'a Expr, u8);

impl fmt::Display for Child<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.precedence() < self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Writes the expression in the same syntax [`parse`] accepts.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) if c.im == 0.0 => write!(f, "{}", c.re),
            Expr::Const(c) if c.re == 0.0 && c.im == 1.0 => write!(f, "i"),
            Expr::Const(c) if c.re == 0.0 => write!(f, "({}*i)", c.im),
            Expr::Const(c) => write!(f, "({} + {}*i)", c.re, c.im),
            Expr::Var => write!(f, "z"),
            Expr::Neg(a) => write!(f, "-{}", Child(a, 3)),
            Expr::Add(a, b) => write!(f, "{} + {}", Child(a, 1), Child(b, 2)),
            Expr::Sub(a, b) => write!(f, "{} - {}", Child(a, 1), Child(b, 2)),
            Expr::Mul(a, b) => write!(f, "{}*{}", Child(a, 2), Child(b, 3)),
            Expr::Div(a, b) => write!(f, "{}/{}", Child(a, 2), Child(b, 3)),
            Expr::Pow(a, b) => write!(f, "{}**{}", Child(a, 5), Child(b, 3)),
            Expr::Call(func, a) => write!(f, "{}({})", func.name(), a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn eval_cubic() {
        let e = parse("z**3 - 1").unwrap();
        assert_eq!(e.eval(c(1.0, 0.0)), c(0.0, 0.0));
        assert_eq!(e.eval(c(2.0, 0.0)), c(7.0, 0.0));
        assert_eq!(e.eval(c(0.0, 1.0)), c(-1.0, -1.0));
    }

    #[test]
    fn constant_value_only_without_var() {
        assert_eq!(parse("2*3").unwrap().constant_value(), Some(c(6.0, 0.0)));
        assert_eq!(parse("2*z").unwrap().constant_value(), None);
    }

    #[test]
    fn display_reparses_to_same_tree() {
        for text in [
            "z**3 - 1",
            "-z**2",
            "(-z)**2",
            "z**(-2)",
            "(z + 1)*(z - 1)",
            "z - (z - 1)",
            "z/(2*z)",
            "sin(z)/z + exp(-z)",
            "2**z**2",
            "(2**z)**2",
            "i*z + (1 + 2*i)",
        ] {
            let e = parse(text).unwrap();
            let shown = e.to_string();
            assert_eq!(parse(&shown).unwrap(), e, "{} displayed as {}", text, shown);
        }
    }

    #[test]
    fn integer_powers_are_exact() {
        let z = c(0.1, 0.7);
        assert_eq!(power(z, c(3.0, 0.0)), z * z * z);
        assert_eq!(power(c(0.0, 0.0), c(2.0, 0.0)), c(0.0, 0.0));
        assert_eq!(power(z, c(0.0, 0.0)), c(1.0, 0.0));
    }
}

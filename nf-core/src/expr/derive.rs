//! Symbolic differentiation with respect to `z`.

use num::complex::Complex64;
use num::{One, Zero};

use super::{Expr, Func};

impl Expr {
    /// d/dz of this expression, with trivial terms folded away.
    pub fn derive(&self) -> Expr {
        match self {
            Expr::Const(_) => Expr::real(0.0),
            Expr::Var => Expr::real(1.0),
            Expr::Neg(a) => neg(a.derive()),
            Expr::Add(a, b) => add(a.derive(), b.derive()),
            Expr::Sub(a, b) => sub(a.derive(), b.derive()),
            Expr::Mul(a, b) => add(
                mul(a.derive(), (**b).clone()),
                mul((**a).clone(), b.derive()),
            ),
            Expr::Div(a, b) => div(
                sub(
                    mul(a.derive(), (**b).clone()),
                    mul((**a).clone(), b.derive()),
                ),
                pow((**b).clone(), Expr::real(2.0)),
            ),
            Expr::Pow(base, exponent) if !exponent.contains_var() => {
                // Power rule: n * b**(n-1) * b'
                let lowered = sub((**exponent).clone(), Expr::real(1.0));
                mul(
                    mul((**exponent).clone(), pow((**base).clone(), lowered)),
                    base.derive(),
                )
            }
            Expr::Pow(base, exponent) if !base.contains_var() => mul(
                mul(self.clone(), call(Func::Log, (**base).clone())),
                exponent.derive(),
            ),
            Expr::Pow(base, exponent) => {
                // b**e * (e' log(b) + e b' / b)
                let inner = add(
                    mul(exponent.derive(), call(Func::Log, (**base).clone())),
                    div(
                        mul((**exponent).clone(), base.derive()),
                        (**base).clone(),
                    ),
                );
                mul(self.clone(), inner)
            }
            Expr::Call(func, arg) => mul(outer_derivative(*func, arg), arg.derive()),
        }
    }
}

/// f'(u) for the named function f, before the chain rule factor.
fn outer_derivative(func: Func, u: &Expr) -> Expr {
    let u = u.clone();
    match func {
        Func::Sin => call(Func::Cos, u),
        Func::Cos => neg(call(Func::Sin, u)),
        Func::Tan => div(
            Expr::real(1.0),
            pow(call(Func::Cos, u), Expr::real(2.0)),
        ),
        Func::Sinh => call(Func::Cosh, u),
        Func::Cosh => call(Func::Sinh, u),
        Func::Tanh => sub(
            Expr::real(1.0),
            pow(call(Func::Tanh, u), Expr::real(2.0)),
        ),
        Func::Exp => call(Func::Exp, u),
        Func::Log => div(Expr::real(1.0), u),
        Func::Sqrt => div(
            Expr::real(1.0),
            mul(Expr::real(2.0), call(Func::Sqrt, u)),
        ),
    }
}

fn constant(e: &Expr) -> Option<Complex64> {
    match e {
        Expr::Const(c) => Some(*c),
        _ => None,
    }
}

fn is_value(e: &Expr, v: f64) -> bool {
    constant(e) == Some(Complex64::new(v, 0.0))
}

fn neg(a: Expr) -> Expr {
    match a {
        Expr::Const(c) => Expr::Const(-c),
        Expr::Neg(inner) => *inner,
        a => Expr::Neg(Box::new(a)),
    }
}

fn add(a: Expr, b: Expr) -> Expr {
    match (constant(&a), constant(&b)) {
        (Some(x), Some(y)) => Expr::Const(x + y),
        (Some(x), _) if x.is_zero() => b,
        (_, Some(y)) if y.is_zero() => a,
        _ => match b {
            Expr::Neg(b) => Expr::Sub(Box::new(a), b),
            b => Expr::Add(Box::new(a), Box::new(b)),
        },
    }
}

fn sub(a: Expr, b: Expr) -> Expr {
    match (constant(&a), constant(&b)) {
        (Some(x), Some(y)) => Expr::Const(x - y),
        (Some(x), _) if x.is_zero() => neg(b),
        (_, Some(y)) if y.is_zero() => a,
        _ => Expr::Sub(Box::new(a), Box::new(b)),
    }
}

fn mul(a: Expr, b: Expr) -> Expr {
    if is_value(&a, 0.0) || is_value(&b, 0.0) {
        return Expr::real(0.0);
    }
    match (a, b) {
        (Expr::Const(x), Expr::Const(y)) => Expr::Const(x * y),
        (Expr::Const(x), b) if x.is_one() => b,
        (a, Expr::Const(y)) if y.is_one() => a,
        // Keep constants on the left and merged: c1 * (c2 * x) => (c1 c2) * x
        (a, Expr::Const(y)) => mul(Expr::Const(y), a),
        (Expr::Const(x), Expr::Mul(inner_a, inner_b)) => match *inner_a {
            Expr::Const(y) => mul(Expr::Const(x * y), *inner_b),
            inner_a => Expr::Mul(
                Box::new(Expr::Const(x)),
                Box::new(Expr::Mul(Box::new(inner_a), inner_b)),
            ),
        },
        (Expr::Mul(inner_a, inner_b), b) if constant(&inner_a).is_some() => {
            let inner_a = *inner_a;
            mul(inner_a, mul(*inner_b, b))
        }
        (a, b) => Expr::Mul(Box::new(a), Box::new(b)),
    }
}

fn div(a: Expr, b: Expr) -> Expr {
    match (constant(&a), constant(&b)) {
        (Some(x), Some(y)) if !y.is_zero() => Expr::Const(x / y),
        (Some(x), _) if x.is_zero() => Expr::real(0.0),
        (_, Some(y)) if y.is_one() => a,
        _ => Expr::Div(Box::new(a), Box::new(b)),
    }
}

fn pow(base: Expr, exponent: Expr) -> Expr {
    if is_value(&exponent, 1.0) {
        return base;
    }
    if is_value(&exponent, 0.0) {
        return Expr::real(1.0);
    }
    Expr::Pow(Box::new(base), Box::new(exponent))
}

fn call(func: Func, arg: Expr) -> Expr {
    Expr::Call(func, Box::new(arg))
}

//! Turns an [`Expr`] into a callable evaluator.

use num::complex::Complex64;

use super::{integer_exponent, Expr};

type Node = Box<dyn Fn(Complex64) -> Complex64 + Send + Sync>;

/// A compiled expression: a tree of closures with constant sub-expressions folded.
///
/// Evaluation is total: finite inputs may still produce infinities or NaN (e.g. `1/z` at 0).
pub struct Evaluator {
    root: Node,
}

impl Evaluator {
    #[inline]
    pub fn eval(&self, z: Complex64) -> Complex64 {
        (self.root)(z)
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator").finish_non_exhaustive()
    }
}

impl Expr {
    pub fn compile(&self) -> Evaluator {
        Evaluator {
            root: compile_node(self),
        }
    }
}

fn compile_node(e: &Expr) -> Node {
    if let Some(c) = e.constant_value() {
        return Box::new(move |_| c);
    }
    match e {
        Expr::Const(c) => {
            let c = *c;
            Box::new(move |_| c)
        }
        Expr::Var => Box::new(|z| z),
        Expr::Neg(a) => {
            let a = compile_node(a);
            Box::new(move |z| -a(z))
        }
        Expr::Add(a, b) => {
            let (a, b) = (compile_node(a), compile_node(b));
            Box::new(move |z| a(z) + b(z))
        }
        Expr::Sub(a, b) => {
            let (a, b) = (compile_node(a), compile_node(b));
            Box::new(move |z| a(z) - b(z))
        }
        Expr::Mul(a, b) => {
            let (a, b) = (compile_node(a), compile_node(b));
            Box::new(move |z| a(z) * b(z))
        }
        Expr::Div(a, b) => {
            let (a, b) = (compile_node(a), compile_node(b));
            Box::new(move |z| a(z) / b(z))
        }
        Expr::Pow(base, exponent) => {
            let base = compile_node(base);
            match exponent.constant_value() {
                Some(exp) => match integer_exponent(exp) {
                    Some(2) => Box::new(move |z| {
                        let b = base(z);
                        b * b
                    }),
                    Some(n) => Box::new(move |z| base(z).powi(n)),
                    None => Box::new(move |z| base(z).powc(exp)),
                },
                None => {
                    let exponent = compile_node(exponent);
                    Box::new(move |z| super::power(base(z), exponent(z)))
                }
            }
        }
        Expr::Call(func, a) => {
            let (func, a) = (*func, compile_node(a));
            Box::new(move |z| func.apply(a(z)))
        }
    }
}

//! Finding the roots of f.
//!
//! Polynomials are solved directly from their coefficients, as the eigenvalues of the
//! companion matrix, giving exactly `degree` roots.
//! Anything else goes through [`solve`], which may find any number of roots.

use num::complex::Complex64;

mod companion;
mod solve;

use crate::expr::Expr;
pub use companion::polynomial_roots;
pub use solve::{solve, SolveOptions};

/// Outcome of trying the polynomial route.
#[derive(Clone, Debug, PartialEq)]
pub enum PolynomialAttempt {
    /// The expression is a polynomial; these are all of its roots.
    Roots(Vec<Complex64>),
    /// The expression is not a polynomial.
    Fallback,
}

/// Roots of `expr` if it is a polynomial in `z`.
pub fn try_polynomial(expr: &Expr) -> PolynomialAttempt {
    match expr.to_polynomial() {
        Some(p) => {
            let coefficients = p.all_coefficients();
            tracing::debug!("polynomial of degree {}", p.degree());
            PolynomialAttempt::Roots(polynomial_roots(&coefficients))
        }
        None => PolynomialAttempt::Fallback,
    }
}

/// Roots of `expr`, searching the default window if it is not a polynomial.
pub fn find_roots(expr: &Expr) -> Vec<Complex64> {
    find_roots_with(expr, &SolveOptions::default())
}

/// Roots of `expr`: the polynomial route first, then [`solve`] with `options`.
///
/// Finding no roots is not an error: every point will simply be unclassified.
pub fn find_roots_with(expr: &Expr, options: &SolveOptions) -> Vec<Complex64> {
    let roots = match try_polynomial(expr) {
        PolynomialAttempt::Roots(roots) => roots,
        PolynomialAttempt::Fallback => {
            tracing::debug!("{} is not a polynomial, solving", expr);
            solve(expr, options)
        }
    };
    if roots.is_empty() {
        tracing::warn!("no roots found for {}; every point will be unclassified", expr);
    }
    roots
}

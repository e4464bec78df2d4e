//! Root finding for expressions that are not polynomials.

use num::complex::Complex64;

use super::companion::polynomial_roots;
use crate::expr::{Expr, Polynomial};
use crate::grid::SampleGrid;
use crate::{Bounds, Size};

/// A candidate is a root when `|f(z)|` falls below this.
const RESIDUAL: f64 = 1e-10;

/// Roots closer than this are the same root.
const SAME_ROOT: f64 = 1e-6;

/// A pole cancels a root of the numerator within this distance, relative to `1 + |pole|`.
/// Repeated roots split by about the square root of machine precision, hence the slack.
const CANCELS: f64 = 1e-4;

/// Where, and how hard, to search for roots of a non-polynomial expression.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolveOptions {
    /// Only roots in this rectangle are reported; seeds are spread across it.
    pub window: Bounds,
    /// Seeds per axis.
    pub seeds: usize,
    /// Newton steps per seed.
    pub max_iter: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            window: Bounds::around(0.0, 0.0, 10.0),
            seeds: 24,
            max_iter: 100,
        }
    }
}

impl SolveOptions {
    /// The same options, with the window grown to cover `bounds`.
    pub fn covering(self, bounds: &Bounds) -> Self {
        SolveOptions {
            window: self.window.union(bounds),
            ..self
        }
    }
}

/// Solve `expr = 0` for an expression that has no polynomial form.
///
/// Rational functions are solved exactly: the roots of the numerator, less one for each root
/// of the denominator they share. Anything else is searched numerically within
/// `options.window`.
pub fn solve(expr: &Expr, options: &SolveOptions) -> Vec<Complex64> {
    match expr.to_rational() {
        Some((numerator, denominator)) => rational_roots(&numerator, &denominator),
        None => numeric_roots(expr, options),
    }
}

/// Roots of `numerator / denominator`, counted with multiplicity.
///
/// Each root of the denominator removes the nearest root of the numerator, if one is close
/// enough, so `z**3/z` keeps a double root at zero and `z/z**2` has none.
fn rational_roots(numerator: &Polynomial, denominator: &Polynomial) -> Vec<Complex64> {
    let mut roots = polynomial_roots(&numerator.all_coefficients());
    for pole in polynomial_roots(&denominator.all_coefficients()) {
        let nearest = roots
            .iter()
            .map(|r| (*r - pole).norm())
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, distance)) = nearest {
            if distance <= CANCELS * (1.0 + pole.norm()) {
                roots.remove(index);
            }
        }
    }
    roots
}

/// Newton's method from a lattice of seeds; distinct converged points, in discovery order.
fn numeric_roots(expr: &Expr, options: &SolveOptions) -> Vec<Complex64> {
    let f = expr.compile();
    let df = expr.derive().compile();
    let seeds = SampleGrid::new(
        Size {
            width: options.seeds.max(2),
            height: options.seeds.max(2),
        },
        &options.window,
    );

    let mut found: Vec<Complex64> = Vec::new();
    for seed in seeds.points() {
        let mut z = *seed;
        for _ in 0..options.max_iter {
            let step = f.eval(z) / df.eval(z);
            if !is_finite(step) {
                break;
            }
            z -= step;
            if step.norm() <= 1e-14 * (1.0 + z.norm()) {
                break;
            }
        }
        if !is_finite(z) || !options.window.contains(z) || f.eval(z).norm() >= RESIDUAL {
            continue;
        }
        if found.iter().all(|r| (*r - z).norm() >= SAME_ROOT) {
            found.push(z);
        }
    }
    found
}

fn is_finite(z: Complex64) -> bool {
    z.re.is_finite() && z.im.is_finite()
}

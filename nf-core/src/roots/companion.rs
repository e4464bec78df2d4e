//! All roots of a polynomial at once, as the eigenvalues of its companion matrix.

use nalgebra::{DMatrix, Schur};
use num::complex::Complex64;
use num::{One, Zero};

/// QR sweeps allowed per matrix row before a decomposition is abandoned.
const SWEEPS_PER_ROW: usize = 30;

/// Origins tried, in units of the root radius, when the unshifted matrix does not converge.
/// The companion matrix of `z**n - 1` is a cyclic permutation, which unshifted QR sweeps
/// leave unchanged.
const RETRY_SHIFTS: [Complex64; 3] = [
    Complex64::new(0.3183, 0.1234),
    Complex64::new(-0.2718, 0.4142),
    Complex64::new(0.1732, -0.5772),
];

/// Roots of a polynomial given its coefficients, highest degree first.
///
/// Leading zero coefficients are ignored. Each trailing zero coefficient contributes an exact
/// root at zero, appended after the others. A polynomial of degree `n` gives exactly `n`
/// roots counted with multiplicity; constants give none.
pub fn polynomial_roots(coefficients: &[Complex64]) -> Vec<Complex64> {
    let first = coefficients.iter().position(|c| !c.is_zero());
    let last = coefficients.iter().rposition(|c| !c.is_zero());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };
    let trailing_zeros = coefficients.len() - 1 - last;
    let p = &coefficients[first..=last];

    let mut roots = match p.len() - 1 {
        0 => Vec::new(),
        1 => vec![-p[1] / p[0]],
        _ => companion_roots(p),
    };
    roots.extend(std::iter::repeat(Complex64::zero()).take(trailing_zeros));
    roots
}

/// Roots of a polynomial of degree 2 or more with a non-zero constant term.
fn companion_roots(coefficients: &[Complex64]) -> Vec<Complex64> {
    if let Some(roots) = eigenvalues(coefficients) {
        return roots;
    }
    let radius = root_radius(coefficients);
    for shift in RETRY_SHIFTS {
        let origin = shift * radius;
        tracing::debug!("companion matrix did not converge, retrying around {}", origin);
        if let Some(roots) = eigenvalues(&taylor_shift(coefficients, origin)) {
            return roots.into_iter().map(|w| w + origin).collect();
        }
    }
    tracing::warn!(
        "no roots: companion matrix of degree {} did not converge",
        coefficients.len() - 1
    );
    Vec::new()
}

/// Eigenvalues of the companion matrix, or `None` if the Schur decomposition stalls.
///
/// Real polynomials stay in real arithmetic; their complex roots come from the 2×2 blocks
/// of the real Schur form.
fn eigenvalues(coefficients: &[Complex64]) -> Option<Vec<Complex64>> {
    let n = coefficients.len() - 1;
    let lead = coefficients[0];
    let monic: Vec<Complex64> = coefficients[1..].iter().map(|c| *c / lead).collect();
    let max_niter = SWEEPS_PER_ROW * n;

    if monic.iter().all(|c| c.im == 0.0) {
        let companion = DMatrix::from_fn(n, n, |i, j| companion_entry(&monic, i, j).re);
        let schur = Schur::try_new(companion, f64::EPSILON, max_niter)?;
        Some(schur.complex_eigenvalues().iter().copied().collect())
    } else {
        let companion = DMatrix::from_fn(n, n, |i, j| companion_entry(&monic, i, j));
        // The complex Schur form is triangular up to negligible subdiagonal entries.
        let (_, triangular) = Schur::try_new(companion, f64::EPSILON, max_niter)?.unpack();
        Some(triangular.diagonal().iter().copied().collect())
    }
}

/// Negated monic coefficients across the first row, ones on the subdiagonal.
fn companion_entry(monic: &[Complex64], i: usize, j: usize) -> Complex64 {
    if i == 0 {
        -monic[j]
    } else if i == j + 1 {
        Complex64::one()
    } else {
        Complex64::zero()
    }
}

/// Geometric mean of the root magnitudes.
fn root_radius(coefficients: &[Complex64]) -> f64 {
    let n = coefficients.len() - 1;
    (coefficients[n].norm() / coefficients[0].norm()).powf(1.0 / n as f64)
}

/// Coefficients of `p(w + origin)`, highest degree first, by repeated synthetic division.
fn taylor_shift(coefficients: &[Complex64], origin: Complex64) -> Vec<Complex64> {
    let mut shifted = coefficients.to_vec();
    let n = shifted.len() - 1;
    for k in 0..n {
        for j in 1..=n - k {
            let carry = shifted[j - 1] * origin;
            shifted[j] += carry;
        }
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    /// Each expected root is matched by a distinct computed root.
    fn assert_same_roots(mut actual: Vec<Complex64>, expected: &[Complex64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for e in expected {
            let (index, distance) = actual
                .iter()
                .map(|a| (*a - *e).norm())
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap();
            assert!(distance < tolerance, "{} not found in {:?}", e, actual);
            actual.remove(index);
        }
    }

    #[test]
    fn cube_roots_of_unity() {
        let roots = polynomial_roots(&[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)]);
        let h = 3f64.sqrt() / 2.0;
        assert_same_roots(roots, &[c(1.0, 0.0), c(-0.5, h), c(-0.5, -h)], 1e-10);
    }

    #[test]
    fn linear_and_constant() {
        assert_eq!(polynomial_roots(&[c(2.0, 0.0), c(-4.0, 0.0)]), vec![c(2.0, 0.0)]);
        assert!(polynomial_roots(&[c(5.0, 0.0)]).is_empty());
        assert!(polynomial_roots(&[c(0.0, 0.0)]).is_empty());
        assert!(polynomial_roots(&[]).is_empty());
    }

    #[test]
    fn leading_zeros_ignored_trailing_zeros_are_roots() {
        let roots = polynomial_roots(&[c(0.0, 0.0), c(1.0, 0.0), c(-3.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)]);
        assert_eq!(roots.len(), 3);
        assert!((roots[0] - c(3.0, 0.0)).norm() < 1e-12);
        assert_eq!(&roots[1..], &[c(0.0, 0.0), c(0.0, 0.0)]);
    }

    #[test]
    fn real_quadratic_with_complex_roots() {
        // z^2 + 2z + 5 = (z + 1 - 2i)(z + 1 + 2i)
        let roots = polynomial_roots(&[c(1.0, 0.0), c(2.0, 0.0), c(5.0, 0.0)]);
        assert_same_roots(roots, &[c(-1.0, 2.0), c(-1.0, -2.0)], 1e-10);
    }

    #[test]
    fn complex_coefficients() {
        // (z - i)(z + 2 - i) = z^2 + (2 - 2i) z + (-2i - 1)
        let roots = polynomial_roots(&[c(1.0, 0.0), c(2.0, -2.0), c(-1.0, -2.0)]);
        assert_same_roots(roots, &[c(0.0, 1.0), c(-2.0, 1.0)], 1e-10);
    }

    #[test]
    fn repeated_roots_are_kept() {
        // (z - 1)^2 (z + 2)
        let roots = polynomial_roots(&[c(1.0, 0.0), c(0.0, 0.0), c(-3.0, 0.0), c(2.0, 0.0)]);
        assert_same_roots(roots, &[c(1.0, 0.0), c(1.0, 0.0), c(-2.0, 0.0)], 1e-6);
    }

    #[test]
    fn higher_degree() {
        // z^8 - 1
        let mut coefficients = vec![c(0.0, 0.0); 9];
        coefficients[0] = c(1.0, 0.0);
        coefficients[8] = c(-1.0, 0.0);
        let expected: Vec<_> = (0..8)
            .map(|k| Complex64::from_polar(1.0, TAU * k as f64 / 8.0))
            .collect();
        assert_same_roots(polynomial_roots(&coefficients), &expected, 1e-10);
    }

    #[test]
    fn shifted_polynomial_has_shifted_roots() {
        // (z - 1)(z - 2) around 1 + i is (w + i)(w - 1 + i)
        let shifted = taylor_shift(&[c(1.0, 0.0), c(-3.0, 0.0), c(2.0, 0.0)], c(1.0, 1.0));
        assert_eq!(shifted, vec![c(1.0, 0.0), c(-1.0, 2.0), c(-1.0, -1.0)]);
    }

    #[test]
    fn shifted_roots_match_direct_roots() {
        let p = [c(1.0, 0.0), c(0.5, -1.0), c(0.0, 0.0), c(-2.0, 0.25)];
        let direct = eigenvalues(&p).unwrap();
        let origin = RETRY_SHIFTS[0];
        let shifted: Vec<_> = eigenvalues(&taylor_shift(&p, origin))
            .unwrap()
            .into_iter()
            .map(|w| w + origin)
            .collect();
        assert_same_roots(shifted, &direct, 1e-9);
    }
}

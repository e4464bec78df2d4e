//! Polynomial and rational views of an [`Expr`].

use num::complex::Complex64;
use num::{One, Zero};

use super::{integer_exponent, Expr, MAX_POLYNOMIAL_DEGREE, MAX_POLYNOMIAL_POWER};

/// A polynomial in `z` with complex coefficients.
///
/// Coefficients are stored lowest degree first, with no zero coefficient at the top;
/// the zero polynomial has no coefficients at all.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<Complex64>,
}

impl Polynomial {
    fn from_lowest_first(mut coefficients: Vec<Complex64>) -> Self {
        while coefficients.last().map_or(false, |c| c.is_zero()) {
            coefficients.pop();
        }
        Polynomial { coefficients }
    }

    pub fn constant(c: Complex64) -> Self {
        Self::from_lowest_first(vec![c])
    }

    /// The polynomial `z`.
    pub fn var() -> Self {
        Self::from_lowest_first(vec![Complex64::zero(), Complex64::one()])
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Degree of the polynomial; the zero polynomial is reported as degree 0.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// All coefficients, highest degree first, zeros included.
    /// The zero polynomial is `[0]`.
    pub fn all_coefficients(&self) -> Vec<Complex64> {
        if self.is_zero() {
            return vec![Complex64::zero()];
        }
        self.coefficients.iter().rev().copied().collect()
    }

    /// Horner evaluation.
    pub fn eval(&self, z: Complex64) -> Complex64 {
        self.coefficients
            .iter()
            .rev()
            .fold(Complex64::zero(), |acc, c| acc * z + *c)
    }

    fn zip_with(&self, other: &Polynomial, op: impl Fn(Complex64, Complex64) -> Complex64) -> Self {
        let len = self.coefficients.len().max(other.coefficients.len());
        let at = |p: &Polynomial, k: usize| p.coefficients.get(k).copied().unwrap_or_default();
        Self::from_lowest_first(
            (0..len)
                .map(|k| op(at(self, k), at(other, k)))
                .collect(),
        )
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn neg(&self) -> Polynomial {
        self.scale(-Complex64::one())
    }

    pub fn scale(&self, factor: Complex64) -> Polynomial {
        Self::from_lowest_first(self.coefficients.iter().map(|c| *c * factor).collect())
    }

    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Self::from_lowest_first(Vec::new());
        }
        let mut out = vec![Complex64::zero(); self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                out[i + j] += *a * *b;
            }
        }
        Self::from_lowest_first(out)
    }

    /// The product, unless its degree would pass [`MAX_POLYNOMIAL_DEGREE`].
    pub fn checked_mul(&self, other: &Polynomial) -> Option<Polynomial> {
        if self.degree() + other.degree() > MAX_POLYNOMIAL_DEGREE {
            return None;
        }
        Some(self.mul(other))
    }

    /// `self ** n`, unless its degree would pass [`MAX_POLYNOMIAL_DEGREE`].
    pub fn checked_pow(&self, n: u32) -> Option<Polynomial> {
        if self.degree() as u64 * u64::from(n) > MAX_POLYNOMIAL_DEGREE as u64 {
            return None;
        }
        Some(self.pow(n))
    }

    /// Quotient and remainder of long division by a non-zero `divisor`.
    pub fn div_rem(&self, divisor: &Polynomial) -> Option<(Polynomial, Polynomial)> {
        let lead = *divisor.coefficients.last()?;
        let shift = divisor.degree();
        if self.coefficients.len() <= shift {
            return Some((Self::from_lowest_first(Vec::new()), self.clone()));
        }
        let mut remainder = self.coefficients.clone();
        let mut quotient = vec![Complex64::zero(); remainder.len() - shift];
        for k in (0..quotient.len()).rev() {
            let q = remainder[k + shift] / lead;
            quotient[k] = q;
            for (j, d) in divisor.coefficients.iter().enumerate() {
                remainder[k + j] -= q * *d;
            }
        }
        remainder.truncate(shift);
        Some((
            Self::from_lowest_first(quotient),
            Self::from_lowest_first(remainder),
        ))
    }

    /// `self / divisor` when the division leaves no remainder, up to rounding.
    pub fn exact_quotient(&self, divisor: &Polynomial) -> Option<Polynomial> {
        let (quotient, remainder) = self.div_rem(divisor)?;
        let scale = self.coefficients.iter().map(|c| c.norm()).fold(0.0, f64::max);
        if remainder.coefficients.iter().all(|c| c.norm() <= EXACT * scale) {
            Some(quotient)
        } else {
            None
        }
    }

    /// `self ** n` by repeated squaring.
    pub fn pow(&self, mut n: u32) -> Polynomial {
        let mut result = Polynomial::constant(Complex64::one());
        let mut base = self.clone();
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base);
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(&base);
            }
        }
        result
    }
}

/// A division remainder this small, relative to the largest coefficient of the dividend,
/// is rounding error.
const EXACT: f64 = 1e-12;

/// A real integer exponent small enough to expand.
fn expandable_power(exponent: &Expr) -> Option<i32> {
    let n = integer_exponent(exponent.constant_value()?)?;
    if n.unsigned_abs() <= MAX_POLYNOMIAL_POWER {
        Some(n)
    } else {
        None
    }
}

fn finite(c: Complex64) -> Option<Complex64> {
    if c.re.is_finite() && c.im.is_finite() {
        Some(c)
    } else {
        None
    }
}

impl Expr {
    /// Views the expression as a polynomial in `z`, if it is one.
    ///
    /// Sub-expressions without `z` are evaluated, so `sin(1)*z` is the polynomial
    /// `0.841...*z`. Division is only accepted when the divisor is a non-zero polynomial that
    /// divides the dividend exactly, so `(z**2 - 1)/(z - 1)` is `z + 1`. Powers are only
    /// accepted with non-negative integer exponents. Expansions past
    /// [`MAX_POLYNOMIAL_DEGREE`] are rejected.
    pub fn to_polynomial(&self) -> Option<Polynomial> {
        if let Some(c) = self.constant_value() {
            return Some(Polynomial::constant(finite(c)?));
        }
        match self {
            Expr::Const(_) => None,
            Expr::Var => Some(Polynomial::var()),
            Expr::Neg(a) => Some(a.to_polynomial()?.neg()),
            Expr::Add(a, b) => Some(a.to_polynomial()?.add(&b.to_polynomial()?)),
            Expr::Sub(a, b) => Some(a.to_polynomial()?.sub(&b.to_polynomial()?)),
            Expr::Mul(a, b) => a.to_polynomial()?.checked_mul(&b.to_polynomial()?),
            Expr::Div(a, b) => a.to_polynomial()?.exact_quotient(&b.to_polynomial()?),
            Expr::Pow(base, exponent) => {
                let n = expandable_power(exponent)?;
                if n < 0 {
                    return None;
                }
                base.to_polynomial()?.checked_pow(n as u32)
            }
            Expr::Call(..) => None,
        }
    }

    /// Views the expression as a ratio `numerator / denominator` of polynomials in `z`.
    ///
    /// Accepts everything [`to_polynomial`](Expr::to_polynomial) does, plus division by
    /// non-constant polynomials and negative integer powers.
    pub fn to_rational(&self) -> Option<(Polynomial, Polynomial)> {
        let one = || Polynomial::constant(Complex64::one());
        if let Some(c) = self.constant_value() {
            return Some((Polynomial::constant(finite(c)?), one()));
        }
        match self {
            Expr::Const(_) => None,
            Expr::Var => Some((Polynomial::var(), one())),
            Expr::Neg(a) => {
                let (n, d) = a.to_rational()?;
                Some((n.neg(), d))
            }
            Expr::Add(a, b) | Expr::Sub(a, b) => {
                let (an, ad) = a.to_rational()?;
                let (bn, bd) = b.to_rational()?;
                let left = an.checked_mul(&bd)?;
                let right = bn.checked_mul(&ad)?;
                let numerator = if matches!(self, Expr::Add(..)) {
                    left.add(&right)
                } else {
                    left.sub(&right)
                };
                Some((numerator, ad.checked_mul(&bd)?))
            }
            Expr::Mul(a, b) => {
                let (an, ad) = a.to_rational()?;
                let (bn, bd) = b.to_rational()?;
                Some((an.checked_mul(&bn)?, ad.checked_mul(&bd)?))
            }
            Expr::Div(a, b) => {
                let (an, ad) = a.to_rational()?;
                let (bn, bd) = b.to_rational()?;
                if bn.is_zero() {
                    return None;
                }
                Some((an.checked_mul(&bd)?, ad.checked_mul(&bn)?))
            }
            Expr::Pow(base, exponent) => {
                let n = expandable_power(exponent)?;
                let (bn, bd) = base.to_rational()?;
                let k = n.unsigned_abs();
                if n >= 0 {
                    Some((bn.checked_pow(k)?, bd.checked_pow(k)?))
                } else if bn.is_zero() {
                    None
                } else {
                    Some((bd.checked_pow(k)?, bn.checked_pow(k)?))
                }
            }
            Expr::Call(..) => None,
        }
    }
}

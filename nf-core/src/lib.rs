//! Library code for the Newton fractal explorer.
//!
//! A run goes through these steps:
//! -   Parse the function (and optionally its derivative) into an [`expr::Expr`].
//! -   Find the roots of the function ([`roots`]).
//! -   Sample the view rectangle into a [`grid::SampleGrid`].
//! -   Run Newton's method from every sample ([`newton`]), classifying each point by the root
//!     it converges to and the pass at which it got there.
//! -   Color the classification ([`color`]) and rasterize it ([`image`]).
//!
//! [`pipeline::compute`] runs all of the above for a [`NewtonParams`].

pub mod color;
pub mod expr;
pub mod grid;
pub mod image;
pub mod newton;
pub mod pipeline;
pub mod roots;

pub use num::complex::Complex64;

/// A pair of integer (width, height) dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    /// Number of cells in a grid of this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Number of cells, or `None` if that does not fit in a `usize`.
    pub fn checked_area(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

/// The rectangle of the complex plane being sampled. Both ends of each axis are included.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// The square of half-width `zoom` around `(x, y)`.
    pub fn around(x: f64, y: f64, zoom: f64) -> Self {
        Bounds {
            x_min: x - zoom,
            x_max: x + zoom,
            y_min: y - zoom,
            y_max: y + zoom,
        }
    }

    /// Smallest bounds covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    pub fn contains(&self, z: Complex64) -> bool {
        (self.x_min..=self.x_max).contains(&z.re) && (self.y_min..=self.y_max).contains(&z.im)
    }

    fn validate(&self) -> Result<()> {
        let all_finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::InvalidParameter(format!(
                "bounds must be finite: {:?}",
                self
            )));
        }
        if self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(Error::InvalidParameter(format!(
                "bounds must have min < max on both axes: {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Which of the two user-provided expressions a problem was found in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Function,
    Derivative,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Function => write!(f, "function"),
            Role::Derivative => write!(f, "derivative"),
        }
    }
}

/// Errors that stop a run before any grid work happens.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid {role} expression: {source}")]
    InvalidExpression {
        role: Role,
        #[source]
        source: expr::ParseError,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Everything needed to compute one Newton fractal.
#[derive(Clone, Debug, PartialEq)]
pub struct NewtonParams {
    /// Text of f(z).
    pub function: String,
    /// Text of f'(z). When absent (or blank), the derivative is computed symbolically.
    pub derivative: Option<String>,
    pub size: Size,
    pub bounds: Bounds,
    pub max_iter: usize,
    pub tolerance: f64,
    /// Seed for the per-root base colors.
    pub seed: u64,
}

impl NewtonParams {
    pub const DEFAULT_FUNCTION: &'static str = "z**3 - 1";
    pub const DEFAULT_MAX_ITER: usize = 50;
    pub const DEFAULT_TOLERANCE: f64 = 1e-8;

    /// Parameters for `function` with the defaults of the interactive explorer:
    /// 600x600 pixels over the square of half-width 2 around the origin.
    pub fn new(function: impl Into<String>) -> Self {
        NewtonParams {
            function: function.into(),
            derivative: None,
            size: Size {
                width: 600,
                height: 600,
            },
            bounds: Bounds::around(0.0, 0.0, 2.0),
            max_iter: Self::DEFAULT_MAX_ITER,
            tolerance: Self::DEFAULT_TOLERANCE,
            seed: 0,
        }
    }

    /// Checks the numeric parameters. Expressions are checked when they are parsed.
    pub fn validate(&self) -> Result<()> {
        if self.size.width < 2 || self.size.height < 2 {
            return Err(Error::InvalidParameter(format!(
                "grid must be at least 2x2, got {}x{}",
                self.size.width, self.size.height
            )));
        }
        if self.size.checked_area().is_none() {
            return Err(Error::InvalidParameter(format!(
                "grid of {}x{} cells is too large",
                self.size.width, self.size.height
            )));
        }
        if self.max_iter < 1 {
            return Err(Error::InvalidParameter(
                "iteration limit must be at least 1".to_owned(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        self.bounds.validate()
    }
}

impl Default for NewtonParams {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FUNCTION)
    }
}

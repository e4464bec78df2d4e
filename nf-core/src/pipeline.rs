//! One full run: text in, colored classification out.

use num::complex::Complex64;

use crate::color::{base_colors, colorize, Rgb, RgbGrid};
use crate::expr::{parse, Evaluator, Expr};
use crate::grid::SampleGrid;
use crate::image::NewtonRenderer;
use crate::newton::{iterate, Classification};
use crate::roots::{find_roots_with, SolveOptions};
use crate::{Error, NewtonParams, Result, Role};

/// Parsed and compiled f and f'.
#[derive(Debug)]
pub struct Prepared {
    pub function: Expr,
    pub derivative: Expr,
    pub f: Evaluator,
    pub df: Evaluator,
}

/// Parse `function_text`, and `derivative_text` if given and not blank.
/// Without a derivative text, f' is derived from f.
pub fn prepare(function_text: &str, derivative_text: Option<&str>) -> Result<Prepared> {
    let function = parse(function_text).map_err(|source| Error::InvalidExpression {
        role: Role::Function,
        source,
    })?;
    let derivative = match derivative_text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => parse(text).map_err(|source| Error::InvalidExpression {
            role: Role::Derivative,
            source,
        })?,
        None => function.derive(),
    };
    tracing::debug!("f(z) = {}, f'(z) = {}", function, derivative);
    let f = function.compile();
    let df = derivative.compile();
    Ok(Prepared {
        function,
        derivative,
        f,
        df,
    })
}

/// Parsed expressions and the roots of f: everything a run needs before touching the grid.
#[derive(Debug)]
pub struct Analysis {
    pub prepared: Prepared,
    /// Roots of f, in the order used for classification.
    pub roots: Vec<Complex64>,
}

/// Check `params`, parse the expressions and find the roots of f.
pub fn analyze(params: &NewtonParams) -> Result<Analysis> {
    params.validate()?;
    let prepared = prepare(&params.function, params.derivative.as_deref())?;
    let roots = find_roots_with(
        &prepared.function,
        &SolveOptions::default().covering(&params.bounds),
    );
    tracing::debug!("{} roots: {:?}", roots.len(), roots);
    Ok(Analysis { prepared, roots })
}

/// The result of a run.
#[derive(Debug)]
pub struct Rendering {
    pub function: Expr,
    pub derivative: Expr,
    /// Roots of f, in the order used for classification.
    pub roots: Vec<Complex64>,
    pub classification: Classification,
    /// Base color of each root.
    pub palette: Vec<Rgb>,
    pub colors: RgbGrid,
}

impl Rendering {
    pub fn image(&self) -> Result<image::DynamicImage> {
        NewtonRenderer::default().render(&self.colors)
    }
}

/// Run the whole pipeline for `params`.
///
/// Parameters and expressions are checked before any grid work.
/// Rows are iterated on the current rayon pool.
pub fn compute(params: &NewtonParams) -> Result<Rendering> {
    let span = tracing::info_span!("compute", function = %params.function);
    let _guard = span.enter();

    let Analysis {
        prepared:
            Prepared {
                function,
                derivative,
                f,
                df,
            },
        roots,
    } = analyze(params)?;

    let grid = SampleGrid::new(params.size, &params.bounds);
    let classification = iterate(
        |z| f.eval(z),
        |z| df.eval(z),
        &grid,
        &roots,
        params.max_iter,
        params.tolerance,
    );
    tracing::debug!(
        "{} of {} points unclassified",
        classification.unclassified(),
        params.size.area()
    );

    let palette = base_colors(roots.len(), params.seed);
    let colors = colorize(&classification, params.max_iter, &palette);
    Ok(Rendering {
        function,
        derivative,
        roots,
        classification,
        palette,
        colors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, Size};

    fn scenario() -> NewtonParams {
        NewtonParams {
            size: Size {
                width: 5,
                height: 5,
            },
            bounds: Bounds::around(0.0, 0.0, 2.0),
            ..NewtonParams::default()
        }
    }

    #[test]
    fn derivative_is_derived_when_blank() {
        let derived = prepare("z**3 - 1", Some("  ")).unwrap();
        assert_eq!(derived.derivative.to_string(), "3*z**2");
        let given = prepare("z**3 - 1", Some("3*z*z")).unwrap();
        let z = Complex64::new(0.3, -1.2);
        assert!((given.df.eval(z) - derived.df.eval(z)).norm() < 1e-12);
    }

    #[test]
    fn bad_function_is_reported() {
        let mut params = scenario();
        params.function = "z**".to_owned();
        assert!(matches!(
            compute(&params),
            Err(Error::InvalidExpression {
                role: Role::Function,
                ..
            })
        ));
    }

    #[test]
    fn bad_derivative_is_reported() {
        let mut params = scenario();
        params.derivative = Some("foo(z)".to_owned());
        assert!(matches!(
            compute(&params),
            Err(Error::InvalidExpression {
                role: Role::Derivative,
                ..
            })
        ));
    }

    #[test]
    fn deeply_nested_function_is_reported() {
        let mut params = scenario();
        params.function = format!("{}z", "-".repeat(100_000));
        match compute(&params) {
            Err(Error::InvalidExpression {
                role: Role::Function,
                source,
            }) => assert_eq!(source.message, "expression nested too deeply"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.roots)),
        }
    }

    #[test]
    fn bad_parameters_stop_the_run() {
        let mut params = scenario();
        params.max_iter = 0;
        assert!(matches!(compute(&params), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn cubic_scenario() {
        let run = compute(&scenario()).unwrap();
        assert_eq!(run.roots.len(), 3);
        assert_eq!(run.palette.len(), 3);
        assert_eq!(run.classification.unclassified(), 1);
        // The center is where f' vanishes.
        assert_eq!(run.colors.get(2, 2), Some(crate::color::BLACK));
        let img = run.image().unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (5, 5));
    }

    #[test]
    fn runs_are_repeatable() {
        let a = compute(&scenario()).unwrap();
        let b = compute(&scenario()).unwrap();
        assert_eq!(a.roots, b.roots);
        assert_eq!(a.colors, b.colors);
    }

    #[test]
    fn analysis_matches_run() {
        let analysis = analyze(&scenario()).unwrap();
        assert_eq!(analysis.roots, compute(&scenario()).unwrap().roots);
        assert_eq!(analysis.prepared.derivative.to_string(), "3*z**2");
    }

    #[test]
    fn non_polynomial_function() {
        let mut params = scenario();
        params.function = "exp(z) - 1".to_owned();
        let run = compute(&params).unwrap();
        assert!(!run.roots.is_empty());
        assert!(run.roots.iter().any(|r| r.norm() < 1e-6));
    }
}

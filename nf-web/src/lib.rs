//! HTTP serving for the Newton fractal explorer.
//!
//! The library implements routing, state, etc. for the server;
//! the binary starts up a runtime and axum server to handle requests.
//!
//! All dynamic paths take the same query parameters (out-of-range values are clamped):
//! - f: Text of f(z). Defaults to `z**3 - 1`.
//! - df: Text of f'(z). Blank (the default) means "derive f".
//! - width, height: Image size in pixels, 200 to 1000. Default 600.
//! - iters: Maximum number of Newton passes, 10 to 200. Default 50.
//! - tol: Convergence tolerance, 1e-8 to 1e-3. Default 1e-8.
//! - zoom: Half-width of the view, 0.1 to 5. Default 2.
//! - x, y: Center of the view, -5 to 5. Default 0.
//! - seed: Seed for the root colors. Default 0.
//!
//! Dynamic paths are:
//! - `/`: HTML interface view, with the roots of f and the rendered image.
//! - `/render`: The rendered image, as PNG.
//! - `/download`: The same PNG, as an attachment named `newton_fractal.png`.
//!
//! Static paths are:
//! - `/static/...`: Serve the provided static content (JS, CSS)

use std::sync::Arc;

use axum::{routing::get, Router};
use nf_core::{Bounds, NewtonParams, Size};
use nf_render::RenderServer;

mod interface;
mod render;
mod static_content;

pub fn root_routes(render_server: RenderServer) -> Router {
    Router::new()
        .route("/", get(interface::interface))
        .route("/render", get(render::inline))
        .route("/download", get(render::download))
        .route("/static/:file", get(static_content::get))
        .with_state(Arc::new(render_server))
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
struct WindowParams {
    #[serde(default = "WindowParams::default_function")]
    f: String,
    #[serde(default)]
    df: String,

    #[serde(default = "WindowParams::default_res")]
    width: usize,
    #[serde(default = "WindowParams::default_res")]
    height: usize,
    #[serde(default = "WindowParams::default_iters")]
    iters: usize,
    #[serde(default = "WindowParams::default_tol")]
    tol: f64,

    #[serde(default = "WindowParams::default_zoom")]
    zoom: f64,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,

    #[serde(default)]
    seed: u64,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            f: Self::default_function(),
            df: String::new(),
            width: Self::default_res(),
            height: Self::default_res(),
            iters: Self::default_iters(),
            tol: Self::default_tol(),
            zoom: Self::default_zoom(),
            x: 0.0,
            y: 0.0,
            seed: 0,
        }
    }
}

impl WindowParams {
    const RES: (usize, usize) = (200, 1000);
    const ITERS: (usize, usize) = (10, 200);
    const TOL: (f64, f64) = (1e-8, 1e-3);
    const ZOOM: (f64, f64) = (0.1, 5.0);
    const CENTER: (f64, f64) = (-5.0, 5.0);

    fn default_function() -> String {
        NewtonParams::DEFAULT_FUNCTION.to_owned()
    }
    fn default_res() -> usize {
        600
    }
    fn default_iters() -> usize {
        NewtonParams::DEFAULT_MAX_ITER
    }
    fn default_tol() -> f64 {
        NewtonParams::DEFAULT_TOLERANCE
    }
    fn default_zoom() -> f64 {
        2.0
    }

    /// The same parameters, with every number pulled into its allowed range.
    /// Non-finite numbers fall back to their defaults.
    fn clamped(&self) -> Self {
        let float = |v: f64, (lo, hi): (f64, f64), default: f64| {
            if v.is_finite() {
                v.clamp(lo, hi)
            } else {
                default
            }
        };
        WindowParams {
            f: self.f.clone(),
            df: self.df.clone(),
            width: self.width.clamp(Self::RES.0, Self::RES.1),
            height: self.height.clamp(Self::RES.0, Self::RES.1),
            iters: self.iters.clamp(Self::ITERS.0, Self::ITERS.1),
            tol: float(self.tol, Self::TOL, Self::default_tol()),
            zoom: float(self.zoom, Self::ZOOM, Self::default_zoom()),
            x: float(self.x, Self::CENTER, 0.0),
            y: float(self.y, Self::CENTER, 0.0),
            seed: self.seed,
        }
    }

    fn to_params(&self) -> NewtonParams {
        let q = self.clamped();
        NewtonParams {
            function: q.f,
            derivative: if q.df.trim().is_empty() {
                None
            } else {
                Some(q.df)
            },
            size: Size {
                width: q.width,
                height: q.height,
            },
            bounds: Bounds::around(q.x, q.y, q.zoom),
            max_iter: q.iters,
            tolerance: q.tol,
            seed: q.seed,
        }
    }

    /// Query string reproducing these parameters.
    fn query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> WindowParams {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn empty_query_is_default() {
        let params = parse("");
        assert_eq!(params, WindowParams::default());
        assert_eq!(params.to_params(), NewtonParams::default());
    }

    #[test]
    fn reads_all_fields() {
        let params = parse(
            "f=z**4+-+1&df=4*z**3&width=300&height=250&iters=20&tol=0.0001&zoom=1.5&x=0.5&y=-1&seed=9",
        )
        .to_params();
        assert_eq!(params.function, "z**4 - 1");
        assert_eq!(params.derivative.as_deref(), Some("4*z**3"));
        assert_eq!(
            params.size,
            Size {
                width: 300,
                height: 250
            }
        );
        assert_eq!(params.max_iter, 20);
        assert_eq!(params.tolerance, 1e-4);
        assert_eq!(params.bounds, Bounds::around(0.5, -1.0, 1.5));
        assert_eq!(params.seed, 9);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let params = parse("width=5&height=5000&iters=1&tol=1&zoom=0&x=100&y=-100").to_params();
        assert_eq!(
            params.size,
            Size {
                width: 200,
                height: 1000
            }
        );
        assert_eq!(params.max_iter, 10);
        assert_eq!(params.tolerance, 1e-3);
        assert_eq!(params.bounds, Bounds::around(5.0, -5.0, 0.1));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn blank_derivative_is_derived() {
        assert_eq!(parse("df=++").to_params().derivative, None);
    }

    #[test]
    fn non_finite_values_use_defaults() {
        let params = parse("tol=NaN&zoom=inf").to_params();
        assert_eq!(params.tolerance, NewtonParams::DEFAULT_TOLERANCE);
        assert_eq!(params.bounds, Bounds::around(0.0, 0.0, 2.0));
    }

    #[test]
    fn query_string_round_trips() {
        let params = parse("f=sin(z)&zoom=3&seed=4");
        assert_eq!(parse(&params.query_string()), params);
    }

    #[test]
    fn rejects_garbage_numbers() {
        assert!(serde_urlencoded::from_str::<WindowParams>("width=big").is_err());
    }
}

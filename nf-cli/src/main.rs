//! Render one Newton fractal to a PNG file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nf_core::{Bounds, NewtonParams, Size};
use nf_render::RenderServer;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Render the Newton fractal of a complex function")]
struct Args {
    /// f(z), e.g. "z**3 - 1" or "sin(z)".
    #[arg(default_value = NewtonParams::DEFAULT_FUNCTION)]
    function: String,

    /// f'(z). Derived from f when omitted.
    #[arg(short, long)]
    derivative: Option<String>,

    #[arg(long, default_value_t = 600)]
    width: usize,
    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Maximum number of Newton passes per point.
    #[arg(short = 'n', long, default_value_t = NewtonParams::DEFAULT_MAX_ITER)]
    max_iter: usize,

    /// Distance to a root at which a point counts as converged.
    #[arg(short, long, default_value_t = NewtonParams::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Half-width of the view.
    #[arg(short, long, default_value_t = 2.0)]
    zoom: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_y: f64,

    /// Seed for the root colors.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Render threads; defaults to one per core.
    #[arg(long)]
    threads: Option<usize>,

    #[arg(short, long, default_value = "newton_fractal.png")]
    output: PathBuf,
}

impl Args {
    fn to_params(&self) -> NewtonParams {
        NewtonParams {
            function: self.function.clone(),
            derivative: self.derivative.clone(),
            size: Size {
                width: self.width,
                height: self.height,
            },
            bounds: Bounds::around(self.center_x, self.center_y, self.zoom),
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            seed: self.seed,
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let server = match args.threads {
        Some(threads) => RenderServer::with_threads(threads)?,
        None => RenderServer::new()?,
    };
    let rendered = server
        .render_blocking(args.to_params())
        .map_err(|err| err.to_string())?;

    let rendering = &rendered.rendering;
    tracing::info!(
        "f(z) = {}, f'(z) = {}",
        rendering.function,
        rendering.derivative
    );
    for (i, root) in rendering.roots.iter().enumerate() {
        tracing::info!("root {}: {}", i + 1, root);
    }
    tracing::info!(
        "{} of {} points unclassified",
        rendering.classification.unclassified(),
        args.width * args.height
    );

    rendered
        .image
        .save_with_format(&args.output, image::ImageFormat::Png)
        .map_err(|err| format!("could not write {}: {}", args.output.display(), err))?;
    tracing::info!("wrote {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library() {
        let args = Args::try_parse_from(["nf-cli"]).unwrap();
        assert_eq!(args.to_params(), NewtonParams::default());
        assert_eq!(args.output, PathBuf::from("newton_fractal.png"));
    }

    #[test]
    fn view_from_center_and_zoom() {
        let args = Args::try_parse_from([
            "nf-cli",
            "sin(z)",
            "--center-x",
            "-1.5",
            "--center-y",
            "0.5",
            "-z",
            "0.5",
            "-d",
            "cos(z)",
        ])
        .unwrap();
        let params = args.to_params();
        assert_eq!(params.function, "sin(z)");
        assert_eq!(params.derivative.as_deref(), Some("cos(z)"));
        assert_eq!(params.bounds, Bounds::around(-1.5, 0.5, 0.5));
    }

    #[test]
    fn writes_png() {
        let output = std::env::temp_dir().join(format!("nf-cli-test-{}.png", std::process::id()));
        let args = Args::try_parse_from([
            "nf-cli",
            "z**3 - 1",
            "--width",
            "8",
            "--height",
            "6",
            "--threads",
            "1",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(&args).unwrap();
        let img = image::open(&output).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
        std::fs::remove_file(&output).unwrap();
    }

    #[test]
    fn bad_function_fails() {
        let args = Args::try_parse_from(["nf-cli", "z ** ", "--width", "4", "--height", "4"]).unwrap();
        assert!(run(&args).unwrap_err().contains("invalid function expression"));
    }
}

//! The sample points of a run.

use num::complex::Complex64;

use crate::{Bounds, Size};

/// `size.height` rows of `size.width` evenly spaced points covering `bounds`, endpoints
/// included. Row-major: row 0 is `y_min`, column 0 is `x_min`.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleGrid {
    size: Size,
    points: Vec<Complex64>,
}

impl SampleGrid {
    pub fn new(size: Size, bounds: &Bounds) -> Self {
        let xs = linspace(bounds.x_min, bounds.x_max, size.width);
        let ys = linspace(bounds.y_min, bounds.y_max, size.height);
        let points = ys
            .iter()
            .flat_map(|y| xs.iter().map(move |x| Complex64::new(*x, *y)))
            .collect();
        SampleGrid { size, points }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// All points, row by row.
    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Complex64> {
        if col >= self.size.width {
            return None;
        }
        self.points.get(row * self.size.width + col).copied()
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|k| start + k as f64 * step).collect();
            // Land exactly on the end, whatever the rounding in `step`.
            values[n - 1] = end;
            values
        }
    }
}

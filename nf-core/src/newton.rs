//! Newton's method over a grid of starting points.
//!
//! Each point `z` is stepped by `z - f(z)/f'(z)`. After each step the point is compared
//! against the known roots in order; the first root within tolerance claims it, and the
//! point keeps that root for the rest of the run. Points that never land within tolerance
//! of a root (including those that hit `f'(z) = 0` and go non-finite) stay unclassified.

use num::complex::Complex64;
use rayon::prelude::*;

use crate::grid::SampleGrid;
use crate::Size;

/// The root a point converged to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Zero {
    /// Position of the root in the root list (0-based).
    pub zero: usize,
    /// The pass (0-based) after which the point was within tolerance of the root.
    pub count: usize,
}

/// Per-point result of a run, as two parallel row-major arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    size: Size,
    root_index: Vec<usize>,
    iter_at: Vec<usize>,
}

impl Classification {
    /// All points unclassified.
    pub fn new(size: Size) -> Self {
        Classification {
            size,
            root_index: vec![0; size.area()],
            iter_at: vec![0; size.area()],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// 1-based root index per point; 0 means unclassified.
    pub fn root_index(&self) -> &[usize] {
        &self.root_index
    }

    /// Pass at which each point was classified; meaningless where `root_index` is 0.
    pub fn iter_at(&self) -> &[usize] {
        &self.iter_at
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Zero> {
        if col >= self.size.width {
            return None;
        }
        let i = row * self.size.width + col;
        match *self.root_index.get(i)? {
            0 => None,
            index => Some(Zero {
                zero: index - 1,
                count: self.iter_at[i],
            }),
        }
    }

    /// Per-point results, row by row.
    pub fn zeros(&self) -> impl Iterator<Item = Option<Zero>> + '_ {
        self.root_index
            .iter()
            .zip(&self.iter_at)
            .map(|(index, count)| match index {
                0 => None,
                index => Some(Zero {
                    zero: index - 1,
                    count: *count,
                }),
            })
    }

    pub fn unclassified(&self) -> usize {
        self.root_index.iter().filter(|i| **i == 0).count()
    }
}

/// Run Newton's method from every point of `grid` for up to `max_iter` passes.
///
/// A point is classified to root `j` at pass `i` when, after the `i`th step, it is within
/// `tolerance` of `roots[j]` and no earlier root (or earlier pass) claimed it.
/// Rows are evaluated in parallel on the current rayon pool.
pub fn iterate<F, D>(
    f: F,
    f_prime: D,
    grid: &SampleGrid,
    roots: &[Complex64],
    max_iter: usize,
    tolerance: f64,
) -> Classification
where
    F: Fn(Complex64) -> Complex64 + Sync,
    D: Fn(Complex64) -> Complex64 + Sync,
{
    let size = grid.size();
    let mut out = Classification::new(size);
    if size.width == 0 {
        return out;
    }

    grid.points()
        .par_chunks(size.width)
        .zip(out.root_index.par_chunks_mut(size.width))
        .zip(out.iter_at.par_chunks_mut(size.width))
        .for_each(|((row, index_row), iter_row)| {
            for ((z, index), iter) in row.iter().zip(index_row).zip(iter_row) {
                if let Some(Zero { zero, count }) =
                    find_zero(&f, &f_prime, *z, roots, max_iter, tolerance)
                {
                    *index = zero + 1;
                    *iter = count;
                }
            }
        });

    out
}

/// Follows one point until it is within `tolerance` of a root, or `limit` passes.
///
/// Stopping once classified doesn't change the outcome: later passes can't reclassify.
#[inline]
fn find_zero<F, D>(
    f: &F,
    f_prime: &D,
    start: Complex64,
    roots: &[Complex64],
    limit: usize,
    tolerance: f64,
) -> Option<Zero>
where
    F: Fn(Complex64) -> Complex64,
    D: Fn(Complex64) -> Complex64,
{
    let mut z = start;
    for i in 0..limit {
        z -= f(z) / f_prime(z);
        // NaN compares false, so non-finite points never match.
        if let Some(j) = roots.iter().position(|r| (z - *r).norm() < tolerance) {
            return Some(Zero { zero: j, count: i });
        }
    }
    None
}

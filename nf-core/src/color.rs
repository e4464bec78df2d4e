//! Coloring a classification.
//!
//! Each root gets a base color; a point that converged to it is drawn in that color, dimmed
//! linearly by how many passes it took. Unclassified points are black.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::newton::{Classification, Zero};
use crate::Size;

/// Red, green, blue, each in `[0, 1]`.
pub type Rgb = [f64; 3];

pub const BLACK: Rgb = [0.0, 0.0, 0.0];

/// `count` pseudo-random base colors drawn from a generator seeded with `seed`.
///
/// The same seed gives the same sequence, and a longer table extends a shorter one.
pub fn base_colors(count: usize, seed: u64) -> Vec<Rgb> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()])
        .collect()
}

/// An image as rows of RGB triples, in the same layout as the classification it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbGrid {
    size: Size,
    pixels: Vec<Rgb>,
}

impl RgbGrid {
    pub fn size(&self) -> Size {
        self.size
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Rgb> {
        if col >= self.size.width {
            return None;
        }
        self.pixels.get(row * self.size.width + col).copied()
    }
}

/// Color every point: `base * (1 - count / max_iter)` for classified points, black otherwise.
///
/// Roots without an entry in `base_colors` are drawn black.
pub fn colorize(classification: &Classification, max_iter: usize, base_colors: &[Rgb]) -> RgbGrid {
    let limit = max_iter.max(1) as f64;
    let pixels = classification
        .zeros()
        .map(|zero| match zero {
            None => BLACK,
            Some(Zero { zero, count }) => match base_colors.get(zero) {
                None => BLACK,
                Some(base) => {
                    let brightness = 1.0 - count as f64 / limit;
                    base.map(|channel| channel * brightness)
                }
            },
        })
        .collect();
    RgbGrid {
        size: classification.size(),
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SampleGrid;
    use crate::newton::iterate;
    use crate::Bounds;
    use num::complex::Complex64;

    #[test]
    fn base_colors_are_seeded() {
        let a = base_colors(3, 0);
        assert_eq!(a, base_colors(3, 0));
        assert_ne!(a, base_colors(3, 1));
        assert_eq!(&base_colors(5, 0)[..3], &a[..]);
        assert!(a.iter().flatten().all(|c| (0.0..1.0).contains(c)));
        assert!(base_colors(0, 0).is_empty());
    }

    /// A 4x2 classification. From the left half, one step lands each point on the root
    /// sharing its imaginary part; the right half divides by f' = 0.
    fn strip() -> Classification {
        let grid = SampleGrid::new(
            Size {
                width: 4,
                height: 2,
            },
            &Bounds {
                x_min: 0.0,
                x_max: 3.0,
                y_min: 0.0,
                y_max: 1.0,
            },
        );
        iterate(
            |z: Complex64| z - Complex64::new(1.0, z.im),
            |z: Complex64| {
                if z.re < 1.5 {
                    Complex64::new(1.0, 0.0)
                } else {
                    Complex64::new(0.0, 0.0)
                }
            },
            &grid,
            &[Complex64::new(1.0, 0.0), Complex64::new(1.0, 1.0)],
            10,
            1e-8,
        )
    }

    #[test]
    fn unclassified_points_are_black() {
        let classes = strip();
        let colors = colorize(&classes, 10, &base_colors(2, 0));
        for (zero, rgb) in classes.zeros().zip(colors.pixels()) {
            if zero.is_none() {
                assert_eq!(*rgb, BLACK);
            }
        }
        assert_eq!(colors.get(0, 3), Some(BLACK));
    }

    #[test]
    fn first_pass_gets_full_base_color() {
        let classes = strip();
        let bases = base_colors(2, 7);
        let colors = colorize(&classes, 10, &bases);
        assert_eq!(colors.get(0, 0), Some(bases[0]));
        // Row 1 sits at im = 1 and reaches the second root.
        assert_eq!(colors.get(1, 0), Some(bases[1]));
        assert_eq!(colors.size(), classes.size());
    }

    #[test]
    fn slower_convergence_is_darker() {
        let max_iter = 10;
        let base = [0.8, 0.4, 0.2];
        let brightness = |count: usize| {
            let classes = single_point(count);
            colorize(&classes, max_iter, &[base]).pixels()[0]
        };
        let fast = brightness(0);
        let slow = brightness(max_iter - 1);
        assert_eq!(fast, base);
        for k in 0..3 {
            assert!(fast[k] > slow[k]);
            assert!(slow[k] > 0.0);
        }
    }

    /// A 2x2 classification whose first point reached root 0 at pass `count`.
    fn single_point(count: usize) -> Classification {
        // z -> z/2 halves the distance to 0 every pass; start where it lands in tolerance
        // after exactly `count + 1` steps.
        let tolerance = 1e-3;
        let start = 1.5 * tolerance * 2f64.powi(count as i32);
        let grid = SampleGrid::new(
            Size {
                width: 2,
                height: 2,
            },
            &Bounds {
                x_min: start,
                x_max: start + 10.0,
                y_min: 0.0,
                y_max: 10.0,
            },
        );
        let classes = iterate(
            |z| z,
            |_| Complex64::new(2.0, 0.0),
            &grid,
            &[Complex64::new(0.0, 0.0)],
            count + 1,
            tolerance,
        );
        assert_eq!(classes.get(0, 0), Some(Zero { zero: 0, count }));
        classes
    }
}

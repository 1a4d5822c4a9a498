//! Ordinary least-squares line fitting.
//!
//! Every smoothing routine reduces to fitting a line through the dominant
//! cluster of a filament's measurements and evaluating it over the full
//! segment range. The fit solves the normal equations for the design matrix
//! `[1, x]` directly; two points are the minimum and callers guarantee it.

use nalgebra::{Matrix2, Vector2};

/// Slope/intercept pair of a fitted line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    /// Evaluates the line at one point.
    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Evaluates the line elementwise.
    pub fn evaluate(&self, xs: impl IntoIterator<Item = f64>) -> Vec<f64> {
        xs.into_iter().map(|x| self.at(x)).collect()
    }
}

/// Least-squares line through the `(x, y)` pairs via the normal equations.
///
/// Requires `x.len() == y.len()` and at least two distinct abscissae; the
/// result is unspecified otherwise (callers in this crate always fit against
/// a strictly increasing rank axis).
pub fn fit_line(x: &[f64], y: &[f64]) -> LineFit {
    debug_assert_eq!(x.len(), y.len());
    debug_assert!(x.len() >= 2, "line fit requires at least two points");

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_xx: f64 = x.iter().map(|v| v * v).sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();

    let normal = Matrix2::new(n, sum_x, sum_x, sum_xx);
    let rhs = Vector2::new(sum_y, sum_xy);
    let beta = normal
        .lu()
        .solve(&rhs)
        .unwrap_or_else(|| Vector2::new(sum_y / n, 0.0));

    LineFit {
        intercept: beta[0],
        slope: beta[1],
    }
}

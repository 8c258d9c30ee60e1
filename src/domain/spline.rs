//! Not-a-knot cubic spline with polynomial extrapolation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    #[error("need at least 2 points, got {0}")]
    InsufficientPoints(usize),

    #[error("xs and ys differ in length: {xs} vs {ys}")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("x values must be strictly increasing")]
    NotIncreasing,

    #[error("spline system is singular")]
    Singular,
}

/// Piecewise cubic through every knot, C2-continuous, with the third
/// derivative also continuous across the second and penultimate knots.
///
/// Two points give the straight line through them and three points give the
/// interpolating parabola. Outside `[xs[0], xs[n-1]]` the end pieces are
/// evaluated as-is, so extrapolation is always enabled.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
}

impl CubicSpline {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, SplineError> {
        if xs.len() != ys.len() {
            return Err(SplineError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(SplineError::InsufficientPoints(xs.len()));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SplineError::NotIncreasing);
        }

        let y2s = match xs.len() {
            2 => vec![0.0; 2],
            3 => {
                let d0 = (ys[1] - ys[0]) / (xs[1] - xs[0]);
                let d1 = (ys[2] - ys[1]) / (xs[2] - xs[1]);
                vec![2.0 * (d1 - d0) / (xs[2] - xs[0]); 3]
            }
            _ => not_a_knot_second_derivatives(&xs, &ys)?,
        };

        Ok(Self { xs, ys, y2s })
    }

    /// Finds the index i such that xs[i] <= x < xs[i+1], clamped to the end pieces.
    fn find_segment(&self, x: f64) -> usize {
        let last = self.xs.len() - 2;
        match self
            .xs
            .binary_search_by(|knot| knot.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => i.min(last),
            Err(i) => i.saturating_sub(1).min(last),
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let i = self.find_segment(x);

        let x_lo = self.xs[i];
        let x_hi = self.xs[i + 1];
        let h = x_hi - x_lo;
        let a = (x_hi - x) / h;
        let b = (x - x_lo) / h;

        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h) / 6.0
    }
}

/// Solves the n x n system for knot second derivatives. Interior rows are the
/// usual C2 conditions; the first and last rows equate the third derivative
/// of neighbouring pieces.
fn not_a_knot_second_derivatives(xs: &[f64], ys: &[f64]) -> Result<Vec<f64>, SplineError> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    let mut a = vec![vec![0.0; n]; n];
    let mut rhs = vec![0.0; n];

    a[0][0] = h[1];
    a[0][1] = -(h[0] + h[1]);
    a[0][2] = h[0];

    for i in 1..n - 1 {
        a[i][i - 1] = h[i - 1];
        a[i][i] = 2.0 * (h[i - 1] + h[i]);
        a[i][i + 1] = h[i];
        rhs[i] = 6.0 * (slope[i] - slope[i - 1]);
    }

    a[n - 1][n - 3] = h[n - 2];
    a[n - 1][n - 2] = -(h[n - 3] + h[n - 2]);
    a[n - 1][n - 1] = h[n - 3];

    solve_dense(a, rhs)
}

/// Gaussian elimination with partial pivoting.
fn solve_dense(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, SplineError> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .ok_or(SplineError::Singular)?;
        if a[pivot][col].abs() < 1e-14 {
            return Err(SplineError::Singular);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

//! Resampling of annual rate curves onto the fixed quarterly maturity grid.

use crate::domain::error::CdsError;
use crate::domain::rate_curve::{CurveRow, RateCurve};
use crate::domain::spline::{CubicSpline, SplineError};
use chrono::NaiveDate;

pub const QUARTERS_PER_YEAR: usize = 4;
pub const QUARTER: f64 = 0.25;
/// Longest maturity on the quarterly grid, in years.
pub const MAX_MATURITY_YEARS: usize = 30;
pub const GRID_LEN: usize = MAX_MATURITY_YEARS * QUARTERS_PER_YEAR;

/// Maturities 0.25, 0.50, ..., 30.00.
pub fn quarterly_grid() -> Vec<f64> {
    (1..=GRID_LEN).map(grid_maturity).collect()
}

/// Maturity in years of the 1-based grid point `quarter`.
pub fn grid_maturity(quarter: usize) -> f64 {
    quarter as f64 * QUARTER
}

/// Rate curve sampled on [`quarterly_grid`]. Every row holds exactly
/// [`GRID_LEN`] values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuarterlyRateCurve {
    rows: Vec<CurveRow>,
}

impl QuarterlyRateCurve {
    /// Builds a curve from pre-sampled rows, sorted by date.
    pub fn from_rows(mut rows: Vec<CurveRow>) -> Result<Self, CdsError> {
        if let Some(bad) = rows.iter().find(|r| r.values.len() != GRID_LEN) {
            return Err(CdsError::InvalidData {
                source_name: "quarterly curve".into(),
                reason: format!(
                    "row {} has {} values, expected {}",
                    bad.date,
                    bad.values.len(),
                    GRID_LEN
                ),
            });
        }
        rows.sort_by_key(|r| r.date);
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CurveRow] {
        &self.rows
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }

    pub fn maturities(&self) -> Vec<f64> {
        quarterly_grid()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fits a spline per date through `(maturity, rate)` and evaluates it on the
/// quarterly grid. Maturities outside the observed range are extrapolated.
pub fn extrapolate_rates(curve: &RateCurve) -> Result<QuarterlyRateCurve, CdsError> {
    let grid = quarterly_grid();
    let mut rows = Vec::with_capacity(curve.rows.len());

    for row in &curve.rows {
        let spline = CubicSpline::new(curve.maturities.clone(), row.values.clone())
            .map_err(|e| spline_error(row.date, curve.maturities.len(), e))?;

        rows.push(CurveRow {
            date: row.date,
            values: grid.iter().map(|&m| spline.evaluate(m)).collect(),
        });
    }

    tracing::debug!(dates = rows.len(), "resampled rate curves to quarterly grid");
    Ok(QuarterlyRateCurve { rows })
}

fn spline_error(date: NaiveDate, points: usize, err: SplineError) -> CdsError {
    match err {
        SplineError::InsufficientPoints(_) => CdsError::InsufficientCurvePoints { date, points },
        other => CdsError::InvalidData {
            source_name: "rate curve".into(),
            reason: format!("spline fit failed on {date}: {other}"),
        },
    }
}

//! Quarterly discount factors.

use crate::domain::error::CdsError;
use crate::domain::period::DateRange;
use crate::domain::quarterly_curve::{
    QUARTERS_PER_YEAR, QuarterlyRateCurve, extrapolate_rates, grid_maturity, quarterly_grid,
};
use crate::domain::rate_curve::{CurveRow, RawRateTable, process_rates};
use chrono::NaiveDate;

/// `exp(-(m * rate) / 4)` for maturity `m` in years.
pub fn discount_factor(rate: f64, maturity: f64) -> f64 {
    (-(maturity * rate) / QUARTERS_PER_YEAR as f64).exp()
}

/// Discount factors on the quarterly grid, one row per curve date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountCurve {
    rows: Vec<CurveRow>,
}

impl DiscountCurve {
    pub fn rows(&self) -> &[CurveRow] {
        &self.rows
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

    /// Factors for `date`, indexed by grid position (0 is 0.25y).
    pub fn on(&self, date: NaiveDate) -> Option<&[f64]> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| self.rows[i].values.as_slice())
    }
}

/// Converts every quarterly rate into its discount factor.
pub fn discount_factors(rates: &QuarterlyRateCurve) -> DiscountCurve {
    let rows = rates
        .rows()
        .iter()
        .map(|row| CurveRow {
            date: row.date,
            values: row
                .values
                .iter()
                .enumerate()
                .map(|(i, &rate)| discount_factor(rate, grid_maturity(i + 1)))
                .collect(),
        })
        .collect();
    DiscountCurve { rows }
}

/// Runs the curve stages end to end: normalise, resample, discount.
///
/// An empty window yields an empty curve, which callers detect with
/// [`DiscountCurve::is_empty`].
pub fn calc_discount(raw: &RawRateTable, range: DateRange) -> Result<DiscountCurve, CdsError> {
    let rates = process_rates(raw, range)?;
    if rates.is_empty() {
        return Ok(DiscountCurve::default());
    }
    let quarterly = extrapolate_rates(&rates)?;
    let discount = discount_factors(&quarterly);
    tracing::info!(dates = discount.len(), %range, "built discount curve");
    Ok(discount)
}

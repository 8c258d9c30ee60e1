//! He-Kelly CDS returns: hazard, survival, risky duration and period return.

use crate::domain::config::ReturnConfig;
use crate::domain::discount::DiscountCurve;
use crate::domain::portfolio::{Portfolio, PortfolioKey, Portfolios};
use crate::domain::quarterly_curve::{QUARTER, QUARTERS_PER_YEAR, grid_maturity};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// `4 ln(1 + s / (4 LGD))`: flat default intensity implied by a par spread
/// under quarterly premium payments.
pub fn hazard_rate(spread: f64, loss_given_default: f64) -> f64 {
    let q = QUARTERS_PER_YEAR as f64;
    q * (1.0 + spread / (q * loss_given_default)).ln()
}

/// Survival probabilities at 0.25, 0.50, ... for `quarters` steps under a
/// flat hazard.
pub fn survival_curve(hazard: f64, quarters: usize) -> Vec<f64> {
    (1..=quarters)
        .map(|q| (-grid_maturity(q) * hazard).exp())
        .collect()
}

/// `0.25 * sum(discount * survival)` over the shorter of the two grids.
pub fn risky_duration(discount: &[f64], survival: &[f64]) -> f64 {
    QUARTER
        * discount
            .iter()
            .zip(survival)
            .map(|(d, s)| d * s)
            .sum::<f64>()
}

/// Carry over one period plus the spread change marked at last period's
/// risky duration.
pub fn cds_return(prev_spread: f64, spread: f64, prev_risky_duration: f64, trading_days: f64) -> f64 {
    prev_spread / trading_days + (spread - prev_spread) * prev_risky_duration
}

/// Discount rows matched to `dates`, with gaps back-filled from the next
/// matched date and any trailing gap forward-filled from the last one.
/// Returns the rows and the number of filled dates.
pub fn align_discount<'a>(
    dates: &[NaiveDate],
    curve: &'a DiscountCurve,
) -> (Vec<Option<&'a [f64]>>, usize) {
    let mut rows: Vec<Option<&[f64]>> = dates.iter().map(|&d| curve.on(d)).collect();
    let missing = rows.iter().filter(|r| r.is_none()).count();

    let mut next = None;
    for row in rows.iter_mut().rev() {
        match row {
            Some(r) => next = Some(*r),
            None => *row = next,
        }
    }
    let mut prev = None;
    for row in rows.iter_mut() {
        match row {
            Some(r) => prev = Some(*r),
            None => *row = prev,
        }
    }

    let unfilled = rows.iter().filter(|r| r.is_none()).count();
    (rows, missing - unfilled)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnObservation {
    pub date: NaiveDate,
    pub value: f64,
    pub spread: f64,
    pub hazard: f64,
    /// Risky duration on `date`, used by the following period's return.
    pub risky_duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReturns {
    pub key: PortfolioKey,
    pub returns: Vec<ReturnObservation>,
    /// Spread dates with a discount curve of their own.
    pub aligned_dates: usize,
    /// Spread dates that borrowed a neighbouring discount curve.
    pub filled_dates: usize,
}

impl PortfolioReturns {
    pub fn values(&self) -> Vec<f64> {
        self.returns.iter().map(|r| r.value).collect()
    }
}

/// Returns for one portfolio. The first date, and any date whose previous
/// date has no risky duration, produces no return.
pub fn calc_portfolio_returns(
    portfolio: &Portfolio,
    discount: &DiscountCurve,
    config: &ReturnConfig,
) -> PortfolioReturns {
    let quarters = config.horizon_quarters();
    let dates: Vec<NaiveDate> = portfolio.observations.iter().map(|o| o.date).collect();
    let (aligned, filled_dates) = align_discount(&dates, discount);
    let aligned_dates = dates.len() - aligned.iter().filter(|r| r.is_none()).count() - filled_dates;

    if aligned_dates == 0 && !dates.is_empty() {
        tracing::warn!(portfolio = %portfolio.key, "no discount curve dates overlap portfolio");
    } else if filled_dates > 0 {
        tracing::debug!(portfolio = %portfolio.key, filled_dates, "filled discount curve gaps");
    }

    let per_date: Vec<(f64, Option<f64>)> = portfolio
        .observations
        .iter()
        .zip(&aligned)
        .map(|(obs, row)| {
            let hazard = hazard_rate(obs.spread, config.loss_given_default);
            let rd = row.map(|r| {
                let horizon = &r[..quarters.min(r.len())];
                risky_duration(horizon, &survival_curve(hazard, horizon.len()))
            });
            (hazard, rd)
        })
        .collect();

    let mut returns = Vec::with_capacity(dates.len().saturating_sub(1));
    for i in 1..portfolio.observations.len() {
        let prev = &portfolio.observations[i - 1];
        let obs = &portfolio.observations[i];
        let (Some(prev_rd), (hazard, rd)) = (per_date[i - 1].1, per_date[i]) else {
            continue;
        };
        returns.push(ReturnObservation {
            date: obs.date,
            value: cds_return(prev.spread, obs.spread, prev_rd, config.trading_days),
            spread: obs.spread,
            hazard,
            risky_duration: rd.unwrap_or(f64::NAN),
        });
    }

    PortfolioReturns {
        key: portfolio.key,
        returns,
        aligned_dates,
        filled_dates,
    }
}

/// Runs [`calc_portfolio_returns`] over every portfolio.
pub fn calc_cds_returns(
    portfolios: &Portfolios,
    discount: &DiscountCurve,
    config: &ReturnConfig,
) -> BTreeMap<PortfolioKey, PortfolioReturns> {
    portfolios
        .iter()
        .map(|p| {
            tracing::debug!(portfolio = %p.key, dates = p.observations.len(), "computing returns");
            (p.key, calc_portfolio_returns(p, discount, config))
        })
        .collect()
}

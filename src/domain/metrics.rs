//! Summary statistics of a portfolio return series.

use super::returns::{PortfolioReturns, ReturnObservation};

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSummary {
    pub observations: usize,
    pub mean: f64,
    /// Sample standard deviation, 0 for fewer than two returns.
    pub volatility: f64,
    pub annualized_mean: f64,
    pub annualized_volatility: f64,
    pub min: f64,
    pub max: f64,
}

impl ReturnSummary {
    pub fn compute(returns: &PortfolioReturns, periods_per_year: f64) -> Self {
        Self::from_observations(&returns.returns, periods_per_year)
    }

    pub fn from_observations(returns: &[ReturnObservation], periods_per_year: f64) -> Self {
        let values: Vec<f64> = returns.iter().map(|r| r.value).collect();
        let n = values.len();

        if n == 0 {
            return Self {
                observations: 0,
                mean: 0.0,
                volatility: 0.0,
                annualized_mean: 0.0,
                annualized_volatility: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let volatility = variance.sqrt();

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            observations: n,
            mean,
            volatility,
            annualized_mean: mean * periods_per_year,
            annualized_volatility: volatility * periods_per_year.sqrt(),
            min,
            max,
        }
    }
}

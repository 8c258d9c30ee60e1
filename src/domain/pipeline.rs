//! End-to-end run: curve stages and quote stages feeding the return stage.

use crate::domain::cds_quote::RawCdsQuote;
use crate::domain::cleaning::{CleaningReport, clean_quotes};
use crate::domain::config::PipelineConfig;
use crate::domain::credit_quantile::{CreditQuantiles, assign_credit_quantiles};
use crate::domain::discount::{DiscountCurve, calc_discount};
use crate::domain::error::CdsError;
use crate::domain::portfolio::{
    MonthlyTenorSpread, PortfolioKey, Portfolios, build_portfolios, monthly_tenor_spreads,
};
use crate::domain::rate_curve::RawRateTable;
use crate::domain::returns::{PortfolioReturns, calc_cds_returns};
use crate::ports::data_port::DataPort;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub cleaning: CleaningReport,
    pub quantiles: CreditQuantiles,
    pub portfolios: Portfolios,
    pub monthly_spreads: Vec<MonthlyTenorSpread>,
    pub discount: DiscountCurve,
    pub returns: BTreeMap<PortfolioKey, PortfolioReturns>,
}

impl PipelineOutput {
    pub fn return_count(&self) -> usize {
        self.returns.values().map(|r| r.returns.len()).sum()
    }
}

/// Builds the portfolios from raw quotes without touching the rate curve.
pub fn build_portfolio_stage(
    raw_quotes: &[RawCdsQuote],
    config: &PipelineConfig,
) -> (CleaningReport, CreditQuantiles, Portfolios) {
    let cleaned = clean_quotes(raw_quotes, config.quote_range);
    let quantiles = assign_credit_quantiles(&cleaned.quotes, &config.bucketing);
    let portfolios = build_portfolios(&cleaned.quotes, &quantiles, &config.bucketing);
    (cleaned.report, quantiles, portfolios)
}

pub fn run_pipeline(
    raw_rates: &RawRateTable,
    raw_quotes: &[RawCdsQuote],
    config: &PipelineConfig,
) -> Result<PipelineOutput, CdsError> {
    let discount = calc_discount(raw_rates, config.rate_range)?;
    if discount.is_empty() {
        tracing::warn!(range = %config.rate_range, "discount curve is empty");
    }

    let (cleaning, quantiles, portfolios) = build_portfolio_stage(raw_quotes, config);
    tracing::info!(
        portfolios = portfolios.len(),
        observations = portfolios.observation_count(),
        "formed portfolios"
    );

    let monthly_spreads = monthly_tenor_spreads(&portfolios);
    let returns = calc_cds_returns(&portfolios, &discount, &config.returns);

    Ok(PipelineOutput {
        cleaning,
        quantiles,
        portfolios,
        monthly_spreads,
        discount,
        returns,
    })
}

/// Loads both inputs through `data_port`, then runs [`run_pipeline`].
pub fn run_from_port(
    data_port: &dyn DataPort,
    config: &PipelineConfig,
) -> Result<PipelineOutput, CdsError> {
    let raw_rates = data_port.load_rate_table()?;
    tracing::info!(
        columns = raw_rates.columns.len(),
        rows = raw_rates.rows.len(),
        "loaded rate table"
    );
    let raw_quotes = data_port.load_cds_quotes()?;
    tracing::info!(rows = raw_quotes.len(), "loaded CDS quotes");
    run_pipeline(&raw_rates, &raw_quotes, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cds_quote::Tenor;
    use crate::domain::credit_quantile::CreditQuantile;
    use crate::domain::period::YearMonth;
    use crate::domain::rate_curve::RawRateRow;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rates(dates: &[NaiveDate]) -> RawRateTable {
        RawRateTable {
            columns: vec!["SVENY01".into(), "SVENY05".into(), "SVENY10".into()],
            rows: dates
                .iter()
                .map(|&d| RawRateRow {
                    date: d,
                    values: vec![Some(3.0), Some(4.0), Some(5.0)],
                })
                .collect(),
        }
    }

    fn quote(ticker: &str, d: NaiveDate, spread: f64) -> RawCdsQuote {
        RawCdsQuote {
            ticker: ticker.into(),
            date: d,
            tenor: Tenor::years(5),
            parspread: Some(spread),
        }
    }

    fn five_names(dates: &[NaiveDate]) -> Vec<RawCdsQuote> {
        let mut quotes = Vec::new();
        for &d in dates {
            for (i, t) in ["A", "B", "C", "D", "E"].iter().enumerate() {
                quotes.push(quote(t, d, 0.01 * (i + 1) as f64));
            }
        }
        quotes
    }

    #[test]
    fn five_names_fill_five_buckets() {
        let dates = [date(2005, 1, 3), date(2005, 1, 4)];
        let config = PipelineConfig::new(date(2005, 1, 1), date(2005, 1, 31));
        let output = run_pipeline(&rates(&dates), &five_names(&dates), &config).unwrap();

        let jan = YearMonth::of(dates[0]);
        for (i, t) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            assert_eq!(output.quantiles.get(t, jan), Some(CreditQuantile(i as u8 + 1)));
        }
        assert_eq!(output.portfolios.len(), 5);
        assert_eq!(output.returns.len(), 5);
        assert_eq!(output.return_count(), 5);
        assert_eq!(output.discount.len(), 2);
        assert_eq!(output.cleaning.retained, 10);

        let q3 = &output.returns[&PortfolioKey::new(Tenor::years(5), 3)];
        assert_eq!(q3.returns.len(), 1);
        assert_eq!(q3.returns[0].date, dates[1]);
        // unchanged spread: carry only
        assert!((q3.returns[0].value - 0.03 / 250.0).abs() < 1e-15);
    }

    #[test]
    fn empty_rate_window_gives_no_returns() {
        let dates = [date(2005, 1, 3), date(2005, 1, 4)];
        let mut config = PipelineConfig::new(date(2005, 1, 1), date(2005, 1, 31));
        config.rate_range = crate::domain::period::DateRange::new(date(1990, 1, 1), date(1990, 12, 31));

        let output = run_pipeline(&rates(&dates), &five_names(&dates), &config).unwrap();
        assert!(output.discount.is_empty());
        assert_eq!(output.portfolios.len(), 5);
        assert_eq!(output.return_count(), 0);
    }

    #[test]
    fn portfolio_stage_runs_without_rates() {
        let dates = [date(2005, 1, 3)];
        let config = PipelineConfig::new(date(2005, 1, 1), date(2005, 1, 31));
        let (report, quantiles, portfolios) = build_portfolio_stage(&five_names(&dates), &config);
        assert_eq!(report.input_rows, 5);
        assert_eq!(quantiles.len(), 5);
        assert_eq!(portfolios.observation_count(), 5);
    }
}

//! Tenor x credit-quantile portfolios of representative par spreads.

use crate::domain::cds_quote::{CdsQuote, Tenor};
use crate::domain::config::BucketingConfig;
use crate::domain::credit_quantile::{CreditQuantile, CreditQuantiles};
use crate::domain::error::CdsError;
use crate::domain::period::YearMonth;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifies a portfolio. Displays as `5Y_Q3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortfolioKey {
    pub tenor: Tenor,
    pub quantile: CreditQuantile,
}

impl PortfolioKey {
    pub fn new(tenor: Tenor, quantile: u8) -> Self {
        Self {
            tenor,
            quantile: CreditQuantile(quantile),
        }
    }
}

impl fmt::Display for PortfolioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_Q{}", self.tenor, self.quantile)
    }
}

impl FromStr for PortfolioKey {
    type Err = CdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CdsError::InvalidData {
            source_name: "portfolio key".into(),
            reason: format!("expected <tenor>_Q<n>, got '{s}'"),
        };
        let (tenor, quantile) = s.trim().split_once("_Q").ok_or_else(invalid)?;
        let quantile: u8 = quantile.parse().map_err(|_| invalid())?;
        if quantile == 0 {
            return Err(invalid());
        }
        Ok(Self::new(tenor.parse()?, quantile))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadObservation {
    pub date: NaiveDate,
    pub spread: f64,
}

/// Date-ordered representative spreads of one portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub key: PortfolioKey,
    pub observations: Vec<SpreadObservation>,
}

/// A representative spread replaced by the global mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Substitution {
    pub key: PortfolioKey,
    pub date: NaiveDate,
    pub original: f64,
    pub replacement: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Portfolios {
    pub portfolios: BTreeMap<PortfolioKey, Portfolio>,
    pub substitutions: Vec<Substitution>,
    /// Mean of all representative spreads before substitution.
    pub global_mean: Option<f64>,
}

impl Portfolios {
    pub fn get(&self, key: &PortfolioKey) -> Option<&Portfolio> {
        self.portfolios.get(key)
    }

    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Portfolio> {
        self.portfolios.values()
    }

    pub fn observation_count(&self) -> usize {
        self.iter().map(|p| p.observations.len()).sum()
    }
}

/// A quote with the bucket its ticker received for the quote's month.
#[derive(Debug, Clone, Copy)]
pub struct LabelledQuote<'a> {
    pub quote: &'a CdsQuote,
    pub quantile: Option<CreditQuantile>,
}

/// Gives every quote, whatever its tenor, the bucket its ticker received
/// from the bucketing tenor in that month.
pub fn label_quotes<'a>(quotes: &'a [CdsQuote], quantiles: &CreditQuantiles) -> Vec<LabelledQuote<'a>> {
    quotes
        .iter()
        .map(|quote| LabelledQuote {
            quote,
            quantile: quantiles.get(&quote.ticker, quote.year_month()),
        })
        .collect()
}

/// Mean spread per (portfolio, date) over labelled quotes in the configured
/// tenors and buckets.
pub fn representative_spreads(
    labelled: &[LabelledQuote<'_>],
    config: &BucketingConfig,
) -> BTreeMap<(PortfolioKey, NaiveDate), f64> {
    let buckets = 1..=config.bucket_count();
    let mut sums: BTreeMap<(PortfolioKey, NaiveDate), (f64, usize)> = BTreeMap::new();

    for lq in labelled {
        let Some(quantile) = lq.quantile else {
            continue;
        };
        if !config.tenors.contains(&lq.quote.tenor) || !buckets.contains(&quantile.0) {
            continue;
        }
        let key = PortfolioKey {
            tenor: lq.quote.tenor,
            quantile,
        };
        let entry = sums.entry((key, lq.quote.date)).or_insert((0.0, 0));
        entry.0 += lq.quote.parspread;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

/// Replaces every spread above `threshold` with the mean of all spreads,
/// taken before any replacement. Row count is unchanged.
pub fn fix_outliers(
    spreads: &mut BTreeMap<(PortfolioKey, NaiveDate), f64>,
    threshold: f64,
) -> (Vec<Substitution>, Option<f64>) {
    if spreads.is_empty() {
        return (Vec::new(), None);
    }
    let mean = spreads.values().sum::<f64>() / spreads.len() as f64;

    let mut substitutions = Vec::new();
    for (&(key, date), spread) in spreads.iter_mut() {
        if *spread > threshold {
            tracing::warn!(
                portfolio = %key,
                %date,
                original = *spread,
                replacement = mean,
                "representative spread above threshold replaced by global mean"
            );
            substitutions.push(Substitution {
                key,
                date,
                original: *spread,
                replacement: mean,
            });
            *spread = mean;
        }
    }
    (substitutions, Some(mean))
}

/// Labels quotes, averages them into portfolios and applies the outlier fix.
pub fn build_portfolios(
    quotes: &[CdsQuote],
    quantiles: &CreditQuantiles,
    config: &BucketingConfig,
) -> Portfolios {
    let labelled = label_quotes(quotes, quantiles);
    let mut spreads = representative_spreads(&labelled, config);
    let (substitutions, global_mean) = fix_outliers(&mut spreads, config.outlier_threshold);

    let mut portfolios: BTreeMap<PortfolioKey, Portfolio> = BTreeMap::new();
    for ((key, date), spread) in spreads {
        portfolios
            .entry(key)
            .or_insert_with(|| Portfolio {
                key,
                observations: Vec::new(),
            })
            .observations
            .push(SpreadObservation { date, spread });
    }

    if !substitutions.is_empty() {
        tracing::info!(
            count = substitutions.len(),
            "replaced outlier representative spreads"
        );
    }

    Portfolios {
        portfolios,
        substitutions,
        global_mean,
    }
}

/// Mean representative spread for one tenor in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTenorSpread {
    pub month: YearMonth,
    pub tenor: Tenor,
    pub spread: f64,
}

/// Averages representative spreads over all buckets and days of a month.
pub fn monthly_tenor_spreads(portfolios: &Portfolios) -> Vec<MonthlyTenorSpread> {
    let mut sums: BTreeMap<(YearMonth, Tenor), (f64, usize)> = BTreeMap::new();
    for p in portfolios.iter() {
        for obs in &p.observations {
            let entry = sums
                .entry((YearMonth::of(obs.date), p.key.tenor))
                .or_insert((0.0, 0));
            entry.0 += obs.spread;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|((month, tenor), (sum, n))| MonthlyTenorSpread {
            month,
            tenor,
            spread: sum / n as f64,
        })
        .collect()
}

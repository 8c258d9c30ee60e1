//! Monthly credit buckets from the cross-section of bucketing-tenor spreads.

use crate::domain::cds_quote::{CdsQuote, Tenor};
use crate::domain::config::{BucketingConfig, QuantileMethod};
use crate::domain::period::YearMonth;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Bucket label, 1 for the tightest spreads up to `breakpoints + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CreditQuantile(pub u8);

impl fmt::Display for CreditQuantile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The first bucketing-tenor spread a name printed in a month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySpread {
    pub ticker: String,
    pub year_month: YearMonth,
    pub parspread: f64,
}

/// Keeps, for every (ticker, month), the earliest-dated quote at `tenor`.
/// Same-day ties go to the quote that came first in `quotes`.
pub fn first_monthly_spreads(quotes: &[CdsQuote], tenor: Tenor) -> Vec<MonthlySpread> {
    let mut at_tenor: Vec<&CdsQuote> = quotes.iter().filter(|q| q.tenor == tenor).collect();
    at_tenor.sort_by_key(|q| q.date);

    let mut first: BTreeMap<(YearMonth, &str), f64> = BTreeMap::new();
    for q in at_tenor {
        first
            .entry((q.year_month(), q.ticker.as_str()))
            .or_insert(q.parspread);
    }

    first
        .into_iter()
        .map(|((year_month, ticker), parspread)| MonthlySpread {
            ticker: ticker.to_string(),
            year_month,
            parspread,
        })
        .collect()
}

/// Sample quantile of ascending `sorted` at probability `p`.
pub fn quantile(sorted: &[f64], p: f64, method: QuantileMethod) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    match method {
        QuantileMethod::Nearest => Some(sorted[pos.round() as usize]),
        QuantileMethod::Linear => {
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            Some(sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo]))
        }
    }
}

/// Label for `spread` given one month's breakpoints: a spread equal to a
/// breakpoint falls in the lower bucket.
pub fn label_for(spread: f64, breakpoints: &[f64]) -> CreditQuantile {
    let exceeded = breakpoints.iter().take_while(|&&bp| spread > bp).count();
    CreditQuantile(exceeded as u8 + 1)
}

/// Per-month breakpoints and the bucket of every (ticker, month).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditQuantiles {
    pub breakpoints: BTreeMap<YearMonth, Vec<f64>>,
    labels: HashMap<(String, YearMonth), CreditQuantile>,
}

impl CreditQuantiles {
    pub fn get(&self, ticker: &str, year_month: YearMonth) -> Option<CreditQuantile> {
        self.labels.get(&(ticker.to_string(), year_month)).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in (month, ticker) order.
    pub fn sorted_labels(&self) -> Vec<(YearMonth, &str, CreditQuantile)> {
        let mut out: Vec<_> = self
            .labels
            .iter()
            .map(|((ticker, ym), q)| (*ym, ticker.as_str(), *q))
            .collect();
        out.sort();
        out
    }
}

/// Computes monthly breakpoints over first-of-month spreads and labels
/// every name that quoted the bucketing tenor in that month.
pub fn assign_credit_quantiles(quotes: &[CdsQuote], config: &BucketingConfig) -> CreditQuantiles {
    let firsts = first_monthly_spreads(quotes, config.bucket_tenor);

    let mut by_month: BTreeMap<YearMonth, Vec<f64>> = BTreeMap::new();
    for s in &firsts {
        by_month.entry(s.year_month).or_default().push(s.parspread);
    }

    let breakpoints: BTreeMap<YearMonth, Vec<f64>> = by_month
        .into_iter()
        .map(|(ym, mut spreads)| {
            spreads.sort_by(f64::total_cmp);
            let cuts = config
                .breakpoints
                .iter()
                .filter_map(|&p| quantile(&spreads, p, config.method))
                .collect();
            (ym, cuts)
        })
        .collect();

    let labels = firsts
        .into_iter()
        .filter_map(|s| {
            let cuts = breakpoints.get(&s.year_month)?;
            Some(((s.ticker, s.year_month), label_for(s.parspread, cuts)))
        })
        .collect::<HashMap<_, _>>();

    tracing::debug!(
        months = breakpoints.len(),
        names = labels.len(),
        "assigned credit quantiles"
    );

    CreditQuantiles {
        breakpoints,
        labels,
    }
}

//! Quote cleaning: date window, null spreads, exact duplicates.

use crate::domain::cds_quote::{CdsQuote, RawCdsQuote, Tenor};
use crate::domain::period::DateRange;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Spread above which a quote is counted as suspect (100%).
pub const SUSPECT_SPREAD: f64 = 1.0;
/// Spread above which a quote is counted as extreme (1000%).
pub const EXTREME_SPREAD: f64 = 10.0;

/// Row counts observed while cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub out_of_range: usize,
    pub null_spreads: usize,
    pub duplicates: usize,
    pub retained: usize,
    pub above_100pct: usize,
    pub above_1000pct: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CleanedQuotes {
    pub quotes: Vec<CdsQuote>,
    pub report: CleaningReport,
}

/// Keeps quotes dated inside `range` with a spread present.
/// Returns the kept quotes with the out-of-range and null counts.
pub fn filter_quotes(raw: &[RawCdsQuote], range: DateRange) -> (Vec<CdsQuote>, usize, usize) {
    let mut out_of_range = 0;
    let mut nulls = 0;
    let mut quotes = Vec::with_capacity(raw.len());

    for q in raw {
        if !range.contains(q.date) {
            out_of_range += 1;
            continue;
        }
        match q.parspread.filter(|s| !s.is_nan()) {
            Some(parspread) => quotes.push(CdsQuote {
                ticker: q.ticker.clone(),
                date: q.date,
                tenor: q.tenor,
                parspread,
            }),
            None => nulls += 1,
        }
    }

    (quotes, out_of_range, nulls)
}

/// Removes rows equal to an earlier row in every field. First occurrences
/// keep their relative order.
pub fn deduplicate(quotes: Vec<CdsQuote>) -> (Vec<CdsQuote>, usize) {
    let mut seen: HashSet<(String, NaiveDate, Tenor, u64)> = HashSet::with_capacity(quotes.len());
    let before = quotes.len();

    let unique: Vec<CdsQuote> = quotes
        .into_iter()
        .filter(|q| seen.insert((q.ticker.clone(), q.date, q.tenor, q.parspread.to_bits())))
        .collect();

    let removed = before - unique.len();
    (unique, removed)
}

/// Filters to `range`, drops null spreads and exact duplicates.
pub fn clean_quotes(raw: &[RawCdsQuote], range: DateRange) -> CleanedQuotes {
    let (filtered, out_of_range, null_spreads) = filter_quotes(raw, range);
    let (quotes, duplicates) = deduplicate(filtered);

    let report = CleaningReport {
        input_rows: raw.len(),
        out_of_range,
        null_spreads,
        duplicates,
        retained: quotes.len(),
        above_100pct: quotes.iter().filter(|q| q.parspread > SUSPECT_SPREAD).count(),
        above_1000pct: quotes.iter().filter(|q| q.parspread > EXTREME_SPREAD).count(),
    };

    if quotes.is_empty() {
        tracing::warn!(%range, "no CDS quotes left after cleaning");
    }
    if duplicates > 0 {
        tracing::info!(duplicates, "removed duplicate CDS quotes");
    }

    CleanedQuotes { quotes, report }
}

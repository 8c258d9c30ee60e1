//! Raw yield-curve tables and their normalisation into a [`RateCurve`].

use crate::domain::error::CdsError;
use crate::domain::period::DateRange;
use chrono::NaiveDate;

/// One date of a raw curve table. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRateRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// Yield-curve table as ingested: maturity-coded column labels
/// (e.g. `SVENY01`..`SVENY30`) and rates in percentage points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRateTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRateRow>,
}

/// A dated vector of values aligned with the owning curve's maturities.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Annual-maturity rate curve in decimal units.
///
/// Maturities are in years and strictly increasing; rows are in date order
/// and contain no missing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateCurve {
    pub maturities: Vec<f64>,
    pub rows: Vec<CurveRow>,
}

impl RateCurve {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }
}

/// Parses the trailing digits of a column label into a year count.
pub fn parse_maturity(label: &str) -> Result<u32, CdsError> {
    let trimmed = label.trim();
    let digits_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_start {
        Some(i) => trimmed[i..]
            .parse()
            .map_err(|_| CdsError::UnparseableMaturity {
                label: label.to_string(),
            }),
        None => Err(CdsError::UnparseableMaturity {
            label: label.to_string(),
        }),
    }
}

/// Drops incomplete rows, restricts to `range`, converts percentage points to
/// decimals and orders the columns by maturity.
///
/// An empty window is not an error: the returned curve is simply empty.
pub fn process_rates(raw: &RawRateTable, range: DateRange) -> Result<RateCurve, CdsError> {
    let mut labelled: Vec<(u32, usize)> = raw
        .columns
        .iter()
        .enumerate()
        .map(|(i, label)| parse_maturity(label).map(|m| (m, i)))
        .collect::<Result<_, _>>()?;
    labelled.sort_by_key(|&(m, _)| m);

    if let Some(pair) = labelled.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(CdsError::DuplicateMaturity { maturity: pair[0].0 });
    }

    let mut rows = Vec::new();
    let mut incomplete = 0usize;

    for row in &raw.rows {
        if row.values.len() != raw.columns.len() {
            return Err(CdsError::InvalidData {
                source_name: "rate curve".into(),
                reason: format!(
                    "row {} has {} values for {} columns",
                    row.date,
                    row.values.len(),
                    raw.columns.len()
                ),
            });
        }

        let complete: Option<Vec<f64>> = labelled
            .iter()
            .map(|&(_, col)| row.values[col].filter(|v| v.is_finite()))
            .collect();

        let Some(values) = complete else {
            incomplete += 1;
            continue;
        };

        if !range.contains(row.date) {
            continue;
        }

        rows.push(CurveRow {
            date: row.date,
            values: values.into_iter().map(|v| v / 100.0).collect(),
        });
    }

    rows.sort_by_key(|r| r.date);

    if incomplete > 0 {
        tracing::debug!(rows = incomplete, "dropped rate rows with missing values");
    }
    if rows.is_empty() {
        tracing::warn!(%range, "no complete rate curves in range");
    }

    Ok(RateCurve {
        maturities: labelled.iter().map(|&(m, _)| f64::from(m)).collect(),
        rows,
    })
}

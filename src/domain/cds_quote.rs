//! CDS quotes and tenor codes.

use crate::domain::error::CdsError;
use crate::domain::period::YearMonth;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Contract maturity, stored in months so that `6M` and `1Y` order correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tenor {
    months: u32,
}

impl Tenor {
    pub const fn years(years: u32) -> Self {
        Self { months: years * 12 }
    }

    pub const fn months(months: u32) -> Self {
        Self { months }
    }

    pub fn in_months(&self) -> u32 {
        self.months
    }
}

impl FromStr for Tenor {
    type Err = CdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        let invalid = || CdsError::InvalidTenor { code: s.to_string() };

        let Some((split, _)) = code.char_indices().last() else {
            return Err(invalid());
        };
        let (count, unit) = code.split_at(split);
        let count: u32 = count.parse().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }
        match unit {
            "Y" => Ok(Self::years(count)),
            "M" => Ok(Self::months(count)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months % 12 == 0 {
            write!(f, "{}Y", self.months / 12)
        } else {
            write!(f, "{}M", self.months)
        }
    }
}

/// A quote as ingested. `parspread` is `None` when the source cell is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCdsQuote {
    pub ticker: String,
    pub date: NaiveDate,
    pub tenor: Tenor,
    pub parspread: Option<f64>,
}

/// A cleaned quote with a known par spread (decimal, 0.01 = 100bp).
#[derive(Debug, Clone, PartialEq)]
pub struct CdsQuote {
    pub ticker: String,
    pub date: NaiveDate,
    pub tenor: Tenor,
    pub parspread: f64,
}

impl CdsQuote {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}

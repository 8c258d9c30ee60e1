#![allow(dead_code)]

use cdsreturns::domain::cds_quote::{RawCdsQuote, Tenor};
use cdsreturns::domain::error::CdsError;
use cdsreturns::domain::rate_curve::{RawRateRow, RawRateTable};
use cdsreturns::ports::data_port::DataPort;
use chrono::NaiveDate;

pub struct MockDataPort {
    pub rates: RawRateTable,
    pub quotes: Vec<RawCdsQuote>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            rates: RawRateTable::default(),
            quotes: Vec::new(),
            error: None,
        }
    }

    pub fn with_rates(mut self, rates: RawRateTable) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_quotes(mut self, quotes: Vec<RawCdsQuote>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), CdsError> {
        match &self.error {
            Some(reason) => Err(CdsError::InvalidData {
                source_name: "mock".into(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_rate_table(&self) -> Result<RawRateTable, CdsError> {
        self.check()?;
        Ok(self.rates.clone())
    }

    fn load_cds_quotes(&self) -> Result<Vec<RawCdsQuote>, CdsError> {
        self.check()?;
        Ok(self.quotes.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn weekdays(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    use chrono::Datelike;
    start
        .iter_days()
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .take(count)
        .collect()
}

/// Curve with 1Y, 2Y, 5Y, 10Y and 30Y columns in percent, rising linearly
/// by 5bp a year from `level`.
pub fn rate_table(dates: &[NaiveDate], level: f64) -> RawRateTable {
    RawRateTable {
        columns: ["SVENY01", "SVENY02", "SVENY05", "SVENY10", "SVENY30"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: dates
            .iter()
            .map(|&d| RawRateRow {
                date: d,
                values: [1.0, 2.0, 5.0, 10.0, 30.0]
                    .iter()
                    .map(|m| Some(level + 0.05 * m))
                    .collect(),
            })
            .collect(),
    }
}

pub fn quote(ticker: &str, d: NaiveDate, tenor: &str, spread: f64) -> RawCdsQuote {
    RawCdsQuote {
        ticker: ticker.to_string(),
        date: d,
        tenor: tenor.parse::<Tenor>().unwrap(),
        parspread: Some(spread),
    }
}

pub const TICKERS: [&str; 5] = ["AAA", "BBB", "CCC", "DDD", "EEE"];

/// Five names quoting 0.01 to 0.05 on 5Y, with 3Y at half and 10Y at
/// double their 5Y spread. `drift` is added to every spread per day.
pub fn five_name_quotes(dates: &[NaiveDate], drift: f64) -> Vec<RawCdsQuote> {
    let mut quotes = Vec::new();
    for (day, &d) in dates.iter().enumerate() {
        for (i, ticker) in TICKERS.iter().enumerate() {
            let base = 0.01 * (i + 1) as f64 + drift * day as f64;
            quotes.push(quote(ticker, d, "5Y", base));
            quotes.push(quote(ticker, d, "3Y", base / 2.0));
            quotes.push(quote(ticker, d, "10Y", base * 2.0));
        }
    }
    quotes
}

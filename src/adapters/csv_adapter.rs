//! CSV file data adapter.

use crate::domain::cds_quote::{RawCdsQuote, Tenor};
use crate::domain::error::CdsError;
use crate::domain::rate_curve::{RawRateRow, RawRateTable};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

const QUOTE_COLUMNS: [&str; 4] = ["ticker", "date", "tenor", "parspread"];

/// Zero-coupon yield columns of the Federal Reserve curve file. The same file
/// also carries par yields, forwards and model parameters.
pub const DEFAULT_RATE_COLUMN_PREFIX: &str = "SVENY";

pub struct CsvAdapter {
    rates_path: PathBuf,
    quotes_path: PathBuf,
    rate_column_prefix: Option<String>,
}

impl CsvAdapter {
    pub fn new(rates_path: PathBuf, quotes_path: PathBuf) -> Self {
        Self {
            rates_path,
            quotes_path,
            rate_column_prefix: Some(DEFAULT_RATE_COLUMN_PREFIX.to_string()),
        }
    }

    /// Only rate columns whose label starts with `prefix` are loaded.
    pub fn with_rate_column_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rate_column_prefix = Some(prefix.into());
        self
    }

    /// Loads every column after the date as a rate column.
    pub fn with_all_rate_columns(mut self) -> Self {
        self.rate_column_prefix = None;
        self
    }

    fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, CdsError> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| match e.into_kind() {
                csv::ErrorKind::Io(err) => {
                    tracing::error!(path = %path.display(), error = %err, "cannot open CSV file");
                    CdsError::Io(err)
                }
                kind => invalid(path, format!("failed to open: {kind:?}")),
            })
    }
}

fn invalid(path: &Path, reason: String) -> CdsError {
    CdsError::InvalidData {
        source_name: path.display().to_string(),
        reason,
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.split(['T', ' ']).next().unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parses a numeric cell. Blank and NA-style cells are missing values.
fn parse_optional_f64(value: &str) -> Result<Option<f64>, String> {
    match value.trim() {
        "" | "." => Ok(None),
        v if v.eq_ignore_ascii_case("na") || v.eq_ignore_ascii_case("nan") => Ok(None),
        v if v.eq_ignore_ascii_case("null") || v.eq_ignore_ascii_case("none") => Ok(None),
        v => v
            .parse::<f64>()
            .map(Some)
            .map_err(|e| format!("invalid number '{v}': {e}")),
    }
}

impl DataPort for CsvAdapter {
    fn load_rate_table(&self) -> Result<RawRateTable, CdsError> {
        let path = self.rates_path.as_path();
        let mut rdr = Self::reader(path)?;
        let headers = rdr.headers()?.clone();

        if headers.len() < 2 {
            return Err(invalid(path, "expected a date column and rate columns".into()));
        }

        let selected: Vec<usize> = (1..headers.len())
            .filter(|&i| match &self.rate_column_prefix {
                Some(prefix) => headers[i].starts_with(prefix.as_str()),
                None => true,
            })
            .collect();

        let columns = selected.iter().map(|&i| headers[i].to_string()).collect();
        let mut rows = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            let date_str = record.get(0).unwrap_or_default();
            let date = parse_date(date_str).ok_or_else(|| {
                invalid(path, format!("row {}: invalid date '{}'", line + 1, date_str))
            })?;

            let values = selected
                .iter()
                .map(|&i| parse_optional_f64(record.get(i).unwrap_or_default()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| invalid(path, format!("row {}: {}", line + 1, e)))?;

            rows.push(RawRateRow { date, values });
        }

        rows.sort_by_key(|r| r.date);
        Ok(RawRateTable { columns, rows })
    }

    fn load_cds_quotes(&self) -> Result<Vec<RawCdsQuote>, CdsError> {
        let path = self.quotes_path.as_path();
        let mut rdr = Self::reader(path)?;
        let headers = rdr.headers()?.clone();

        let mut index = [0usize; 4];
        for (slot, name) in index.iter_mut().zip(QUOTE_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| invalid(path, format!("missing {name} column")))?;
        }
        let [ticker_col, date_col, tenor_col, spread_col] = index;

        let mut quotes = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            let field = |i: usize| record.get(i).unwrap_or_default();

            let date = parse_date(field(date_col)).ok_or_else(|| {
                invalid(path, format!("row {}: invalid date '{}'", line + 1, field(date_col)))
            })?;
            let tenor: Tenor = field(tenor_col).parse()?;
            let parspread = parse_optional_f64(field(spread_col))
                .map_err(|e| invalid(path, format!("row {}: {}", line + 1, e)))?;

            quotes.push(RawCdsQuote {
                ticker: field(ticker_col).to_string(),
                date,
                tenor,
                parspread,
            });
        }

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let rates = dir.path().join("rates.csv");
        let quotes = dir.path().join("quotes.csv");

        fs::write(
            &rates,
            "Date,SVENY01,SVENY02,BETA0\n\
             2005-01-04,2.60,3.10,4.0\n\
             2005-01-03,2.50,3.00,4.0\n\
             2005-01-05,NA,3.05,4.0\n",
        )
        .unwrap();
        fs::write(
            &quotes,
            "ticker,redcode,date,tenor,parspread,convspreard\n\
             AAA,X1,2005-01-03,5Y,0.0123,0.01\n\
             AAA,X1,2005-01-03 00:00:00,3Y,,0.01\n\
             BBB,X2,2005-01-04,10Y,0.05,\n",
        )
        .unwrap();

        (dir, rates, quotes)
    }

    #[test]
    fn load_rate_table_sorts_rows_and_keeps_missing_cells() {
        let (_dir, rates, quotes) = setup_test_data();
        let adapter = CsvAdapter::new(rates, quotes).with_all_rate_columns();

        let table = adapter.load_rate_table().unwrap();
        assert_eq!(table.columns, vec!["SVENY01", "SVENY02", "BETA0"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].date, NaiveDate::from_ymd_opt(2005, 1, 3).unwrap());
        assert_eq!(table.rows[0].values[0], Some(2.5));
        assert_eq!(table.rows[2].values[0], None);
    }

    #[test]
    fn rate_column_prefix_filters_columns() {
        let (_dir, rates, quotes) = setup_test_data();
        let adapter = CsvAdapter::new(rates, quotes).with_rate_column_prefix("SVENY");

        let table = adapter.load_rate_table().unwrap();
        assert_eq!(table.columns, vec!["SVENY01", "SVENY02"]);
        assert!(table.rows.iter().all(|r| r.values.len() == 2));
    }

    #[test]
    fn zero_coupon_columns_selected_by_default() {
        let dir = TempDir::new().unwrap();
        let rates = dir.path().join("rates.csv");
        fs::write(
            &rates,
            "Date,SVENY01,SVENY02,SVENPY01,SVENF01,BETA0,TAU1\n\
             2005-01-03,2.50,3.00,2.49,2.70,4.0,1.5\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(rates, dir.path().join("quotes.csv"));

        let table = adapter.load_rate_table().unwrap();
        assert_eq!(table.columns, vec!["SVENY01", "SVENY02"]);
        assert_eq!(table.rows[0].values, vec![Some(2.5), Some(3.0)]);
    }

    #[test]
    fn load_cds_quotes_reads_named_columns() {
        let (_dir, rates, quotes) = setup_test_data();
        let adapter = CsvAdapter::new(rates, quotes);

        let quotes = adapter.load_cds_quotes().unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].ticker, "AAA");
        assert_eq!(quotes[0].tenor, Tenor::years(5));
        assert_eq!(quotes[0].parspread, Some(0.0123));
        assert_eq!(quotes[1].date, NaiveDate::from_ymd_opt(2005, 1, 3).unwrap());
        assert_eq!(quotes[1].parspread, None);
        assert_eq!(quotes[2].tenor, Tenor::years(10));
    }

    #[test]
    fn load_cds_quotes_requires_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quotes.csv");
        fs::write(&path, "ticker,date,spread\nAAA,2005-01-03,0.01\n").unwrap();
        let adapter = CsvAdapter::new(dir.path().join("rates.csv"), path);

        let err = adapter.load_cds_quotes().unwrap_err();
        assert!(err.to_string().contains("missing tenor column"));
    }

    #[test]
    fn bad_number_is_an_error() {
        let dir = TempDir::new().unwrap();
        let rates = dir.path().join("rates.csv");
        fs::write(&rates, "Date,SVENY01\n2005-01-03,abc\n").unwrap();
        let adapter = CsvAdapter::new(rates, dir.path().join("quotes.csv"));

        assert!(matches!(
            adapter.load_rate_table(),
            Err(CdsError::InvalidData { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().join("nope.csv"), dir.path().join("nope.csv"));
        assert!(matches!(adapter.load_rate_table(), Err(CdsError::Io(_))));
        assert!(matches!(adapter.load_cds_quotes(), Err(CdsError::Io(_))));
    }
}

//! Run parameters for the return pipeline.

use crate::domain::cds_quote::Tenor;
use crate::domain::error::CdsError;
use crate::domain::period::DateRange;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LOSS_GIVEN_DEFAULT: f64 = 0.6;
pub const DEFAULT_HORIZON_YEARS: u32 = 20;
pub const DEFAULT_TRADING_DAYS: f64 = 250.0;
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 1.0;
pub const DEFAULT_BREAKPOINTS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// How a sample quantile is read off the sorted observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantileMethod {
    /// Linear interpolation between the two closest ranks.
    #[default]
    Linear,
    /// The observation at the rounded rank.
    Nearest,
}

impl FromStr for QuantileMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "nearest" => Ok(Self::Nearest),
            other => Err(format!("unknown quantile interpolation '{other}'")),
        }
    }
}

impl fmt::Display for QuantileMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

/// Credit bucketing and portfolio formation.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketingConfig {
    /// Tenor whose spread ranks names each month.
    pub bucket_tenor: Tenor,
    /// Tenors that get a portfolio.
    pub tenors: Vec<Tenor>,
    /// Cross-sectional probabilities splitting names into `len + 1` buckets.
    pub breakpoints: Vec<f64>,
    pub method: QuantileMethod,
    /// Representative spreads above this are replaced by the global mean.
    pub outlier_threshold: f64,
}

impl BucketingConfig {
    pub fn bucket_count(&self) -> u8 {
        (self.breakpoints.len() + 1) as u8
    }
}

impl Default for BucketingConfig {
    fn default() -> Self {
        Self {
            bucket_tenor: Tenor::years(5),
            tenors: vec![
                Tenor::years(3),
                Tenor::years(5),
                Tenor::years(7),
                Tenor::years(10),
            ],
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            method: QuantileMethod::Linear,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

/// He-Kelly return parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnConfig {
    pub loss_given_default: f64,
    /// Survival and discounting horizon in whole years.
    pub horizon_years: u32,
    /// Day count used to accrue the spread carry.
    pub trading_days: f64,
}

impl ReturnConfig {
    pub fn horizon_quarters(&self) -> usize {
        self.horizon_years as usize * 4
    }
}

impl Default for ReturnConfig {
    fn default() -> Self {
        Self {
            loss_given_default: DEFAULT_LOSS_GIVEN_DEFAULT,
            horizon_years: DEFAULT_HORIZON_YEARS,
            trading_days: DEFAULT_TRADING_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Window applied to CDS quotes.
    pub quote_range: DateRange,
    /// Window applied to the yield curve.
    pub rate_range: DateRange,
    pub bucketing: BucketingConfig,
    pub returns: ReturnConfig,
}

impl PipelineConfig {
    /// Default parameters with one window for both inputs.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let range = DateRange::new(start, end);
        Self {
            quote_range: range,
            rate_range: range,
            bucketing: BucketingConfig::default(),
            returns: ReturnConfig::default(),
        }
    }
}

/// Parses a comma-separated tenor list such as `3Y,5Y,7Y,10Y`.
pub fn parse_tenors(s: &str) -> Result<Vec<Tenor>, CdsError> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}

/// Parses a comma-separated probability list such as `0.2,0.4,0.6,0.8`.
pub fn parse_probabilities(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| format!("'{p}' is not a number"))
        })
        .collect()
}

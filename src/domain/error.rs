//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for cdsreturns.
#[derive(Debug, thiserror::Error)]
pub enum CdsError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid data in {source_name}: {reason}")]
    InvalidData { source_name: String, reason: String },

    #[error("unparseable maturity in column label {label:?}")]
    UnparseableMaturity { label: String },

    #[error("maturity {maturity}y appears in more than one column")]
    DuplicateMaturity { maturity: u32 },

    #[error("invalid tenor code {code:?}")]
    InvalidTenor { code: String },

    #[error("curve on {date} has {points} maturities, need at least 2")]
    InsufficientCurvePoints { date: NaiveDate, points: usize },

    #[error("no {what} between {start} and {end}")]
    EmptyRange {
        what: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CdsError> for std::process::ExitCode {
    fn from(err: &CdsError) -> Self {
        let code: u8 = match err {
            CdsError::Io(_) => 1,
            CdsError::ConfigParse { .. }
            | CdsError::ConfigMissing { .. }
            | CdsError::ConfigInvalid { .. } => 2,
            CdsError::InvalidData { .. } | CdsError::InvalidTenor { .. } | CdsError::Csv(_) => 3,
            CdsError::UnparseableMaturity { .. }
            | CdsError::DuplicateMaturity { .. }
            | CdsError::InsufficientCurvePoints { .. } => 4,
            CdsError::EmptyRange { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

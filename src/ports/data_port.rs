//! Data access port trait.

use crate::domain::cds_quote::RawCdsQuote;
use crate::domain::error::CdsError;
use crate::domain::rate_curve::RawRateTable;

pub trait DataPort {
    /// Yield-curve table with maturity-coded columns, rates in percent.
    fn load_rate_table(&self) -> Result<RawRateTable, CdsError>;

    /// Every CDS quote in the source, unfiltered.
    fn load_cds_quotes(&self) -> Result<Vec<RawCdsQuote>, CdsError>;
}

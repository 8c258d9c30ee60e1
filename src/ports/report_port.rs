//! Report output port trait.

use crate::domain::discount::DiscountCurve;
use crate::domain::error::CdsError;
use crate::domain::portfolio::{MonthlyTenorSpread, PortfolioKey};
use crate::domain::returns::PortfolioReturns;
use std::collections::BTreeMap;
use std::path::Path;

/// Port for writing pipeline results.
pub trait ReportPort {
    fn write_returns(
        &self,
        returns: &BTreeMap<PortfolioKey, PortfolioReturns>,
        output_path: &Path,
    ) -> Result<(), CdsError>;

    fn write_monthly_spreads(
        &self,
        monthly: &[MonthlyTenorSpread],
        output_path: &Path,
    ) -> Result<(), CdsError>;

    fn write_discount_curve(
        &self,
        discount: &DiscountCurve,
        output_path: &Path,
    ) -> Result<(), CdsError>;
}

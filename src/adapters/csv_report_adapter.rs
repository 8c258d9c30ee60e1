//! CSV report writer.

use crate::domain::discount::DiscountCurve;
use crate::domain::error::CdsError;
use crate::domain::portfolio::{MonthlyTenorSpread, PortfolioKey};
use crate::domain::returns::PortfolioReturns;
use crate::ports::report_port::ReportPort;
use std::collections::BTreeMap;
use std::path::Path;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, CdsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(csv::Writer::from_path(path)?)
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_returns(
        &self,
        returns: &BTreeMap<PortfolioKey, PortfolioReturns>,
        output_path: &Path,
    ) -> Result<(), CdsError> {
        let mut wtr = Self::writer(output_path)?;
        wtr.write_record([
            "portfolio",
            "tenor",
            "quantile",
            "date",
            "return",
            "spread",
            "hazard",
            "risky_duration",
        ])?;

        for (key, series) in returns {
            for r in &series.returns {
                wtr.write_record([
                    key.to_string(),
                    key.tenor.to_string(),
                    key.quantile.to_string(),
                    r.date.to_string(),
                    r.value.to_string(),
                    r.spread.to_string(),
                    r.hazard.to_string(),
                    r.risky_duration.to_string(),
                ])?;
            }
        }

        wtr.flush()?;
        tracing::info!(path = %output_path.display(), "wrote returns");
        Ok(())
    }

    fn write_monthly_spreads(
        &self,
        monthly: &[MonthlyTenorSpread],
        output_path: &Path,
    ) -> Result<(), CdsError> {
        let mut wtr = Self::writer(output_path)?;
        wtr.write_record(["month", "tenor", "rep_parspread"])?;
        for m in monthly {
            wtr.write_record([m.month.to_string(), m.tenor.to_string(), m.spread.to_string()])?;
        }
        wtr.flush()?;
        tracing::info!(path = %output_path.display(), "wrote monthly spreads");
        Ok(())
    }

    fn write_discount_curve(
        &self,
        discount: &DiscountCurve,
        output_path: &Path,
    ) -> Result<(), CdsError> {
        let mut wtr = Self::writer(output_path)?;

        let mut header = vec!["date".to_string()];
        header.extend(discount.maturities().iter().map(|m| format!("{m:.2}")));
        wtr.write_record(&header)?;

        for row in discount.rows() {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(row.date.to_string());
            record.extend(row.values.iter().map(|v| v.to_string()));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        tracing::info!(path = %output_path.display(), "wrote discount curve");
        Ok(())
    }
}

//! Configuration validation.
//!
//! Validates all config fields before a run.

use crate::domain::config::{QuantileMethod, parse_probabilities, parse_tenors};
use crate::domain::error::CdsError;
use crate::domain::quarterly_curve::MAX_MATURITY_YEARS;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), CdsError> {
    validate_data_paths(config)?;
    validate_period(config)?;
    validate_portfolio(config)?;
    validate_returns(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> CdsError {
    CdsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_paths(config: &dyn ConfigPort) -> Result<(), CdsError> {
    for key in ["rates_path", "quotes_path"] {
        if config.get_string("data", key).is_none() {
            return Err(CdsError::ConfigMissing {
                section: "data".to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), CdsError> {
    let start = parse_date(config, "period", "start_date")?.ok_or_else(|| CdsError::ConfigMissing {
        section: "period".to_string(),
        key: "start_date".to_string(),
    })?;
    let end = parse_date(config, "period", "end_date")?.ok_or_else(|| CdsError::ConfigMissing {
        section: "period".to_string(),
        key: "end_date".to_string(),
    })?;
    if start > end {
        return Err(invalid("period", "start_date", "start_date must not be after end_date"));
    }

    let rates_start = parse_date(config, "rates", "start_date")?.unwrap_or(start);
    let rates_end = parse_date(config, "rates", "end_date")?.unwrap_or(end);
    if rates_start > rates_end {
        return Err(invalid("rates", "start_date", "start_date must not be after end_date"));
    }
    Ok(())
}

/// Reads an optional `YYYY-MM-DD` date.
pub fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, CdsError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(section, key, format!("invalid {key} format, expected YYYY-MM-DD"))),
    }
}

fn validate_portfolio(config: &dyn ConfigPort) -> Result<(), CdsError> {
    if let Some(tenor) = config.get_string("portfolio", "bucket_tenor") {
        tenor
            .parse::<crate::domain::cds_quote::Tenor>()
            .map_err(|e| invalid("portfolio", "bucket_tenor", e.to_string()))?;
    }

    if let Some(tenors) = config.get_string("portfolio", "tenors") {
        let parsed = parse_tenors(&tenors).map_err(|e| invalid("portfolio", "tenors", e.to_string()))?;
        if parsed.is_empty() {
            return Err(invalid("portfolio", "tenors", "at least one tenor is required"));
        }
    }

    if let Some(bps) = config.get_string("portfolio", "breakpoints") {
        let parsed = parse_probabilities(&bps).map_err(|e| invalid("portfolio", "breakpoints", e))?;
        if parsed.is_empty() {
            return Err(invalid("portfolio", "breakpoints", "at least one breakpoint is required"));
        }
        if parsed.iter().any(|&p| p <= 0.0 || p >= 1.0) {
            return Err(invalid("portfolio", "breakpoints", "breakpoints must lie strictly between 0 and 1"));
        }
        if parsed.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("portfolio", "breakpoints", "breakpoints must be strictly increasing"));
        }
        if parsed.len() >= u8::MAX as usize {
            return Err(invalid("portfolio", "breakpoints", "too many breakpoints"));
        }
    }

    if let Some(method) = config.get_string("portfolio", "quantile_interpolation") {
        method
            .parse::<QuantileMethod>()
            .map_err(|e| invalid("portfolio", "quantile_interpolation", e))?;
    }

    let threshold = config.get_double("portfolio", "outlier_threshold", 1.0);
    if threshold <= 0.0 {
        return Err(invalid("portfolio", "outlier_threshold", "outlier_threshold must be positive"));
    }
    Ok(())
}

fn validate_returns(config: &dyn ConfigPort) -> Result<(), CdsError> {
    let lgd = config.get_double("returns", "loss_given_default", 0.6);
    if lgd <= 0.0 || lgd > 1.0 {
        return Err(invalid("returns", "loss_given_default", "loss_given_default must be in (0, 1]"));
    }

    let horizon = config.get_int("returns", "horizon_years", 20);
    if horizon < 1 || horizon > MAX_MATURITY_YEARS as i64 {
        return Err(invalid(
            "returns",
            "horizon_years",
            format!("horizon_years must be between 1 and {MAX_MATURITY_YEARS}"),
        ));
    }

    let days = config.get_double("returns", "trading_days", 250.0);
    if days <= 0.0 {
        return Err(invalid("returns", "trading_days", "trading_days must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockConfig {
        values: HashMap<(String, String), String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                values: HashMap::new(),
            }
        }

        fn set(mut self, section: &str, key: &str, value: &str) -> Self {
            self.values
                .insert((section.to_string(), key.to_string()), value.to_string());
            self
        }

        fn valid() -> Self {
            Self::new()
                .set("data", "rates_path", "rates.csv")
                .set("data", "quotes_path", "quotes.csv")
                .set("period", "start_date", "2002-04-01")
                .set("period", "end_date", "2013-02-28")
        }
    }

    impl ConfigPort for MockConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.values
                .get(&(section.to_string(), key.to_string()))
                .cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    fn assert_invalid(config: MockConfig, expected_key: &str) {
        match validate_config(&config) {
            Err(CdsError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {expected_key}, got {other:?}"),
        }
    }

    #[test]
    fn minimal_config_is_valid() {
        assert!(validate_config(&MockConfig::valid()).is_ok());
    }

    #[test]
    fn missing_paths_reported() {
        let config = MockConfig::new()
            .set("data", "rates_path", "rates.csv")
            .set("period", "start_date", "2002-04-01")
            .set("period", "end_date", "2013-02-28");
        match validate_config(&config) {
            Err(CdsError::ConfigMissing { section, key }) => {
                assert_eq!(section, "data");
                assert_eq!(key, "quotes_path");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_period_reported() {
        let config = MockConfig::new()
            .set("data", "rates_path", "rates.csv")
            .set("data", "quotes_path", "quotes.csv")
            .set("period", "end_date", "2013-02-28");
        assert!(matches!(
            validate_config(&config),
            Err(CdsError::ConfigMissing { key, .. }) if key == "start_date"
        ));
    }

    #[test]
    fn bad_dates_rejected() {
        assert_invalid(MockConfig::valid().set("period", "start_date", "01/04/2002"), "start_date");
        assert_invalid(MockConfig::valid().set("period", "start_date", "2014-01-01"), "start_date");
        assert_invalid(
            MockConfig::valid()
                .set("rates", "start_date", "2013-03-01")
                .set("rates", "end_date", "2013-01-01"),
            "start_date",
        );
    }

    #[test]
    fn portfolio_settings_checked() {
        assert_invalid(MockConfig::valid().set("portfolio", "bucket_tenor", "5"), "bucket_tenor");
        assert_invalid(MockConfig::valid().set("portfolio", "tenors", "3Y,7X"), "tenors");
        assert_invalid(MockConfig::valid().set("portfolio", "breakpoints", "0.5,0.3"), "breakpoints");
        assert_invalid(MockConfig::valid().set("portfolio", "breakpoints", "0.0,0.5"), "breakpoints");
        assert_invalid(MockConfig::valid().set("portfolio", "breakpoints", "0.2,x"), "breakpoints");
        assert_invalid(
            MockConfig::valid().set("portfolio", "quantile_interpolation", "midpoint"),
            "quantile_interpolation",
        );
        assert_invalid(MockConfig::valid().set("portfolio", "outlier_threshold", "0"), "outlier_threshold");
    }

    #[test]
    fn return_settings_checked() {
        assert_invalid(MockConfig::valid().set("returns", "loss_given_default", "0"), "loss_given_default");
        assert_invalid(MockConfig::valid().set("returns", "loss_given_default", "1.5"), "loss_given_default");
        assert_invalid(MockConfig::valid().set("returns", "horizon_years", "31"), "horizon_years");
        assert_invalid(MockConfig::valid().set("returns", "horizon_years", "0"), "horizon_years");
        assert_invalid(MockConfig::valid().set("returns", "trading_days", "-1"), "trading_days");
    }

    #[test]
    fn full_valid_config_passes() {
        let config = MockConfig::valid()
            .set("rates", "start_date", "2002-04-01")
            .set("rates", "end_date", "2013-03-01")
            .set("portfolio", "bucket_tenor", "5Y")
            .set("portfolio", "tenors", "3Y,5Y,7Y,10Y")
            .set("portfolio", "breakpoints", "0.2,0.4,0.6,0.8")
            .set("portfolio", "quantile_interpolation", "nearest")
            .set("returns", "loss_given_default", "0.6")
            .set("returns", "horizon_years", "20")
            .set("returns", "trading_days", "250");
        assert!(validate_config(&config).is_ok());
    }
}

//! Core domain types and logic.

pub mod cds_quote;
pub mod cleaning;
pub mod config;
pub mod config_validation;
pub mod credit_quantile;
pub mod discount;
pub mod error;
pub mod metrics;
pub mod period;
pub mod pipeline;
pub mod portfolio;
pub mod quarterly_curve;
pub mod rate_curve;
pub mod returns;
pub mod spline;

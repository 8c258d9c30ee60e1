//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::cleaning::CleaningReport;
use crate::domain::config::{
    BucketingConfig, DEFAULT_HORIZON_YEARS, DEFAULT_LOSS_GIVEN_DEFAULT, DEFAULT_OUTLIER_THRESHOLD,
    DEFAULT_TRADING_DAYS, PipelineConfig, ReturnConfig, parse_probabilities, parse_tenors,
};
use crate::domain::config_validation::{parse_date, validate_config};
use crate::domain::discount::calc_discount;
use crate::domain::error::CdsError;
use crate::domain::metrics::ReturnSummary;
use crate::domain::period::DateRange;
use crate::domain::pipeline::{PipelineOutput, build_portfolio_stage, run_from_port};
use crate::domain::portfolio::Portfolios;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_RETURNS_PATH: &str = "cds_returns.csv";

#[derive(Parser, Debug)]
#[command(name = "cdsreturns", about = "CDS portfolio return pipeline")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute portfolio returns
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        monthly: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write the quarterly discount curve
    Discount {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show the cleaning report and portfolio inventory
    Inspect {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output,
            monthly,
        } => run_returns(&config, output.as_deref(), monthly.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Discount { config, output } => run_discount(&config, &output),
        Command::Inspect { config } => run_inspect(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CdsError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Loads and validates the config file, then builds the run parameters.
fn prepare(config_path: &Path) -> Result<(FileConfigAdapter, PipelineConfig), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    let config = validate_config(&adapter)
        .and_then(|()| build_pipeline_config(&adapter))
        .map_err(|e| report(&e))?;
    Ok((adapter, config))
}

fn report(err: &CdsError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn required_date(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<chrono::NaiveDate, CdsError> {
    parse_date(adapter, section, key)?.ok_or_else(|| CdsError::ConfigMissing {
        section: section.into(),
        key: key.into(),
    })
}

fn config_invalid(key: &str, reason: impl Into<String>) -> CdsError {
    CdsError::ConfigInvalid {
        section: "portfolio".into(),
        key: key.into(),
        reason: reason.into(),
    }
}

pub fn build_pipeline_config(adapter: &dyn ConfigPort) -> Result<PipelineConfig, CdsError> {
    let start = required_date(adapter, "period", "start_date")?;
    let end = required_date(adapter, "period", "end_date")?;
    let quote_range = DateRange::new(start, end);
    let rate_range = DateRange::new(
        parse_date(adapter, "rates", "start_date")?.unwrap_or(start),
        parse_date(adapter, "rates", "end_date")?.unwrap_or(end),
    );

    let defaults = BucketingConfig::default();
    let bucket_tenor = match adapter.get_string("portfolio", "bucket_tenor") {
        Some(s) => s.parse()?,
        None => defaults.bucket_tenor,
    };
    let tenors = match adapter.get_string("portfolio", "tenors") {
        Some(s) => parse_tenors(&s)?,
        None => defaults.tenors,
    };
    let breakpoints = match adapter.get_string("portfolio", "breakpoints") {
        Some(s) => parse_probabilities(&s).map_err(|e| config_invalid("breakpoints", e))?,
        None => defaults.breakpoints,
    };
    let method = match adapter.get_string("portfolio", "quantile_interpolation") {
        Some(s) => s
            .parse()
            .map_err(|e: String| config_invalid("quantile_interpolation", e))?,
        None => defaults.method,
    };

    let horizon = adapter.get_int("returns", "horizon_years", DEFAULT_HORIZON_YEARS as i64);
    let horizon_years = u32::try_from(horizon).map_err(|_| CdsError::ConfigInvalid {
        section: "returns".into(),
        key: "horizon_years".into(),
        reason: "horizon_years must be positive".into(),
    })?;

    Ok(PipelineConfig {
        quote_range,
        rate_range,
        bucketing: BucketingConfig {
            bucket_tenor,
            tenors,
            breakpoints,
            method,
            outlier_threshold: adapter.get_double(
                "portfolio",
                "outlier_threshold",
                DEFAULT_OUTLIER_THRESHOLD,
            ),
        },
        returns: ReturnConfig {
            loss_given_default: adapter.get_double(
                "returns",
                "loss_given_default",
                DEFAULT_LOSS_GIVEN_DEFAULT,
            ),
            horizon_years,
            trading_days: adapter.get_double("returns", "trading_days", DEFAULT_TRADING_DAYS),
        },
    })
}

pub fn build_data_port(adapter: &dyn ConfigPort) -> Result<CsvAdapter, CdsError> {
    let path = |key: &str| {
        adapter
            .get_string("data", key)
            .map(PathBuf::from)
            .ok_or_else(|| CdsError::ConfigMissing {
                section: "data".into(),
                key: key.into(),
            })
    };
    let data_port = CsvAdapter::new(path("rates_path")?, path("quotes_path")?);
    // `*` loads every rate column; absent keeps the adapter's default.
    Ok(match adapter.get_string("data", "rate_column_prefix").as_deref() {
        Some("*") => data_port.with_all_rate_columns(),
        Some(prefix) => data_port.with_rate_column_prefix(prefix),
        None => data_port,
    })
}

fn run_returns(config_path: &Path, output: Option<&Path>, monthly: Option<&Path>) -> ExitCode {
    let (adapter, config) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let output_path = output.map(Path::to_path_buf).unwrap_or_else(|| {
        adapter
            .get_string("output", "returns_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RETURNS_PATH))
    });
    let monthly_path = monthly
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("output", "monthly_path").map(PathBuf::from));

    let result = build_data_port(&adapter).and_then(|port| run_pipeline_and_report(&port, &config));
    let output = match result {
        Ok(o) => o,
        Err(e) => return report(&e),
    };

    if let Err(e) = CsvReportAdapter.write_returns(&output.returns, &output_path) {
        return report(&e);
    }
    eprintln!("Returns written to {}", output_path.display());

    if let Some(path) = monthly_path {
        if let Err(e) = CsvReportAdapter.write_monthly_spreads(&output.monthly_spreads, &path) {
            return report(&e);
        }
        eprintln!("Monthly spreads written to {}", path.display());
    }

    ExitCode::SUCCESS
}

/// Runs the pipeline, prints the summaries and escalates an empty result.
pub fn run_pipeline_and_report(
    data_port: &dyn DataPort,
    config: &PipelineConfig,
) -> Result<PipelineOutput, CdsError> {
    let output = run_from_port(data_port, config)?;

    print_cleaning_report(&output.cleaning);
    print_portfolios(&output.portfolios);

    eprintln!("\nReturns:");
    for (key, series) in &output.returns {
        let s = ReturnSummary::compute(series, config.returns.trading_days);
        eprintln!(
            "  {:<8} n={:<6} mean={:+.6} vol={:.6} ann_mean={:+.4} ann_vol={:.4} min={:+.6} max={:+.6}",
            key.to_string(),
            s.observations, s.mean, s.volatility, s.annualized_mean, s.annualized_volatility, s.min, s.max,
        );
        if series.filled_dates > 0 {
            eprintln!("           {} dates used a neighbouring discount curve", series.filled_dates);
        }
    }

    if output.return_count() == 0 {
        return Err(CdsError::EmptyRange {
            what: "portfolio returns".into(),
            start: config.quote_range.start,
            end: config.quote_range.end,
        });
    }
    Ok(output)
}

fn print_cleaning_report(report: &CleaningReport) {
    eprintln!("\nCleaning:");
    eprintln!("  input rows:         {}", report.input_rows);
    eprintln!("  outside window:     {}", report.out_of_range);
    eprintln!("  null spreads:       {}", report.null_spreads);
    eprintln!("  duplicates:         {}", report.duplicates);
    eprintln!("  retained:           {}", report.retained);
    eprintln!("  spreads > 100%:     {}", report.above_100pct);
    eprintln!("  spreads > 1000%:    {}", report.above_1000pct);
}

fn print_portfolios(portfolios: &Portfolios) {
    eprintln!("\nPortfolios:");
    for p in portfolios.iter() {
        let (first, last) = match (p.observations.first(), p.observations.last()) {
            (Some(f), Some(l)) => (f.date.to_string(), l.date.to_string()),
            _ => ("-".into(), "-".into()),
        };
        eprintln!(
            "  {:<8} {:>6} dates  {first} to {last}",
            p.key.to_string(),
            p.observations.len()
        );
    }
    if let Some(mean) = portfolios.global_mean {
        eprintln!("  global mean spread: {mean:.6}");
    }
    if !portfolios.substitutions.is_empty() {
        eprintln!("  outlier substitutions: {}", portfolios.substitutions.len());
        for sub in &portfolios.substitutions {
            eprintln!(
                "    {} {} {:.6} -> {:.6}",
                sub.key, sub.date, sub.original, sub.replacement
            );
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let (_, config) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    eprintln!("\nQuote window:    {}", config.quote_range);
    eprintln!("Rate window:     {}", config.rate_range);
    eprintln!("Bucket tenor:    {}", config.bucketing.bucket_tenor);
    let tenors: Vec<String> = config.bucketing.tenors.iter().map(|t| t.to_string()).collect();
    eprintln!("Tenors:          {}", tenors.join(", "));
    eprintln!(
        "Buckets:         {} ({} interpolation)",
        config.bucketing.bucket_count(),
        config.bucketing.method
    );
    eprintln!("LGD:             {}", config.returns.loss_given_default);
    eprintln!("Horizon:         {}y", config.returns.horizon_years);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_discount(config_path: &Path, output_path: &Path) -> ExitCode {
    let (adapter, config) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let result = build_data_port(&adapter)
        .and_then(|port| port.load_rate_table())
        .and_then(|raw| calc_discount(&raw, config.rate_range));
    let discount = match result {
        Ok(d) => d,
        Err(e) => return report(&e),
    };
    if discount.is_empty() {
        let err = CdsError::EmptyRange {
            what: "yield curve rows".into(),
            start: config.rate_range.start,
            end: config.rate_range.end,
        };
        return report(&err);
    }

    if let Err(e) = CsvReportAdapter.write_discount_curve(&discount, output_path) {
        return report(&e);
    }
    eprintln!(
        "Discount curve ({} dates) written to {}",
        discount.len(),
        output_path.display()
    );
    ExitCode::SUCCESS
}

fn run_inspect(config_path: &Path) -> ExitCode {
    let (adapter, config) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let raw_quotes = match build_data_port(&adapter).and_then(|port| port.load_cds_quotes()) {
        Ok(q) => q,
        Err(e) => return report(&e),
    };

    let (cleaning, quantiles, portfolios) = build_portfolio_stage(&raw_quotes, &config);
    print_cleaning_report(&cleaning);
    eprintln!("\nCredit quantiles: {} months", quantiles.breakpoints.len());
    eprintln!("Labelled (ticker, month) pairs: {}", quantiles.len());
    print_portfolios(&portfolios);
    ExitCode::SUCCESS
}

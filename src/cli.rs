//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::stdout_report::StdoutReport;
use crate::adapters::text_report;
use crate::domain::config_validation::build_strategy_config;
use crate::domain::error::TrendbandError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::replay::replay;
use crate::domain::schedule::{fetch_window, resolve_run, RunDecision};
use crate::domain::signal::{compute_allocation, DailyAllocation};
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceHistoryPort;
use crate::ports::report_port::ReportPort;

/// Fatal error messages are cut to this many characters.
pub const MAX_ERROR_CHARS: usize = 200;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_HISTORY_START: &str = "2022-01-01";

#[derive(Parser, Debug)]
#[command(
    name = "trendband",
    about = "Daily moving-average band allocation signals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the target allocation for today or a given date
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        /// Target date (YYYY-MM-DD); bypasses weekend gating
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Replay the strategy and report CAGR and maximum drawdown
    Performance {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data_dir: PathBuf,
    pub history_start: NaiveDate,
    pub skip_weekends: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    Skipped { date: NaiveDate, reason: String },
    Allocated(DailyAllocation),
    Failed { target: NaiveDate, reason: String },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Signal {
            config,
            date,
            data_dir,
        } => run_signal(&config, date.as_deref(), data_dir),
        Command::Performance {
            config,
            start,
            end,
            data_dir,
        } => run_performance(&config, start.as_deref(), end.as_deref(), data_dir),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            eprintln!("{}", fatal_message(&e));
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TrendbandError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| TrendbandError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_run_settings(config: &dyn ConfigPort) -> Result<RunSettings, TrendbandError> {
    let data_dir = config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    let start_str = config
        .get_string("data", "start_date")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HISTORY_START.to_string());
    let history_start = parse_date(&start_str, "data", "start_date")?;

    Ok(RunSettings {
        data_dir: PathBuf::from(data_dir.trim()),
        history_start,
        skip_weekends: config.get_bool("run", "skip_weekends", true),
    })
}

pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, TrendbandError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        TrendbandError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("invalid date '{}' (expected YYYY-MM-DD)", value),
        }
    })
}

/// Line printed on stderr for an error that aborts the run. Written
/// directly so it survives any log filter.
pub fn fatal_message(err: &TrendbandError) -> String {
    format!("error: {}", truncate_message(&err.to_string(), MAX_ERROR_CHARS))
}

/// Cut `message` to at most `max_chars` characters, marking the cut.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let kept: String = message.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn load_run(
    config_path: &Path,
    data_dir: Option<PathBuf>,
) -> Result<(StrategyConfig, RunSettings), TrendbandError> {
    let adapter = load_config(config_path)?;
    let strategy = build_strategy_config(&adapter)?;
    let mut settings = build_run_settings(&adapter)?;
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    Ok((strategy, settings))
}

fn run_signal(
    config_path: &Path,
    date: Option<&str>,
    data_dir: Option<PathBuf>,
) -> Result<(), TrendbandError> {
    let (strategy, settings) = load_run(config_path, data_dir)?;
    let requested = date.map(|d| parse_date(d, "cli", "date")).transpose()?;
    let decision = resolve_run(Local::now().date_naive(), requested, settings.skip_weekends);

    let prices = CsvPriceAdapter::new(settings.data_dir.clone());
    run_signal_pipeline(&prices, &StdoutReport, &strategy, &settings, decision)?;
    Ok(())
}

/// Resolve, fetch, compute and deliver one daily signal.
///
/// Engine failures (no data, short history, unmapped score) are delivered
/// as a failure report and returned as `SignalOutcome::Failed`; provider
/// and delivery errors are returned as `Err`.
pub fn run_signal_pipeline(
    prices: &dyn PriceHistoryPort,
    reporter: &dyn ReportPort,
    strategy: &StrategyConfig,
    settings: &RunSettings,
    decision: RunDecision,
) -> Result<SignalOutcome, TrendbandError> {
    let target = match decision {
        RunDecision::Skip { date, reason } => {
            tracing::info!(%date, %reason, "skipping run");
            reporter.deliver(&text_report::format_skip(date, &reason))?;
            return Ok(SignalOutcome::Skipped { date, reason });
        }
        RunDecision::Run { target } => target,
    };

    let (start, end) = fetch_window(settings.history_start, target);
    tracing::info!(%target, %start, %end, "fetching price history");
    let table = prices.fetch(&strategy.tickers(), start, end)?;

    match compute_allocation(&table, target, strategy) {
        Ok(allocation) => {
            tracing::info!(
                effective = %allocation.effective_date,
                cash = allocation.cash,
                "allocation ready"
            );
            reporter.deliver(&text_report::format_allocation(&allocation))?;
            Ok(SignalOutcome::Allocated(allocation))
        }
        Err(e) if e.is_signal_failure() => {
            let reason = e.to_string();
            tracing::warn!(%target, %reason, "signal generation failed");
            reporter.deliver(&text_report::format_failure(target, &reason))?;
            Ok(SignalOutcome::Failed { target, reason })
        }
        Err(e) => Err(e),
    }
}

fn run_performance(
    config_path: &Path,
    start: Option<&str>,
    end: Option<&str>,
    data_dir: Option<PathBuf>,
) -> Result<(), TrendbandError> {
    let (strategy, settings) = load_run(config_path, data_dir)?;
    let start = match start {
        Some(s) => parse_date(s, "cli", "start")?,
        None => settings.history_start,
    };
    let end = match end {
        Some(s) => parse_date(s, "cli", "end")?,
        None => Local::now().date_naive(),
    };

    let prices = CsvPriceAdapter::new(settings.data_dir.clone());
    run_performance_pipeline(&prices, &StdoutReport, &strategy, &settings, start, end)?;
    Ok(())
}

/// Replay the strategy over `[start, end]` and deliver the summary.
pub fn run_performance_pipeline(
    prices: &dyn PriceHistoryPort,
    reporter: &dyn ReportPort,
    strategy: &StrategyConfig,
    settings: &RunSettings,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PerformanceSummary, TrendbandError> {
    if start > end {
        return Err(TrendbandError::ConfigInvalid {
            section: "cli".to_string(),
            key: "start".to_string(),
            reason: format!("start {} is after end {}", start, end),
        });
    }

    let (fetch_start, fetch_end) = fetch_window(settings.history_start.min(start), end);
    tracing::info!(%start, %end, "replaying strategy");
    let table = prices.fetch(&strategy.tickers(), fetch_start, fetch_end)?;
    let returns = replay(&table, strategy, start, end)?;

    let summary = PerformanceSummary::from_daily(&returns);
    let first = returns.first().map_or(start, |r| r.date);
    let last = returns.last().map_or(end, |r| r.date);
    reporter.deliver(&text_report::format_performance(&summary, first, last))?;
    Ok(summary)
}

fn run_validate(config_path: &Path) -> Result<(), TrendbandError> {
    let adapter = load_config(config_path)?;
    let strategy = build_strategy_config(&adapter)?;
    let settings = build_run_settings(&adapter)?;

    tracing::info!(
        data_dir = %settings.data_dir.display(),
        history_start = %settings.history_start,
        skip_weekends = settings.skip_weekends,
        "configuration is valid"
    );
    StdoutReport.deliver(&text_report::format_strategy(&strategy))
}

//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_history_adapter::CsvHistoryAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::allocation::parse_allocations;
use crate::domain::config_validation::{validate_scenario_config, DATA_SECTION, SCENARIO_SECTION};
use crate::domain::error::PortfolioError;
use crate::domain::metrics::ScenarioMetrics;
use crate::domain::rounding::RoundingPolicy;
use crate::domain::scenario::PortfolioScenario;
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;

pub const DEFAULT_INITIAL_AMOUNT: f64 = 10_000.0;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "portfolio-sim", about = "Rebalanced portfolio backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a portfolio scenario
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Write the daily trajectory to stdout as CSV, summary to stderr
        #[arg(long)]
        daily: bool,
    },
    /// Validate a scenario configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the history range of a security
    Info {
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Scenario inputs resolved from config and command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSettings {
    pub start_date: String,
    pub end_date: String,
    pub initial_amount: f64,
    pub holdings: Vec<(String, f64)>,
    pub rounding: RoundingPolicy,
    pub data_dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct Overrides {
    pub start: Option<String>,
    pub end: Option<String>,
    pub amount: Option<f64>,
    pub data_dir: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            start,
            end,
            amount,
            data_dir,
            daily,
        } => {
            let overrides = Overrides {
                start,
                end,
                amount,
                data_dir,
            };
            report(run_scenario_command(&config, overrides, daily))
        }
        Command::Validate { config } => report(run_validate(&config)),
        Command::Info { ticker, data_dir } => report(run_info(&ticker, data_dir)),
    }
}

fn report(result: Result<(), PortfolioError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PortfolioError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

pub fn build_settings(
    config: &dyn ConfigPort,
    overrides: Overrides,
) -> Result<ScenarioSettings, PortfolioError> {
    let required = |key: &str| {
        config
            .get_string(SCENARIO_SECTION, key)
            .ok_or_else(|| PortfolioError::ConfigMissing {
                section: SCENARIO_SECTION.into(),
                key: key.into(),
            })
    };

    let start_date = match overrides.start {
        Some(s) => s,
        None => required("start_date")?,
    };
    let end_date = match overrides.end {
        Some(s) => s,
        None => required("end_date")?,
    };

    let holdings = parse_allocations(&required("holdings")?)?;

    let rounding = match config.get_string(SCENARIO_SECTION, "rounding") {
        Some(s) => s.parse().map_err(|reason| PortfolioError::ConfigInvalid {
            section: SCENARIO_SECTION.into(),
            key: "rounding".into(),
            reason,
        })?,
        None => RoundingPolicy::default(),
    };

    let initial_amount = overrides.amount.unwrap_or_else(|| {
        config.get_double(SCENARIO_SECTION, "initial_amount", DEFAULT_INITIAL_AMOUNT)
    });

    let data_dir = overrides.data_dir.unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string(DATA_SECTION, "dir")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        )
    });

    Ok(ScenarioSettings {
        start_date,
        end_date,
        initial_amount,
        holdings,
        rounding,
        data_dir,
    })
}

/// Load every holding's history and add it to a new scenario.
pub fn build_scenario(
    history: &dyn HistoryPort,
    settings: &ScenarioSettings,
) -> Result<PortfolioScenario, PortfolioError> {
    let mut scenario = PortfolioScenario::new(&settings.start_date, &settings.end_date)
        .with_rounding(settings.rounding);

    for (ticker, weight) in &settings.holdings {
        let security = history.load_security(ticker)?;
        eprintln!("  {}: {} records", ticker, security.len());
        scenario.add_security(Arc::new(security), *weight)?;
    }
    Ok(scenario)
}

fn run_scenario_command(
    config_path: &Path,
    overrides: Overrides,
    daily: bool,
) -> Result<(), PortfolioError> {
    let config = load_config(config_path)?;
    validate_scenario_config(&config)?;
    let settings = build_settings(&config, overrides)?;

    eprintln!("Loading history from {}", settings.data_dir.display());
    let history = CsvHistoryAdapter::new(settings.data_dir.clone());
    let mut scenario = build_scenario(&history, &settings)?;

    eprintln!(
        "Running scenario: {} to {} ({} rounding)",
        scenario.start_date(),
        scenario.end_date(),
        scenario.rounding()
    );
    scenario.run(settings.initial_amount)?;

    write_report(&scenario, daily, io::stdout(), io::stderr())
}

/// Write the run report. With `daily` the trajectory CSV owns `out` and the
/// summary moves to `diag`, so the CSV can be piped into another tool.
pub fn write_report<O: io::Write, E: io::Write>(
    scenario: &PortfolioScenario,
    daily: bool,
    out: O,
    diag: E,
) -> Result<(), PortfolioError> {
    if daily {
        write_summary(scenario, diag)?;
        write_daily_csv(scenario, out)
    } else {
        write_summary(scenario, out)?;
        Ok(())
    }
}

/// Write the headline numbers and metrics of a completed scenario.
pub fn write_summary<W: io::Write>(scenario: &PortfolioScenario, mut out: W) -> io::Result<()> {
    let (Some(start_amt), Some(end_amt), Some(pct_change)) =
        (scenario.start_amt(), scenario.end_amt(), scenario.pct_change())
    else {
        return Ok(());
    };
    let metrics = ScenarioMetrics::compute(scenario.results(), start_amt, 0.0);

    write!(out, "{scenario}")?;
    writeln!(out, "Start Amount:     {:.2}", start_amt)?;
    writeln!(out, "End Amount:       {:.2}", end_amt)?;
    writeln!(out, "Pct Change:       {:.4}%", pct_change * 100.0)?;
    writeln!(out, "Annualized:       {:.2}%", metrics.annualized_return * 100.0)?;
    writeln!(out, "Volatility:       {:.2}%", metrics.volatility * 100.0)?;
    writeln!(out, "Sharpe Ratio:     {:.2}", metrics.sharpe_ratio)?;
    writeln!(out, "Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0)?;
    writeln!(out, "Best Day:         {:+.2}%", metrics.best_day * 100.0)?;
    writeln!(out, "Worst Day:        {:+.2}%", metrics.worst_day * 100.0)?;
    writeln!(out, "Rebalances:       {}", scenario.rebalance_count())?;
    out.flush()
}

/// Write `date,total_value,change,pct_change` rows for every result.
pub fn write_daily_csv<W: io::Write>(
    scenario: &PortfolioScenario,
    out: W,
) -> Result<(), PortfolioError> {
    let mut wtr = csv::Writer::from_writer(out);
    let to_io = |e: csv::Error| PortfolioError::Io(io::Error::other(e));

    wtr.write_record(["date", "total_value", "change", "pct_change"])
        .map_err(to_io)?;
    for r in scenario.results() {
        wtr.write_record([
            r.date.to_string(),
            format!("{:.2}", r.total_value),
            format!("{:.2}", r.change_from_previous),
            format!("{:.6}", r.pct_change_from_previous),
        ])
        .map_err(to_io)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), PortfolioError> {
    let config = load_config(config_path)?;
    validate_scenario_config(&config)?;
    let settings = build_settings(&config, Overrides::default())?;

    eprintln!("\nScenario: {} to {}", settings.start_date, settings.end_date);
    eprintln!("Initial amount: {:.2}", settings.initial_amount);
    eprintln!("Rounding: {}", settings.rounding);
    for (ticker, weight) in &settings.holdings {
        eprintln!("  {}: {:.2}%", ticker, weight * 100.0);
    }
    let total: f64 = settings.holdings.iter().map(|(_, w)| w).sum();
    if (total - 1.0).abs() > 1e-6 {
        eprintln!("warning: weights sum to {:.4}, not 1", total);
    }

    eprintln!("\nScenario configuration is valid.");
    Ok(())
}

fn run_info(ticker: &str, data_dir: Option<PathBuf>) -> Result<(), PortfolioError> {
    let ticker = ticker.trim().to_uppercase();
    let adapter = CsvHistoryAdapter::new(data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)));

    match adapter.data_range(&ticker)? {
        Some((first, last, count)) => {
            println!("{}: {} records, {} to {}", ticker, count, first, last);
        }
        None => eprintln!("{}: no data found", ticker),
    }
    Ok(())
}

//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sentiment_adapter::{FixedSentiment, RandomSentiment};
use crate::adapters::trajectory_writer::write_trajectory_file;
use crate::domain::backtest::{BacktestResult, SimulationConfig, backtest};
use crate::domain::config_validation::{parse_value, validate_all};
use crate::domain::error::MactraderError;
use crate::domain::metrics::Performance;
use crate::domain::optimizer::{self, ParamGrid, SweepEntry};
use crate::domain::signal::Decision;
use crate::domain::strategy::StrategyParams;
use crate::logging::setup_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::sentiment_port::SentimentPort;

pub const DEFAULT_SYMBOL: &str = "ETH/USD";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LIMIT: usize = 500;
pub const DEFAULT_TOP: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "mactrader", about = "Moving average crossover backtester")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single backtest and print its performance summary
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding <SYMBOL>.csv price files
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        symbol: Option<String>,
        /// Write the per-period trajectory to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Sweep short/long window pairs and rank them by total return
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        symbol: Option<String>,
        /// Number of ranked results to print
        #[arg(short, long)]
        top: Option<usize>,
        /// Run combinations one at a time instead of on the thread pool
        #[arg(long)]
        sequential: bool,
    },
    /// Validate a configuration file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with price files in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    setup_logging(if cli.verbose { "debug" } else { "info" });

    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            symbol,
            output,
        } => run_backtest(&config, data.as_deref(), symbol.as_deref(), output.as_deref()),
        Command::Optimize {
            config,
            data,
            symbol,
            top,
            sequential,
        } => run_optimize(&config, data.as_deref(), symbol.as_deref(), top, !sequential),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, data } => run_list_symbols(&config, data.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MactraderError> {
    info!(path = %path.display(), "loading config");
    let config = FileConfigAdapter::from_file(path)?;
    validate_all(&config)?;
    Ok(config)
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    symbol_override: Option<&str>,
    output_path: Option<&Path>,
) -> Result<(), MactraderError> {
    let config = load_config(config_path)?;
    let params = build_strategy_params(&config)?;
    let sim_config = build_simulation_config(&config)?;
    let sentiment = build_sentiment(&config)?;
    let symbol = resolve_symbol(symbol_override, &config);
    let limit = resolve_limit(&config)?;
    let data_port = CsvAdapter::new(resolve_data_dir(data_override, &config));

    let (result, perf) = run_backtest_pipeline(
        &data_port,
        &symbol,
        limit,
        params,
        sentiment.as_deref(),
        sim_config,
    )?;

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} | SMA({}) / SMA({}) | {} periods",
        symbol,
        params.short_window,
        params.long_window,
        result.signals.len()
    )?;
    if let Some(score) = result.signals.sentiment {
        writeln!(out, "Sentiment score: {:.2}", score)?;
    }
    writeln!(
        out,
        "Signals: {} buy, {} sell, {} hold",
        result.signals.count(Decision::Buy),
        result.signals.count(Decision::Sell),
        result.signals.count(Decision::Hold)
    )?;
    writeln!(out)?;
    perf.write_summary(&mut out)?;

    if let Some(path) = output_path {
        write_trajectory_file(path, &result.trajectory, &result.signals)?;
        info!(path = %path.display(), "trajectory written");
    }
    Ok(())
}

/// Fetch, generate, simulate and summarize one run against `data_port`.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    symbol: &str,
    limit: Option<usize>,
    params: StrategyParams,
    sentiment: Option<&dyn SentimentPort>,
    sim_config: SimulationConfig,
) -> Result<(BacktestResult, Performance), MactraderError> {
    let series = data_port.fetch_ohlcv(symbol, limit)?;
    info!(symbol, bars = series.len(), "fetched price data");

    info!(
        short = params.short_window,
        long = params.long_window,
        sentiment = sentiment.is_some(),
        "running backtest"
    );
    let result = backtest(params, sentiment, &series, sim_config)?;
    let perf = Performance::compute(&result.trajectory)?;
    info!(trades = perf.total_trades, "backtest complete");

    Ok((result, perf))
}

fn run_optimize(
    config_path: &Path,
    data_override: Option<&Path>,
    symbol_override: Option<&str>,
    top_override: Option<usize>,
    parallel: bool,
) -> Result<(), MactraderError> {
    let config = load_config(config_path)?;
    let grid = build_param_grid(&config)?;
    let sim_config = build_simulation_config(&config)?;
    let symbol = resolve_symbol(symbol_override, &config);
    let limit = resolve_limit(&config)?;
    let top = match top_override {
        Some(n) => n,
        None => parse_value::<usize>(&config, "optimize", "top")?.unwrap_or(DEFAULT_TOP),
    };
    if sentiment_mode(&config) != "off" {
        warn!("sentiment is not applied during optimization");
    }
    let data_port = CsvAdapter::new(resolve_data_dir(data_override, &config));

    let entries = run_optimize_pipeline(&data_port, &symbol, limit, &grid, sim_config, parallel)?;
    if entries.is_empty() {
        warn!("parameter grid has no valid short/long combinations");
        return Ok(());
    }

    let mut out = io::stdout().lock();
    write_sweep_table(&mut out, optimizer::top(&entries, top))?;
    Ok(())
}

pub fn run_optimize_pipeline(
    data_port: &dyn DataPort,
    symbol: &str,
    limit: Option<usize>,
    grid: &ParamGrid,
    sim_config: SimulationConfig,
    parallel: bool,
) -> Result<Vec<SweepEntry>, MactraderError> {
    let series = data_port.fetch_ohlcv(symbol, limit)?;
    info!(symbol, bars = series.len(), "fetched price data");
    if series.is_empty() {
        return Err(MactraderError::NoData {
            symbol: symbol.to_string(),
        });
    }
    optimizer::optimize(grid, &series, sim_config, parallel)
}

pub fn write_sweep_table<W: Write>(out: &mut W, entries: &[SweepEntry]) -> io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:>6}  {:>6}  {:>10}  {:>6}  {:>14}",
        "rank", "short", "long", "return", "trades", "final value"
    )?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:>6}  {:>6}  {:>9.2}%  {:>6}  {:>14.2}",
            i + 1,
            entry.params.short_window,
            entry.params.long_window,
            entry.total_return * 100.0,
            entry.total_trades,
            entry.final_value
        )?;
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), MactraderError> {
    let config = load_config(config_path)?;
    let params = build_strategy_params(&config)?;
    let sim_config = build_simulation_config(&config)?;
    let grid = build_param_grid(&config)?;
    let limit = resolve_limit(&config)?;

    let mut out = io::stdout().lock();
    writeln!(out, "Configuration is valid")?;
    writeln!(out, "  symbol:       {}", resolve_symbol(None, &config))?;
    writeln!(out, "  data dir:     {}", resolve_data_dir(None, &config).display())?;
    match limit {
        Some(n) => writeln!(out, "  limit:        {}", n)?,
        None => writeln!(out, "  limit:        all rows")?,
    }
    writeln!(
        out,
        "  windows:      short {}, long {}",
        params.short_window, params.long_window
    )?;
    writeln!(out, "  initial cash: {:.2}", sim_config.initial_cash)?;
    writeln!(out, "  commission:   {:.3}%", sim_config.commission_rate * 100.0)?;
    writeln!(out, "  sentiment:    {}", sentiment_mode(&config))?;
    writeln!(out, "  sweep:        {} combinations", grid.combinations().len())?;
    Ok(())
}

fn run_list_symbols(config_path: &Path, data_override: Option<&Path>) -> Result<(), MactraderError> {
    let config = load_config(config_path)?;
    let dir = resolve_data_dir(data_override, &config);
    let symbols = CsvAdapter::new(dir.clone()).list_symbols()?;

    if symbols.is_empty() {
        warn!(dir = %dir.display(), "no price files found");
        return Ok(());
    }
    let mut out = io::stdout().lock();
    for symbol in &symbols {
        writeln!(out, "{}", symbol)?;
    }
    info!(count = symbols.len(), "symbols found");
    Ok(())
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, MactraderError> {
    let defaults = StrategyParams::default();
    let short = parse_value(config, "strategy", "short_window")?.unwrap_or(defaults.short_window);
    let long = parse_value(config, "strategy", "long_window")?.unwrap_or(defaults.long_window);
    StrategyParams::new(short, long)
}

pub fn build_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, MactraderError> {
    let defaults = SimulationConfig::default();
    let sim_config = SimulationConfig {
        initial_cash: parse_value(config, "backtest", "initial_cash")?
            .unwrap_or(defaults.initial_cash),
        commission_rate: parse_value(config, "backtest", "commission")?
            .unwrap_or(defaults.commission_rate),
    };
    sim_config.validate()?;
    Ok(sim_config)
}

pub fn build_param_grid(config: &dyn ConfigPort) -> Result<ParamGrid, MactraderError> {
    let mut grid = ParamGrid::default();
    if let Some(spec) = config.get_string("optimize", "short_windows") {
        grid.short_windows = ParamGrid::parse_windows(&spec)
            .map_err(|reason| MactraderError::config_invalid("optimize", "short_windows", reason))?;
    }
    if let Some(spec) = config.get_string("optimize", "long_windows") {
        grid.long_windows = ParamGrid::parse_windows(&spec)
            .map_err(|reason| MactraderError::config_invalid("optimize", "long_windows", reason))?;
    }
    Ok(grid)
}

/// `None` when `[sentiment] mode` is `off` or absent.
pub fn build_sentiment(
    config: &dyn ConfigPort,
) -> Result<Option<Box<dyn SentimentPort>>, MactraderError> {
    match sentiment_mode(config).as_str() {
        "off" => Ok(None),
        "fixed" => {
            let score = parse_value::<f64>(config, "sentiment", "score")?.ok_or_else(|| {
                MactraderError::ConfigMissing {
                    section: "sentiment".into(),
                    key: "score".into(),
                }
            })?;
            Ok(Some(Box::new(FixedSentiment::new(score)?)))
        }
        "random" => {
            let source = match parse_value::<u64>(config, "sentiment", "seed")? {
                Some(seed) => RandomSentiment::seeded(seed),
                None => RandomSentiment::from_entropy(),
            };
            Ok(Some(Box::new(source)))
        }
        other => Err(MactraderError::config_invalid(
            "sentiment",
            "mode",
            format!("unknown mode '{}'", other),
        )),
    }
}

fn sentiment_mode(config: &dyn ConfigPort) -> String {
    config
        .get_string("sentiment", "mode")
        .map(|m| m.to_lowercase())
        .unwrap_or_else(|| "off".to_string())
}

pub fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> String {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
}

pub fn resolve_data_dir(dir_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    match dir_override {
        Some(dir) => dir.to_path_buf(),
        None => config
            .get_string("data", "dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    }
}

/// `[data] limit`, defaulting to the most recent 500 bars. `limit = all` keeps
/// every row.
pub fn resolve_limit(config: &dyn ConfigPort) -> Result<Option<usize>, MactraderError> {
    if config
        .get_string("data", "limit")
        .is_some_and(|v| v.eq_ignore_ascii_case("all"))
    {
        return Ok(None);
    }
    Ok(Some(
        parse_value(config, "data", "limit")?.unwrap_or(DEFAULT_LIMIT),
    ))
}

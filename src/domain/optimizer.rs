//! Parameter sweep over moving average window pairs.

use rayon::prelude::*;
use tracing::{debug, info};

use super::backtest::{SimulationConfig, backtest};
use super::error::MactraderError;
use super::metrics::Performance;
use super::ohlcv::PriceSeries;
use super::strategy::StrategyParams;

/// Window lengths to try for each side of the crossover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGrid {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
}

impl Default for ParamGrid {
    /// Short 10, 15, ..., 55 against long 50, 60, ..., 240.
    fn default() -> Self {
        ParamGrid {
            short_windows: (10..60).step_by(5).collect(),
            long_windows: (50..250).step_by(10).collect(),
        }
    }
}

impl ParamGrid {
    /// Every (short, long) pair with short < long. Other pairs are skipped.
    pub fn combinations(&self) -> Vec<StrategyParams> {
        let mut combos = Vec::new();
        for &short in &self.short_windows {
            for &long in &self.long_windows {
                let params = StrategyParams {
                    short_window: short,
                    long_window: long,
                };
                if params.validate().is_ok() {
                    combos.push(params);
                }
            }
        }
        combos
    }

    /// Parse a window list: either `a,b,c` or a half-open range `start..end..step`
    /// (step defaults to 1).
    pub fn parse_windows(spec: &str) -> Result<Vec<usize>, String> {
        let spec = spec.trim();
        if spec.contains("..") {
            let parts: Vec<&str> = spec.split("..").map(str::trim).collect();
            if parts.len() < 2 || parts.len() > 3 {
                return Err(format!("invalid range '{spec}', expected start..end[..step]"));
            }
            let start = parse_window(parts[0])?;
            let end = parse_window(parts[1])?;
            let step = match parts.get(2) {
                Some(s) => parse_window(s)?,
                None => 1,
            };
            if step == 0 {
                return Err("range step must be positive".to_string());
            }
            if start >= end {
                return Err(format!("empty range '{spec}'"));
            }
            return Ok((start..end).step_by(step).collect());
        }

        let windows = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_window)
            .collect::<Result<Vec<_>, _>>()?;
        if windows.is_empty() {
            return Err("window list is empty".to_string());
        }
        Ok(windows)
    }
}

fn parse_window(s: &str) -> Result<usize, String> {
    s.parse::<usize>()
        .map_err(|_| format!("'{s}' is not a window length"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepEntry {
    pub params: StrategyParams,
    pub total_return: f64,
    pub total_trades: u32,
    pub final_value: f64,
}

/// Backtest every grid combination against `series` and rank by total return,
/// best first.
///
/// Each combination builds its own strategy and simulator; the series is only
/// read. Runs happen on the rayon pool when `parallel` is set.
pub fn optimize(
    grid: &ParamGrid,
    series: &PriceSeries,
    config: SimulationConfig,
    parallel: bool,
) -> Result<Vec<SweepEntry>, MactraderError> {
    config.validate()?;
    let combos = grid.combinations();
    info!(
        combinations = combos.len(),
        parallel, "starting parameter sweep"
    );

    let run_one = |params: &StrategyParams| -> Result<SweepEntry, MactraderError> {
        let result = backtest(*params, None, series, config)?;
        let perf = Performance::compute(&result.trajectory)?;
        debug!(
            short = params.short_window,
            long = params.long_window,
            total_return = perf.total_return,
            "sweep run complete"
        );
        Ok(SweepEntry {
            params: *params,
            total_return: perf.total_return,
            total_trades: perf.total_trades,
            final_value: perf.final_value,
        })
    };

    let mut entries: Vec<SweepEntry> = if parallel {
        combos
            .par_iter()
            .map(run_one)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        combos
            .iter()
            .map(run_one)
            .collect::<Result<Vec<_>, _>>()?
    };

    entries.sort_by(|a, b| b.total_return.total_cmp(&a.total_return));
    Ok(entries)
}

/// The `n` best entries of an already ranked sweep.
pub fn top(entries: &[SweepEntry], n: usize) -> &[SweepEntry] {
    &entries[..n.min(entries.len())]
}

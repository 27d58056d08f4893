//! Backtest engine: portfolio simulation over a decision sequence.
//!
//! The simulation is a single left-to-right fold. Each period marks the open
//! position to market first, then applies at most one trade, then records a
//! snapshot. No period ever looks ahead.

use tracing::debug;

use super::error::MactraderError;
use super::ohlcv::PriceSeries;
use super::portfolio::{PortfolioSnapshot, PortfolioState, Trajectory};
use super::signal::{Decision, SignalSeries};
use super::strategy::{MovingAverageCrossover, StrategyParams};
use crate::ports::sentiment_port::SentimentPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub initial_cash: f64,
    /// Proportional fee on traded notional, e.g. 0.002 for 0.2%.
    pub commission_rate: f64,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), MactraderError> {
        if !self.initial_cash.is_finite() || self.initial_cash < 0.0 {
            return Err(MactraderError::config_invalid(
                "backtest",
                "initial_cash",
                "initial_cash must be a non-negative number",
            ));
        }
        if !self.commission_rate.is_finite()
            || self.commission_rate < 0.0
            || self.commission_rate >= 1.0
        {
            return Err(MactraderError::config_invalid(
                "backtest",
                "commission",
                "commission must be in [0, 1)",
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_cash: 10_000.0,
            commission_rate: 0.002,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self, MactraderError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn run(
        &self,
        decisions: &[Decision],
        series: &PriceSeries,
    ) -> Result<Trajectory, MactraderError> {
        if decisions.len() != series.len() {
            return Err(MactraderError::LengthMismatch {
                decisions: decisions.len(),
                prices: series.len(),
            });
        }
        if series.is_empty() {
            return Err(MactraderError::NoData {
                symbol: series.symbol().to_string(),
            });
        }

        let commission = self.config.commission_rate;
        let mut state = PortfolioState::new(self.config.initial_cash);
        let mut trajectory = Trajectory::new(self.config.initial_cash);

        for (bar, &decision) in series.bars().iter().zip(decisions) {
            let price = bar.close;
            let mut holdings_value = state.market_value(price);
            let mut trade_count = 0;

            match decision {
                // a buy at zero would size an unbounded position
                Decision::Buy if state.is_flat() && price == 0.0 => {
                    return Err(MactraderError::InvalidPriceData {
                        reason: format!("cannot buy at zero close at {}", bar.timestamp),
                    });
                }
                Decision::Buy if state.is_flat() => {
                    state.buy_all(price, commission);
                    holdings_value = state.market_value(price);
                    trade_count = 1;
                    debug!(timestamp = %bar.timestamp, price, shares = state.shares_held, "buy");
                }
                Decision::Sell if !state.is_flat() => {
                    state.sell_all(price, commission);
                    holdings_value = 0.0;
                    trade_count = 1;
                    debug!(timestamp = %bar.timestamp, price, cash = state.cash, "sell");
                }
                _ => {}
            }

            trajectory.record(PortfolioSnapshot {
                timestamp: bar.timestamp,
                cash: state.cash,
                holdings_value,
                total_value: state.cash + holdings_value,
                trade_count,
            });
        }

        Ok(trajectory)
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub params: StrategyParams,
    pub signals: SignalSeries,
    pub trajectory: Trajectory,
}

/// Generate signals for `series` and simulate them, with a fresh strategy and
/// simulator for this call alone.
pub fn backtest(
    params: StrategyParams,
    sentiment: Option<&dyn SentimentPort>,
    series: &PriceSeries,
    config: SimulationConfig,
) -> Result<BacktestResult, MactraderError> {
    let strategy = MovingAverageCrossover::new(params, sentiment)?;
    let simulator = Simulator::new(config)?;
    if series.is_empty() {
        return Err(MactraderError::NoData {
            symbol: series.symbol().to_string(),
        });
    }

    let signals = strategy.generate(series)?;
    let trajectory = simulator.run(&signals.decisions(), series)?;

    Ok(BacktestResult {
        params,
        signals,
        trajectory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(prices: &[f64]) -> PriceSeries {
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect();
        PriceSeries::new("ETH/USD", bars).unwrap()
    }

    fn config(initial_cash: f64, commission_rate: f64) -> SimulationConfig {
        SimulationConfig {
            initial_cash,
            commission_rate,
        }
    }

    use Decision::{Buy, Hold, Sell};

    #[test]
    fn worked_scenario() {
        let prices = series(&[100.0, 110.0, 120.0, 110.0, 100.0, 90.0]);
        let decisions = [Buy, Hold, Hold, Sell, Hold, Hold];
        let sim = Simulator::new(config(1000.0, 0.01)).unwrap();
        let trajectory = sim.run(&decisions, &prices).unwrap();

        assert_eq!(trajectory.trade_counts(), vec![1, 0, 0, 1, 0, 0]);

        let shares = trajectory.points[0].holdings_value / 100.0;
        assert_relative_eq!(shares, 9.90099, epsilon = 1e-5);
        assert_relative_eq!(trajectory.points[2].holdings_value, shares * 120.0, epsilon = 1e-9);

        let final_value = trajectory.final_value().unwrap();
        assert_relative_eq!(final_value, 1078.2178, epsilon = 1e-4);
        assert_eq!(trajectory.points[5].holdings_value, 0.0);
    }

    #[test]
    fn first_period_starts_from_initial_cash() {
        let sim = Simulator::new(config(1000.0, 0.0)).unwrap();
        let trajectory = sim.run(&[Hold, Hold], &series(&[10.0, 11.0])).unwrap();
        for p in &trajectory.points {
            assert_eq!(p.cash, 1000.0);
            assert_eq!(p.holdings_value, 0.0);
            assert_eq!(p.total_value, 1000.0);
            assert_eq!(p.trade_count, 0);
        }
    }

    #[test]
    fn sell_while_flat_is_noop() {
        let sim = Simulator::new(config(1000.0, 0.01)).unwrap();
        let trajectory = sim.run(&[Sell, Sell], &series(&[10.0, 20.0])).unwrap();
        assert_eq!(trajectory.total_trades(), 0);
        assert_eq!(trajectory.total_values(), vec![1000.0, 1000.0]);
    }

    #[test]
    fn buy_while_holding_is_noop() {
        let sim = Simulator::new(config(1000.0, 0.0)).unwrap();
        let trajectory = sim
            .run(&[Buy, Buy, Buy], &series(&[10.0, 20.0, 40.0]))
            .unwrap();
        assert_eq!(trajectory.trade_counts(), vec![1, 0, 0]);
        // 100 shares marked to market, no pyramiding
        assert_relative_eq!(trajectory.points[2].holdings_value, 4000.0);
        assert_eq!(trajectory.points[2].cash, 0.0);
    }

    #[test]
    fn mark_to_market_before_sell() {
        let sim = Simulator::new(config(100.0, 0.0)).unwrap();
        let trajectory = sim.run(&[Buy, Sell], &series(&[10.0, 15.0])).unwrap();
        assert_relative_eq!(trajectory.points[1].cash, 150.0);
        assert_eq!(trajectory.points[1].holdings_value, 0.0);
        assert_relative_eq!(trajectory.points[1].total_value, 150.0);
    }

    #[test]
    fn commission_only_leaks_on_trades() {
        let sim = Simulator::new(config(1000.0, 0.05)).unwrap();
        let trajectory = sim
            .run(&[Buy, Hold, Hold], &series(&[100.0, 100.0, 100.0]))
            .unwrap();
        let after_buy = trajectory.points[0].total_value;
        assert!(after_buy < 1000.0);
        assert_relative_eq!(trajectory.points[1].total_value, after_buy);
        assert_relative_eq!(trajectory.points[2].total_value, after_buy);
    }

    #[test]
    fn zero_initial_cash_runs() {
        let sim = Simulator::new(config(0.0, 0.01)).unwrap();
        let trajectory = sim.run(&[Buy, Sell], &series(&[10.0, 11.0])).unwrap();
        assert_eq!(trajectory.total_values(), vec![0.0, 0.0]);
    }

    #[test]
    fn rejects_length_mismatch() {
        let sim = Simulator::new(SimulationConfig::default()).unwrap();
        let err = sim.run(&[Buy], &series(&[10.0, 11.0])).unwrap_err();
        assert!(matches!(
            err,
            MactraderError::LengthMismatch {
                decisions: 1,
                prices: 2
            }
        ));
    }

    #[test]
    fn rejects_empty_series() {
        let sim = Simulator::new(SimulationConfig::default()).unwrap();
        let err = sim.run(&[], &series(&[])).unwrap_err();
        assert!(matches!(err, MactraderError::NoData { .. }));
    }

    #[test]
    fn zero_close_on_hold_marks_holdings_at_zero() {
        let sim = Simulator::new(config(1000.0, 0.0)).unwrap();
        let trajectory = sim
            .run(&[Hold, Hold, Hold], &series(&[10.0, 0.0, 10.0]))
            .unwrap();
        assert_eq!(trajectory.total_values(), vec![1000.0, 1000.0, 1000.0]);

        let trajectory = sim
            .run(&[Buy, Hold, Hold], &series(&[10.0, 0.0, 10.0]))
            .unwrap();
        assert_eq!(trajectory.points[1].holdings_value, 0.0);
        assert_eq!(trajectory.points[1].total_value, 0.0);
        assert_relative_eq!(trajectory.points[2].total_value, 1000.0);
    }

    #[test]
    fn sell_at_zero_close_realizes_nothing() {
        let sim = Simulator::new(config(1000.0, 0.01)).unwrap();
        let trajectory = sim
            .run(&[Buy, Sell, Hold], &series(&[10.0, 0.0, 10.0]))
            .unwrap();
        assert_eq!(trajectory.trade_counts(), vec![1, 1, 0]);
        assert_eq!(trajectory.points[1].cash, 0.0);
        assert_eq!(trajectory.points[1].holdings_value, 0.0);
        assert_eq!(trajectory.points[2].total_value, 0.0);
    }

    #[test]
    fn buy_at_zero_close_is_rejected() {
        let sim = Simulator::new(SimulationConfig::default()).unwrap();
        let err = sim.run(&[Hold, Buy], &series(&[10.0, 0.0])).unwrap_err();
        assert!(matches!(err, MactraderError::InvalidPriceData { .. }));
    }

    #[test]
    fn rejects_bad_config() {
        assert!(Simulator::new(config(-1.0, 0.0)).is_err());
        assert!(Simulator::new(config(f64::INFINITY, 0.0)).is_err());
        assert!(Simulator::new(config(100.0, 1.0)).is_err());
        assert!(Simulator::new(config(100.0, -0.1)).is_err());
        assert!(Simulator::new(config(0.0, 0.0)).is_ok());
    }

    #[test]
    fn backtest_wires_signals_into_simulation() {
        let prices = series(&[10.0, 10.0, 12.0, 14.0, 13.0, 9.0, 8.0]);
        let result = backtest(
            StrategyParams::new(2, 3).unwrap(),
            None,
            &prices,
            config(1000.0, 0.0),
        )
        .unwrap();

        assert_eq!(result.signals.len(), prices.len());
        assert_eq!(result.trajectory.len(), prices.len());
        assert!(result.trajectory.total_trades() >= 1);
    }

    #[test]
    fn backtest_rejects_invalid_windows_before_running() {
        let err = backtest(
            StrategyParams {
                short_window: 5,
                long_window: 2,
            },
            None,
            &series(&[]),
            SimulationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MactraderError::InvalidWindows { .. }));
    }

    #[test]
    fn backtest_rejects_empty_series() {
        let err = backtest(
            StrategyParams::default(),
            None,
            &series(&[]),
            SimulationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MactraderError::NoData { .. }));
    }
}

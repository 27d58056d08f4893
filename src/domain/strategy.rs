//! Moving average crossover strategy with an optional sentiment override.

use tracing::debug;

use super::error::MactraderError;
use super::indicator::sma::calculate_sma;
use super::ohlcv::PriceSeries;
use super::signal::{Decision, SignalPoint, SignalSeries};
use crate::ports::sentiment_port::SentimentPort;

/// Sentiment below this turns every buy into a hold.
pub const BEARISH_THRESHOLD: f64 = -0.5;
/// Sentiment above this turns every sell into a hold.
pub const BULLISH_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl StrategyParams {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, MactraderError> {
        let params = StrategyParams {
            short_window,
            long_window,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), MactraderError> {
        if self.short_window == 0 || self.short_window >= self.long_window {
            return Err(MactraderError::InvalidWindows {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            short_window: 25,
            long_window: 70,
        }
    }
}

pub struct MovingAverageCrossover<'a> {
    params: StrategyParams,
    sentiment: Option<&'a dyn SentimentPort>,
}

impl<'a> MovingAverageCrossover<'a> {
    pub fn new(
        params: StrategyParams,
        sentiment: Option<&'a dyn SentimentPort>,
    ) -> Result<Self, MactraderError> {
        params.validate()?;
        Ok(Self { params, sentiment })
    }

    /// Produce one decision per bar of `series`.
    ///
    /// The sentiment source, when present, is queried once for the whole
    /// series, before any decision is finalised.
    pub fn generate(&self, series: &PriceSeries) -> Result<SignalSeries, MactraderError> {
        if series.is_empty() {
            return Ok(SignalSeries {
                points: Vec::new(),
                sentiment: None,
            });
        }

        let bars = series.bars();
        let short = calculate_sma(bars, self.params.short_window);
        let long = calculate_sma(bars, self.params.long_window);

        let sentiment = match self.sentiment {
            Some(source) => {
                let score = source.sentiment(series.symbol())?;
                debug!(symbol = series.symbol(), score, "sentiment fetched");
                Some(score)
            }
            None => None,
        };

        let points = bars
            .iter()
            .zip(short.values.iter().zip(long.values.iter()))
            .map(|(bar, (s, l))| {
                let mut decision = crossover_decision(s.value, l.value);
                if let Some(score) = sentiment {
                    decision = apply_sentiment(decision, score);
                }
                SignalPoint {
                    timestamp: bar.timestamp,
                    close: bar.close,
                    short_mavg: s.value,
                    long_mavg: l.value,
                    decision,
                }
            })
            .collect();

        Ok(SignalSeries { points, sentiment })
    }
}

/// Buy when the short average is above the long one, sell when below, hold on a tie.
pub fn crossover_decision(short_mavg: f64, long_mavg: f64) -> Decision {
    if short_mavg > long_mavg {
        Decision::Buy
    } else if short_mavg < long_mavg {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

/// Both thresholds are checked independently against the same score.
pub fn apply_sentiment(decision: Decision, score: f64) -> Decision {
    let mut decision = decision;
    if score < BEARISH_THRESHOLD && decision == Decision::Buy {
        decision = Decision::Hold;
    }
    if score > BULLISH_THRESHOLD && decision == Decision::Sell {
        decision = Decision::Hold;
    }
    decision
}

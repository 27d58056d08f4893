//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). While fewer than n bars are available the
//! window shrinks to the bars seen so far, so every bar gets a value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            period,
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let start = (i + 1).saturating_sub(period);
        let window = &bars[start..=i];
        let mean = window.iter().map(|b| b.close).sum::<f64>() / window.len() as f64;
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value: mean,
        });
    }

    IndicatorSeries { period, values }
}

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use mactrader::domain::error::MactraderError;
pub use mactrader::domain::ohlcv::{OhlcvBar, PriceSeries};
use mactrader::ports::data_port::DataPort;
use mactrader::ports::sentiment_port::SentimentPort;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), make_bars(closes));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<PriceSeries, MactraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MactraderError::Data {
                reason: reason.clone(),
            });
        }
        let mut bars = self.data.get(symbol).cloned().unwrap_or_default();
        if let Some(limit) = limit {
            let skip = bars.len().saturating_sub(limit);
            bars.drain(..skip);
        }
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MactraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Returns a fixed score and counts how often it was asked.
pub struct MockSentiment {
    pub score: f64,
    pub calls: Cell<usize>,
}

impl MockSentiment {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            calls: Cell::new(0),
        }
    }
}

impl SentimentPort for MockSentiment {
    fn sentiment(&self, _symbol: &str) -> Result<f64, MactraderError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.score)
    }
}

pub struct FailingSentiment;

impl SentimentPort for FailingSentiment {
    fn sentiment(&self, _symbol: &str) -> Result<f64, MactraderError> {
        Err(MactraderError::Sentiment {
            reason: "service unavailable".into(),
        })
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One bar per day starting 2024-01-01, all prices equal to the close.
pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: start_time() + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("ETH/USD", make_bars(closes)).unwrap()
}

/// Trending sine wave, enough crossovers to trade several times.
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 15.0 * (i as f64 / 6.0).sin() + i as f64 * 0.1)
        .collect()
}

/// Price CSV text in the on-disk format, one row per close.
pub fn csv_text(closes: &[f64]) -> String {
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for bar in make_bars(closes) {
        text.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    text
}

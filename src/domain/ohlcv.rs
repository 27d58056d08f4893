//! OHLCV bar and price series representation.

use chrono::NaiveDateTime;

use super::error::MactraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    fn check_values(&self) -> Result<(), MactraderError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(MactraderError::InvalidPriceData {
                    reason: format!("{} at {} is {}", name, self.timestamp, value),
                });
            }
        }
        Ok(())
    }
}

/// An ordered, validated sequence of bars for one symbol.
///
/// Bar order is simulation order. Construction rejects non-finite or negative
/// values and timestamps that are not strictly increasing; it never re-sorts.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, MactraderError> {
        for bar in &bars {
            bar.check_values()?;
        }
        if let Some(pair) = bars
            .windows(2)
            .find(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(MactraderError::InvalidPriceData {
                reason: format!(
                    "timestamp {} does not follow {}",
                    pair[1].timestamp, pair[0].timestamp
                ),
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

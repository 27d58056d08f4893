//! Per-period trading decisions produced by a strategy.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Buy => "buy",
            Decision::Sell => "sell",
            Decision::Hold => "hold",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalPoint {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub short_mavg: f64,
    pub long_mavg: f64,
    pub decision: Decision,
}

/// Strategy output aligned 1:1 with the input price series.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    pub points: Vec<SignalPoint>,
    /// The score that was applied as an override, if a sentiment source was present.
    pub sentiment: Option<f64>,
}

impl SignalSeries {
    pub fn decisions(&self) -> Vec<Decision> {
        self.points.iter().map(|p| p.decision).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.points.iter().filter(|p| p.decision == decision).count()
    }
}

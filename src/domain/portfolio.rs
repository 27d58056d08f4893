//! Portfolio state and trajectory tracking.

use chrono::NaiveDateTime;

/// Mutable-per-step state carried through a simulation run.
///
/// Long-only and single-asset: the account is either fully invested
/// (`cash == 0`, `shares_held > 0`) or flat (`shares_held == 0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares_held: f64,
}

impl PortfolioState {
    pub fn new(initial_cash: f64) -> Self {
        PortfolioState {
            cash: initial_cash,
            shares_held: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.shares_held == 0.0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares_held * price
    }

    /// Spend all cash on shares, the commission shrinking the share count.
    pub fn buy_all(&mut self, price: f64, commission_rate: f64) {
        self.shares_held = self.cash / (price * (1.0 + commission_rate));
        self.cash = 0.0;
    }

    /// Sell every share, the commission shrinking the proceeds.
    pub fn sell_all(&mut self, price: f64, commission_rate: f64) {
        let proceeds = self.shares_held * price * (1.0 - commission_rate);
        self.cash += proceeds;
        self.shares_held = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub timestamp: NaiveDateTime,
    pub cash: f64,
    pub holdings_value: f64,
    pub total_value: f64,
    pub trade_count: u32,
}

/// The per-period history of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub initial_cash: f64,
    pub points: Vec<PortfolioSnapshot>,
}

impl Trajectory {
    pub fn new(initial_cash: f64) -> Self {
        Trajectory {
            initial_cash,
            points: Vec::new(),
        }
    }

    pub fn record(&mut self, snapshot: PortfolioSnapshot) {
        self.points.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.total_value)
    }

    pub fn total_trades(&self) -> u32 {
        self.points.iter().map(|p| p.trade_count).sum()
    }

    pub fn trade_counts(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.trade_count).collect()
    }

    pub fn total_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_value).collect()
    }
}

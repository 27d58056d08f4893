//! Technical indicator types.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorSeries`: a time series of indicator values for one lookback period

pub mod sma;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub period: usize,
    pub values: Vec<IndicatorPoint>,
}

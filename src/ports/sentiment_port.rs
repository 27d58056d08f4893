//! Sentiment source port trait.

use crate::domain::error::MactraderError;

/// A market sentiment oracle.
///
/// Scores are expected in [-1, 1], negative meaning bearish. Network access or
/// any other side effect belongs to the implementation.
pub trait SentimentPort {
    fn sentiment(&self, symbol: &str) -> Result<f64, MactraderError>;
}

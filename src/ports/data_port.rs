//! Data access port trait.

use crate::domain::error::MactraderError;
use crate::domain::ohlcv::PriceSeries;

pub trait DataPort {
    /// Fetch the historical series for `symbol`, oldest bar first.
    ///
    /// With `limit` set, only the most recent `limit` bars are returned.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<PriceSeries, MactraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, MactraderError>;
}

//! CSV file data adapter.
//!
//! One file per symbol under a base directory, named after the symbol with
//! `/` replaced by `_` (`ETH/USD` → `ETH_USD.csv`). Columns:
//! `timestamp,open,high,low,close,volume`.

use crate::domain::error::MactraderError;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn file_name(symbol: &str) -> String {
        format!("{}.csv", symbol.replace('/', "_"))
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(Self::file_name(symbol))
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, or Unix
/// milliseconds.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, MactraderError> {
    record
        .get(index)
        .ok_or_else(|| MactraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| MactraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<PriceSeries, MactraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| MactraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| MactraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| MactraderError::Data {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| MactraderError::Data {
                reason: format!("invalid timestamp: {}", ts_str),
            })?;

            bars.push(OhlcvBar {
                timestamp,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        if let Some(limit) = limit {
            let skip = bars.len().saturating_sub(limit);
            bars.drain(..skip);
        }

        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded price data");
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MactraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MactraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| MactraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(".csv") {
                symbols.push(stem.replacen('_', "/", 1));
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

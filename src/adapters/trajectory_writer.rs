//! CSV export of a simulated trajectory alongside the signals that drove it.

use std::path::Path;

use crate::domain::error::MactraderError;
use crate::domain::portfolio::Trajectory;
use crate::domain::signal::SignalSeries;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn write_trajectory_csv<W: std::io::Write>(
    writer: W,
    trajectory: &Trajectory,
    signals: &SignalSeries,
) -> Result<(), MactraderError> {
    if trajectory.len() != signals.len() {
        return Err(MactraderError::LengthMismatch {
            decisions: signals.len(),
            prices: trajectory.len(),
        });
    }

    let mut wtr = csv::Writer::from_writer(writer);
    let to_err = |e: csv::Error| MactraderError::Data {
        reason: format!("CSV write error: {}", e),
    };

    wtr.write_record([
        "timestamp",
        "close",
        "signal",
        "cash",
        "holdings_value",
        "total_value",
        "trade_count",
    ])
    .map_err(to_err)?;

    for (point, signal) in trajectory.points.iter().zip(&signals.points) {
        wtr.write_record([
            point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            signal.close.to_string(),
            signal.decision.to_string(),
            point.cash.to_string(),
            point.holdings_value.to_string(),
            point.total_value.to_string(),
            point.trade_count.to_string(),
        ])
        .map_err(to_err)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_trajectory_file(
    path: &Path,
    trajectory: &Trajectory,
    signals: &SignalSeries,
) -> Result<(), MactraderError> {
    let file = std::fs::File::create(path)?;
    write_trajectory_csv(file, trajectory, signals)
}

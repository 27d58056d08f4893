//! Performance metrics derived from a simulation trajectory.

use std::io::{self, Write};

use super::error::MactraderError;
use super::portfolio::{PortfolioSnapshot, Trajectory};

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub initial_cash: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub total_trades: u32,
    pub max_drawdown: f64,
}

impl Performance {
    pub fn compute(trajectory: &Trajectory) -> Result<Self, MactraderError> {
        let final_value = trajectory
            .final_value()
            .ok_or(MactraderError::EmptyTrajectory)?;
        if trajectory.initial_cash == 0.0 {
            return Err(MactraderError::UndefinedReturn);
        }

        Ok(Performance {
            initial_cash: trajectory.initial_cash,
            final_value,
            total_return: final_value / trajectory.initial_cash - 1.0,
            total_trades: trajectory.total_trades(),
            max_drawdown: compute_drawdown(&trajectory.points),
        })
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Backtest Performance Summary:")?;
        writeln!(out, "-----------------------------")?;
        writeln!(out, "Initial Portfolio Value: ${:.2}", self.initial_cash)?;
        writeln!(out, "Final Portfolio Value:   ${:.2}", self.final_value)?;
        writeln!(out, "Total Return:            {:.2}%", self.total_return * 100.0)?;
        writeln!(out, "Max Drawdown:            -{:.2}%", self.max_drawdown * 100.0)?;
        writeln!(out, "Total Trades:            {}", self.total_trades)?;
        writeln!(out, "-----------------------------")?;
        Ok(())
    }
}

/// Largest peak-to-trough decline of total value, as a fraction of the peak.
fn compute_drawdown(points: &[PortfolioSnapshot]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };

    let mut peak = first.total_value;
    let mut max_dd = 0.0_f64;

    for point in points {
        if point.total_value > peak {
            peak = point.total_value;
        } else if peak > 0.0 {
            let dd = (peak - point.total_value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

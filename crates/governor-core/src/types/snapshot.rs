//! Account and position snapshots reported by the exchange connector.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Direction;

/// Current account state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    /// Total account equity
    pub equity: Decimal,
}

/// Snapshot of the (single) open position as the exchange reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub direction: Direction,
    /// Absolute position size in base units
    pub size: f64,
    /// Average entry price
    pub entry_price: f64,
    /// Unrealized profit/loss
    pub unrealized_pnl: Decimal,
}

impl PositionSnapshot {
    pub fn new(direction: Direction, size: f64, entry_price: f64) -> Self {
        Self {
            direction,
            size,
            entry_price,
            unrealized_pnl: Decimal::ZERO,
        }
    }
}

/// Result of opening a position.
#[derive(Debug, Clone)]
pub struct OrderFill {
    pub direction: Direction,
    pub size: f64,
    pub fill_price: f64,
}

/// Result of closing a position.
///
/// `realized_pnl` is reported when the exchange provides it; otherwise the
/// caller computes it from entry/exit prices and size.
#[derive(Debug, Clone)]
pub struct ClosedTrade {
    pub direction: Direction,
    pub size: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub realized_pnl: Option<Decimal>,
}

impl ClosedTrade {
    /// Realized P&L, falling back to entry/exit arithmetic when the
    /// exchange did not report it.
    pub fn pnl(&self) -> Decimal {
        self.realized_pnl.unwrap_or_else(|| {
            let per_unit = match self.direction {
                Direction::Long => self.exit_price - self.entry_price,
                Direction::Short => self.entry_price - self.exit_price,
            };
            Decimal::try_from(per_unit * self.size).unwrap_or_default()
        })
    }
}

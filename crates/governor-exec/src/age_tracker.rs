//! Position-age tracking for time-based exits.

use chrono::{DateTime, Utc};
use governor_core::types::{Candle, Direction};
use tracing::debug;

/// Advice to exit a position, carrying elapsed-time and price-drift facts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitAdvice {
    pub reason: String,
    pub candles_held: u32,
    /// Absolute price change since entry, as a fraction of entry
    pub price_change_pct: f64,
}

/// What the tracker currently knows about the open position.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerStatus {
    Flat,
    Tracking {
        side: Direction,
        entry_price: f64,
        candles_held: u32,
        candles_remaining: u32,
    },
}

#[derive(Debug, Clone)]
struct TrackedPosition {
    side: Direction,
    entry_price: f64,
    entry_time: DateTime<Utc>,
    candles_held: u32,
}

/// Counts elapsed candles since entry and flags positions that have aged
/// past the bound.
///
/// The tracker only reports elapsed-time and price-drift facts; deciding
/// whether the move is "insufficient" belongs to the caller (see
/// `ExecutionPlanner::check_time_stop`). State machine is strictly
/// flat -> tracking on open and tracking -> flat on close.
#[derive(Debug)]
pub struct PositionAgeTracker {
    max_candles: u32,
    tracked: Option<TrackedPosition>,
}

impl PositionAgeTracker {
    pub fn new(max_candles: u32) -> Self {
        Self {
            max_candles,
            tracked: None,
        }
    }

    /// Record a freshly opened position and reset the candle counter.
    pub fn on_position_opened(&mut self, side: Direction, entry_price: f64, timestamp: DateTime<Utc>) {
        debug!(%side, entry_price, "tracking new position");
        self.tracked = Some(TrackedPosition {
            side,
            entry_price,
            entry_time: timestamp,
            candles_held: 0,
        });
    }

    /// Clear all tracking state.
    pub fn on_position_closed(&mut self) {
        debug!("position closed, tracker reset");
        self.tracked = None;
    }

    /// Entry timestamp of the tracked position, if any.
    pub fn entry_time(&self) -> Option<DateTime<Utc>> {
        self.tracked.as_ref().map(|t| t.entry_time)
    }

    /// Process a new candle. No-op while flat.
    ///
    /// Once the held-candle count reaches the bound, returns advice with
    /// the elapsed count and the price drift since entry.
    pub fn on_new_candle(&mut self, candle: &Candle) -> Option<ExitAdvice> {
        let tracked = self.tracked.as_mut()?;
        tracked.candles_held += 1;

        if tracked.candles_held < self.max_candles {
            return None;
        }

        let price_change_pct = if tracked.entry_price > 0.0 {
            (candle.close - tracked.entry_price).abs() / tracked.entry_price
        } else {
            0.0
        };

        Some(ExitAdvice {
            reason: format!(
                "held {} candles with {:.2}% movement",
                tracked.candles_held,
                price_change_pct * 100.0
            ),
            candles_held: tracked.candles_held,
            price_change_pct,
        })
    }

    pub fn get_status(&self) -> TrackerStatus {
        match &self.tracked {
            None => TrackerStatus::Flat,
            Some(t) => TrackerStatus::Tracking {
                side: t.side,
                entry_price: t.entry_price,
                candles_held: t.candles_held,
                candles_remaining: self.max_candles.saturating_sub(t.candles_held),
            },
        }
    }
}

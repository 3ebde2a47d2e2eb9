//! Persistent daily-loss and loss-streak circuit breaker.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use governor_core::error::GovernorError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::StateStore;

/// Persisted circuit-breaker state. Survives restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskState {
    /// UTC-midnight boundary the daily counters are valid for
    pub day_start: DateTime<Utc>,
    /// Signed realized P&L accumulated since `day_start`
    pub day_pnl: Decimal,
    /// Consecutive closed trades with negative realized P&L
    pub consecutive_losses: u32,
    /// Trading is paused while now < this
    pub paused_until: Option<DateTime<Utc>>,
    /// Trading is fully halted while now < this
    pub shutdown_until: Option<DateTime<Utc>>,
}

impl Default for RiskState {
    fn default() -> Self {
        Self {
            day_start: DateTime::UNIX_EPOCH,
            day_pnl: Decimal::ZERO,
            consecutive_losses: 0,
            paused_until: None,
            shutdown_until: None,
        }
    }
}

/// Outcome of reporting a closed trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseOutcome {
    pub triggered_pause: bool,
    pub consecutive_losses: u32,
    pub day_pnl: Decimal,
}

/// Answers "is trading paused or shut down right now?" and updates
/// streak/day-PnL state when a trade closes.
///
/// Pause is triggered automatically by a loss streak and is meant to be
/// short and reversible. Shutdown is invoked by the caller when the
/// daily loss limit is breached, since that threshold depends on account
/// size the caller owns; this component never calls `shutdown_for`
/// itself.
#[derive(Debug)]
pub struct RiskGovernor {
    state: RiskState,
    store: StateStore,
}

impl RiskGovernor {
    /// Load persisted state from the store, falling back to a fresh
    /// zeroed state on a missing or corrupt file.
    pub fn load(store: StateStore) -> Self {
        let state = store.load();
        Self { state, store }
    }

    pub fn state(&self) -> &RiskState {
        &self.state
    }

    /// Reset daily counters the first time the governor is consulted
    /// after a UTC-midnight boundary is crossed. Must run before any
    /// read of `day_pnl`.
    pub fn ensure_day_initialized(&mut self) -> Result<(), GovernorError> {
        self.ensure_day_initialized_at(Utc::now())
    }

    pub fn ensure_day_initialized_at(&mut self, now: DateTime<Utc>) -> Result<(), GovernorError> {
        let boundary = utc_midnight(now);
        if self.state.day_start != boundary {
            info!(day = %boundary.date_naive(), "new trading day, resetting daily counters");
            self.state.day_start = boundary;
            self.state.day_pnl = Decimal::ZERO;
            self.store.save(&self.state)?;
        }
        Ok(())
    }

    /// Is trading paused right now? Pure time comparison, no side effects.
    pub fn is_paused(&self) -> bool {
        self.is_paused_at(Utc::now())
    }

    pub fn is_paused_at(&self, now: DateTime<Utc>) -> bool {
        self.state.paused_until.is_some_and(|until| now < until)
    }

    /// Is trading fully halted right now?
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown_at(Utc::now())
    }

    pub fn is_shutdown_at(&self, now: DateTime<Utc>) -> bool {
        self.state.shutdown_until.is_some_and(|until| now < until)
    }

    /// Realized P&L accumulated since the current day boundary.
    ///
    /// Callers must run `ensure_day_initialized` first so stale counters
    /// from a previous day are never reported.
    pub fn get_day_pnl(&self) -> Decimal {
        self.state.day_pnl
    }

    /// Report a closed trade's realized P&L.
    ///
    /// Accumulates the day P&L, maintains the loss streak, and fires an
    /// automatic pause once the streak reaches `pause_after_losses`.
    pub fn on_trade_closed(
        &mut self,
        pnl: Decimal,
        pause_after_losses: u32,
        pause_duration: Duration,
    ) -> Result<CloseOutcome, GovernorError> {
        self.on_trade_closed_at(Utc::now(), pnl, pause_after_losses, pause_duration)
    }

    pub fn on_trade_closed_at(
        &mut self,
        now: DateTime<Utc>,
        pnl: Decimal,
        pause_after_losses: u32,
        pause_duration: Duration,
    ) -> Result<CloseOutcome, GovernorError> {
        self.ensure_day_initialized_at(now)?;

        self.state.day_pnl += pnl;
        if pnl < Decimal::ZERO {
            self.state.consecutive_losses += 1;
        } else {
            self.state.consecutive_losses = 0;
        }
        self.store.save(&self.state)?;

        let mut triggered_pause = false;
        if self.state.consecutive_losses >= pause_after_losses {
            warn!(
                losses = self.state.consecutive_losses,
                "loss streak threshold reached, pausing"
            );
            self.pause_for_at(now, pause_duration)?;
            triggered_pause = true;
        }

        Ok(CloseOutcome {
            triggered_pause,
            consecutive_losses: self.state.consecutive_losses,
            day_pnl: self.state.day_pnl,
        })
    }

    /// Pause trading for the given duration.
    pub fn pause_for(&mut self, duration: Duration) -> Result<(), GovernorError> {
        self.pause_for_at(Utc::now(), duration)
    }

    pub fn pause_for_at(
        &mut self,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<(), GovernorError> {
        self.state.paused_until = Some(now + duration);
        self.store.save(&self.state)
    }

    /// Halt trading entirely for the given duration. Invoked by the
    /// polling loop when the daily loss limit is breached.
    pub fn shutdown_for(&mut self, duration: Duration) -> Result<(), GovernorError> {
        self.shutdown_for_at(Utc::now(), duration)
    }

    pub fn shutdown_for_at(
        &mut self,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<(), GovernorError> {
        self.state.shutdown_until = Some(now + duration);
        self.store.save(&self.state)
    }
}

/// The UTC-midnight boundary for the given instant.
fn utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn governor(dir: &tempfile::TempDir) -> RiskGovernor {
        RiskGovernor::load(StateStore::new(dir.path().join("risk_state.json")))
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_loss_streak_triggers_pause() {
        let dir = tempfile::tempdir().unwrap();
        let mut gov = governor(&dir);
        let now = at(10, 0);
        let pause = Duration::hours(4);

        let one = gov.on_trade_closed_at(now, dec!(-10), 3, pause).unwrap();
        assert!(!one.triggered_pause);
        let two = gov.on_trade_closed_at(now, dec!(-10), 3, pause).unwrap();
        assert!(!two.triggered_pause);
        assert!(!gov.is_paused_at(now));

        let three = gov.on_trade_closed_at(now, dec!(-10), 3, pause).unwrap();
        assert!(three.triggered_pause);
        assert_eq!(three.consecutive_losses, 3);
        assert!(gov.is_paused_at(now));
        assert_eq!(gov.state().paused_until, Some(now + pause));
        assert!(!gov.is_paused_at(now + pause));
    }

    #[test]
    fn test_winning_trade_resets_streak() {
        let dir = tempfile::tempdir().unwrap();
        let mut gov = governor(&dir);
        let now = at(10, 0);
        let pause = Duration::hours(4);

        gov.on_trade_closed_at(now, dec!(-10), 3, pause).unwrap();
        gov.on_trade_closed_at(now, dec!(-10), 3, pause).unwrap();

        let win = gov.on_trade_closed_at(now, dec!(5), 3, pause).unwrap();
        assert_eq!(win.consecutive_losses, 0);

        // Two more losses alone do not fire a pause
        gov.on_trade_closed_at(now, dec!(-10), 3, pause).unwrap();
        let last = gov.on_trade_closed_at(now, dec!(-10), 3, pause).unwrap();
        assert!(!last.triggered_pause);
        assert!(!gov.is_paused_at(now));
    }

    #[test]
    fn test_breakeven_close_resets_streak() {
        let dir = tempfile::tempdir().unwrap();
        let mut gov = governor(&dir);
        let now = at(10, 0);

        gov.on_trade_closed_at(now, dec!(-10), 3, Duration::hours(1))
            .unwrap();
        let flat = gov
            .on_trade_closed_at(now, Decimal::ZERO, 3, Duration::hours(1))
            .unwrap();
        assert_eq!(flat.consecutive_losses, 0);
    }

    #[test]
    fn test_day_pnl_resets_at_utc_midnight() {
        let dir = tempfile::tempdir().unwrap();
        let mut gov = governor(&dir);

        let evening = at(23, 50);
        gov.on_trade_closed_at(evening, dec!(-250), 10, Duration::hours(1))
            .unwrap();
        assert_eq!(gov.get_day_pnl(), dec!(-250));

        // First consultation after the boundary resets the counter
        let next_day = Utc.with_ymd_and_hms(2024, 6, 2, 0, 5, 0).unwrap();
        gov.ensure_day_initialized_at(next_day).unwrap();
        assert_eq!(gov.get_day_pnl(), Decimal::ZERO);

        // A second consultation the same day does not reset again
        gov.on_trade_closed_at(next_day, dec!(40), 10, Duration::hours(1))
            .unwrap();
        gov.ensure_day_initialized_at(next_day + Duration::hours(3))
            .unwrap();
        assert_eq!(gov.get_day_pnl(), dec!(40));
    }

    #[test]
    fn test_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("risk_state.json"));
        let now = at(9, 30);

        let mut gov = RiskGovernor::load(store.clone());
        gov.ensure_day_initialized_at(now).unwrap();
        gov.on_trade_closed_at(now, dec!(-12.5), 5, Duration::hours(4))
            .unwrap();
        gov.pause_for_at(now, Duration::hours(2)).unwrap();
        gov.shutdown_for_at(now, Duration::hours(24)).unwrap();

        let reloaded = RiskGovernor::load(store);
        assert_eq!(reloaded.state(), gov.state());
        assert_eq!(reloaded.get_day_pnl(), dec!(-12.5));
        assert_eq!(reloaded.state().consecutive_losses, 1);
        assert!(reloaded.is_paused_at(now + Duration::hours(1)));
        assert!(reloaded.is_shutdown_at(now + Duration::hours(23)));
    }

    #[test]
    fn test_pause_and_shutdown_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let mut gov = governor(&dir);
        let now = at(12, 0);

        gov.shutdown_for_at(now, Duration::hours(24)).unwrap();
        assert!(gov.is_shutdown_at(now));
        assert!(!gov.is_paused_at(now));

        gov.pause_for_at(now, Duration::hours(1)).unwrap();
        assert!(gov.is_paused_at(now));
        assert!(!gov.is_paused_at(now + Duration::hours(2)));
        assert!(gov.is_shutdown_at(now + Duration::hours(2)));
    }
}

//! Admission control: sliding-window rate limit plus post-close cooldown.

use chrono::{DateTime, Duration, Utc};

/// Trailing window for the trade-frequency cap, in seconds.
const FREQUENCY_WINDOW_SECS: i64 = 3600;

/// Answers "may a new position be opened right now?".
///
/// Two independent braking mechanisms, both of which must pass: a
/// frequency cap over the trailing hour and a cooldown after the most
/// recent close. The guard only advises; callers must still invoke
/// `record_open` / `record_close` for state to stay accurate.
///
/// State is intentionally process-lifetime only. Rate limiting across a
/// restart is not meaningful for this use case.
#[derive(Debug)]
pub struct AdmissionGuard {
    max_trades_per_hour: usize,
    cooldown: Duration,
    open_timestamps: Vec<DateTime<Utc>>,
    last_close: Option<DateTime<Utc>>,
}

impl AdmissionGuard {
    pub fn new(max_trades_per_hour: usize, cooldown_minutes: i64) -> Self {
        Self {
            max_trades_per_hour,
            cooldown: Duration::minutes(cooldown_minutes),
            open_timestamps: Vec::new(),
            last_close: None,
        }
    }

    /// May a new position be opened right now?
    pub fn allow_new_trade(&mut self) -> bool {
        self.allow_new_trade_at(Utc::now())
    }

    pub fn allow_new_trade_at(&mut self, now: DateTime<Utc>) -> bool {
        let window = Duration::seconds(FREQUENCY_WINDOW_SECS);
        self.open_timestamps
            .retain(|t| now.signed_duration_since(*t) < window);

        if self.open_timestamps.len() >= self.max_trades_per_hour {
            return false;
        }

        if let Some(close) = self.last_close {
            if now.signed_duration_since(close) < self.cooldown {
                return false;
            }
        }

        true
    }

    /// Record that a position was opened.
    pub fn record_open(&mut self) {
        self.record_open_at(Utc::now());
    }

    pub fn record_open_at(&mut self, now: DateTime<Utc>) {
        self.open_timestamps.push(now);
    }

    /// Record that a position was closed.
    pub fn record_close(&mut self) {
        self.record_close_at(Utc::now());
    }

    pub fn record_close_at(&mut self, now: DateTime<Utc>) {
        self.last_close = Some(now);
    }

    /// Opens currently inside the trailing window.
    pub fn opens_in_window(&self, now: DateTime<Utc>) -> usize {
        let window = Duration::seconds(FREQUENCY_WINDOW_SECS);
        self.open_timestamps
            .iter()
            .filter(|t| now.signed_duration_since(**t) < window)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_frequency_cap() {
        let mut guard = AdmissionGuard::new(2, 0);
        let now = t0();

        assert!(guard.allow_new_trade_at(now));
        guard.record_open_at(now);
        assert!(guard.allow_new_trade_at(now));
        guard.record_open_at(now + Duration::minutes(5));

        // Cap reached
        assert!(!guard.allow_new_trade_at(now + Duration::minutes(10)));

        // Still blocked while both opens are inside the window
        assert!(!guard.allow_new_trade_at(now + Duration::minutes(59)));

        // First open ages out after an hour
        assert!(guard.allow_new_trade_at(now + Duration::minutes(61)));
    }

    #[test]
    fn test_cooldown_after_close() {
        let mut guard = AdmissionGuard::new(10, 10);
        let close = t0();
        guard.record_close_at(close);

        assert!(!guard.allow_new_trade_at(close + Duration::seconds(1)));
        assert!(!guard.allow_new_trade_at(close + Duration::seconds(599)));
        assert!(guard.allow_new_trade_at(close + Duration::seconds(600)));
    }

    #[test]
    fn test_both_conditions_must_pass() {
        let mut guard = AdmissionGuard::new(1, 10);
        let now = t0();

        guard.record_open_at(now);
        guard.record_close_at(now + Duration::minutes(5));

        // Cooldown elapsed but the frequency cap still blocks
        assert!(!guard.allow_new_trade_at(now + Duration::minutes(30)));

        // Both clear
        assert!(guard.allow_new_trade_at(now + Duration::minutes(61)));
    }

    #[test]
    fn test_no_history_allows() {
        let mut guard = AdmissionGuard::new(2, 30);
        assert!(guard.allow_new_trade_at(t0()));
    }

    #[test]
    fn test_window_prunes_state() {
        let mut guard = AdmissionGuard::new(2, 0);
        let now = t0();
        guard.record_open_at(now);
        guard.record_open_at(now);

        assert_eq!(guard.opens_in_window(now), 2);
        assert!(guard.allow_new_trade_at(now + Duration::hours(2)));
        assert_eq!(guard.opens_in_window(now + Duration::hours(2)), 0);
    }
}

//! The governor facade: gating order, trade lifecycle, loss-limit shutdown.

use chrono::{DateTime, Duration, Utc};
use governor_core::error::GovernorError;
use governor_core::types::{Candle, ClosedTrade, Direction, GovernorEvent, PositionSnapshot};
use governor_exec::{ExecutionPlanner, ExitAdvice, PlanDecision, PositionAgeTracker};
use governor_risk::{AdmissionGuard, RiskGovernor};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Caller-side risk thresholds the engine enforces around the components.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Loss streak length that triggers an automatic pause
    pub pause_after_losses: u32,
    pub pause_duration: Duration,
    /// Daily loss limit as a fraction of starting equity
    pub daily_loss_limit_pct: Decimal,
    pub shutdown_duration: Duration,
    /// Starting equity the daily loss limit is measured against
    pub start_equity: Decimal,
}

/// What the polling loop should do this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleDecision {
    /// Trading is paused or shut down; do nothing
    Halted { reason: String },
    /// The open position stagnated past the time stop; close it
    ForceExit(ExitAdvice),
    /// A position is open and healthy; no new trade
    Hold,
    /// Admission control refused a new trade
    Blocked { reason: String },
    /// All gates passed; a signal may be acted on
    ClearToTrade,
}

/// A cycle decision plus any events to forward to the notification
/// channel.
#[derive(Debug)]
pub struct CycleReport {
    pub decision: CycleDecision,
    pub events: Vec<GovernorEvent>,
}

/// Owns the four governor components and runs them in the contract
/// order each polling cycle: circuit breaker, time stop, admission,
/// planning.
///
/// Trade lifecycle state is kept accurate by diffing exchange position
/// snapshots (`sync_position`) rather than trusting call-site
/// discipline, so the record hooks fire exactly once per real open or
/// close even across restarts.
pub struct TradingGovernor {
    settings: EngineSettings,
    admission: AdmissionGuard,
    risk: RiskGovernor,
    planner: ExecutionPlanner,
    tracker: PositionAgeTracker,
}

impl TradingGovernor {
    pub fn new(
        settings: EngineSettings,
        admission: AdmissionGuard,
        risk: RiskGovernor,
        planner: ExecutionPlanner,
        tracker: PositionAgeTracker,
    ) -> Self {
        Self {
            settings,
            admission,
            risk,
            planner,
            tracker,
        }
    }

    pub fn risk(&self) -> &RiskGovernor {
        &self.risk
    }

    pub fn planner(&self) -> &ExecutionPlanner {
        &self.planner
    }

    pub fn tracker(&self) -> &PositionAgeTracker {
        &self.tracker
    }

    /// Run the per-cycle gating sequence.
    pub fn evaluate_cycle(
        &mut self,
        candles: &[Candle],
        position: Option<&PositionSnapshot>,
        now: DateTime<Utc>,
    ) -> Result<CycleReport, GovernorError> {
        let mut events = Vec::new();
        self.risk.ensure_day_initialized_at(now)?;

        if self.risk.is_shutdown_at(now) {
            return Ok(CycleReport {
                decision: CycleDecision::Halted {
                    reason: halt_reason("shut down", self.risk.state().shutdown_until),
                },
                events,
            });
        }

        if self.risk.is_paused_at(now) {
            return Ok(CycleReport {
                decision: CycleDecision::Halted {
                    reason: halt_reason("paused", self.risk.state().paused_until),
                },
                events,
            });
        }

        // Daily loss limit is a risk-capital signal owned by this loop,
        // not by the streak-driven circuit breaker.
        let loss_limit = self.settings.start_equity * self.settings.daily_loss_limit_pct;
        let day_pnl = self.risk.get_day_pnl();
        if day_pnl <= -loss_limit {
            let reason = format!("daily loss limit breached: {day_pnl} (limit {loss_limit})");
            warn!(%day_pnl, %loss_limit, "daily loss limit breached, shutting down");
            self.risk
                .shutdown_for_at(now, self.settings.shutdown_duration)?;
            events.push(GovernorEvent::Shutdown {
                reason: reason.clone(),
                duration: self.settings.shutdown_duration,
            });
            return Ok(CycleReport {
                decision: CycleDecision::Halted { reason },
                events,
            });
        }

        if let Some(open) = position {
            let decision = match candles.last() {
                Some(candle) => self.check_open_position(open, candle, now),
                None => CycleDecision::Hold,
            };
            return Ok(CycleReport { decision, events });
        }

        if !self.admission.allow_new_trade_at(now) {
            return Ok(CycleReport {
                decision: CycleDecision::Blocked {
                    reason: "admission refused: frequency cap or post-close cooldown".to_string(),
                },
                events,
            });
        }

        Ok(CycleReport {
            decision: CycleDecision::ClearToTrade,
            events,
        })
    }

    fn check_open_position(
        &mut self,
        position: &PositionSnapshot,
        candle: &Candle,
        now: DateTime<Utc>,
    ) -> CycleDecision {
        let Some(aged) = self.tracker.on_new_candle(candle) else {
            return CycleDecision::Hold;
        };
        let entry_time = self.tracker.entry_time().unwrap_or(now);

        match self.planner.check_time_stop(
            entry_time,
            now,
            position.entry_price,
            candle.close,
            aged.candles_held,
        ) {
            Some(advice) => {
                info!(reason = %advice.reason, "stagnation exit recommended");
                CycleDecision::ForceExit(advice)
            }
            None => CycleDecision::Hold,
        }
    }

    /// Plan an entry once a cycle reported `ClearToTrade`.
    pub fn plan_entry(
        &self,
        candles: &[Candle],
        direction: Direction,
        fractal_level: Option<f64>,
        invalidation_level: Option<f64>,
    ) -> PlanDecision {
        self.planner
            .plan(candles, direction, fractal_level, invalidation_level)
    }

    /// Reconcile governor state with the exchange's view of the position.
    ///
    /// Diffs the previous and current snapshots and fires the admission
    /// and age-tracker hooks exactly once per real transition. `closed`
    /// carries the exchange's close result when one happened this cycle.
    pub fn sync_position(
        &mut self,
        previous: Option<&PositionSnapshot>,
        current: Option<&PositionSnapshot>,
        closed: Option<&ClosedTrade>,
        now: DateTime<Utc>,
    ) -> Result<Vec<GovernorEvent>, GovernorError> {
        let mut events = Vec::new();

        match (previous, current) {
            (None, Some(opened)) => {
                self.record_open(opened, now);
            }
            (Some(prev), None) => {
                self.record_close(prev, closed, now, &mut events)?;
            }
            (Some(prev), Some(cur)) if prev.direction != cur.direction => {
                // Position flipped: a close and an open in one cycle.
                self.record_close(prev, closed, now, &mut events)?;
                self.record_open(cur, now);
            }
            _ => {}
        }

        Ok(events)
    }

    fn record_open(&mut self, opened: &PositionSnapshot, now: DateTime<Utc>) {
        info!(direction = %opened.direction, entry = opened.entry_price, "position open observed");
        self.admission.record_open_at(now);
        self.tracker
            .on_position_opened(opened.direction, opened.entry_price, now);
    }

    fn record_close(
        &mut self,
        previous: &PositionSnapshot,
        closed: Option<&ClosedTrade>,
        now: DateTime<Utc>,
        events: &mut Vec<GovernorEvent>,
    ) -> Result<(), GovernorError> {
        self.admission.record_close_at(now);
        self.tracker.on_position_closed();

        // Fall back to the last unrealized mark when the exchange gave
        // no close result for this transition.
        let pnl = closed
            .map(ClosedTrade::pnl)
            .unwrap_or(previous.unrealized_pnl);
        let exit_price = closed.map(|c| c.exit_price).unwrap_or(previous.entry_price);

        let outcome = self.risk.on_trade_closed_at(
            now,
            pnl,
            self.settings.pause_after_losses,
            self.settings.pause_duration,
        )?;

        events.push(GovernorEvent::TradeClosed {
            direction: previous.direction,
            size: previous.size,
            entry: previous.entry_price,
            exit: exit_price,
            pnl,
        });

        if outcome.triggered_pause {
            events.push(GovernorEvent::Paused {
                reason: format!("{} consecutive losses", outcome.consecutive_losses),
                duration: self.settings.pause_duration,
            });
        }

        Ok(())
    }
}

fn halt_reason(kind: &str, until: Option<DateTime<Utc>>) -> String {
    match until {
        Some(t) => format!("trading {kind} until {t}"),
        None => format!("trading {kind}"),
    }
}

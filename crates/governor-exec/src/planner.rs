//! Entry, stop, and target planning.

use chrono::{DateTime, Utc};
use governor_core::types::{Candle, Direction};
use governor_indicators::Atr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::age_tracker::ExitAdvice;

/// Invalidation-level stop buffer, in ATR units.
const INVALIDATION_BUFFER_ATR: f64 = 0.2;

/// How the entry price is derived from the fractal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Enter slightly through the level on the retest, biased in the
    /// trade's favor by the configured offset
    BreakRetest,
    /// Enter exactly at the level on the pullback
    Pullback,
    /// Limit order at the midpoint of current price and the level
    LimitMidpoint,
}

/// Planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub entry_mode: EntryMode,
    /// Stop distance in ATR units
    pub stop_atr_multiplier: f64,
    /// Minimum reward-to-risk ratio
    pub min_rr_ratio: f64,
    /// Max candles to hold a position that has not moved
    pub time_stop_candles: u32,
    /// ATR lookback period
    pub atr_period: usize,
    /// Break-retest entry offset in basis points
    pub retest_offset_bps: f64,
    /// Price drift below which a fully aged position is stagnant
    pub stagnation_move_pct: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            entry_mode: EntryMode::BreakRetest,
            stop_atr_multiplier: 1.5,
            min_rr_ratio: 2.0,
            time_stop_candles: 8,
            atr_period: 14,
            retest_offset_bps: 5.0,
            stagnation_move_pct: 0.003,
        }
    }
}

/// A fully specified trade plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    /// Entry-to-stop distance, strictly positive
    pub risk: f64,
    /// Entry-to-target distance
    pub reward: f64,
    pub rr_ratio: f64,
    /// ATR used to size the stop
    pub atr: f64,
}

/// Outcome of planning: a usable plan or an ordinary rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanDecision {
    Valid(ExecutionPlan),
    Rejected { reason: String },
}

impl PlanDecision {
    pub fn is_valid(&self) -> bool {
        matches!(self, PlanDecision::Valid(_))
    }

    pub fn plan(&self) -> Option<&ExecutionPlan> {
        match self {
            PlanDecision::Valid(plan) => Some(plan),
            PlanDecision::Rejected { .. } => None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        PlanDecision::Rejected {
            reason: reason.into(),
        }
    }
}

/// Computes entry price, stop-loss, and target for a proposed direction,
/// rejecting plans with insufficient reward-to-risk.
///
/// The stop stacks an ATR-based offset (adapts to realized volatility)
/// with an invalidation-level floor (respects market structure); the
/// final stop is never tighter than either constraint.
#[derive(Debug, Clone)]
pub struct ExecutionPlanner {
    config: PlannerConfig,
    atr: Atr,
}

impl ExecutionPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let atr = Atr::new(config.atr_period);
        Self { config, atr }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan an entry for the given direction.
    pub fn plan(
        &self,
        candles: &[Candle],
        direction: Direction,
        fractal_level: Option<f64>,
        invalidation_level: Option<f64>,
    ) -> PlanDecision {
        if candles.len() < self.config.atr_period {
            return PlanDecision::rejected(format!(
                "insufficient data: need {} candles, have {}",
                self.config.atr_period,
                candles.len()
            ));
        }

        let current_price = candles[candles.len() - 1].close;
        let Some(atr) = self.atr.latest(candles) else {
            return PlanDecision::rejected("insufficient data for ATR");
        };

        let entry_price = self.entry_price(direction, fractal_level, current_price);
        let stop_loss = self.stop_loss(entry_price, direction, atr, invalidation_level);

        let risk = match direction {
            Direction::Long => entry_price - stop_loss,
            Direction::Short => stop_loss - entry_price,
        };
        if risk <= 0.0 {
            return PlanDecision::rejected("invalid risk calculation (risk <= 0)");
        }

        let target = entry_price + direction.sign() * risk * self.config.min_rr_ratio;
        let reward = (target - entry_price).abs();
        let rr_ratio = reward / risk;

        // Tautological under the construction above, but callers may
        // re-plan with a snapped target and must still clear the minimum.
        if rr_ratio < self.config.min_rr_ratio {
            return PlanDecision::rejected(format!(
                "R:R ratio {:.2} below minimum {:.2}",
                rr_ratio, self.config.min_rr_ratio
            ));
        }

        debug!(%direction, entry_price, stop_loss, target, rr_ratio, "plan computed");

        PlanDecision::Valid(ExecutionPlan {
            direction,
            entry_price,
            stop_loss,
            target,
            risk,
            reward,
            rr_ratio,
            atr,
        })
    }

    fn entry_price(
        &self,
        direction: Direction,
        fractal_level: Option<f64>,
        current_price: f64,
    ) -> f64 {
        let Some(level) = fractal_level else {
            return current_price;
        };

        match self.config.entry_mode {
            EntryMode::BreakRetest => {
                let offset = self.config.retest_offset_bps / 10_000.0;
                match direction {
                    Direction::Long => level * (1.0 + offset),
                    Direction::Short => level * (1.0 - offset),
                }
            }
            EntryMode::Pullback => level,
            EntryMode::LimitMidpoint => (current_price + level) / 2.0,
        }
    }

    fn stop_loss(
        &self,
        entry_price: f64,
        direction: Direction,
        atr: f64,
        invalidation_level: Option<f64>,
    ) -> f64 {
        let stop_distance = atr * self.config.stop_atr_multiplier;
        let buffer = atr * INVALIDATION_BUFFER_ATR;

        match direction {
            Direction::Long => {
                let atr_stop = entry_price - stop_distance;
                match invalidation_level {
                    Some(level) => atr_stop.min(level - buffer),
                    None => atr_stop,
                }
            }
            Direction::Short => {
                let atr_stop = entry_price + stop_distance;
                match invalidation_level {
                    Some(level) => atr_stop.max(level + buffer),
                    None => atr_stop,
                }
            }
        }
    }

    /// Stagnation check: recommend an exit once the position has aged
    /// past the candle bound while price has barely moved. Distinct from
    /// stop-loss and target exits; frees capital from setups that never
    /// developed.
    pub fn check_time_stop(
        &self,
        entry_time: DateTime<Utc>,
        now: DateTime<Utc>,
        entry_price: f64,
        current_price: f64,
        candles_since_entry: u32,
    ) -> Option<ExitAdvice> {
        if candles_since_entry < self.config.time_stop_candles {
            return None;
        }

        let price_change_pct = if entry_price > 0.0 {
            (current_price - entry_price).abs() / entry_price
        } else {
            0.0
        };

        if price_change_pct >= self.config.stagnation_move_pct {
            return None;
        }

        let held = now.signed_duration_since(entry_time);
        Some(ExitAdvice {
            reason: format!(
                "time stop: {} candles ({}m) with minimal movement ({:.2}%)",
                candles_since_entry,
                held.num_minutes(),
                price_change_pct * 100.0
            ),
            candles_held: candles_since_entry,
            price_change_pct,
        })
    }
}

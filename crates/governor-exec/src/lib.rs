//! Execution planning for the trading governor.
//!
//! Turns a proposed direction into concrete entry/stop/target prices and
//! tracks open-position age for the stagnation exit.

mod age_tracker;
mod planner;

pub use age_tracker::{ExitAdvice, PositionAgeTracker, TrackerStatus};
pub use planner::{EntryMode, ExecutionPlan, ExecutionPlanner, PlanDecision, PlannerConfig};

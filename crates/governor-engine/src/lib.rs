//! Per-cycle orchestration of the governor components.

mod engine;

pub use engine::{CycleDecision, CycleReport, EngineSettings, TradingGovernor};

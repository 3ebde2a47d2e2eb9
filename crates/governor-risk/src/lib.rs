//! Risk gating for the trading governor.
//!
//! Provides admission control (trade-frequency limiting plus post-close
//! cooldown), the persistent loss circuit breaker, and proposal clamping.

mod admission;
mod governor;
mod proposal;
mod store;

pub use admission::AdmissionGuard;
pub use governor::{CloseOutcome, RiskGovernor, RiskState};
pub use proposal::clamp_proposal;
pub use store::StateStore;

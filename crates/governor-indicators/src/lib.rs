//! Volatility indicators used by the execution planner.

mod volatility;

pub use volatility::Atr;

//! Core data types for the governor.

mod candle;
mod direction;
mod event;
mod signal;
mod snapshot;

pub use candle::Candle;
pub use direction::Direction;
pub use event::GovernorEvent;
pub use signal::{ProposedSignal, SignalSide};
pub use snapshot::{AccountState, ClosedTrade, OrderFill, PositionSnapshot};

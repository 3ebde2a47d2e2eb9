//! Core types and traits for the trading governor.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle)
//! - Position and account snapshots reported by the exchange
//! - Governor events for the notification channel
//! - Traits for the external collaborators (exchange, signal service,
//!   candle feed, notifier)

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DataError, ExchangeError, GovernorError, GovernorResult, SignalError};
pub use traits::*;
pub use types::*;

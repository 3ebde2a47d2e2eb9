//! Signal service trait definition.

use crate::error::SignalError;
use crate::types::{Candle, ProposedSignal};
use async_trait::async_trait;

/// Trait for the signal-generation service.
///
/// The service's reasoning (model, human, heuristic) is opaque here; the
/// governor treats the proposal as untrusted input subject to its own
/// gating.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Propose a decision for the given candle window.
    async fn propose(&self, candles: &[Candle]) -> Result<ProposedSignal, SignalError>;
}

//! Exchange connector trait definition.

use crate::error::ExchangeError;
use crate::types::{AccountState, ClosedTrade, Direction, OrderFill, PositionSnapshot};
use async_trait::async_trait;

/// Trait for exchange integrations.
///
/// The governor trades a single instrument, so the connector tracks at
/// most one open position and does not take a symbol per call.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Get current account state (equity).
    async fn account(&self) -> Result<AccountState, ExchangeError>;

    /// Get the current open position, if any.
    async fn position(&self) -> Result<Option<PositionSnapshot>, ExchangeError>;

    /// Open a market position.
    async fn open_position(
        &self,
        direction: Direction,
        size: f64,
    ) -> Result<OrderFill, ExchangeError>;

    /// Close the current position with a market order.
    ///
    /// Reports realized P&L when the exchange provides it.
    async fn close_position(&self) -> Result<ClosedTrade, ExchangeError>;

    /// Connector name for logging.
    fn name(&self) -> &str;
}

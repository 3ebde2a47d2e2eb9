//! Market-data feed trait definition.

use crate::error::DataError;
use crate::types::Candle;
use async_trait::async_trait;

/// Trait for candle feeds.
#[async_trait]
pub trait CandleFeed: Send + Sync {
    /// Fetch up to `limit` of the most recent candles, oldest first.
    ///
    /// Returning fewer candles than a consumer needs is not an error;
    /// components reject insufficient data through their return values.
    async fn fetch(&self, limit: usize) -> Result<Vec<Candle>, DataError>;
}

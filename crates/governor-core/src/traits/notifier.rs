//! Notification channel trait definition.

use crate::error::GovernorError;
use crate::types::GovernorEvent;
use async_trait::async_trait;

/// Trait for notification channels.
///
/// Notifiers only read governor state through events; they never mutate
/// it. Delivery failures must not stall the polling loop.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a single event.
    async fn notify(&self, event: &GovernorEvent) -> Result<(), GovernorError>;
}

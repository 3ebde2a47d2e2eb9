//! Logging setup and event notification channels.

mod logging;
mod notifier;

pub use logging::setup_logging;
pub use notifier::{LogNotifier, TelegramNotifier};

//! Traits for the governor's external collaborators.

mod exchange;
mod feed;
mod notifier;
mod signal;

pub use exchange::ExchangeConnector;
pub use feed::CandleFeed;
pub use notifier::Notifier;
pub use signal::SignalSource;

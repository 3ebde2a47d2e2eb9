//! Market-data feeds and signal-service clients.

pub mod csv_feed;
pub mod signal_client;

pub use csv_feed::CsvCandleFeed;
pub use signal_client::HttpSignalSource;

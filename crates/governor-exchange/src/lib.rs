//! Exchange connectors.

pub mod paper;

pub use paper::PaperExchange;

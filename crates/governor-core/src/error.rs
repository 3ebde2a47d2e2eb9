//! Error types for the governor.

use thiserror::Error;

/// Top-level governor error.
#[derive(Error, Debug)]
pub enum GovernorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("State persistence failed for {path}: {source}")]
    StatePersistence {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Exchange connector errors.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("No open position")]
    NoOpenPosition,

    #[error("Insufficient equity: required {required}, available {available}")]
    InsufficientEquity {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("API error: {0}")]
    Api(String),
}

/// Market-data feed errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Signal service errors.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Malformed decision payload: {0}")]
    MalformedDecision(String),
}

/// Result type alias for governor operations.
pub type GovernorResult<T> = Result<T, GovernorError>;

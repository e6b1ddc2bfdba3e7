//! Error types for the tickflow trading engine.

use thiserror::Error;

/// Core error type for the trading engine
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Invalid price value
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    /// Invalid quantity value
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Symbol id outside the configured universe
    #[error("Symbol id {id} out of range (capacity {capacity})")]
    SymbolOutOfRange {
        /// The offending symbol id
        id: u32,
        /// Configured symbol capacity
        capacity: usize,
    },

    /// Symbol universe is full
    #[error("Symbol table full: cannot intern '{0}'")]
    SymbolTableFull(String),

    /// Pop on an empty event queue
    #[error("Event queue is empty")]
    QueueEmpty,

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    /// Strategy-raised error surfaced through the dispatcher
    #[error("Strategy error: {0}")]
    Strategy(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

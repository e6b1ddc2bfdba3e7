//! Error types for tick sources.

use thiserror::Error;

/// Feed reading and decoding errors
#[derive(Error, Debug, Clone)]
pub enum FeedError {
    /// Record ended mid-field
    #[error("Truncated record: {got} of {expected} bytes")]
    Truncated {
        /// Bytes actually available
        got: usize,
        /// Bytes a full record needs
        expected: usize,
    },

    /// Symbol field was not valid UTF-8
    #[error("Invalid symbol bytes in record at offset {0}")]
    InvalidSymbol(u64),

    /// Record field failed validation
    #[error("Invalid field value: {field} = {value}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Symbol longer than the fixed field width
    #[error("Symbol '{0}' exceeds the record field width")]
    SymbolTooLong(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::IoError(err.to_string())
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for FeedError {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => FeedError::Truncated {
                got: 0,
                expected: crate::file::TICK_RECORD_SIZE,
            },
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                FeedError::ParseError(format!("{} bytes unparsed", e.input.len()))
            }
        }
    }
}

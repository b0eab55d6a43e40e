//! Error types for calendarize.

use thiserror::Error;

/// Errors that can abort an import run or a store operation.
///
/// A single event with unparseable dates is not an error: the parser skips it
/// and reports a warning instead.
#[derive(Error, Debug)]
pub enum CalendarizeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not fetch calendar: {0}")]
    FetchFailed(String),

    #[error("Malformed calendar feed: {0}")]
    MalformedFeed(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for calendarize operations.
pub type CalResult<T> = Result<T, CalendarizeError>;

// src/error.rs
use thiserror::Error;

/// Failures raised by the regression and the price suggester.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Shape, schema or value problems in the data handed to `train`/`predict`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model has not been trained")]
    NotTrained,
}

impl ModelError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ModelError::InvalidInput(msg.into())
    }
}

/// Reading, validating or writing a pricing table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}, column `{column}`: `{value}` is not a number")]
    NotNumeric { row: usize, column: String, value: String },

    #[error("column `{column}` has {got} values, table has {expected} rows")]
    LengthMismatch { column: String, expected: usize, got: usize },
}

/// One URL's fetch went wrong. Never escapes a batch; it ends up inside
/// `Absence` in the result map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("could not read body: {0}")]
    Body(String),
}

/// Bad fetcher configuration, reported before any request goes out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid price selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("worker count must be at least 1")]
    Workers,

    #[error("http client: {0}")]
    Client(String),
}

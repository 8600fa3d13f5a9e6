//! Common error types for tagscope

use thiserror::Error;

/// Common result type for tagscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the tagscope crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-input parsing error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No row in the tabular input carried the required schema columns
    #[error("Header row with required schema columns not found")]
    SchemaNotFound,

    /// A record reached the reconciler without the full field schema.
    /// Indicates a broken producer, never a validation outcome.
    #[error("Schema contract violation: {0}")]
    ContractViolation(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

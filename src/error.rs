use thiserror::Error;

use crate::value::DataType;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("Cannot convert '{value}' to {target}")]
    Conversion { value: String, target: DataType },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Empty series")]
    EmptySeries,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

//! Error types for trialscan-cleaning

use thiserror::Error;

/// Result type alias for cleaning operations
pub type Result<T> = std::result::Result<T, CleaningError>;

#[derive(Error, Debug)]
pub enum CleaningError {
    /// A target-size value that is neither a count, a per-arm breakdown nor
    /// missing. The batch halts for manual inspection.
    #[error("Unsupported target size at row {index}: {value}")]
    UnsupportedValue { index: usize, value: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CleaningError {
    fn from(err: std::io::Error) -> Self {
        CleaningError::Io(err.to_string())
    }
}

impl From<csv::Error> for CleaningError {
    fn from(err: csv::Error) -> Self {
        CleaningError::Csv(err.to_string())
    }
}

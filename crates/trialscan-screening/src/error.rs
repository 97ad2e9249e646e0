//! Error types for trialscan-screening

use thiserror::Error;

/// Result type alias for screening operations
pub type Result<T> = std::result::Result<T, ScreeningError>;

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid document {path}: {message}")]
    InvalidDocument { path: String, message: String },

    #[error("Invalid PubMed record: {0}")]
    InvalidArticle(String),
}

impl From<std::io::Error> for ScreeningError {
    fn from(err: std::io::Error) -> Self {
        ScreeningError::Io(err.to_string())
    }
}

impl From<csv::Error> for ScreeningError {
    fn from(err: csv::Error) -> Self {
        ScreeningError::Csv(err.to_string())
    }
}

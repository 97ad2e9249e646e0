//! Error types for pattern compilation

use thiserror::Error;

/// Result type alias for pattern operations
pub type Result<T> = std::result::Result<T, PatternError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A pattern string is not a valid regular expression
    #[error("Invalid pattern {pattern:?}: {message}")]
    Invalid { pattern: String, message: String },
}

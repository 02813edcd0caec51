//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while talking to EDINET.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// EDINET API error
    #[error("EDINET API error: {0}")]
    EdinetApi(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid date
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

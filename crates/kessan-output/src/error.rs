//! Error types for report output.

use thiserror::Error;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while writing reports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ExportError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        Self::Io(err.into_error())
    }
}

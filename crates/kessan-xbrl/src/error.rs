//! Error types for XBRL extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that abort extraction of a single filing.
///
/// Defects inside individual facts (a missing context reference, a value that
/// is not a number, an unparseable date) are never reported here; those facts
/// are skipped and extraction carries on with the rest of the document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The archive could not be read, or it holds no XBRL instance.
    #[error("Archive format error: {0}")]
    ArchiveFormat(String),

    /// The XBRL instance is not well-formed XML.
    #[error("Malformed XBRL document: {0}")]
    MalformedDocument(String),
}

impl ExtractError {
    /// Returns true when the filing simply carries no usable XBRL payload.
    ///
    /// Callers processing a batch should log these and move on.
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::ArchiveFormat(_))
    }
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::ArchiveFormat(err.to_string())
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        Self::ArchiveFormat(err.to_string())
    }
}

impl From<quick_xml::Error> for ExtractError {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}

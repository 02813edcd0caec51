//! EDINET document retrieval.
//!
//! This module provides access to the EDINET v2 API:
//! - the daily document list (`/api/v2/documents.json`)
//! - filing archive and PDF downloads (`/api/v2/documents/{docID}`)
//! - selection of earnings reports from a document list
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use kessan_data::edinet::{EdinetClient, EdinetConfig, filter_earnings_reports};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdinetClient::new(EdinetConfig::from_env())?;
//!     let date = NaiveDate::from_ymd_opt(2024, 12, 27).ok_or("bad date")?;
//!
//!     let list = client.fetch_documents(date).await?;
//!     let reports = filter_earnings_reports(&list);
//!     println!("{} earnings reports", reports.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod documents;

pub use client::{DocumentKind, EdinetClient};
pub use config::{DEFAULT_BASE_URL, DEFAULT_REQUEST_INTERVAL, EdinetConfig};
pub use documents::{
    DocumentList, DocumentMetadata, ListMetadata, filter_earnings_reports, parse_date,
    sanitize_filename,
};

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod error;
pub mod export;
pub mod format;
pub mod report;
pub mod summary;

pub use analysis::{Analysis, AnalysisCategory, Assessment, Level, analyze};
pub use error::{ExportError, Result};
pub use export::{ExportFormat, Exporter, MetricRow};
pub use format::{format_decimal, format_number};
pub use report::{AnalysisReport, AnalysisResult, CompanyInfo};
pub use summary::render_summary;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

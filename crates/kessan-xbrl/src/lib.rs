#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod context;
pub mod derived;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod normalize;
pub mod period;

mod reader;

pub use archive::locate_xbrl;
pub use context::{Context, ContextIndex, ContextPeriod, PeriodDate};
pub use derived::enrich;
pub use error::{ExtractError, Result};
pub use extract::{ExtractionResult, PeriodBucket, PeriodBuckets, XbrlExtractor, extract_facts};
pub use metrics::{MetricDefinition, MetricKey, MetricUnit};
pub use normalize::normalize;
pub use period::{
    Bucket, CURRENT_FISCAL_YEAR_START, PREVIOUS_FISCAL_YEAR_START, PeriodClassifier,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

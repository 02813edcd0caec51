//! Fact extraction.
//!
//! A fact is any element outside the `xbrli:` namespace whose local name
//! resolves to a canonical metric. Its value is the first run of character
//! data directly inside the element (CDATA included); text after a child
//! element or comment is ignored. Its period comes from the context named by `contextRef`. Facts with
//! an unknown name, a missing or unknown context, non-numeric text or a
//! period outside every bucket are skipped without error.

use crate::archive;
use crate::context::ContextIndex;
use crate::derived;
use crate::error::Result;
use crate::metrics::{self, MetricKey};
use crate::normalize::normalize;
use crate::period::{Bucket, PeriodClassifier};
use crate::reader::{self, ElementStart, XmlEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Metric values for one period, keyed in canonical order.
pub type PeriodBucket = BTreeMap<MetricKey, f64>;

/// Facts sorted by period, before derived metrics are added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodBuckets {
    /// Current fiscal year
    pub current_period: PeriodBucket,
    /// Prior fiscal year
    pub previous_period: PeriodBucket,
    /// Forecast figures
    pub forecast: PeriodBucket,
}

impl PeriodBuckets {
    fn bucket_mut(&mut self, bucket: Bucket) -> &mut PeriodBucket {
        match bucket {
            Bucket::Current => &mut self.current_period,
            Bucket::Previous => &mut self.previous_period,
            Bucket::Forecast => &mut self.forecast,
        }
    }

    /// Total number of values across all buckets.
    pub fn len(&self) -> usize {
        self.current_period.len() + self.previous_period.len() + self.forecast.len()
    }

    /// Returns true if no fact was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Structured figures extracted from one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Current-period values, including derived ratios
    pub current_period: PeriodBucket,
    /// Previous-period values
    pub previous_period: PeriodBucket,
    /// Forecast values
    pub forecast: PeriodBucket,
    /// When the extraction ran
    pub extracted_at: DateTime<Utc>,
}

impl ExtractionResult {
    /// Returns true if the current period holds at least one value.
    ///
    /// Filings without current-period figures are not worth reporting on.
    pub fn has_current_period_facts(&self) -> bool {
        !self.current_period.is_empty()
    }

    /// Looks up a current-period value.
    pub fn current(&self, key: MetricKey) -> Option<f64> {
        self.current_period.get(&key).copied()
    }

    /// Looks up a previous-period value.
    pub fn previous(&self, key: MetricKey) -> Option<f64> {
        self.previous_period.get(&key).copied()
    }
}

/// Extracts financial figures from EDINET filings.
///
/// The extractor holds no state between calls and may be shared across
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct XbrlExtractor {
    classifier: PeriodClassifier,
}

impl XbrlExtractor {
    /// Creates an extractor with the default fiscal-year boundaries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with custom fiscal-year boundaries.
    pub const fn with_classifier(classifier: PeriodClassifier) -> Self {
        Self { classifier }
    }

    /// The period classifier in use.
    pub const fn classifier(&self) -> &PeriodClassifier {
        &self.classifier
    }

    /// Extracts figures from a filing ZIP archive.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractError::ArchiveFormat`] if the archive cannot
    /// be read or holds no XBRL document, and
    /// [`crate::ExtractError::MalformedDocument`] if the document is not
    /// well-formed XML.
    pub fn extract_archive(&self, bytes: &[u8]) -> Result<ExtractionResult> {
        let xml = archive::locate_xbrl(bytes)?;
        self.extract_document(&xml)
    }

    /// Extracts figures from a bare XBRL instance document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractError::MalformedDocument`] if `xml` is not
    /// well-formed.
    pub fn extract_document(&self, xml: &[u8]) -> Result<ExtractionResult> {
        let contexts = ContextIndex::build(xml)?;
        let PeriodBuckets {
            mut current_period,
            previous_period,
            forecast,
        } = extract_facts(xml, &contexts, &self.classifier)?;

        derived::enrich(&mut current_period, &previous_period);

        debug!(
            current = current_period.len(),
            previous = previous_period.len(),
            forecast = forecast.len(),
            "extracted facts"
        );

        Ok(ExtractionResult {
            current_period,
            previous_period,
            forecast,
            extracted_at: Utc::now(),
        })
    }
}

/// Collects every recognised fact in `xml` into period buckets.
///
/// When the same metric appears more than once in a bucket the value seen
/// last in document order is kept.
///
/// # Errors
///
/// Returns [`crate::ExtractError::MalformedDocument`] if `xml` is not
/// well-formed.
pub fn extract_facts(
    xml: &[u8],
    contexts: &ContextIndex,
    classifier: &PeriodClassifier,
) -> Result<PeriodBuckets> {
    let mut collector = FactCollector {
        contexts,
        classifier,
        buckets: PeriodBuckets::default(),
        stack: Vec::new(),
    };
    reader::walk(xml, |event| collector.handle(event))?;
    Ok(collector.buckets)
}

#[derive(Debug)]
struct Candidate {
    key: MetricKey,
    context_ref: Option<String>,
    scale: Option<String>,
    unit_ref: Option<String>,
    // First direct text run only.
    text: Option<String>,
}

impl Candidate {
    fn from_start(start: &ElementStart) -> Option<Self> {
        if start.in_instance_namespace() {
            return None;
        }
        let key = metrics::resolve(&start.local_name)?;
        Some(Self {
            key,
            context_ref: start.attribute("contextRef").map(str::to_string),
            scale: start.attribute("scale").map(str::to_string),
            unit_ref: start.attribute("unitRef").map(str::to_string),
            text: None,
        })
    }
}

struct FactCollector<'a> {
    contexts: &'a ContextIndex,
    classifier: &'a PeriodClassifier,
    buckets: PeriodBuckets,
    // One slot per open element; `None` for elements that are not facts.
    stack: Vec<Option<Candidate>>,
}

impl FactCollector<'_> {
    fn handle(&mut self, event: XmlEvent) {
        match event {
            XmlEvent::Start(start) => self.stack.push(Candidate::from_start(&start)),
            XmlEvent::Text(text) => {
                if let Some(Some(candidate)) = self.stack.last_mut() {
                    candidate.text.get_or_insert(text);
                }
            }
            XmlEvent::End => {
                if let Some(Some(candidate)) = self.stack.pop() {
                    self.record(candidate);
                }
            }
        }
    }

    fn record(&mut self, candidate: Candidate) {
        let Some(context_ref) = candidate.context_ref.as_deref() else {
            trace!(metric = %candidate.key, "skipping fact without contextRef");
            return;
        };
        let Some(context) = self.contexts.get(context_ref) else {
            trace!(metric = %candidate.key, context_ref, "skipping fact with unknown context");
            return;
        };
        let text = candidate.text.as_deref().unwrap_or_default();
        let Some(value) = normalize(
            text,
            candidate.scale.as_deref(),
            candidate.unit_ref.as_deref(),
        ) else {
            trace!(metric = %candidate.key, text = text.trim(), "skipping non-numeric fact");
            return;
        };
        let Some(bucket) = self.classifier.classify(context) else {
            trace!(metric = %candidate.key, context_ref, "skipping fact outside known periods");
            return;
        };
        self.buckets.bucket_mut(bucket).insert(candidate.key, value);
    }
}

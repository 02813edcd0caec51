//! Batch pipeline for one day of EDINET filings.
//!
//! Fetches the day's document list, keeps the earnings reports, and for each
//! one reuses or downloads its archive, extracts figures on a blocking worker
//! and grades them. Filings that fail or carry no usable data are logged and
//! skipped; the batch always runs to the end.

use super::cache_manager::{self, CacheManager};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use kessan_data::DataError;
use kessan_data::edinet::{DocumentMetadata, EdinetClient, filter_earnings_reports};
use kessan_output::{AnalysisReport, AnalysisResult, CompanyInfo, ExportError, ExportFormat};
use kessan_xbrl::{ExtractError, ExtractionResult, PeriodClassifier, XbrlExtractor};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default number of filings processed concurrently.
pub(crate) const DEFAULT_CONCURRENCY: usize = 4;

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// EDINET request failed.
    #[error("EDINET error: {0}")]
    Data(#[from] DataError),
    /// Archive could not be processed.
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),
    /// Report could not be written.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Extraction worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    /// Root for cached archives and saved reports.
    pub data_dir: PathBuf,
    /// Whether to read and write the archive cache.
    pub use_cache: bool,
    /// Whether to download even when a cached archive exists.
    pub force_refresh: bool,
    /// Filings processed at once.
    pub concurrency: usize,
    /// Fiscal-year boundaries for period classification.
    pub classifier: PeriodClassifier,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: cache_manager::default_data_dir(),
            use_cache: true,
            force_refresh: false,
            concurrency: DEFAULT_CONCURRENCY,
            classifier: PeriodClassifier::default(),
        }
    }
}

/// What a batch run produced.
#[derive(Debug)]
pub(crate) struct BatchOutcome {
    /// Graded filings in document-list order.
    pub report: AnalysisReport,
    /// Earnings reports found in the list.
    pub filings: usize,
}

impl BatchOutcome {
    /// Filings that were skipped.
    pub(crate) const fn skipped(&self) -> usize {
        self.filings.saturating_sub(self.report.total_count)
    }
}

/// Maps EDINET document metadata to the details carried into reports.
pub(crate) fn company_info(doc: &DocumentMetadata) -> CompanyInfo {
    CompanyInfo {
        name: doc.filer_name.clone(),
        sec_code: doc.sec_code.clone(),
        doc_id: doc.doc_id.clone(),
        submit_date: doc.submit_date_time.clone(),
        doc_description: doc.doc_description.clone(),
    }
}

/// Returns the archive of `doc`, from the cache when allowed, otherwise
/// downloaded and written back to the cache.
async fn fetch_archive(
    client: &EdinetClient,
    cache: Option<&CacheManager>,
    doc: &DocumentMetadata,
    force_refresh: bool,
) -> Result<Vec<u8>, PipelineError> {
    if let Some(cache) = cache
        && !force_refresh
        && let Some(bytes) = cache.load_archive(doc).await
    {
        return Ok(bytes);
    }

    let bytes = client.download_xbrl(&doc.doc_id).await?;

    if let Some(cache) = cache
        && let Err(e) = cache.store_archive(doc, &bytes).await
    {
        warn!(doc_id = %doc.doc_id, error = %e, "failed to cache archive");
    }

    Ok(bytes)
}

/// Grades one filing. Returns `None` when the filing has no usable data.
///
/// # Errors
///
/// Returns an error if the archive cannot be fetched or the extraction
/// worker fails.
async fn analyze_filing(
    client: &EdinetClient,
    cache: Option<&CacheManager>,
    extractor: XbrlExtractor,
    doc: &DocumentMetadata,
    force_refresh: bool,
) -> Result<Option<AnalysisResult>, PipelineError> {
    let bytes = fetch_archive(client, cache, doc, force_refresh).await?;
    let extraction =
        tokio::task::spawn_blocking(move || extractor.extract_archive(&bytes)).await?;

    match extraction {
        Ok(result) if result.has_current_period_facts() => {
            Ok(Some(AnalysisResult::new(company_info(doc), result)))
        }
        Ok(_) => {
            info!(doc_id = %doc.doc_id, "no current-period figures, skipping");
            Ok(None)
        }
        Err(e) if e.is_no_data() => {
            info!(doc_id = %doc.doc_id, reason = %e, "no XBRL data, skipping");
            Ok(None)
        }
        Err(e) => {
            warn!(doc_id = %doc.doc_id, error = %e, "unreadable filing, skipping");
            Ok(None)
        }
    }
}

/// Runs the batch for filings submitted on `date`.
///
/// # Errors
///
/// Returns an error only if the document list cannot be fetched. Failures
/// of individual filings are logged and skipped.
pub(crate) async fn run_batch(
    client: &EdinetClient,
    config: &PipelineConfig,
    date: NaiveDate,
    progress: Option<&ProgressBar>,
) -> Result<BatchOutcome, PipelineError> {
    let list = client.fetch_documents(date).await?;
    let earnings = filter_earnings_reports(&list);
    info!(
        %date,
        documents = list.len(),
        earnings_reports = earnings.len(),
        "fetched document list"
    );

    if let Some(pb) = progress {
        pb.set_length(earnings.len() as u64);
        pb.set_message(format!(
            "Processing {} filings ({} concurrent)...",
            earnings.len(),
            config.concurrency
        ));
    }

    let cache_manager = config
        .use_cache
        .then(|| CacheManager::new(&config.data_dir));
    let cache = cache_manager.as_ref();
    let extractor = XbrlExtractor::with_classifier(config.classifier);
    let filings = earnings.len();

    let outcomes: Vec<Option<AnalysisResult>> = stream::iter(earnings)
        .map(|doc| async move {
            match analyze_filing(client, cache, extractor, doc, config.force_refresh).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(doc_id = %doc.doc_id, error = %e, "failed to process filing");
                    None
                }
            }
        })
        .buffered(config.concurrency.max(1))
        .inspect(|_| {
            if let Some(pb) = progress {
                pb.inc(1);
            }
        })
        .collect()
        .await;

    let results: Vec<AnalysisResult> = outcomes.into_iter().flatten().collect();
    Ok(BatchOutcome {
        report: AnalysisReport::new(date, results),
        filings,
    })
}

/// Extracts figures from a local file: a filing archive, or a bare XBRL
/// instance when `is_document` is set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or extraction fails.
pub(crate) async fn extract_local(
    path: PathBuf,
    is_document: bool,
    classifier: PeriodClassifier,
) -> Result<ExtractionResult, PipelineError> {
    let bytes = tokio::fs::read(&path).await?;
    let extractor = XbrlExtractor::with_classifier(classifier);
    let result = tokio::task::spawn_blocking(move || {
        if is_document {
            extractor.extract_document(&bytes)
        } else {
            extractor.extract_archive(&bytes)
        }
    })
    .await??;
    info!(
        path = %path.display(),
        current = result.current_period.len(),
        previous = result.previous_period.len(),
        forecast = result.forecast.len(),
        "extracted local filing"
    );
    Ok(result)
}

/// Saves `report` as pretty JSON under `json/`, and as CSV under `csv/` when
/// requested. Returns the written paths.
///
/// # Errors
///
/// Returns an error if a report cannot be serialized or written.
pub(crate) fn save_report(
    report: &AnalysisReport,
    config: &PipelineConfig,
    with_csv: bool,
) -> Result<Vec<PathBuf>, PipelineError> {
    let cache = CacheManager::new(&config.data_dir);
    let mut paths = vec![report.save(&cache.json_dir(), ExportFormat::PrettyJson)?];
    if with_csv {
        paths.push(report.save(&cache.csv_dir(), ExportFormat::Csv)?);
    }
    Ok(paths)
}

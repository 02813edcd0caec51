//! Batch analysis report.

use crate::analysis::{Analysis, analyze};
use crate::error::Result;
use crate::export::{ExportFormat, Exporter};
use chrono::NaiveDate;
use kessan_xbrl::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of saved report files.
pub const REPORT_FILE_PREFIX: &str = "kessan_analysis";

/// Filing and filer details carried into the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Filer name
    pub name: Option<String>,
    /// Securities code
    pub sec_code: Option<String>,
    /// EDINET document id
    pub doc_id: String,
    /// Submission timestamp as reported by EDINET
    pub submit_date: Option<String>,
    /// Document title
    pub doc_description: Option<String>,
}

impl CompanyInfo {
    /// Filer name, or the document id when the name is unknown.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.doc_id)
    }
}

/// Extraction and assessment of one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Who filed
    pub company_info: CompanyInfo,
    /// Extracted figures
    pub financial_data: ExtractionResult,
    /// Assessment of the current period
    pub analysis: Analysis,
}

impl AnalysisResult {
    /// Assesses `financial_data` and bundles it with the filer details.
    pub fn new(company_info: CompanyInfo, financial_data: ExtractionResult) -> Self {
        let analysis = analyze(&financial_data.current_period);
        Self {
            company_info,
            financial_data,
            analysis,
        }
    }
}

/// All results of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Submission date the batch covered
    pub analysis_date: NaiveDate,
    /// Number of analysed filings
    pub total_count: usize,
    /// Per-filing results, in document-list order
    pub results: Vec<AnalysisResult>,
}

impl AnalysisReport {
    /// Creates a report; `total_count` is taken from `results`.
    pub fn new(analysis_date: NaiveDate, results: Vec<AnalysisResult>) -> Self {
        Self {
            analysis_date,
            total_count: results.len(),
            results,
        }
    }

    /// File name for this report (`kessan_analysis_20231201.json`).
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!(
            "{REPORT_FILE_PREFIX}_{}.{}",
            self.analysis_date.format("%Y%m%d"),
            format.extension()
        )
    }

    /// Writes the report into `dir`, creating it if needed, and returns the
    /// written path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self, dir: &Path, format: ExportFormat) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(format));
        self.export_to_file(&path, format)?;
        Ok(path)
    }
}

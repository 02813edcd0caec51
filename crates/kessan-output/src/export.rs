//! JSON and CSV export.
//!
//! JSON keeps the nested report structure. CSV flattens it to one row per
//! company, period and metric.

use crate::error::Result;
use crate::report::{AnalysisReport, CompanyInfo};
use kessan_xbrl::{ExtractionResult, MetricKey, PeriodBucket};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values, one metric per row.
    Csv,

    /// Compact JSON.
    Json,

    /// Pretty-printed JSON.
    PrettyJson,
}

impl ExportFormat {
    /// File extension for this format.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One flattened metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Securities code
    pub sec_code: Option<String>,
    /// Filer name
    pub company: Option<String>,
    /// EDINET document id
    pub doc_id: Option<String>,
    /// `current_period`, `previous_period` or `forecast`
    pub period: String,
    /// Canonical metric
    pub metric: MetricKey,
    /// Value in base units
    pub value: f64,
}

/// Flattens an extraction result into rows, current period first.
pub fn metric_rows(result: &ExtractionResult, company: Option<&CompanyInfo>) -> Vec<MetricRow> {
    let buckets: [(&str, &PeriodBucket); 3] = [
        ("current_period", &result.current_period),
        ("previous_period", &result.previous_period),
        ("forecast", &result.forecast),
    ];

    buckets
        .into_iter()
        .flat_map(|(period, bucket)| {
            bucket.iter().map(move |(&metric, &value)| MetricRow {
                sec_code: company.and_then(|c| c.sec_code.clone()),
                company: company.and_then(|c| c.name.clone()),
                doc_id: company.map(|c| c.doc_id.clone()),
                period: period.to_string(),
                metric,
                value,
            })
        })
        .collect()
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn rows_to_csv(rows: &[MetricRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Exporter for AnalysisReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => {
                let rows: Vec<MetricRow> = self
                    .results
                    .iter()
                    .flat_map(|result| {
                        metric_rows(&result.financial_data, Some(&result.company_info))
                    })
                    .collect();
                rows_to_csv(&rows)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for ExtractionResult {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => rows_to_csv(&metric_rows(self, None)),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

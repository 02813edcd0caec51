//! EDINET document list types and helpers.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker present in the description of every earnings report, quarterly
/// (`四半期決算短信`) ones included.
pub const EARNINGS_REPORT_MARKER: &str = "決算短信";

/// One entry of the daily document list.
///
/// EDINET sends many more fields; only the ones used downstream are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Position in the day's list
    #[serde(default)]
    pub seq_number: Option<u32>,
    /// Document id (`S100XXXX`)
    #[serde(rename = "docID")]
    pub doc_id: String,
    /// Filer's EDINET code (`E12345`)
    #[serde(default)]
    pub edinet_code: Option<String>,
    /// Five-digit securities code (`12340`)
    #[serde(default)]
    pub sec_code: Option<String>,
    /// Filer name
    #[serde(default)]
    pub filer_name: Option<String>,
    /// Document type code
    #[serde(default)]
    pub doc_type_code: Option<String>,
    /// Start of the reporting period
    #[serde(default)]
    pub period_start: Option<String>,
    /// End of the reporting period
    #[serde(default)]
    pub period_end: Option<String>,
    /// Submission timestamp (`2023-12-01 15:00`)
    #[serde(default)]
    pub submit_date_time: Option<String>,
    /// Free-text document title
    #[serde(default)]
    pub doc_description: Option<String>,
    /// `"1"` when an XBRL archive is available
    #[serde(default)]
    pub xbrl_flag: Option<String>,
    /// `"1"` when a PDF is available
    #[serde(default)]
    pub pdf_flag: Option<String>,
}

impl DocumentMetadata {
    /// Returns true if the description marks this as an earnings report.
    pub fn is_earnings_report(&self) -> bool {
        self.doc_description
            .as_deref()
            .is_some_and(|description| description.contains(EARNINGS_REPORT_MARKER))
    }

    /// Submission date, if the timestamp starts with `YYYY-MM-DD`.
    pub fn submit_date(&self) -> Option<NaiveDate> {
        self.submit_date_time
            .as_deref()
            .and_then(|text| text.get(..10))
            .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
    }
}

/// Result-set summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Number of documents listed
    pub count: u64,
}

/// List header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    /// Service title
    #[serde(default)]
    pub title: Option<String>,
    /// API-level status code (`"200"` on success)
    #[serde(default)]
    pub status: Option<String>,
    /// API-level message
    #[serde(default)]
    pub message: Option<String>,
    /// When the list was generated
    #[serde(default)]
    pub process_date_time: Option<String>,
    /// Result-set summary
    #[serde(default)]
    pub resultset: Option<ResultSet>,
}

/// The daily document list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentList {
    /// List header
    #[serde(default)]
    pub metadata: ListMetadata,
    /// Documents submitted on the requested day
    #[serde(default)]
    pub results: Vec<DocumentMetadata>,
}

impl DocumentList {
    /// Decodes a document-list response body.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EdinetApi`] if the body is not a JSON object (the
    /// service answers some failures with an HTML page) or if the header
    /// carries a non-success status, and [`DataError::Serialization`] if the
    /// JSON does not have the expected shape.
    pub fn from_json(body: &str) -> Result<Self> {
        let trimmed = body.trim_start();
        if !trimmed.starts_with('{') {
            let preview: String = trimmed.chars().take(200).collect();
            return Err(DataError::EdinetApi(format!(
                "expected a JSON document list, got: {preview}"
            )));
        }

        let list: Self = serde_json::from_str(trimmed)?;
        match list.metadata.status.as_deref() {
            None | Some("200") => Ok(list),
            Some(status) => Err(DataError::EdinetApi(format!(
                "status {status}: {}",
                list.metadata.message.as_deref().unwrap_or("no message")
            ))),
        }
    }

    /// Number of listed documents.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no documents were listed.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Selects the earnings reports from a document list, in list order.
pub fn filter_earnings_reports(list: &DocumentList) -> Vec<&DocumentMetadata> {
    list.results
        .iter()
        .filter(|doc| doc.is_earnings_report())
        .collect()
}

/// Reduces `name` to a safe file name.
///
/// Any directory part is dropped and every character outside
/// `[A-Za-z0-9_.-]` becomes `_`.
///
/// ```
/// use kessan_data::edinet::sanitize_filename;
///
/// assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
/// assert_eq!(sanitize_filename("7203 トヨタ.zip"), "7203____.zip");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let basename = Path::new(name)
        .file_name()
        .map_or_else(|| name.to_string(), |base| base.to_string_lossy().into_owned());
    basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`DataError::InvalidDate`] for any other format.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| DataError::InvalidDate(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn document(doc_id: &str, description: Option<&str>) -> DocumentMetadata {
        DocumentMetadata {
            seq_number: None,
            doc_id: doc_id.to_string(),
            edinet_code: None,
            sec_code: None,
            filer_name: None,
            doc_type_code: None,
            period_start: None,
            period_end: None,
            submit_date_time: None,
            doc_description: description.map(str::to_string),
            xbrl_flag: None,
            pdf_flag: None,
        }
    }

    #[rstest]
    #[case(Some("決算短信〔日本基準〕（連結）"), true)]
    #[case(Some("第2四半期決算短信〔日本基準〕（連結）"), true)]
    #[case(Some("有価証券報告書"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn test_is_earnings_report(#[case] description: Option<&str>, #[case] expected: bool) {
        assert_eq!(document("S1", description).is_earnings_report(), expected);
    }

    #[test]
    fn test_filter_preserves_order() {
        let list = DocumentList {
            metadata: ListMetadata::default(),
            results: vec![
                document("S1", Some("決算短信")),
                document("S2", Some("有価証券報告書")),
                document("S3", Some("四半期決算短信")),
            ],
        };
        let ids: Vec<&str> = filter_earnings_reports(&list)
            .into_iter()
            .map(|doc| doc.doc_id.as_str())
            .collect();
        assert_eq!(ids, ["S1", "S3"]);
        assert!(filter_earnings_reports(&DocumentList::default()).is_empty());
    }

    #[rstest]
    #[case("S100TEST.zip", "S100TEST.zip")]
    #[case("dir/sub/file-name_1.zip", "file-name_1.zip")]
    #[case("a b:c.pdf", "a_b_c.pdf")]
    #[case("12340_S100TEST.zip", "12340_S100TEST.zip")]
    fn test_sanitize_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-12-27").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 27).unwrap()
        );
        assert!(matches!(
            parse_date("2024/12/27"),
            Err(DataError::InvalidDate(_))
        ));
        assert!(matches!(parse_date("yesterday"), Err(DataError::InvalidDate(_))));
    }

    #[test]
    fn test_submit_date() {
        let mut doc = document("S1", None);
        assert_eq!(doc.submit_date(), None);
        doc.submit_date_time = Some("2023-12-01 15:00".to_string());
        assert_eq!(doc.submit_date(), NaiveDate::from_ymd_opt(2023, 12, 1));
    }
}

//! On-disk cache for downloaded filings and saved reports.
//!
//! Everything lives under one data directory:
//! - `xbrl/` holds downloaded archives as `{secCode}_{docID}.zip`
//! - `json/` holds JSON reports
//! - `csv/` holds CSV reports

use kessan_data::edinet::{DocumentMetadata, sanitize_filename};
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Stands in for the securities code of filers that have none.
const UNKNOWN_SEC_CODE: &str = "unknown";

/// Get the default data directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/kessan/`
/// - macOS: `~/Library/Caches/kessan/`
/// - Windows: `%LOCALAPPDATA%\kessan\`
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kessan")
}

/// Paths and archive storage under a data directory.
#[derive(Debug, Clone)]
pub(crate) struct CacheManager {
    root: PathBuf,
}

impl CacheManager {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn xbrl_dir(&self) -> PathBuf {
        self.root.join("xbrl")
    }

    pub(crate) fn json_dir(&self) -> PathBuf {
        self.root.join("json")
    }

    pub(crate) fn csv_dir(&self) -> PathBuf {
        self.root.join("csv")
    }

    /// Where the archive of `doc` is cached.
    pub(crate) fn archive_path(&self, doc: &DocumentMetadata) -> PathBuf {
        let sec_code = doc
            .sec_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or(UNKNOWN_SEC_CODE);
        let name = sanitize_filename(&format!("{sec_code}_{}.zip", doc.doc_id));
        self.xbrl_dir().join(name)
    }

    /// Reads a previously cached archive. Missing or unreadable files count
    /// as a cache miss.
    pub(crate) async fn load_archive(&self, doc: &DocumentMetadata) -> Option<Vec<u8>> {
        let path = self.archive_path(doc);
        match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => {
                debug!(path = %path.display(), "archive cache hit");
                Some(bytes)
            }
            _ => None,
        }
    }

    /// Stores an archive, creating `xbrl/` if needed.
    pub(crate) async fn store_archive(
        &self,
        doc: &DocumentMetadata,
        bytes: &[u8],
    ) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(self.xbrl_dir()).await?;
        let path = self.archive_path(doc);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "cached archive");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(doc_id: &str, sec_code: Option<&str>) -> DocumentMetadata {
        serde_json::from_value(serde_json::json!({
            "docID": doc_id,
            "secCode": sec_code,
        }))
        .unwrap()
    }

    #[test]
    fn test_default_data_dir() {
        assert!(default_data_dir().ends_with("kessan"));
    }

    #[test]
    fn test_archive_path_naming() {
        let cache = CacheManager::new("/data");
        assert_eq!(
            cache.archive_path(&document("S100TEST", Some("12340"))),
            PathBuf::from("/data/xbrl/12340_S100TEST.zip")
        );
        assert_eq!(
            cache.archive_path(&document("S100TEST", None)),
            PathBuf::from("/data/xbrl/unknown_S100TEST.zip")
        );
        assert_eq!(
            cache.archive_path(&document("../S100 TEST", Some("1234"))),
            PathBuf::from("/data/xbrl/S100_TEST.zip")
        );
        assert_eq!(cache.json_dir(), PathBuf::from("/data/json"));
        assert_eq!(cache.csv_dir(), PathBuf::from("/data/csv"));
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path());
        let doc = document("S100TEST", Some("12340"));

        assert!(cache.load_archive(&doc).await.is_none());

        let path = cache.store_archive(&doc, b"PK\x03\x04").await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(cache.load_archive(&doc).await.as_deref(), Some(&b"PK\x03\x04"[..]));
    }
}

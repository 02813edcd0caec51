//! EDINET API client with rate limiting.

use super::config::EdinetConfig;
use super::documents::{DocumentList, sanitize_filename};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use reqwest::{Request, StatusCode, Url};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// User agent sent with every request
const USER_AGENT: &str = concat!("kessan/", env!("CARGO_PKG_VERSION"));

/// `type` value asking the document-list endpoint to include results,
/// not just the header
const LIST_WITH_RESULTS: &str = "2";

/// Document kinds that can be downloaded for a filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// ZIP archive holding the XBRL instance and its attachments
    Xbrl,
    /// Rendered PDF
    Pdf,
}

impl DocumentKind {
    /// EDINET's `type` parameter for this kind.
    pub const fn api_type(self) -> u8 {
        match self {
            Self::Xbrl => 1,
            Self::Pdf => 2,
        }
    }

    /// File extension for saved documents.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xbrl => "zip",
            Self::Pdf => "pdf",
        }
    }
}

/// Spaces requests out by a minimum interval.
#[derive(Debug)]
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// EDINET API client.
///
/// Cloning is cheap; clones share the HTTP connection pool and the rate
/// limiter.
#[derive(Clone)]
pub struct EdinetClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    api_key: Option<String>,
}

impl EdinetClient {
    /// Creates a client from `config`.
    ///
    /// A missing subscription key is logged but not rejected; the API will
    /// answer with an authentication error.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Parse`] if the base URL is invalid and
    /// [`DataError::Network`] if the HTTP client cannot be built.
    pub fn new(config: EdinetConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| DataError::Parse(format!("invalid base URL '{base_url}': {e}")))?;

        if config.api_key.is_none() {
            warn!("no EDINET API key configured; set EDINET_API_KEY");
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.min_request_interval))),
            base_url,
            api_key: config.api_key,
        })
    }

    /// Fetches the list of documents submitted on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Http`] for a non-success status (with the API's
    /// message on authentication failures), [`DataError::EdinetApi`] if the
    /// body is not a JSON document list, and [`DataError::Network`] on
    /// transport failures.
    ///
    /// # Example
    /// ```no_run
    /// use chrono::NaiveDate;
    /// use kessan_data::edinet::{EdinetClient, EdinetConfig};
    ///
    /// # async fn example() -> kessan_data::Result<()> {
    /// let client = EdinetClient::new(EdinetConfig::from_env())?;
    /// let date = NaiveDate::from_ymd_opt(2024, 12, 27).unwrap();
    /// let list = client.fetch_documents(date).await?;
    /// println!("{} documents", list.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_documents(&self, date: NaiveDate) -> Result<DocumentList> {
        let request = self.documents_request(date)?;

        self.rate_limiter.lock().await.wait().await;
        debug!(%date, "fetching document list");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let list = DocumentList::from_json(&body)?;
        info!(%date, documents = list.len(), "fetched document list");
        Ok(list)
    }

    /// Downloads one document of a filing.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EdinetApi`] for an empty id or when the service
    /// answers with a JSON error instead of the file, [`DataError::Http`]
    /// for a non-success status, and [`DataError::Network`] on transport
    /// failures.
    pub async fn download_archive(&self, doc_id: &str, kind: DocumentKind) -> Result<Vec<u8>> {
        let request = self.download_request(doc_id, kind)?;

        self.rate_limiter.lock().await.wait().await;
        debug!(doc_id, ?kind, "downloading document");

        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        // Unknown document ids come back as a 200 with a JSON error body.
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        if is_json {
            let body = response.text().await?;
            return Err(DataError::EdinetApi(format!(
                "{doc_id}: {}",
                api_message(&body).unwrap_or(body)
            )));
        }

        let bytes = response.bytes().await?;
        debug!(doc_id, size = bytes.len(), "downloaded document");
        Ok(bytes.to_vec())
    }

    /// Downloads the XBRL archive of a filing.
    ///
    /// # Errors
    ///
    /// See [`Self::download_archive`].
    pub async fn download_xbrl(&self, doc_id: &str) -> Result<Vec<u8>> {
        self.download_archive(doc_id, DocumentKind::Xbrl).await
    }

    /// Downloads a document into `dir`, returning the written path.
    ///
    /// The file is named `{file_stem}.{extension}` after sanitizing.
    ///
    /// # Errors
    ///
    /// See [`Self::download_archive`]; additionally [`DataError::Io`] if the
    /// file cannot be written.
    pub async fn download_to(
        &self,
        doc_id: &str,
        kind: DocumentKind,
        dir: &Path,
        file_stem: &str,
    ) -> Result<PathBuf> {
        let bytes = self.download_archive(doc_id, kind).await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(sanitize_filename(&format!(
            "{file_stem}.{}",
            kind.extension()
        )));
        tokio::fs::write(&path, &bytes).await?;

        info!(path = %path.display(), size = bytes.len(), "saved document");
        Ok(path)
    }

    /// Builds the document-list request for `date`.
    pub fn documents_request(&self, date: NaiveDate) -> Result<Request> {
        let url = format!("{}/api/v2/documents.json", self.base_url);
        let query = self.with_key(vec![
            ("date", date.format("%Y-%m-%d").to_string()),
            ("type", LIST_WITH_RESULTS.to_string()),
        ]);
        Ok(self.client.get(url).query(&query).build()?)
    }

    /// Builds the download request for one document.
    pub fn download_request(&self, doc_id: &str, kind: DocumentKind) -> Result<Request> {
        let doc_id = doc_id.trim();
        if doc_id.is_empty() {
            return Err(DataError::EdinetApi("Empty document id".to_string()));
        }
        let url = format!("{}/api/v2/documents/{doc_id}", self.base_url);
        let query = self.with_key(vec![("type", kind.api_type().to_string())]);
        Ok(self.client.get(url).query(&query).build()?)
    }

    fn with_key(&self, mut query: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        if let Some(key) = &self.api_key {
            query.push(("Subscription-Key", key.clone()));
        }
        query
    }
}

impl std::fmt::Debug for EdinetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdinetClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

fn status_error(status: StatusCode, body: &str) -> DataError {
    if status == StatusCode::UNAUTHORIZED {
        let detail = api_message(body).unwrap_or_else(|| "no message".to_string());
        return DataError::Http(format!(
            "{status}: authentication failed ({detail}); set EDINET_API_KEY to a valid subscription key"
        ));
    }
    DataError::Http(status.to_string())
}

// EDINET error bodies put the text under `message`, at the top level or
// inside `metadata`.
fn api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("metadata").and_then(|meta| meta.get("message")))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

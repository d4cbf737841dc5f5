//! HTTP CSV adapter for [`TableSource`], including the Google Sheets CSV
//! export endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, ETAG, IF_MATCH};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use township_core::{DashboardError, Result};

use crate::export::SerializedTable;
use crate::source::{content_version, decode_csv, encode_csv, Snapshot, SourceVersion, TableSource};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CSV export URL of one sheet tab.
pub fn google_export_url(spreadsheet_id: &str, gid: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        spreadsheet_id, gid
    )
}

/// A sheet fetched as CSV over HTTP.
///
/// Writes are a `PUT` of the full CSV body guarded by `If-Match` when the
/// server reported an ETag. Sources built with `writable = false` reject
/// every write.
#[derive(Debug, Clone)]
pub struct HttpCsvSource {
    url: String,
    label: String,
    writable: bool,
    client: reqwest::Client,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>, writable: bool) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DashboardError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            label: url.clone(),
            url,
            writable,
            client,
        })
    }

    /// Read-only source for a Google Sheets tab.
    pub fn google_sheet(spreadsheet_id: &str, gid: &str) -> Result<Self> {
        let mut source = Self::new(google_export_url(spreadsheet_id, gid), false)?;
        source.label = format!("Google Sheet {} (gid {})", spreadsheet_id, gid);
        Ok(source)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn load_error(&self, reason: impl ToString) -> DashboardError {
        DashboardError::Load {
            source_name: self.describe(),
            reason: reason.to_string(),
        }
    }

    fn persist_error(&self, reason: impl ToString) -> DashboardError {
        DashboardError::Persist {
            source_name: self.describe(),
            reason: reason.to_string(),
        }
    }

    fn changed(&self, expected: &SourceVersion, found: impl ToString) -> DashboardError {
        DashboardError::SourceChanged {
            source_name: self.describe(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// GET the body and its version, without decoding.
    async fn fetch(&self) -> std::result::Result<(Vec<u8>, SourceVersion), String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }
        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?.to_vec();
        let version = match etag {
            Some(tag) => SourceVersion::ETag(tag),
            None => content_version(&bytes),
        };
        Ok((bytes, version))
    }
}

#[async_trait]
impl TableSource for HttpCsvSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    async fn load(&self) -> Result<Snapshot> {
        let (bytes, version) = self.fetch().await.map_err(|e| self.load_error(e))?;
        let raw = decode_csv(&bytes, &self.describe())?;
        debug!("Fetched {} rows from {} ({})", raw.rows.len(), self.label, version);
        Ok(Snapshot { raw, version })
    }

    async fn persist(
        &self,
        table: &SerializedTable,
        expected: &SourceVersion,
    ) -> Result<SourceVersion> {
        if !self.writable {
            return Err(DashboardError::ReadOnlySource(self.describe()));
        }

        let mut request = self
            .client
            .put(&self.url)
            .header(CONTENT_TYPE, "text/csv; charset=utf-8");

        match expected {
            SourceVersion::ETag(tag) => {
                request = request.header(IF_MATCH, tag.as_str());
            }
            SourceVersion::ContentHash(_) => {
                // No server-side precondition available; compare a fresh read.
                let (_, current) = self.fetch().await.map_err(|e| self.persist_error(e))?;
                if &current != expected {
                    warn!("{} changed since load", self.label);
                    return Err(self.changed(expected, current));
                }
            }
        }

        let body = encode_csv(table, &self.describe())?;
        let written = content_version(&body);
        let resp = request
            .body(body)
            .send()
            .await
            .map_err(|e| self.persist_error(e))?;

        let status = resp.status();
        if status == StatusCode::PRECONDITION_FAILED {
            warn!("{} rejected If-Match {}", self.label, expected);
            return Err(self.changed(expected, "a newer revision"));
        }
        if !status.is_success() {
            return Err(self.persist_error(format!("HTTP {}", status)));
        }

        info!("Uploaded {} rows to {}", table.rows.len(), self.label);
        Ok(resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| SourceVersion::ETag(s.to_string()))
            .unwrap_or(written))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

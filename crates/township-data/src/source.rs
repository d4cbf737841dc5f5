//! The external table port and its CSV wire format.
//!
//! A [`TableSource`] offers two bulk operations: read every row, and
//! overwrite every row. Each load reports a [`SourceVersion`] that the next
//! persist must present, so a sheet edited elsewhere is never silently
//! overwritten.

use std::fmt;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use township_core::{DashboardError, Result};

use crate::export::SerializedTable;

// ── RawTable ──────────────────────────────────────────────────────────────────

/// Sheet contents as read: the header row plus string cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ── SourceVersion ─────────────────────────────────────────────────────────────

/// Opaque marker of the source state observed at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceVersion {
    /// An HTTP entity tag reported by the server.
    ETag(String),
    /// Hex SHA-256 of the raw bytes.
    ContentHash(String),
}

impl fmt::Display for SourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceVersion::ETag(tag) => write!(f, "etag:{}", tag),
            SourceVersion::ContentHash(hash) => {
                write!(f, "sha256:{}", hash.get(..12).unwrap_or(hash))
            }
        }
    }
}

/// Content-hash version for `bytes`.
pub fn content_version(bytes: &[u8]) -> SourceVersion {
    SourceVersion::ContentHash(hex::encode(Sha256::digest(bytes)))
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// One successful bulk read.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub raw: RawTable,
    pub version: SourceVersion,
}

// ── TableSource ───────────────────────────────────────────────────────────────

/// Bulk read / bulk overwrite access to an external sheet.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Human-readable name used in logs and messages.
    fn describe(&self) -> String;

    /// `false` when [`TableSource::persist`] always fails with
    /// [`DashboardError::ReadOnlySource`].
    fn is_writable(&self) -> bool;

    /// Read every row.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace the whole sheet with `table`, provided the source still
    /// matches `expected`. Returns the version of the written state.
    async fn persist(&self, table: &SerializedTable, expected: &SourceVersion)
        -> Result<SourceVersion>;
}

// ── CSV codec ─────────────────────────────────────────────────────────────────

/// Decode CSV bytes. The first record is the header row; rows whose cells
/// are all blank are dropped. Ragged rows are accepted.
pub fn decode_csv(bytes: &[u8], source_name: &str) -> Result<RawTable> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut raw = RawTable::default();
    let mut first = true;

    for result in reader.records() {
        let record = result.map_err(|e| DashboardError::Load {
            source_name: source_name.to_string(),
            reason: describe_csv_error(&e),
        })?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();

        if first {
            raw.headers = cells;
            first = false;
            continue;
        }
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        raw.rows.push(cells);
    }

    Ok(raw)
}

/// Encode a serialized table as CSV bytes (header row first).
pub fn encode_csv(table: &SerializedTable, source_name: &str) -> Result<Vec<u8>> {
    let to_err = |e: csv::Error| DashboardError::Persist {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(false)
        .from_writer(Vec::new());
    writer.write_record(&table.header).map_err(to_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(to_err)?;
    }
    writer.into_inner().map_err(|e| DashboardError::Persist {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.position() {
        Some(pos) => format!("csv parse error at line {}: {}", pos.line(), err),
        None => format!("csv parse error: {}", err),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

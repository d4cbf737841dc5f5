//! Local CSV file adapter for [`TableSource`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use township_core::{DashboardError, Result};

use crate::export::SerializedTable;
use crate::source::{content_version, decode_csv, encode_csv, Snapshot, SourceVersion, TableSource};

/// A sheet stored as a CSV file on disk. Versioned by content hash.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist_error(&self, reason: impl ToString) -> DashboardError {
        DashboardError::Persist {
            source_name: self.describe(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl TableSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn load(&self) -> Result<Snapshot> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DashboardError::Load {
                source_name: self.describe(),
                reason: e.to_string(),
            })?;
        let raw = decode_csv(&bytes, &self.describe())?;
        let version = content_version(&bytes);
        debug!(
            "Read {} rows from {} ({})",
            raw.rows.len(),
            self.path.display(),
            version
        );
        Ok(Snapshot { raw, version })
    }

    async fn persist(
        &self,
        table: &SerializedTable,
        expected: &SourceVersion,
    ) -> Result<SourceVersion> {
        let current = match tokio::fs::read(&self.path).await {
            Ok(bytes) => content_version(&bytes),
            Err(e) => return Err(self.persist_error(e)),
        };
        if &current != expected {
            warn!(
                "{} changed on disk since load ({} -> {})",
                self.path.display(),
                expected,
                current
            );
            return Err(DashboardError::SourceChanged {
                source_name: self.describe(),
                expected: expected.to_string(),
                found: current.to_string(),
            });
        }

        let bytes = encode_csv(table, &self.describe())?;

        let tmp = self.path.with_extension("csv.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| self.persist_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.persist_error(e))?;

        info!("Wrote {} rows to {}", table.rows.len(), self.path.display());
        Ok(content_version(&bytes))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHEET: &str = "Township Name,Plot No.,Status\nAlpha,A-1,Open\n";

    fn setup() -> (TempDir, CsvFileSource) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plots.csv");
        std::fs::write(&path, SHEET).unwrap();
        (dir, CsvFileSource::new(path))
    }

    fn edited() -> SerializedTable {
        SerializedTable {
            header: vec!["Township Name".into(), "Plot No.".into(), "Status".into()],
            rows: vec![vec!["Alpha".into(), "A-1".into(), "Sold".into()]],
        }
    }

    #[tokio::test]
    async fn test_load_reads_rows_and_version() {
        let (_dir, source) = setup();
        let snapshot = source.load().await.unwrap();
        assert_eq!(snapshot.raw.rows.len(), 1);
        assert_eq!(snapshot.version, content_version(SHEET.as_bytes()));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let source = CsvFileSource::new(dir.path().join("absent.csv"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, DashboardError::Load { .. }));
    }

    #[tokio::test]
    async fn test_persist_overwrites_whole_file() {
        let (_dir, source) = setup();
        let snapshot = source.load().await.unwrap();
        let new_version = source.persist(&edited(), &snapshot.version).await.unwrap();

        let text = std::fs::read_to_string(source.path()).unwrap();
        assert_eq!(text, "Township Name,Plot No.,Status\nAlpha,A-1,Sold\n");
        assert_eq!(new_version, content_version(text.as_bytes()));
        assert!(!source.path().with_extension("csv.tmp").exists());
    }

    #[tokio::test]
    async fn test_persist_detects_external_change() {
        let (_dir, source) = setup();
        let snapshot = source.load().await.unwrap();
        std::fs::write(source.path(), "Township Name,Plot No.,Status\nAlpha,A-1,Hold\n").unwrap();

        let err = source.persist(&edited(), &snapshot.version).await.unwrap_err();
        assert!(matches!(err, DashboardError::SourceChanged { .. }));
        assert!(err.is_persist_failure());

        let text = std::fs::read_to_string(source.path()).unwrap();
        assert!(text.contains("Hold"));
    }
}

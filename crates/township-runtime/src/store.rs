//! The explicit in-memory plot store.
//!
//! [`Store`] owns the one mutable [`Table`] and the [`TableSource`] it came
//! from. Handlers receive it by reference; every edit reloads first so the
//! edit is applied against the current sheet, then persists the whole table
//! with the version observed by that reload.

use chrono::{DateTime, Local};

use township_core::models::{DuplicatePolicy, PersistFailurePolicy, Table};
use township_core::{DashboardError, Result};
use township_data::export::serialize_table;
use township_data::mutator::{apply_update, EditRequest, UpdateReport};
use township_data::normalizer::normalize;
use township_data::source::{SourceVersion, TableSource};

// ── Store ─────────────────────────────────────────────────────────────────────

pub struct Store {
    source: Box<dyn TableSource>,
    table: Table,
    version: SourceVersion,
    loaded_at: DateTime<Local>,
    duplicate_policy: DuplicatePolicy,
    persist_policy: PersistFailurePolicy,
    /// Local table holds an edit the source never accepted.
    diverged: bool,
    last_error: Option<String>,
}

impl Store {
    /// Perform the initial load. A failure here is terminal for the session;
    /// there is no retry.
    pub async fn open(
        source: Box<dyn TableSource>,
        duplicate_policy: DuplicatePolicy,
        persist_policy: PersistFailurePolicy,
    ) -> Result<Self> {
        let snapshot = source.load().await?;
        let table = normalize(&snapshot.raw);
        tracing::info!(
            source = %source.describe(),
            rows = table.len(),
            version = %snapshot.version,
            "table loaded"
        );
        Ok(Self {
            source,
            table,
            version: snapshot.version,
            loaded_at: Local::now(),
            duplicate_policy,
            persist_policy,
            diverged: false,
            last_error: None,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn version(&self) -> &SourceVersion {
        &self.version
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    pub fn source_name(&self) -> String {
        self.source.describe()
    }

    pub fn is_writable(&self) -> bool {
        self.source.is_writable()
    }

    /// `true` while the local table carries an edit that failed to persist.
    pub fn is_diverged(&self) -> bool {
        self.diverged
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    pub fn persist_policy(&self) -> PersistFailurePolicy {
        self.persist_policy
    }

    /// Message of the most recent failed reload or persist, cleared by the
    /// next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Actions ───────────────────────────────────────────────────────────

    /// Re-read the source and rebuild the table. On failure the current
    /// table is kept and the error returned.
    pub async fn reload(&mut self) -> Result<()> {
        match self.source.load().await {
            Ok(snapshot) => {
                if self.diverged {
                    tracing::warn!("reload discards local edits that were never persisted");
                }
                self.table = normalize(&snapshot.raw);
                self.version = snapshot.version;
                self.loaded_at = Local::now();
                self.diverged = false;
                self.last_error = None;
                tracing::debug!(rows = self.table.len(), version = %self.version, "table reloaded");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed; keeping current table");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reload, apply `request`, and persist the whole table.
    ///
    /// Validation errors leave the table untouched. A persist failure is
    /// returned after the configured [`PersistFailurePolicy`] has run.
    pub async fn apply_edit(&mut self, request: &EditRequest) -> Result<UpdateReport> {
        if !self.source.is_writable() {
            return Err(DashboardError::ReadOnlySource(self.source.describe()));
        }

        self.reload().await?;

        let report = apply_update(&mut self.table, request, self.duplicate_policy)?;
        let serialized = serialize_table(&self.table);

        match self.source.persist(&serialized, &self.version).await {
            Ok(version) => {
                tracing::info!(
                    rows = report.rows.len(),
                    version = %version,
                    "edit persisted"
                );
                self.version = version;
                self.diverged = false;
                self.last_error = None;
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, policy = %self.persist_policy, "persist failed");
                self.on_persist_failure().await;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────

    async fn on_persist_failure(&mut self) {
        self.diverged = true;
        if self.persist_policy == PersistFailurePolicy::Reload {
            // On success `reload` clears `diverged`.
            if self.reload().await.is_err() {
                tracing::warn!("could not re-fetch after failed persist; local table diverged");
            }
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("source", &self.source.describe())
            .field("rows", &self.table.len())
            .field("version", &self.version)
            .field("diverged", &self.diverged)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use township_core::models::CellValue;
    use township_data::export::SerializedTable;
    use township_data::filter::facet_value;
    use township_data::source::{content_version, decode_csv, encode_csv, Snapshot};

    const SHEET: &str = "Township Name,Plot No.,Status,Plot Price\n\
                         Alpha,A-1,Open,100\n\
                         Alpha,A-2,Open,200\n";

    /// In-memory sheet shared between the test and the store.
    #[derive(Clone, Default)]
    struct MemorySheet {
        bytes: Arc<Mutex<Vec<u8>>>,
        fail_persist: Arc<AtomicBool>,
        fail_load: Arc<AtomicBool>,
        loads: Arc<AtomicUsize>,
    }

    impl MemorySheet {
        fn new(csv: &str) -> Self {
            let sheet = Self::default();
            sheet.set(csv);
            sheet
        }

        fn set(&self, csv: &str) {
            *self.bytes.lock().unwrap() = csv.as_bytes().to_vec();
        }

        fn text(&self) -> String {
            String::from_utf8(self.bytes.lock().unwrap().clone()).unwrap()
        }
    }

    struct MemorySource {
        sheet: MemorySheet,
        writable: bool,
    }

    #[async_trait]
    impl TableSource for MemorySource {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        fn is_writable(&self) -> bool {
            self.writable
        }

        async fn load(&self) -> Result<Snapshot> {
            self.sheet.loads.fetch_add(1, Ordering::SeqCst);
            if self.sheet.fail_load.load(Ordering::SeqCst) {
                return Err(DashboardError::Load {
                    source_name: "memory".into(),
                    reason: "offline".into(),
                });
            }
            let bytes = self.sheet.bytes.lock().unwrap().clone();
            Ok(Snapshot {
                raw: decode_csv(&bytes, "memory")?,
                version: content_version(&bytes),
            })
        }

        async fn persist(
            &self,
            table: &SerializedTable,
            expected: &SourceVersion,
        ) -> Result<SourceVersion> {
            if self.sheet.fail_persist.load(Ordering::SeqCst) {
                return Err(DashboardError::Persist {
                    source_name: "memory".into(),
                    reason: "quota exceeded".into(),
                });
            }
            let mut bytes = self.sheet.bytes.lock().unwrap();
            let current = content_version(&bytes);
            if &current != expected {
                return Err(DashboardError::SourceChanged {
                    source_name: "memory".into(),
                    expected: expected.to_string(),
                    found: current.to_string(),
                });
            }
            *bytes = encode_csv(table, "memory")?;
            Ok(content_version(&bytes))
        }
    }

    async fn open(sheet: &MemorySheet, policy: PersistFailurePolicy) -> Store {
        let source = MemorySource {
            sheet: sheet.clone(),
            writable: true,
        };
        Store::open(Box::new(source), DuplicatePolicy::AllMatches, policy)
            .await
            .unwrap()
    }

    fn sold(plot: &str) -> EditRequest {
        EditRequest::parse("Alpha", plot, "status", "Sold").unwrap()
    }

    #[tokio::test]
    async fn test_open_normalizes_table() {
        let sheet = MemorySheet::new(SHEET);
        let store = open(&sheet, PersistFailurePolicy::Reload).await;
        assert_eq!(store.table().len(), 2);
        assert_eq!(store.table().value(1, "plot_price"), Some(&CellValue::Number(200.0)));
        assert!(!store.is_diverged());
    }

    #[tokio::test]
    async fn test_open_failure_is_terminal() {
        let sheet = MemorySheet::new(SHEET);
        sheet.fail_load.store(true, Ordering::SeqCst);
        let source = MemorySource {
            sheet: sheet.clone(),
            writable: true,
        };
        let err = Store::open(Box::new(source), DuplicatePolicy::default(), PersistFailurePolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Load { .. }));
        assert_eq!(sheet.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_edit_persists_whole_table() {
        let sheet = MemorySheet::new(SHEET);
        let mut store = open(&sheet, PersistFailurePolicy::Reload).await;

        let report = store.apply_edit(&sold("A-2")).await.unwrap();
        assert_eq!(report.rows, vec![1]);
        assert_eq!(
            sheet.text(),
            "Township Name,Plot No.,Status,Plot Price\nAlpha,A-1,Open,100\nAlpha,A-2,Sold,200\n"
        );
        assert_eq!(store.version(), &content_version(sheet.text().as_bytes()));
    }

    #[tokio::test]
    async fn test_edit_reloads_before_applying() {
        let sheet = MemorySheet::new(SHEET);
        let mut store = open(&sheet, PersistFailurePolicy::Reload).await;

        // Someone else adds a plot after our initial load.
        sheet.set(&format!("{}Alpha,A-3,Open,300\n", SHEET));
        store.apply_edit(&sold("A-3")).await.unwrap();

        assert_eq!(store.table().len(), 3);
        assert!(sheet.text().contains("A-3,Sold,300"));
    }

    #[tokio::test]
    async fn test_validation_error_leaves_table_untouched() {
        let sheet = MemorySheet::new(SHEET);
        let mut store = open(&sheet, PersistFailurePolicy::Reload).await;
        let before = store.table().clone();

        let err = store.apply_edit(&sold("Z-9")).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.table(), &before);
        assert_eq!(sheet.text(), SHEET);
    }

    #[tokio::test]
    async fn test_persist_failure_reload_discards_edit() {
        let sheet = MemorySheet::new(SHEET);
        let mut store = open(&sheet, PersistFailurePolicy::Reload).await;
        sheet.fail_persist.store(true, Ordering::SeqCst);

        let err = store.apply_edit(&sold("A-1")).await.unwrap_err();
        assert!(err.is_persist_failure());
        assert!(!store.is_diverged());
        assert_eq!(facet_value(store.table(), 0, "status"), "Open");
        assert!(store.last_error().is_some());
    }

    #[tokio::test]
    async fn test_persist_failure_retain_keeps_edit() {
        let sheet = MemorySheet::new(SHEET);
        let mut store = open(&sheet, PersistFailurePolicy::Retain).await;
        sheet.fail_persist.store(true, Ordering::SeqCst);

        store.apply_edit(&sold("A-1")).await.unwrap_err();
        assert!(store.is_diverged());
        assert_eq!(facet_value(store.table(), 0, "status"), "Sold");
        assert_eq!(sheet.text(), SHEET);

        // A successful reload ends the divergence.
        store.reload().await.unwrap();
        assert!(!store.is_diverged());
        assert_eq!(facet_value(store.table(), 0, "status"), "Open");
    }

    #[tokio::test]
    async fn test_read_only_source_rejects_before_reload() {
        let sheet = MemorySheet::new(SHEET);
        let source = MemorySource {
            sheet: sheet.clone(),
            writable: false,
        };
        let mut store = Store::open(Box::new(source), DuplicatePolicy::default(), PersistFailurePolicy::default())
            .await
            .unwrap();

        let err = store.apply_edit(&sold("A-1")).await.unwrap_err();
        assert!(matches!(err, DashboardError::ReadOnlySource(_)));
        assert_eq!(sheet.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_table() {
        let sheet = MemorySheet::new(SHEET);
        let mut store = open(&sheet, PersistFailurePolicy::Reload).await;
        sheet.fail_load.store(true, Ordering::SeqCst);

        assert!(store.reload().await.is_err());
        assert_eq!(store.table().len(), 2);
        assert!(store.last_error().unwrap().contains("offline"));
    }
}

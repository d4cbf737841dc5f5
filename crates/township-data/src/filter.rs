//! Cascading township / facet filtering.
//!
//! The township partitions the table first; the ownership, status and
//! registry-status option universes are then computed within that township.

use std::collections::HashSet;

use township_core::catalog::{OWNERSHIP, REGISTRY_STATUS, STATUS, TOWNSHIP_NAME};
use township_core::models::{CellValue, Record, Table};

// ── Facet ─────────────────────────────────────────────────────────────────────

/// A secondary filter dimension inside a township.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Ownership,
    Status,
    RegistryStatus,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Ownership, Facet::Status, Facet::RegistryStatus];

    pub fn column(&self) -> &'static str {
        match self {
            Facet::Ownership => OWNERSHIP,
            Facet::Status => STATUS,
            Facet::RegistryStatus => REGISTRY_STATUS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Facet::Ownership => "Owner",
            Facet::Status => "Status",
            Facet::RegistryStatus => "Registry Status",
        }
    }
}

// ── FacetOptions ──────────────────────────────────────────────────────────────

/// Distinct facet values present within one township, in first-appearance
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    pub ownership: Vec<String>,
    pub status: Vec<String>,
    pub registry_status: Vec<String>,
}

impl FacetOptions {
    pub fn get(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Ownership => &self.ownership,
            Facet::Status => &self.status,
            Facet::RegistryStatus => &self.registry_status,
        }
    }
}

// ── FilterCriteria ────────────────────────────────────────────────────────────

/// The township plus one selected-value set per facet.
///
/// An empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub township: String,
    pub ownership: HashSet<String>,
    pub status: HashSet<String>,
    pub registry_status: HashSet<String>,
}

impl FilterCriteria {
    /// Criteria selecting every facet option present in `township`.
    pub fn all_for(table: &Table, township: &str) -> Self {
        let options = facet_options(table, township);
        Self {
            township: township.to_string(),
            ownership: options.ownership.into_iter().collect(),
            status: options.status.into_iter().collect(),
            registry_status: options.registry_status.into_iter().collect(),
        }
    }

    pub fn selection(&self, facet: Facet) -> &HashSet<String> {
        match facet {
            Facet::Ownership => &self.ownership,
            Facet::Status => &self.status,
            Facet::RegistryStatus => &self.registry_status,
        }
    }

    pub fn selection_mut(&mut self, facet: Facet) -> &mut HashSet<String> {
        match facet {
            Facet::Ownership => &mut self.ownership,
            Facet::Status => &mut self.status,
            Facet::RegistryStatus => &mut self.registry_status,
        }
    }
}

// ── FilteredView ──────────────────────────────────────────────────────────────

/// The matching subsequence of a table, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a Table,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every record of `table`.
    pub fn all(table: &'a Table) -> Self {
        Self {
            table,
            rows: (0..table.len()).collect(),
        }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Row indices into the underlying table.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let table = self.table;
        self.rows.iter().map(move |&i| &table.records()[i])
    }

    /// Cells of `column` across the view, `None` when the column is absent.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &'a CellValue> + '_> {
        let idx = self.table.column_index(column)?;
        let table = self.table;
        Some(
            self.rows
                .iter()
                .filter_map(move |&i| table.records()[i].get(idx)),
        )
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Text used for equality and membership tests. `Missing` and absent
/// columns render as the empty string.
pub fn facet_value(table: &Table, row: usize, column: &str) -> String {
    table
        .value(row, column)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Distinct township names in first-appearance order. Empty when the table
/// has no township column.
pub fn townships(table: &Table) -> Vec<String> {
    if !table.has_column(TOWNSHIP_NAME) {
        return Vec::new();
    }
    distinct((0..table.len()).map(|row| facet_value(table, row, TOWNSHIP_NAME)))
}

/// Facet option universes for the records of `township`.
pub fn facet_options(table: &Table, township: &str) -> FacetOptions {
    let rows = township_rows(table, township);
    let collect = |facet: Facet| distinct(rows.iter().map(|&r| facet_value(table, r, facet.column())));
    FacetOptions {
        ownership: collect(Facet::Ownership),
        status: collect(Facet::Status),
        registry_status: collect(Facet::RegistryStatus),
    }
}

/// Records matching `criteria`, preserving table order.
///
/// A record matches iff its township equals `criteria.township` and each
/// facet value is a member of the corresponding set.
pub fn filter<'a>(table: &'a Table, criteria: &FilterCriteria) -> FilteredView<'a> {
    let rows = township_rows(table, &criteria.township)
        .into_iter()
        .filter(|&row| {
            Facet::ALL.iter().all(|facet| {
                criteria
                    .selection(*facet)
                    .contains(&facet_value(table, row, facet.column()))
            })
        })
        .collect();
    FilteredView { table, rows }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn township_rows(table: &Table, township: &str) -> Vec<usize> {
    if !table.has_column(TOWNSHIP_NAME) {
        return Vec::new();
    }
    (0..table.len())
        .filter(|&row| facet_value(table, row, TOWNSHIP_NAME) == township)
        .collect()
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    values.filter(|v| seen.insert(v.clone())).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! In-memory table model shared by every dashboard crate.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::DashboardError;

// ── CellValue ─────────────────────────────────────────────────────────────────

/// A single normalized cell.
///
/// `Missing` is the sentinel for values that were absent or failed to parse.
/// It is kept distinct from a genuine zero or an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    /// Always finite.
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl CellValue {
    /// The numeric value, or `None` for anything that is not a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Short name of the variant, used in validation messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "numeric",
            CellValue::Date(_) => "date",
            CellValue::Missing => "missing",
        }
    }
}

/// Renders the external representation: `Missing` is empty, numbers use the
/// shortest round-trip form (never `NaN` / `inf`), dates are `YYYY-MM-DD`.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.is_finite() => write!(f, "{}", n),
            CellValue::Number(_) => Ok(()),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Missing => Ok(()),
        }
    }
}

// ── Record / Column / Table ───────────────────────────────────────────────────

/// One row, positionally aligned with [`Table::columns`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    cells: Vec<CellValue>,
}

impl Record {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    fn set(&mut self, index: usize, value: CellValue) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
        }
    }
}

/// A column: its canonical key plus the header text it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Canonical (normalized) key, e.g. `plot_size_actual`.
    pub name: String,
    /// Header text exactly as it appeared in the source.
    pub source_header: String,
}

impl Column {
    pub fn new(name: impl Into<String>, source_header: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_header: source_header.into(),
        }
    }
}

/// An ordered sequence of records sharing one column set.
///
/// Every record holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table, padding short records with empty text and dropping
    /// cells beyond the last column.
    pub fn new(columns: Vec<Column>, records: Vec<Record>) -> Self {
        let width = columns.len();
        let records = records
            .into_iter()
            .map(|mut r| {
                r.cells.resize(width, CellValue::Text(String::new()));
                r
            })
            .collect();
        Self { columns, records }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cell at `row` in column `name`, or `None` when either is absent.
    pub fn value(&self, row: usize, name: &str) -> Option<&CellValue> {
        let col = self.column_index(name)?;
        self.records.get(row)?.get(col)
    }

    /// Overwrite one cell. Out-of-range positions are ignored.
    pub fn set_value(&mut self, row: usize, column: usize, value: CellValue) {
        if let Some(record) = self.records.get_mut(row) {
            record.set(column, value);
        }
    }

    /// Replace every cell of one column through `f`.
    pub fn map_column(&mut self, column: usize, mut f: impl FnMut(&CellValue) -> CellValue) {
        for record in &mut self.records {
            if let Some(cell) = record.cells.get_mut(column) {
                *cell = f(cell);
            }
        }
    }

    /// Append a column whose cells are all [`CellValue::Missing`] and return
    /// its index. The canonical name doubles as the source header.
    pub fn add_column(&mut self, name: &str) -> usize {
        self.columns.push(Column::new(name, name));
        for record in &mut self.records {
            record.cells.push(CellValue::Missing);
        }
        self.columns.len() - 1
    }
}

// ── Policies ──────────────────────────────────────────────────────────────────

/// What an edit does when several records share the `(township, plot_no)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Update only the first matching record in table order.
    FirstMatch,
    /// Update every matching record.
    #[default]
    AllMatches,
    /// Reject the edit.
    ErrorOnMultiple,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::FirstMatch => "first-match",
            DuplicatePolicy::AllMatches => "all-matches",
            DuplicatePolicy::ErrorOnMultiple => "error-on-multiple",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-match" => Ok(DuplicatePolicy::FirstMatch),
            "all-matches" => Ok(DuplicatePolicy::AllMatches),
            "error-on-multiple" => Ok(DuplicatePolicy::ErrorOnMultiple),
            other => Err(DashboardError::Config(format!(
                "unknown duplicate policy: {}",
                other
            ))),
        }
    }
}

/// What the store does with a local edit after the bulk write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistFailurePolicy {
    /// Re-fetch the source and discard the local edit.
    #[default]
    Reload,
    /// Keep the local edit; the store reports itself as diverged.
    Retain,
}

impl PersistFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistFailurePolicy::Reload => "reload",
            PersistFailurePolicy::Retain => "retain",
        }
    }
}

impl fmt::Display for PersistFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersistFailurePolicy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reload" => Ok(PersistFailurePolicy::Reload),
            "retain" => Ok(PersistFailurePolicy::Retain),
            other => Err(DashboardError::Config(format!(
                "unknown persist failure policy: {}",
                other
            ))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample_table() -> Table {
        Table::new(
            vec![
                Column::new("township_name", "Township Name"),
                Column::new("plot_no", "Plot No."),
            ],
            vec![
                Record::new(vec![text("Alpha"), text("A-1")]),
                Record::new(vec![text("Beta")]),
                Record::new(vec![text("Gamma"), text("G-1"), text("extra")]),
            ],
        )
    }

    #[test]
    fn test_table_pads_and_truncates_records() {
        let table = sample_table();
        assert!(table.records().iter().all(|r| r.cells().len() == 2));
        assert_eq!(table.value(1, "plot_no"), Some(&text("")));
        assert_eq!(table.value(2, "plot_no"), Some(&text("G-1")));
    }

    #[test]
    fn test_value_lookup_unknown_column() {
        let table = sample_table();
        assert_eq!(table.value(0, "rate"), None);
        assert_eq!(table.value(99, "plot_no"), None);
    }

    #[test]
    fn test_add_column_fills_missing() {
        let mut table = sample_table();
        let idx = table.add_column("buyer_name");
        assert_eq!(idx, 2);
        assert_eq!(table.columns()[2].source_header, "buyer_name");
        assert!(table.records().iter().all(|r| r.cells()[2].is_missing()));
    }

    #[test]
    fn test_set_value_out_of_range_is_ignored() {
        let mut table = sample_table();
        let before = table.clone();
        table.set_value(10, 0, text("x"));
        table.set_value(0, 10, text("x"));
        assert_eq!(table, before);
    }

    #[test]
    fn test_display_never_emits_non_finite_tokens() {
        assert_eq!(CellValue::Number(f64::NAN).to_string(), "");
        assert_eq!(CellValue::Number(f64::INFINITY).to_string(), "");
        assert_eq!(CellValue::Missing.to_string(), "");
    }

    #[test]
    fn test_display_numbers_and_dates() {
        assert_eq!(CellValue::Number(300.0).to_string(), "300");
        assert_eq!(CellValue::Number(1234.5).to_string(), "1234.5");
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(CellValue::Date(d).to_string(), "2024-03-07");
    }

    #[test]
    fn test_duplicate_policy_round_trip_names() {
        for policy in [
            DuplicatePolicy::FirstMatch,
            DuplicatePolicy::AllMatches,
            DuplicatePolicy::ErrorOnMultiple,
        ] {
            assert_eq!(policy.as_str().parse::<DuplicatePolicy>().unwrap(), policy);
        }
        assert!("sometimes".parse::<DuplicatePolicy>().is_err());
        assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::AllMatches);
    }

    #[test]
    fn test_persist_failure_policy_parse() {
        assert_eq!(
            "retain".parse::<PersistFailurePolicy>().unwrap(),
            PersistFailurePolicy::Retain
        );
        assert_eq!(PersistFailurePolicy::default(), PersistFailurePolicy::Reload);
        assert!("ignore".parse::<PersistFailurePolicy>().is_err());
    }
}

//! Serialization of a [`Table`] into the external sheet representation.

use township_core::models::Table;

/// A fully stringified sheet: header row plus data rows of equal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Stringify every cell for a full-sheet overwrite.
///
/// Missing cells become empty strings, numbers use their shortest round-trip
/// form, and dates are written as `YYYY-MM-DD`. The header row carries the
/// source header text so the sheet keeps its original layout.
pub fn serialize_table(table: &Table) -> SerializedTable {
    let header = table
        .columns()
        .iter()
        .map(|c| c.source_header.clone())
        .collect();
    let rows = table
        .records()
        .iter()
        .map(|r| r.cells().iter().map(|c| c.to_string()).collect())
        .collect();
    SerializedTable { header, rows }
}

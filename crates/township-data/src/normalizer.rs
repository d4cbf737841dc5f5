//! Header canonicalization and best-effort cell coercion.
//!
//! Turns a [`RawTable`] with arbitrary header casing and string cells into a
//! canonical [`Table`]. Coercion never fails: unparseable numeric and date
//! cells degrade to [`CellValue::Missing`].

use chrono::NaiveDate;
use tracing::debug;

pub use township_core::catalog::normalize_header;
use township_core::catalog::{DATE_COLUMNS, LEGACY_RENAMES, NUMERIC_COLUMNS};
use township_core::models::{CellValue, Column, Record, Table};

use crate::source::RawTable;

// ── Coerced ───────────────────────────────────────────────────────────────────

/// Result of a partial parse: either a value or the missing sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced<T> {
    Parsed(T),
    Missing,
}

impl<T> Coerced<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            Coerced::Parsed(v) => Some(v),
            Coerced::Missing => None,
        }
    }
}

/// Date layouts tried in order. Two-digit-year layouts come first because
/// `%Y` would otherwise accept `24` as the year 24. There is no `%y/%m/%d`,
/// so `25/12/24` stays day-first.
const DATE_FORMATS: [&str; 17] = [
    "%y-%m-%d",
    "%m/%d/%y",
    "%d/%m/%y",
    "%d-%b-%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Build the canonical column list for `headers`.
///
/// Applies [`LEGACY_RENAMES`] where the legacy key is present and the target
/// is not, then suffixes repeated keys with `_2`, `_3`, ….
pub fn canonical_columns(headers: &[String]) -> Vec<Column> {
    let mut names: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    for (legacy, target) in LEGACY_RENAMES {
        if names.iter().any(|n| n == target) {
            continue;
        }
        if let Some(pos) = names.iter().position(|n| n == legacy) {
            debug!("Renaming legacy column {} -> {}", legacy, target);
            names[pos] = target.to_string();
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    for (name, header) in names.into_iter().zip(headers) {
        let mut unique = name.clone();
        let mut n = 2;
        while columns.iter().any(|c| c.name == unique) {
            unique = format!("{}_{}", name, n);
            n += 1;
        }
        columns.push(Column::new(unique, header.clone()));
    }
    columns
}

/// Parse a numeric cell: trim, strip `,` thousands separators, parse `f64`.
/// Empty, non-numeric, and non-finite input is [`Coerced::Missing`].
pub fn coerce_number(raw: &str) -> Coerced<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Coerced::Missing;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Coerced::Parsed(v),
        _ => Coerced::Missing,
    }
}

/// Parse a date cell against [`DATE_FORMATS`]; a trailing time after an ISO
/// date (`2024-01-15 10:30:00`, `2024-01-15T10:30:00Z`) is ignored.
pub fn coerce_date(raw: &str) -> Coerced<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return Coerced::Missing;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Coerced::Parsed(d);
        }
    }

    if let Some((head, _)) = s.split_once(|c: char| c == ' ' || c == 'T') {
        for fmt in ["%y-%m-%d", "%Y-%m-%d", "%Y/%m/%d"] {
            if let Ok(d) = NaiveDate::parse_from_str(head, fmt) {
                return Coerced::Parsed(d);
            }
        }
    }

    Coerced::Missing
}

/// Normalize a raw sheet into a canonical [`Table`].
///
/// Catalog columns absent from the sheet are skipped; non-catalog columns
/// stay as text.
pub fn normalize(raw: &RawTable) -> Table {
    let columns = canonical_columns(&raw.headers);
    let records = raw
        .rows
        .iter()
        .map(|row| Record::new(row.iter().map(|c| CellValue::Text(c.clone())).collect()))
        .collect();
    let mut table = Table::new(columns, records);

    let mut degraded = 0usize;

    for name in NUMERIC_COLUMNS {
        let Some(idx) = table.column_index(name) else {
            continue;
        };
        table.map_column(idx, |cell| match cell {
            CellValue::Text(s) => match coerce_number(s) {
                Coerced::Parsed(v) => CellValue::Number(v),
                Coerced::Missing => {
                    degraded += 1;
                    CellValue::Missing
                }
            },
            other => other.clone(),
        });
    }

    for name in DATE_COLUMNS {
        let Some(idx) = table.column_index(name) else {
            continue;
        };
        table.map_column(idx, |cell| match cell {
            CellValue::Text(s) => match coerce_date(s) {
                Coerced::Parsed(d) => CellValue::Date(d),
                Coerced::Missing => {
                    degraded += 1;
                    CellValue::Missing
                }
            },
            other => other.clone(),
        });
    }

    debug!(
        "Normalized {} rows x {} columns ({} cells coerced to missing)",
        table.len(),
        table.columns().len(),
        degraded
    );

    table
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Column catalog: canonical column names, their semantic types, legacy
//! header renames, and the editable-field allow-list.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::DashboardError;
use crate::models::CellValue;

// ── Canonical column names ────────────────────────────────────────────────────

pub const TOWNSHIP_NAME: &str = "township_name";
pub const PLOT_NO: &str = "plot_no";
pub const OWNERSHIP: &str = "ownership";
pub const STATUS: &str = "status";
pub const REGISTRY_STATUS: &str = "registry_status";

pub const RATE: &str = "rate";
pub const AMOUNT_RECEIVED: &str = "amount_received";
pub const PLOT_PRICE: &str = "plot_price";
pub const RECEIVABLE: &str = "receivable";
pub const PLOT_SIZE_ACTUAL: &str = "plot_size_actual";
pub const REGISTRY_AMOUNT: &str = "registry_amount";

pub const REGISTRY_DATE: &str = "registry_date";

pub const REGISTRY_NUMBER: &str = "registry_number";
pub const BUYER_NAME: &str = "buyer_name";
pub const CONTACT_NUMBER: &str = "contact_number";
pub const CHEQUE_NUMBER: &str = "cheque_number";

/// Columns coerced to floating point on load.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    RATE,
    AMOUNT_RECEIVED,
    PLOT_PRICE,
    RECEIVABLE,
    PLOT_SIZE_ACTUAL,
    REGISTRY_AMOUNT,
];

/// Columns coerced to calendar dates on load.
pub const DATE_COLUMNS: [&str; 1] = [REGISTRY_DATE];

/// Canonical key for a header: trim, lowercase, then each space to `_`.
///
/// Idempotent: `normalize_header(normalize_header(h)) == normalize_header(h)`.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Legacy header keys (after header normalization) and their replacements.
/// A rename applies only when the legacy key is present.
pub const LEGACY_RENAMES: [(&str, &str); 4] = [
    ("plot_size_(sqft)_actual", PLOT_SIZE_ACTUAL),
    ("plot_size_(sqft)_tncp", "plot_size_tncp"),
    ("diff_(actual_-_tncp)", "diff_size"),
    ("plot_no.", PLOT_NO),
];

// ── ColumnKind ────────────────────────────────────────────────────────────────

/// Semantic type of a catalog column after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
    Date,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Date => "date",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of the column `name`. Anything outside the numeric and date catalog,
/// including unknown pass-through columns, is text.
pub fn column_kind(name: &str) -> ColumnKind {
    if NUMERIC_COLUMNS.contains(&name) {
        ColumnKind::Numeric
    } else if DATE_COLUMNS.contains(&name) {
        ColumnKind::Date
    } else {
        ColumnKind::Text
    }
}

// ── EditableField ─────────────────────────────────────────────────────────────

/// The fixed allow-list of fields an edit may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    Status,
    PlotSizeActual,
    Rate,
    PlotPrice,
    AmountReceived,
    RegistryStatus,
    RegistryDate,
    RegistryNumber,
    BuyerName,
    ContactNumber,
    ChequeNumber,
    RegistryAmount,
}

impl EditableField {
    /// Every editable field, in form order.
    pub const ALL: [EditableField; 12] = [
        EditableField::Status,
        EditableField::PlotSizeActual,
        EditableField::Rate,
        EditableField::PlotPrice,
        EditableField::AmountReceived,
        EditableField::RegistryStatus,
        EditableField::RegistryDate,
        EditableField::RegistryNumber,
        EditableField::BuyerName,
        EditableField::ContactNumber,
        EditableField::ChequeNumber,
        EditableField::RegistryAmount,
    ];

    /// Canonical column written by this field.
    pub fn column(&self) -> &'static str {
        match self {
            EditableField::Status => STATUS,
            EditableField::PlotSizeActual => PLOT_SIZE_ACTUAL,
            EditableField::Rate => RATE,
            EditableField::PlotPrice => PLOT_PRICE,
            EditableField::AmountReceived => AMOUNT_RECEIVED,
            EditableField::RegistryStatus => REGISTRY_STATUS,
            EditableField::RegistryDate => REGISTRY_DATE,
            EditableField::RegistryNumber => REGISTRY_NUMBER,
            EditableField::BuyerName => BUYER_NAME,
            EditableField::ContactNumber => CONTACT_NUMBER,
            EditableField::ChequeNumber => CHEQUE_NUMBER,
            EditableField::RegistryAmount => REGISTRY_AMOUNT,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        column_kind(self.column())
    }

    /// Human-readable label for forms.
    pub fn label(&self) -> &'static str {
        match self {
            EditableField::Status => "Status",
            EditableField::PlotSizeActual => "Plot Size (SQFT)",
            EditableField::Rate => "Rate",
            EditableField::PlotPrice => "Plot Price",
            EditableField::AmountReceived => "Amount Received",
            EditableField::RegistryStatus => "Registry Status",
            EditableField::RegistryDate => "Registry Date",
            EditableField::RegistryNumber => "Registry Number",
            EditableField::BuyerName => "Buyer Name",
            EditableField::ContactNumber => "Contact Number",
            EditableField::ChequeNumber => "Cheque Number",
            EditableField::RegistryAmount => "Registry Amount",
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for EditableField {
    type Err = DashboardError;

    /// Accepts the canonical column name, or any header spelling that
    /// normalizes to it (`"Buyer Name"`, `" BUYER NAME "`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_header(s);
        EditableField::ALL
            .into_iter()
            .find(|f| f.column() == key)
            .ok_or_else(|| DashboardError::UneditableField(s.to_string()))
    }
}

// ── EditValue ─────────────────────────────────────────────────────────────────

/// A typed value submitted for an [`EditableField`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl EditValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            EditValue::Number(_) => ColumnKind::Numeric,
            EditValue::Date(_) => ColumnKind::Date,
            EditValue::Text(_) => ColumnKind::Text,
        }
    }

    pub fn into_cell(self) -> CellValue {
        match self {
            EditValue::Number(n) => CellValue::Number(n),
            EditValue::Date(d) => CellValue::Date(d),
            EditValue::Text(s) => CellValue::Text(s),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

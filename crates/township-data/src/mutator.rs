//! Single-field plot edits.
//!
//! An edit is validated completely (field allow-list, value kind, key
//! matches) before the table is touched. Persisting the result is the
//! caller's job: serialize with [`crate::export::serialize_table`] and hand
//! the whole sheet to a [`crate::source::TableSource`].

use tracing::{debug, info};

use township_core::catalog::{ColumnKind, EditValue, EditableField, PLOT_NO, TOWNSHIP_NAME};
use township_core::models::{DuplicatePolicy, Table};
use township_core::{DashboardError, Result};

use crate::filter::facet_value;
use crate::normalizer::{coerce_date, coerce_number, Coerced};

// ── EditRequest ───────────────────────────────────────────────────────────────

/// One field-level edit addressed by `(township, plot_no)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub township: String,
    pub plot_no: String,
    pub field: EditableField,
    pub value: EditValue,
}

impl EditRequest {
    /// Build a request from user input. Fails with `UneditableField` for a
    /// field outside the allow-list and `InvalidValue` for unparseable input.
    pub fn parse(township: &str, plot_no: &str, field: &str, raw_value: &str) -> Result<Self> {
        let field: EditableField = field.parse()?;
        let value = parse_edit_value(field, raw_value)?;
        Ok(Self {
            township: township.to_string(),
            plot_no: plot_no.to_string(),
            field,
            value,
        })
    }
}

/// What an applied edit touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Row indices that received the new value.
    pub rows: Vec<usize>,
    /// `true` when the field's column had to be appended.
    pub column_added: bool,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Convert user input into a value of `field`'s kind.
///
/// Unlike load-time coercion there is no sentinel fallback: input that does
/// not parse is rejected.
pub fn parse_edit_value(field: EditableField, raw: &str) -> Result<EditValue> {
    let invalid = || DashboardError::InvalidValue {
        field: field.column().to_string(),
        value: raw.to_string(),
    };
    match field.kind() {
        ColumnKind::Numeric => match coerce_number(raw) {
            Coerced::Parsed(n) => Ok(EditValue::Number(n)),
            Coerced::Missing => Err(invalid()),
        },
        ColumnKind::Date => match coerce_date(raw) {
            Coerced::Parsed(d) => Ok(EditValue::Date(d)),
            Coerced::Missing => Err(invalid()),
        },
        ColumnKind::Text => Ok(EditValue::Text(raw.trim().to_string())),
    }
}

/// Rows whose township and plot number both equal the given key, in table
/// order.
pub fn matching_rows(table: &Table, township: &str, plot_no: &str) -> Vec<usize> {
    if !table.has_column(TOWNSHIP_NAME) || !table.has_column(PLOT_NO) {
        return Vec::new();
    }
    (0..table.len())
        .filter(|&row| {
            facet_value(table, row, TOWNSHIP_NAME) == township
                && facet_value(table, row, PLOT_NO) == plot_no
        })
        .collect()
}

/// Apply `request` to `table` under `policy`.
///
/// On error the table is unchanged.
pub fn apply_update(
    table: &mut Table,
    request: &EditRequest,
    policy: DuplicatePolicy,
) -> Result<UpdateReport> {
    let field = request.field;
    if request.value.kind() != field.kind() {
        return Err(DashboardError::TypeMismatch {
            field: field.column().to_string(),
            expected: field.kind().to_string(),
            actual: request.value.kind().to_string(),
        });
    }

    let matches = matching_rows(table, &request.township, &request.plot_no);
    let rows = match (matches.len(), policy) {
        (0, _) => {
            return Err(DashboardError::PlotNotFound {
                township: request.township.clone(),
                plot_no: request.plot_no.clone(),
            })
        }
        (1, _) | (_, DuplicatePolicy::AllMatches) => matches,
        (_, DuplicatePolicy::FirstMatch) => matches.into_iter().take(1).collect(),
        (count, DuplicatePolicy::ErrorOnMultiple) => {
            return Err(DashboardError::DuplicatePlots {
                township: request.township.clone(),
                plot_no: request.plot_no.clone(),
                count,
            })
        }
    };

    let (column, column_added) = match table.column_index(field.column()) {
        Some(idx) => (idx, false),
        None => {
            debug!("Appending missing column {}", field.column());
            (table.add_column(field.column()), true)
        }
    };

    for &row in &rows {
        table.set_value(row, column, request.value.clone().into_cell());
    }

    info!(
        "Updated {} of plot {} in {} ({} row(s), policy {})",
        field,
        request.plot_no,
        request.township,
        rows.len(),
        policy
    );

    Ok(UpdateReport { rows, column_added })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use township_core::models::CellValue;

    use crate::normalizer::normalize;
    use crate::source::decode_csv;

    fn load(csv: &str) -> Table {
        normalize(&decode_csv(csv.as_bytes(), "test").unwrap())
    }

    fn duplicate_sheet() -> Table {
        load(
            "Township Name,Plot No.,Status,Plot Price\n\
             Alpha,A-11,Open,100\n\
             Alpha,A-12,Open,200\n\
             Beta,A-12,Open,300\n\
             Alpha,A-12,Open,400\n",
        )
    }

    fn sold_a12() -> EditRequest {
        EditRequest::parse("Alpha", "A-12", "status", "Sold").unwrap()
    }

    fn statuses(table: &Table) -> Vec<String> {
        (0..table.len())
            .map(|r| facet_value(table, r, "status"))
            .collect()
    }

    // ── duplicate policies ────────────────────────────────────────────────────

    #[test]
    fn test_duplicate_key_all_matches_broadcasts() {
        let mut table = duplicate_sheet();
        let report = apply_update(&mut table, &sold_a12(), DuplicatePolicy::AllMatches).unwrap();
        assert_eq!(report.rows, vec![1, 3]);
        assert_eq!(statuses(&table), vec!["Open", "Sold", "Open", "Sold"]);
    }

    #[test]
    fn test_duplicate_key_first_match_updates_one() {
        let mut table = duplicate_sheet();
        let report = apply_update(&mut table, &sold_a12(), DuplicatePolicy::FirstMatch).unwrap();
        assert_eq!(report.rows, vec![1]);
        assert_eq!(statuses(&table), vec!["Open", "Sold", "Open", "Open"]);
    }

    #[test]
    fn test_duplicate_key_error_on_multiple_rejects() {
        let mut table = duplicate_sheet();
        let before = table.clone();
        let err = apply_update(&mut table, &sold_a12(), DuplicatePolicy::ErrorOnMultiple)
            .unwrap_err();
        assert!(matches!(err, DashboardError::DuplicatePlots { count: 2, .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_unique_key_ignores_policy() {
        let mut table = duplicate_sheet();
        let request = EditRequest::parse("Beta", "A-12", "status", "Sold").unwrap();
        let report =
            apply_update(&mut table, &request, DuplicatePolicy::ErrorOnMultiple).unwrap();
        assert_eq!(report.rows, vec![2]);
    }

    // ── validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_plot_is_not_found() {
        let mut table = duplicate_sheet();
        let request = EditRequest::parse("Alpha", "Z-9", "status", "Sold").unwrap();
        let err = apply_update(&mut table, &request, DuplicatePolicy::AllMatches).unwrap_err();
        assert!(matches!(err, DashboardError::PlotNotFound { .. }));
    }

    #[test]
    fn test_non_listed_field_rejected() {
        let err = EditRequest::parse("Alpha", "A-12", "township_name", "Gamma").unwrap_err();
        assert!(matches!(err, DashboardError::UneditableField(_)));
        assert!(err.is_validation());
    }

    #[test]
    fn test_type_mismatch_rejected_before_mutation() {
        let mut table = duplicate_sheet();
        let before = table.clone();
        let request = EditRequest {
            township: "Alpha".into(),
            plot_no: "A-11".into(),
            field: EditableField::PlotPrice,
            value: EditValue::Text("lots".into()),
        };
        let err = apply_update(&mut table, &request, DuplicatePolicy::AllMatches).unwrap_err();
        assert!(matches!(err, DashboardError::TypeMismatch { .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_parse_edit_value_is_strict() {
        assert_eq!(
            parse_edit_value(EditableField::PlotPrice, "1,234.50").unwrap(),
            EditValue::Number(1234.5)
        );
        assert!(matches!(
            parse_edit_value(EditableField::Rate, "N/A"),
            Err(DashboardError::InvalidValue { .. })
        ));
        assert_eq!(
            parse_edit_value(EditableField::RegistryDate, "2024-05-01").unwrap(),
            EditValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        );
        assert!(parse_edit_value(EditableField::RegistryDate, "someday").is_err());
    }

    #[test]
    fn test_numeric_looking_text_stays_text() {
        assert_eq!(
            parse_edit_value(EditableField::RegistryNumber, "004512").unwrap(),
            EditValue::Text("004512".into())
        );
    }

    // ── column handling ───────────────────────────────────────────────────────

    #[test]
    fn test_numeric_edit_writes_number() {
        let mut table = duplicate_sheet();
        let request = EditRequest::parse("Alpha", "A-11", "Plot Price", "150").unwrap();
        apply_update(&mut table, &request, DuplicatePolicy::AllMatches).unwrap();
        assert_eq!(table.value(0, "plot_price"), Some(&CellValue::Number(150.0)));
    }

    #[test]
    fn test_absent_column_is_appended() {
        let mut table = duplicate_sheet();
        let request = EditRequest::parse("Alpha", "A-11", "buyer_name", "R. Iyer").unwrap();
        let report = apply_update(&mut table, &request, DuplicatePolicy::AllMatches).unwrap();

        assert!(report.column_added);
        assert_eq!(table.value(0, "buyer_name"), Some(&CellValue::Text("R. Iyer".into())));
        assert_eq!(table.value(1, "buyer_name"), Some(&CellValue::Missing));
    }
}

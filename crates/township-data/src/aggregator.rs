//! Summary totals over a filtered plot view.

use township_core::catalog::{AMOUNT_RECEIVED, PLOT_PRICE, PLOT_SIZE_ACTUAL, RECEIVABLE};
use township_core::models::{CellValue, Table};

use crate::filter::{townships, FilterCriteria, FilteredView};

// ── MetricTotal ───────────────────────────────────────────────────────────────

/// Sum of one numeric column.
///
/// Non-numeric cells (the `Missing` sentinel, or stray text) are skipped and
/// counted rather than folded into the sum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricTotal {
    pub total: f64,
    /// `false` when the column does not exist in the table.
    pub available: bool,
    pub summed: usize,
    pub skipped: usize,
}

impl MetricTotal {
    /// The total, or `None` when the column is absent.
    pub fn value(&self) -> Option<f64> {
        self.available.then_some(self.total)
    }

    fn add_cell(&mut self, cell: &CellValue) {
        match cell {
            CellValue::Number(n) if n.is_finite() => {
                self.total += n;
                self.summed += 1;
            }
            _ => self.skipped += 1,
        }
    }
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// The four dashboard KPIs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// Sum of `plot_size_actual`.
    pub total_size: MetricTotal,
    /// Sum of `plot_price`.
    pub total_sales: MetricTotal,
    /// Sum of `amount_received`.
    pub total_received: MetricTotal,
    /// Sum of `receivable`.
    pub total_receivable: MetricTotal,
    pub plot_count: usize,
}

impl Summary {
    /// Share of sales already received, in percent. Zero when there are no
    /// sales.
    pub fn collection_percentage(&self) -> f64 {
        township_core::formatting::percentage(
            self.total_received.total,
            self.total_sales.total,
            1,
        )
    }

    /// Number of skipped cells across all four metrics.
    pub fn skipped_cells(&self) -> usize {
        self.total_size.skipped
            + self.total_sales.skipped
            + self.total_received.skipped
            + self.total_receivable.skipped
    }
}

/// Summary of one township under the full facet selection.
#[derive(Debug, Clone, PartialEq)]
pub struct TownshipSummary {
    pub township: String,
    pub summary: Summary,
}

// ── PlotAggregator ────────────────────────────────────────────────────────────

/// Stateless helper that sums the KPI columns.
pub struct PlotAggregator;

impl PlotAggregator {
    /// Sum the four KPI columns over `view`. An empty view yields zeros.
    pub fn summarize(view: &FilteredView<'_>) -> Summary {
        Summary {
            total_size: Self::sum_column(view, PLOT_SIZE_ACTUAL),
            total_sales: Self::sum_column(view, PLOT_PRICE),
            total_received: Self::sum_column(view, AMOUNT_RECEIVED),
            total_receivable: Self::sum_column(view, RECEIVABLE),
            plot_count: view.len(),
        }
    }

    /// NaN-ignoring sum of `column` over `view`.
    pub fn sum_column(view: &FilteredView<'_>, column: &str) -> MetricTotal {
        let Some(cells) = view.column_values(column) else {
            return MetricTotal::default();
        };
        let mut metric = MetricTotal {
            available: true,
            ..MetricTotal::default()
        };
        for cell in cells {
            metric.add_cell(cell);
        }
        metric
    }

    /// One summary per township, every facet selected, in first-appearance
    /// order.
    pub fn summarize_by_township(table: &Table) -> Vec<TownshipSummary> {
        townships(table)
            .into_iter()
            .map(|township| {
                let criteria = FilterCriteria::all_for(table, &township);
                let summary = Self::summarize(&crate::filter::filter(table, &criteria));
                TownshipSummary { township, summary }
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

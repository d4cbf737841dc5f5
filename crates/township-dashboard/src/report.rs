//! Plain-text output for the headless `summary` and `update` views.

use township_core::formatting::format_metric;
use township_core::models::Table;
use township_data::aggregator::{PlotAggregator, Summary, TownshipSummary};
use township_data::filter::Facet;
use township_data::mutator::UpdateReport;
use township_runtime::dashboard::DashboardState;

/// Facet values requested on the command line. An empty list keeps every
/// option of that facet.
pub type Restrictions<'a> = [(Facet, &'a [String]); 3];

/// Summaries for `township` (or every township when `None`) with the
/// facet restrictions applied.
pub fn summaries(
    table: &Table,
    township: Option<&str>,
    restrictions: &Restrictions<'_>,
) -> anyhow::Result<Vec<TownshipSummary>> {
    let unrestricted = restrictions.iter().all(|(_, values)| values.is_empty());
    if township.is_none() && unrestricted {
        return Ok(PlotAggregator::summarize_by_township(table));
    }

    let names: Vec<String> = match township {
        Some(name) => {
            let state = DashboardState::new(table, Some(name));
            if state.township() != Some(name) {
                anyhow::bail!("township {:?} not found in the sheet", name);
            }
            vec![name.to_string()]
        }
        None => DashboardState::new(table, None).townships().to_vec(),
    };

    Ok(names
        .into_iter()
        .map(|name| {
            let mut state = DashboardState::new(table, Some(&name));
            for (facet, values) in restrictions {
                state.restrict(*facet, values);
            }
            TownshipSummary {
                township: name,
                summary: state.summary(table),
            }
        })
        .collect())
}

fn metric_line(label: &str, value: String) -> String {
    format!("  {:<20}{:>22}", label, value)
}

/// One block of text per township.
pub fn format_summary(entry: &TownshipSummary) -> String {
    let Summary {
        total_size,
        total_sales,
        total_received,
        total_receivable,
        plot_count,
    } = entry.summary;

    let mut lines = vec![
        format!("{} ({} plots)", entry.township, plot_count),
        metric_line("Total Size (SQFT)", format_metric(total_size.value(), 0)),
        metric_line("Total Sales", format_metric(total_sales.value(), 2)),
        metric_line("Total Received", format_metric(total_received.value(), 2)),
        metric_line("Total Receivable", format_metric(total_receivable.value(), 2)),
        metric_line(
            "Collected",
            format!("{:.1}%", entry.summary.collection_percentage()),
        ),
    ];
    let skipped = entry.summary.skipped_cells();
    if skipped > 0 {
        lines.push(metric_line("Blank/invalid cells", skipped.to_string()));
    }
    lines.join("\n")
}

/// Confirmation printed after a successful `update`.
pub fn format_update(plot_no: &str, field: &str, report: &UpdateReport) -> String {
    let mut text = format!(
        "Updated {} on plot {} ({} row(s))",
        field,
        plot_no,
        report.rows.len()
    );
    if report.column_added {
        text.push_str(&format!("; added column {}", field));
    }
    text
}

// ── Tests ──────────────────────────────────────────────────────────────────────

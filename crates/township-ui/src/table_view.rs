//! The plot table for the current filtered view.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per matching
//! plot, numeric columns right-aligned with thousands separators.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use township_core::catalog::{column_kind, ColumnKind, PLOT_SIZE_ACTUAL, STATUS};
use township_core::formatting::format_number;
use township_core::models::{CellValue, Column};
use township_data::filter::FilteredView;

use crate::themes::Theme;

const MAX_COLUMN_WIDTH: u16 = 18;

/// Width of `column`: its header, at least wide enough for the values of
/// its kind, at most [`MAX_COLUMN_WIDTH`].
pub fn column_width(column: &Column) -> u16 {
    let floor = match column_kind(&column.name) {
        ColumnKind::Numeric if column.name == PLOT_SIZE_ACTUAL => 9,
        ColumnKind::Numeric => 13,
        ColumnKind::Date => 10,
        ColumnKind::Text => 6,
    };
    (column.source_header.width() as u16)
        .max(floor)
        .min(MAX_COLUMN_WIDTH)
}

/// Cut `text` to at most `width` display columns, ending in `…` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Display text of one cell. Numbers get thousands separators; absent
/// values render as `-`.
pub fn display_cell(column: &str, cell: Option<&CellValue>) -> String {
    match cell {
        None | Some(CellValue::Missing) => "-".to_string(),
        Some(CellValue::Number(n)) => {
            let decimals = if column == PLOT_SIZE_ACTUAL { 0 } else { 2 };
            format_number(*n, decimals)
        }
        Some(other) => other.to_string(),
    }
}

fn right_align(text: String, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{}{}", " ".repeat(pad), text)
}

/// Render `columns` of the table. `selected` is a position within `view`.
pub fn render_plot_table(
    frame: &mut Frame,
    area: Rect,
    view: &FilteredView<'_>,
    columns: &[&Column],
    selected: Option<usize>,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border(focused))
        .title(format!(" Plots ({}) ", view.len()));

    if columns.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No columns selected. Press 'c' to choose columns.",
                theme.warning,
            )))
            .block(block),
            area,
        );
        return;
    }

    let widths: Vec<u16> = columns.iter().map(|c| column_width(c)).collect();

    let header = Row::new(
        columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| Cell::from(truncate(&c.source_header, *w as usize)).style(theme.table_header)),
    )
    .height(1);

    // Only the rows that fit are built.
    let visible = area.height.saturating_sub(3) as usize;
    let offset = match selected {
        Some(s) if visible > 0 && s >= visible => s + 1 - visible,
        _ => 0,
    };

    let table = view.table();
    let rows: Vec<Row> = view
        .rows()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible.max(1))
        .map(|(i, &row)| {
            let style = if selected == Some(i) && focused {
                theme.table_selected
            } else if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let cells = columns.iter().zip(&widths).map(|(column, width)| {
                let name = column.name.as_str();
                let text = truncate(&display_cell(name, table.value(row, name)), *width as usize);
                let cell = if column_kind(name) == ColumnKind::Numeric {
                    Cell::from(right_align(text, *width as usize))
                } else {
                    Cell::from(text)
                };
                if name == STATUS && selected != Some(i) {
                    let status = table
                        .value(row, STATUS)
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    cell.style(theme.status_style(&status))
                } else {
                    cell
                }
            });
            Row::new(cells).style(style)
        })
        .collect();

    let widget = Table::new(rows, widths.into_iter().map(Constraint::Length))
        .header(header)
        .block(block)
        .style(theme.text);

    frame.render_widget(widget, area);
}

/// Placeholder when the selection matches nothing.
pub fn render_no_plots(frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No plots match the current filters", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Tick at least one value in every facet, or press 'a' to select all.",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border(focused))
                .title(" Plots (0) "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

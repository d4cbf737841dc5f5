//! Full record of the selected plot: every column, whatever the table
//! shows.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use township_core::catalog::PLOT_NO;
use township_core::models::Table;

use crate::table_view::{display_cell, truncate};
use crate::themes::Theme;

const LABEL_WIDTH: usize = 18;

/// `Label ........ value`, one line per column of `row`.
pub fn detail_lines<'a>(table: &Table, row: usize, theme: &'a Theme) -> Vec<Line<'a>> {
    table
        .columns()
        .iter()
        .map(|column| {
            let label = truncate(&column.source_header, LABEL_WIDTH);
            let pad = LABEL_WIDTH.saturating_sub(label.width()) + 1;
            Line::from(vec![
                Span::styled(format!("{}{}", label, " ".repeat(pad)), theme.label),
                Span::styled(
                    display_cell(&column.name, table.value(row, &column.name)),
                    theme.value,
                ),
            ])
        })
        .collect()
}

pub fn render_plot_detail(
    frame: &mut Frame,
    area: Rect,
    table: &Table,
    row: Option<usize>,
    theme: &Theme,
) {
    let (title, lines) = match row {
        Some(row) => {
            let plot = table
                .value(row, PLOT_NO)
                .map(|v| v.to_string())
                .unwrap_or_default();
            (format!(" Plot {} ", plot), detail_lines(table, row, theme))
        }
        None => (
            " Plot Details ".to_string(),
            vec![Line::from(Span::styled("No plot selected", theme.dim))],
        ),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(title);
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use township_data::normalizer::normalize;
    use township_data::source::decode_csv;

    const SHEET: &str = "\
Township Name,Plot No.,Rate,Registry Amount,Cheque Number,Plot Size (SQFT) TNCP,Facing
Alpha,A-1,\"2,500\",,CH-7,1180,East
";

    fn table() -> Table {
        normalize(&decode_csv(SHEET.as_bytes(), "test").unwrap())
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_detail_lists_every_column() {
        let table = table();
        let theme = Theme::dark();
        let lines = detail_lines(&table, 0, &theme);
        assert_eq!(lines.len(), table.columns().len());

        let rendered: Vec<String> = lines.iter().map(text).collect();
        assert!(rendered[2].starts_with("Rate "));
        assert!(rendered[2].ends_with("2,500.00"));
        // Blank numeric cell.
        assert!(rendered[3].ends_with(" -"));
        assert!(rendered[4].ends_with("CH-7"));
        assert!(rendered[6].ends_with("East"));
    }

    #[test]
    fn test_labels_are_aligned() {
        let table = table();
        let theme = Theme::dark();
        for line in detail_lines(&table, 0, &theme) {
            assert_eq!(line.spans[0].content.width(), LABEL_WIDTH + 1);
        }
    }

    #[test]
    fn test_render_plot_detail() {
        let table = table();
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|frame| render_plot_detail(frame, frame.area(), &table, Some(0), &theme))
            .unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("Plot A-1"));
        assert!(rendered.contains("Cheque Number"));
        assert!(rendered.contains("CH-7"));
    }

    #[test]
    fn test_render_without_selection_does_not_panic() {
        let table = table();
        let theme = Theme::light();
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        terminal
            .draw(|frame| render_plot_detail(frame, frame.area(), &table, None, &theme))
            .unwrap();
    }
}

//! Township selector and the three facet checklists.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use township_data::filter::Facet;
use township_runtime::dashboard::DashboardState;

use crate::app::Focus;
use crate::themes::Theme;

/// Label shown for the empty facet value.
pub const BLANK_LABEL: &str = "(blank)";

/// Index of `facet` in [`Facet::ALL`].
pub fn facet_slot(facet: Facet) -> usize {
    Facet::ALL.iter().position(|f| *f == facet).unwrap_or(0)
}

/// `◀ Alpha ▶  (1/3)`
pub fn township_line<'a>(state: &DashboardState, theme: &'a Theme) -> Line<'a> {
    let Some(current) = state.township() else {
        return Line::from(Span::styled("No townships", theme.warning));
    };
    let position = state
        .townships()
        .iter()
        .position(|t| t == current)
        .map(|i| i + 1)
        .unwrap_or(0);
    Line::from(vec![
        Span::styled("◀ ", theme.dim),
        Span::styled(current.to_string(), theme.value),
        Span::styled(" ▶", theme.dim),
        Span::styled(
            format!("  ({}/{})", position, state.townships().len()),
            theme.dim,
        ),
    ])
}

/// One checkbox line per option of `facet`. `cursor` highlights a line.
pub fn facet_lines<'a>(
    state: &DashboardState,
    facet: Facet,
    cursor: Option<usize>,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    state
        .options()
        .get(facet)
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let selected = state.is_selected(facet, value);
            let (mark, mark_style) = if selected {
                ("[x] ", theme.checkbox_on)
            } else {
                ("[ ] ", theme.checkbox_off)
            };
            let label = if value.is_empty() {
                BLANK_LABEL.to_string()
            } else {
                value.clone()
            };
            let label_style = if cursor == Some(i) {
                theme.cursor
            } else if selected {
                theme.text
            } else {
                theme.dim
            };
            Line::from(vec![
                Span::styled(mark, mark_style),
                Span::styled(label, label_style),
            ])
        })
        .collect()
}

/// Render the sidebar. `cursors` holds one cursor per facet, in
/// [`Facet::ALL`] order.
pub fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    state: &DashboardState,
    focus: Focus,
    cursors: &[usize; 3],
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let township_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border(focus == Focus::Township))
        .title(" Township ");
    frame.render_widget(
        Paragraph::new(township_line(state, theme)).block(township_block),
        chunks[0],
    );

    for (facet, chunk) in Facet::ALL.iter().zip(chunks.iter().skip(1)) {
        let focused = focus == Focus::Facet(*facet);
        let cursor = cursors[facet_slot(*facet)];
        let lines = facet_lines(state, *facet, focused.then_some(cursor), theme);

        let selected = state.criteria().selection(*facet).len();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.panel_border(focused))
            .title(format!(" {} ({}/{}) ", facet.label(), selected, lines.len()));

        // Keep the cursor visible inside the block.
        let visible = chunk.height.saturating_sub(2) as usize;
        let offset = if visible > 0 && cursor >= visible {
            cursor + 1 - visible
        } else {
            0
        };
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .block(block)
                .scroll((offset as u16, 0)),
            *chunk,
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use township_core::models::Table;
    use township_data::normalizer::normalize;
    use township_data::source::decode_csv;

    fn table() -> Table {
        normalize(
            &decode_csv(
                b"Township Name,Plot No.,Ownership,Status,Registry Status\n\
                  Alpha,A-1,Company,Sold,Done\n\
                  Alpha,A-2,Partner,Open,\n\
                  Beta,B-1,Company,Open,Done\n",
                "test",
            )
            .unwrap(),
        )
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_township_line() {
        let table = table();
        let theme = Theme::dark();
        let state = DashboardState::new(&table, Some("Beta"));
        assert_eq!(text(&township_line(&state, &theme)), "◀ Beta ▶  (2/2)");
    }

    #[test]
    fn test_facet_lines_marks_selection_and_blank() {
        let table = table();
        let theme = Theme::dark();
        let mut state = DashboardState::new(&table, None);
        state.toggle(Facet::Ownership, "Partner");

        let owners: Vec<String> = facet_lines(&state, Facet::Ownership, None, &theme)
            .iter()
            .map(text)
            .collect();
        assert_eq!(owners, vec!["[x] Company", "[ ] Partner"]);

        let registry: Vec<String> = facet_lines(&state, Facet::RegistryStatus, None, &theme)
            .iter()
            .map(text)
            .collect();
        assert_eq!(registry, vec!["[x] Done", "[x] (blank)"]);
    }

    #[test]
    fn test_cursor_line_uses_cursor_style() {
        let table = table();
        let theme = Theme::dark();
        let state = DashboardState::new(&table, None);
        let lines = facet_lines(&state, Facet::Status, Some(1), &theme);
        assert_eq!(lines[1].spans[1].style, theme.cursor);
        assert_ne!(lines[0].spans[1].style, theme.cursor);
    }

    #[test]
    fn test_facet_slot_order() {
        assert_eq!(facet_slot(Facet::Ownership), 0);
        assert_eq!(facet_slot(Facet::RegistryStatus), 2);
    }

    #[test]
    fn test_render_sidebar_does_not_panic() {
        let table = table();
        let theme = Theme::dark();
        let state = DashboardState::new(&table, None);
        let mut terminal = Terminal::new(TestBackend::new(30, 20)).unwrap();
        terminal
            .draw(|frame| {
                render_sidebar(
                    frame,
                    frame.area(),
                    &state,
                    Focus::Facet(Facet::Status),
                    &[0, 5, 0],
                    &theme,
                )
            })
            .unwrap();
    }
}

//! Which table columns the plot table shows.
//!
//! The chooser stores the *hidden* columns, so every column is visible by
//! default and a column that first appears after a reload shows up too.

use std::collections::HashSet;

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use township_core::models::{Column, Table};

use super::popup_area;
use crate::themes::Theme;

#[derive(Debug, Clone, Default)]
pub struct ColumnChooser {
    hidden: HashSet<String>,
    pub cursor: usize,
    pub open: bool,
}

impl ColumnChooser {
    pub fn is_visible(&self, name: &str) -> bool {
        !self.hidden.contains(name)
    }

    /// Visible columns in table order.
    pub fn visible<'a>(&self, table: &'a Table) -> Vec<&'a Column> {
        table
            .columns()
            .iter()
            .filter(|c| self.is_visible(&c.name))
            .collect()
    }

    pub fn toggle(&mut self, name: &str) {
        if !self.hidden.remove(name) {
            self.hidden.insert(name.to_string());
        }
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    pub fn toggle_at_cursor(&mut self, table: &Table) {
        if let Some(column) = table.columns().get(self.cursor) {
            self.toggle(&column.name);
        }
    }

    pub fn move_cursor(&mut self, table: &Table, step: isize) {
        let len = table.columns().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + step).clamp(0, len as isize - 1) as usize;
    }

    /// Keep the cursor inside the current column list.
    pub fn clamp(&mut self, table: &Table) {
        self.cursor = self.cursor.min(table.columns().len().saturating_sub(1));
    }

    pub fn to_lines<'a>(&self, table: &Table, theme: &'a Theme) -> Vec<Line<'a>> {
        table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let visible = self.is_visible(&column.name);
                let (mark, mark_style) = if visible {
                    ("[x] ", theme.checkbox_on)
                } else {
                    ("[ ] ", theme.checkbox_off)
                };
                let label_style = if i == self.cursor {
                    theme.cursor
                } else if visible {
                    theme.text
                } else {
                    theme.dim
                };
                Line::from(vec![
                    Span::styled(mark, mark_style),
                    Span::styled(column.source_header.clone(), label_style),
                ])
            })
            .collect()
    }
}

/// Render the chooser as a popup centred in `area`.
pub fn render_column_chooser(
    frame: &mut Frame,
    area: Rect,
    chooser: &ColumnChooser,
    table: &Table,
    theme: &Theme,
) {
    let mut lines = chooser.to_lines(table, theme);
    let shown = chooser.visible(table).len();
    let title = format!(" Columns ({}/{}) ", shown, lines.len());
    let hint = "Space show/hide  a all  Esc close";

    let content_width = lines
        .iter()
        .map(|l| l.width())
        .chain([title.width(), hint.width()])
        .max()
        .unwrap_or(0);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(hint, theme.dim)));

    let popup = popup_area(area, content_width as u16 + 4, lines.len() as u16 + 2);

    let visible = popup.height.saturating_sub(4) as usize;
    let offset = if visible > 0 && chooser.cursor >= visible {
        chooser.cursor + 1 - visible
    } else {
        0
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.focus_border)
        .title(title);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .scroll((offset as u16, 0)),
        popup,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────

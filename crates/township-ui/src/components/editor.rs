//! Modal form for editing one field of the selected plot.
//!
//! The form has two stages: pick a field from the allow-list, then type the
//! new value. Submitting builds an [`EditRequest`]; parsing errors surface
//! before anything reaches the store.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use township_core::catalog::{ColumnKind, EditableField};
use township_core::Result;
use township_data::mutator::EditRequest;

use super::popup_area;
use crate::themes::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStage {
    SelectField,
    EnterValue,
}

#[derive(Debug, Clone)]
pub struct EditorForm {
    pub township: String,
    pub plot_no: String,
    pub field_index: usize,
    pub stage: EditStage,
    pub input: String,
}

impl EditorForm {
    pub fn new(township: impl Into<String>, plot_no: impl Into<String>) -> Self {
        Self {
            township: township.into(),
            plot_no: plot_no.into(),
            field_index: 0,
            stage: EditStage::SelectField,
            input: String::new(),
        }
    }

    pub fn field(&self) -> EditableField {
        EditableField::ALL[self.field_index % EditableField::ALL.len()]
    }

    pub fn move_field(&mut self, step: isize) {
        let len = EditableField::ALL.len() as isize;
        self.field_index = (self.field_index as isize + step).rem_euclid(len) as usize;
    }

    /// Switch to value entry, pre-filled with `current`.
    pub fn begin_value(&mut self, current: &str) {
        self.stage = EditStage::EnterValue;
        self.input = current.to_string();
    }

    /// Return to field selection. `false` when already there.
    pub fn back(&mut self) -> bool {
        if self.stage == EditStage::EnterValue {
            self.stage = EditStage::SelectField;
            self.input.clear();
            true
        } else {
            false
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn to_request(&self) -> Result<EditRequest> {
        EditRequest::parse(
            &self.township,
            &self.plot_no,
            self.field().column(),
            &self.input,
        )
    }

    pub fn to_lines<'a>(&self, theme: &'a Theme) -> Vec<Line<'a>> {
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Plot ", theme.label),
                Span::styled(self.plot_no.clone(), theme.value),
                Span::styled(" in ", theme.label),
                Span::styled(self.township.clone(), theme.value),
            ]),
            Line::from(""),
        ];

        match self.stage {
            EditStage::SelectField => {
                for (i, field) in EditableField::ALL.iter().enumerate() {
                    let style = if i == self.field_index {
                        theme.cursor
                    } else {
                        theme.text
                    };
                    lines.push(Line::from(vec![
                        Span::styled(format!("{:<18}", field.label()), style),
                        Span::styled(format!(" {}", kind_hint(field.kind())), theme.dim),
                    ]));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "↑↓ choose  Enter select  Esc cancel",
                    theme.dim,
                )));
            }
            EditStage::EnterValue => {
                let field = self.field();
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", field.label()), theme.label),
                    Span::styled(self.input.clone(), theme.value),
                    Span::styled("█", theme.info),
                ]));
                lines.push(Line::from(Span::styled(kind_hint(field.kind()), theme.dim)));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Enter save  Esc back",
                    theme.dim,
                )));
            }
        }
        lines
    }
}

fn kind_hint(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Numeric => "number",
        ColumnKind::Date => "date (YYYY-MM-DD)",
        ColumnKind::Text => "text",
    }
}

/// Render the form as a popup centred in `area`.
pub fn render_editor(frame: &mut Frame, area: Rect, form: &EditorForm, theme: &Theme) {
    let lines = form.to_lines(theme);
    let content_width = lines.iter().map(|l| l.width()).max().unwrap_or(0);
    let title = format!(" Edit plot {} ", form.plot_no);

    let popup = popup_area(
        area,
        content_width.max(title.width()) as u16 + 4,
        lines.len() as u16 + 2,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.focus_border)
        .title(title);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), popup);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use chrono::{DateTime, Local};
use ratatui::text::{Line, Span};

use crate::themes::Theme;

pub const TITLE: &str = "TOWNSHIP PLOT DASHBOARD";

/// Three-line dashboard header:
///
/// 1. Title.
/// 2. A 60-column `=` separator.
/// 3. `[ source | township | loaded HH:MM:SS ]`, plus a divergence warning
///    when the local table holds an unsaved edit.
pub struct Header<'a> {
    pub source: &'a str,
    pub township: Option<&'a str>,
    pub loaded_at: DateTime<Local>,
    pub diverged: bool,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        source: &'a str,
        township: Option<&'a str>,
        loaded_at: DateTime<Local>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            source,
            township,
            loaded_at,
            diverged: false,
            theme,
        }
    }

    pub fn diverged(mut self, diverged: bool) -> Self {
        self.diverged = diverged;
        self
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.source.to_string(), self.theme.value),
            Span::styled(" | ", self.theme.label),
            Span::styled(
                self.township.unwrap_or("no township").to_string(),
                self.theme.value,
            ),
            Span::styled(" | ", self.theme.label),
            Span::styled(
                format!("loaded {}", self.loaded_at.format("%H:%M:%S")),
                self.theme.dim,
            ),
            Span::styled(" ]", self.theme.label),
        ];
        if self.diverged {
            info.push(Span::styled("  ⚠ unsaved local edit", self.theme.warning));
        }

        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(info),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

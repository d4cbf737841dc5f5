//! Main application state and TUI event loop for the Township Dashboard.
//!
//! [`App`] owns the [`Store`], the cascading filter selection and all
//! panel cursors. Key handling is synchronous and returns a [`Command`];
//! commands that touch the source (reload, save) are awaited by the loop.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};

use township_data::filter::{facet_value, Facet};
use township_data::mutator::EditRequest;
use township_core::catalog::{PLOT_NO, TOWNSHIP_NAME};
use township_runtime::dashboard::DashboardState;
use township_runtime::store::Store;

use crate::components::columns::{render_column_chooser, ColumnChooser};
use crate::components::detail::render_plot_detail;
use crate::components::editor::{render_editor, EditStage, EditorForm};
use crate::components::header::Header;
use crate::components::kpi::render_kpis;
use crate::components::sidebar::{facet_slot, render_sidebar};
use crate::table_view::{render_no_plots, render_plot_table};
use crate::themes::Theme;

const SIDEBAR_WIDTH: u16 = 32;
const DETAIL_WIDTH: u16 = 42;

// ── Focus ─────────────────────────────────────────────────────────────────────

/// Which panel receives arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Township,
    Facet(Facet),
    Table,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Township,
        Focus::Facet(Facet::Ownership),
        Focus::Facet(Facet::Status),
        Focus::Facet(Facet::RegistryStatus),
        Focus::Table,
    ];

    fn step(self, step: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let current = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(current + step).rem_euclid(len) as usize]
    }
}

// ── Command / StatusMessage ───────────────────────────────────────────────────

/// Work requested by a key press that needs the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    Quit,
    Reload,
    Submit(EditRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub store: Store,
    pub state: DashboardState,
    pub focus: Focus,
    /// One cursor per facet, in [`Facet::ALL`] order.
    pub facet_cursors: [usize; 3],
    /// Position within the filtered view.
    pub table_cursor: usize,
    pub columns: ColumnChooser,
    pub editor: Option<EditorForm>,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, store: Store, township: Option<&str>) -> Self {
        let state = DashboardState::new(store.table(), township);
        Self {
            theme: Theme::from_name(theme_name),
            store,
            state,
            focus: Focus::Township,
            facet_cursors: [0; 3],
            table_cursor: 0,
            columns: ColumnChooser::default(),
            editor: None,
            status: None,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q` / `Ctrl+C`.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        let command = self.handle_key(key);
                        self.execute(command).await;
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Carry out a [`Command`] against the store.
    pub async fn execute(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::Quit => self.should_quit = true,
            Command::Reload => {
                tracing::debug!("manual reload");
                self.status = Some(match self.store.reload().await {
                    Ok(()) => StatusMessage::new(
                        StatusLevel::Info,
                        format!("Reloaded {} plots", self.store.table().len()),
                    ),
                    Err(e) => StatusMessage::new(StatusLevel::Error, e.to_string()),
                });
                self.after_table_change();
            }
            Command::Submit(request) => {
                let result = self.store.apply_edit(&request).await;
                self.status = Some(match result {
                    Ok(report) => {
                        self.editor = None;
                        StatusMessage::new(
                            StatusLevel::Success,
                            format!(
                                "Saved {} for plot {} ({} row(s))",
                                request.field.label(),
                                request.plot_no,
                                report.rows.len()
                            ),
                        )
                    }
                    Err(e) if e.is_validation() => {
                        tracing::debug!(error = %e, "edit rejected");
                        StatusMessage::new(StatusLevel::Error, e.to_string())
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "edit not saved");
                        self.editor = None;
                        let suffix = if self.store.is_diverged() {
                            " (local edit kept, not saved)"
                        } else {
                            " (reloaded from source)"
                        };
                        StatusMessage::new(StatusLevel::Error, format!("{}{}", e, suffix))
                    }
                });
                self.after_table_change();
            }
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Command::Quit;
        }
        if self.editor.is_some() {
            return self.handle_editor_key(key);
        }
        if self.columns.open {
            self.handle_chooser_key(key);
            return Command::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Command::Quit,
            KeyCode::Char('r') => return Command::Reload,
            KeyCode::Tab => self.focus = self.focus.step(1),
            KeyCode::BackTab => self.focus = self.focus.step(-1),
            KeyCode::Left => self.change_township(-1),
            KeyCode::Right => self.change_township(1),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('a') => self.select_focused(true),
            KeyCode::Char('n') => self.select_focused(false),
            KeyCode::Char('c') => {
                self.columns.clamp(self.store.table());
                self.columns.open = true;
            }
            KeyCode::Char('e') => self.open_editor(),
            KeyCode::Enter if self.focus == Focus::Table => self.open_editor(),
            _ => {}
        }
        Command::None
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Command {
        let Some(form) = self.editor.as_mut() else {
            return Command::None;
        };
        match (form.stage, key.code) {
            (_, KeyCode::Esc) => {
                if !form.back() {
                    self.editor = None;
                }
            }
            (EditStage::SelectField, KeyCode::Up) => form.move_field(-1),
            (EditStage::SelectField, KeyCode::Down) => form.move_field(1),
            (EditStage::SelectField, KeyCode::Enter) => {
                let column = form.field().column();
                let current = self.current_value(column);
                if let Some(form) = self.editor.as_mut() {
                    form.begin_value(&current);
                }
            }
            (EditStage::EnterValue, KeyCode::Enter) => match form.to_request() {
                Ok(request) => return Command::Submit(request),
                Err(e) => {
                    self.status = Some(StatusMessage::new(StatusLevel::Error, e.to_string()));
                }
            },
            (EditStage::EnterValue, KeyCode::Backspace) => form.pop_char(),
            (EditStage::EnterValue, KeyCode::Char(c)) => form.push_char(c),
            _ => {}
        }
        Command::None
    }

    fn handle_chooser_key(&mut self, key: KeyEvent) {
        let table = self.store.table();
        match key.code {
            KeyCode::Up => self.columns.move_cursor(table, -1),
            KeyCode::Down => self.columns.move_cursor(table, 1),
            KeyCode::Char(' ') => self.columns.toggle_at_cursor(table),
            KeyCode::Char('a') => self.columns.show_all(),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('c') => self.columns.open = false,
            _ => {}
        }
    }

    // ── State helpers ─────────────────────────────────────────────────────────

    fn change_township(&mut self, step: isize) {
        self.state.cycle_township(self.store.table(), step);
        self.facet_cursors = [0; 3];
        self.table_cursor = 0;
    }

    fn move_cursor(&mut self, step: isize) {
        let (cursor, len) = match self.focus {
            Focus::Township => {
                self.change_township(step);
                return;
            }
            Focus::Facet(facet) => (
                &mut self.facet_cursors[facet_slot(facet)],
                self.state.options().get(facet).len(),
            ),
            Focus::Table => (&mut self.table_cursor, self.state.view(self.store.table()).len()),
        };
        if len == 0 {
            *cursor = 0;
        } else {
            *cursor = (*cursor as isize + step).clamp(0, len as isize - 1) as usize;
        }
    }

    fn toggle_current(&mut self) {
        if let Focus::Facet(facet) = self.focus {
            let cursor = self.facet_cursors[facet_slot(facet)];
            if let Some(value) = self.state.options().get(facet).get(cursor).cloned() {
                self.state.toggle(facet, &value);
                self.clamp_table_cursor();
            }
        }
    }

    fn select_focused(&mut self, all: bool) {
        if let Focus::Facet(facet) = self.focus {
            if all {
                self.state.select_all(facet);
            } else {
                self.state.select_none(facet);
            }
            self.clamp_table_cursor();
        }
    }

    /// Table row of the plot under the table cursor.
    fn selected_row(&self) -> Option<usize> {
        self.state
            .view(self.store.table())
            .rows()
            .get(self.table_cursor)
            .copied()
    }

    fn current_value(&self, column: &str) -> String {
        self.selected_row()
            .map(|row| facet_value(self.store.table(), row, column))
            .unwrap_or_default()
    }

    fn open_editor(&mut self) {
        if !self.store.is_writable() {
            self.status = Some(StatusMessage::new(
                StatusLevel::Error,
                format!("{} is read-only", self.store.source_name()),
            ));
            return;
        }
        let Some(row) = self.selected_row() else {
            self.status = Some(StatusMessage::new(StatusLevel::Info, "No plot selected"));
            return;
        };
        let table = self.store.table();
        self.editor = Some(EditorForm::new(
            facet_value(table, row, TOWNSHIP_NAME),
            facet_value(table, row, PLOT_NO),
        ));
    }

    fn after_table_change(&mut self) {
        self.state.refresh(self.store.table());
        for facet in Facet::ALL {
            let len = self.state.options().get(facet).len();
            let cursor = &mut self.facet_cursors[facet_slot(facet)];
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
        self.columns.clamp(self.store.table());
        self.clamp_table_cursor();
    }

    fn clamp_table_cursor(&mut self) {
        let len = self.state.view(self.store.table()).len();
        self.table_cursor = self.table_cursor.min(len.saturating_sub(1));
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let table = self.store.table();
        let view = self.state.view(table);
        let summary = self.state.summary(table);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let source = self.store.source_name();
        let header = Header::new(&source, self.state.township(), self.store.loaded_at(), &self.theme)
            .diverged(self.store.is_diverged());
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), rows[0]);

        render_kpis(frame, rows[1], &summary, &self.theme);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(SIDEBAR_WIDTH),
                Constraint::Min(40),
                Constraint::Length(DETAIL_WIDTH),
            ])
            .split(rows[2]);

        render_sidebar(
            frame,
            body[0],
            &self.state,
            self.focus,
            &self.facet_cursors,
            &self.theme,
        );

        let table_focused = self.focus == Focus::Table;
        if view.is_empty() {
            render_no_plots(frame, body[1], table_focused, &self.theme);
        } else {
            render_plot_table(
                frame,
                body[1],
                &view,
                &self.columns.visible(table),
                Some(self.table_cursor),
                table_focused,
                &self.theme,
            );
        }
        render_plot_detail(frame, body[2], table, self.selected_row(), &self.theme);

        frame.render_widget(Paragraph::new(self.status_line(&summary)), rows[3]);

        if self.columns.open {
            render_column_chooser(frame, rows[2], &self.columns, table, &self.theme);
        }
        if let Some(form) = &self.editor {
            render_editor(frame, body[1], form, &self.theme);
        }
    }

    fn status_line(&self, summary: &township_data::aggregator::Summary) -> Line<'_> {
        if let Some(status) = &self.status {
            let style = match status.level {
                StatusLevel::Info => self.theme.info,
                StatusLevel::Success => self.theme.success,
                StatusLevel::Error => self.theme.error,
            };
            return Line::from(Span::styled(status.text.clone(), style));
        }
        let collected = summary.collection_percentage();
        Line::from(vec![
            Span::styled(format!("{} plots", summary.plot_count), self.theme.label),
            Span::styled("  collected ", self.theme.dim),
            Span::styled(
                format!("{:.1}%", collected),
                self.theme.collection_style(collected),
            ),
            Span::styled(
                "   Tab focus  ←→ township  Space toggle  a/n all/none  c columns  e edit  r reload  q quit",
                self.theme.dim,
            ),
        ])
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style used by the dashboard widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Panels ───────────────────────────────────────────────────────────────
    /// Border of the panel that has keyboard focus.
    pub focus_border: Style,
    /// Border of every other panel.
    pub border: Style,
    pub cursor: Style,
    pub checkbox_on: Style,
    pub checkbox_off: Style,

    // ── KPI cards ────────────────────────────────────────────────────────────
    pub kpi_title: Style,
    pub kpi_value: Style,
    pub kpi_missing: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_selected: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            focus_border: Style::default().fg(Color::Cyan),
            border: Style::default().fg(Color::DarkGray),
            cursor: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),
            checkbox_on: Style::default().fg(Color::Green),
            checkbox_off: Style::default().fg(Color::DarkGray),

            kpi_title: Style::default().fg(Color::Gray),
            kpi_value: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            kpi_missing: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            focus_border: Style::default().fg(Color::Blue),
            border: Style::default().fg(Color::Gray),
            cursor: Style::default()
                .fg(Color::White)
                .bg(Color::Blue),
            checkbox_on: Style::default().fg(Color::Green),
            checkbox_off: Style::default().fg(Color::Gray),

            kpi_title: Style::default().fg(Color::DarkGray),
            kpi_value: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            kpi_missing: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_selected: Style::default()
                .fg(Color::White)
                .bg(Color::Blue),
        }
    }

    /// Basic 8-colour ANSI palette without bold or italic modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            focus_border: Style::default().fg(Color::White),
            border: Style::default().fg(Color::DarkGray),
            cursor: Style::default().fg(Color::Black).bg(Color::White),
            checkbox_on: Style::default().fg(Color::Green),
            checkbox_off: Style::default().fg(Color::DarkGray),

            kpi_title: Style::default().fg(Color::Gray),
            kpi_value: Style::default().fg(Color::Yellow),
            kpi_missing: Style::default().fg(Color::Red),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_selected: Style::default().fg(Color::Black).bg(Color::White),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Border style for a panel.
    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            self.focus_border
        } else {
            self.border
        }
    }

    /// Style for the collection percentage (received / sales).
    ///
    /// * `≥ 80 %`  → `success`
    /// * `50–80 %` → `warning`
    /// * `< 50 %`  → `error`
    pub fn collection_style(&self, percentage: f64) -> Style {
        if percentage >= 80.0 {
            self.success
        } else if percentage >= 50.0 {
            self.warning
        } else {
            self.error
        }
    }

    /// Style for a plot's status cell.
    pub fn status_style(&self, status: &str) -> Style {
        match status.trim().to_lowercase().as_str() {
            "sold" | "registered" | "done" => self.success,
            "booked" | "hold" | "on hold" | "pending" => self.warning,
            "" => self.dim,
            _ => self.text,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.kpi_value.fg, Some(Color::Yellow));
        assert_eq!(t.table_selected.bg, Some(Color::Cyan));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.table_row.fg, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_has_no_modifiers() {
        let t = Theme::classic();
        assert!(!t.bold.add_modifier.contains(Modifier::BOLD));
        assert!(!t.kpi_value.add_modifier.contains(Modifier::BOLD));
        assert!(!t.kpi_missing.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(Theme::from_name("does-not-exist").header.fg.is_some());
    }

    #[test]
    fn test_collection_style_thresholds() {
        let t = Theme::dark();
        assert_eq!(t.collection_style(0.0).fg, Some(Color::Red));
        assert_eq!(t.collection_style(49.9).fg, Some(Color::Red));
        assert_eq!(t.collection_style(50.0).fg, Some(Color::Yellow));
        assert_eq!(t.collection_style(80.0).fg, Some(Color::Green));
    }

    #[test]
    fn test_status_style() {
        let t = Theme::dark();
        assert_eq!(t.status_style("Sold").fg, Some(Color::Green));
        assert_eq!(t.status_style(" booked ").fg, Some(Color::Yellow));
        assert_eq!(t.status_style("").fg, Some(Color::DarkGray));
        assert_eq!(t.status_style("Open").fg, Some(Color::White));
    }

    #[test]
    fn test_panel_border() {
        let t = Theme::dark();
        assert_eq!(t.panel_border(true).fg, Some(Color::Cyan));
        assert_eq!(t.panel_border(false).fg, Some(Color::DarkGray));
    }
}

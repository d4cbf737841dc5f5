//! The four summary cards shown above the plot table.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use township_core::formatting::format_metric;
use township_data::aggregator::{MetricTotal, Summary};

use crate::themes::Theme;

/// One card: a title and a metric that may be unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub metric: MetricTotal,
    pub decimals: u32,
}

impl KpiCard {
    /// Formatted value, `"Column not found"` when the column is absent.
    pub fn value_text(&self) -> String {
        format_metric(self.metric.value(), self.decimals)
    }

    pub fn to_lines<'a>(&self, theme: &'a Theme) -> Vec<Line<'a>> {
        let value_style = if self.metric.available {
            theme.kpi_value
        } else {
            theme.kpi_missing
        };
        let mut lines = vec![Line::from(Span::styled(self.value_text(), value_style))];
        if self.metric.skipped > 0 {
            lines.push(Line::from(Span::styled(
                format!("{} blank/invalid", self.metric.skipped),
                theme.dim,
            )));
        }
        lines
    }
}

/// Cards in display order.
pub fn kpi_cards(summary: &Summary) -> [KpiCard; 4] {
    [
        KpiCard {
            title: "Total Size (SQFT)",
            metric: summary.total_size,
            decimals: 0,
        },
        KpiCard {
            title: "Total Sales",
            metric: summary.total_sales,
            decimals: 2,
        },
        KpiCard {
            title: "Total Received",
            metric: summary.total_received,
            decimals: 2,
        },
        KpiCard {
            title: "Total Receivable",
            metric: summary.total_receivable,
            decimals: 2,
        },
    ]
}

/// Render the cards side by side into `area`.
pub fn render_kpis(frame: &mut Frame, area: Rect, summary: &Summary, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (card, chunk) in kpi_cards(summary).iter().zip(chunks.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(Span::styled(format!(" {} ", card.title), theme.kpi_title));
        frame.render_widget(
            Paragraph::new(Text::from(card.to_lines(theme))).block(block),
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

    fn metric(total: f64, available: bool, skipped: usize) -> MetricTotal {
        MetricTotal {
            total,
            available,
            summed: 1,
            skipped,
        }
    }

    fn summary() -> Summary {
        Summary {
            total_size: metric(3400.0, true, 0),
            total_sales: metric(300.0, true, 1),
            total_received: metric(60.0, true, 0),
            total_receivable: MetricTotal::default(),
            plot_count: 3,
        }
    }

    #[test]
    fn test_card_values() {
        let cards = kpi_cards(&summary());
        assert_eq!(cards[0].value_text(), "3,400");
        assert_eq!(cards[1].value_text(), "300.00");
        assert_eq!(cards[3].value_text(), "Column not found");
    }

    #[test]
    fn test_card_mentions_skipped_cells() {
        let theme = Theme::dark();
        let cards = kpi_cards(&summary());
        assert_eq!(cards[1].to_lines(&theme).len(), 2);
        assert_eq!(cards[0].to_lines(&theme).len(), 1);
    }

    #[test]
    fn test_render_kpis_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(100, 5)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_kpis(frame, frame.area(), &summary(), &theme))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Total Sales"));
        assert!(rendered.contains("3,400"));
    }
}

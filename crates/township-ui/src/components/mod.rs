//! Reusable dashboard widgets.

use ratatui::layout::Rect;

pub mod columns;
pub mod detail;
pub mod editor;
pub mod header;
pub mod kpi;
pub mod sidebar;

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_area_centres_and_shrinks() {
        let area = Rect::new(10, 5, 40, 20);
        assert_eq!(popup_area(area, 20, 10), Rect::new(20, 10, 20, 10));
        assert_eq!(popup_area(area, 100, 100), area);
    }
}

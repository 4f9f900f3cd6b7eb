pub mod chat_view;
pub mod color;
pub mod compose;
pub mod confirm_delete;
pub mod entry_list;
pub mod goals_modal;
pub mod header;
pub mod help;
pub mod markdown;
pub mod mood_chart;
pub mod note_popup;
pub mod selection_dock;
pub mod status_bar;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Helper function to create a centered rect using up certain percentage of the available rect
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Cut a single line down to `max_width` characters, marking the cut with "..."
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// The last characters of a one-line input that fit in `width` columns,
/// leaving a column for the cursor
pub fn input_tail(text: &str, width: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(width.saturating_sub(1))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut_lines() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer line", 10), "a much ...");
    }

    #[test]
    fn input_tail_leaves_room_for_cursor() {
        assert_eq!(input_tail("hello", 10), "hello");
        assert_eq!(input_tail("hello world", 6), "world");
    }

    #[test]
    fn popup_is_centered() {
        let area = popup_area(Rect::new(0, 0, 100, 40), 50, 50);
        assert_eq!(area, Rect::new(25, 10, 50, 20));
    }
}

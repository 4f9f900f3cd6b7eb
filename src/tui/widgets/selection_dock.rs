use crate::tui::widgets::color::Palette;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Shown while entries are selected for analysis
pub fn render_selection_dock(
    f: &mut Frame,
    area: Rect,
    selected: usize,
    analyzing: bool,
    analyze_key: &str,
    palette: &Palette,
) {
    let style = Style::default()
        .fg(palette.highlight_fg)
        .bg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let paragraph = Paragraph::new(dock_text(selected, analyzing, analyze_key))
        .style(style)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

pub fn dock_text(selected: usize, analyzing: bool, analyze_key: &str) -> String {
    if analyzing {
        format!("{} SELECTED • Processing...", selected)
    } else {
        format!("{} SELECTED • {}: Run analysis", selected, analyze_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dock_shows_count_and_state() {
        assert_eq!(dock_text(2, false, "a"), "2 SELECTED • a: Run analysis");
        assert_eq!(dock_text(2, true, "a"), "2 SELECTED • Processing...");
    }
}

use crate::models::Goal;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Greeting on the left, sync state on the right
pub fn render_header(f: &mut Frame, area: Rect, greeting: &str, is_demo: bool, loading: bool, palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);

    let mut spans = vec![Span::styled(
        greeting.to_string(),
        base.add_modifier(Modifier::BOLD),
    )];
    if is_demo {
        spans.push(Span::styled("  [demo]", base.fg(palette.accent)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(base), area);

    if loading {
        let sync = Paragraph::new("Syncing...")
            .style(base)
            .alignment(Alignment::Right);
        f.render_widget(sync, area);
    }
}

/// Goal titles across one line
pub fn render_goals_strip(f: &mut Frame, area: Rect, goals: &[Goal], palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let text = goals_strip_text(goals, area.width as usize);
    let line = Line::from(vec![
        Span::styled("Targets: ", base.add_modifier(Modifier::BOLD)),
        Span::styled(text, base.fg(palette.accent)),
    ]);
    f.render_widget(Paragraph::new(line).style(base), area);
}

pub fn goals_strip_text(goals: &[Goal], max_width: usize) -> String {
    if goals.is_empty() {
        return "No targets set.".to_string();
    }
    let joined = goals
        .iter()
        .map(|g| format!("● {}", g.title))
        .collect::<Vec<_>>()
        .join("  ");
    // "Targets: " takes 9 columns
    truncate(&joined, max_width.saturating_sub(9))
}

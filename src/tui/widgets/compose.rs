use crate::tui::widgets::color::Palette;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// The new-entry box above the feed. While `editing`, the tail of the draft
/// is shown with the cursor after the last character.
pub fn render_compose(
    f: &mut Frame,
    area: Rect,
    draft: &str,
    editing: bool,
    publishing: bool,
    hint: &str,
    palette: &Palette,
) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let title = if publishing { "New entry - Publishing..." } else { "New entry" };
    let border_style = if editing { base.fg(palette.accent) } else { base };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
        .style(base);

    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;

    if draft.is_empty() && !editing {
        let placeholder = Line::from(Span::styled(
            format!("What's on your mind? ({})", hint),
            base.add_modifier(Modifier::DIM),
        ));
        f.render_widget(Paragraph::new(placeholder).block(block), area);
        return;
    }

    let visible = visible_tail(draft, inner_height);
    let lines: Vec<Line> = visible.iter().map(|l| Line::from(l.to_string())).collect();
    f.render_widget(Paragraph::new(lines).block(block).style(base), area);

    if editing && inner_height > 0 && inner_width > 0 {
        let last = visible.last().map(|l| l.chars().count()).unwrap_or(0);
        let row = visible.len().saturating_sub(1);
        let x = area.x + 1 + last.min(inner_width.saturating_sub(1)) as u16;
        let y = area.y + 1 + row as u16;
        f.set_cursor_position((x, y));
    }
}

/// Last `height` lines of the draft; a trailing newline counts as an empty line
pub fn visible_tail(draft: &str, height: usize) -> Vec<&str> {
    let lines: Vec<&str> = draft.split('\n').collect();
    let start = lines.len().saturating_sub(height);
    lines[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_cursor_line() {
        assert_eq!(visible_tail("one\ntwo\nthree", 2), vec!["two", "three"]);
        assert_eq!(visible_tail("one\n", 3), vec!["one", ""]);
        assert_eq!(visible_tail("", 3), vec![""]);
    }
}

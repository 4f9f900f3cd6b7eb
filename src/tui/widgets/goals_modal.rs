use crate::models::Goal;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::{input_tail, popup_area, truncate};
use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

pub fn render_goals_modal(
    f: &mut Frame,
    area: Rect,
    goals: &[Goal],
    draft: &str,
    list_state: &mut ListState,
    remove_key: &str,
    palette: &Palette,
) {
    let popup = popup_area(area, 50, 60);
    if popup.height < 6 {
        return;
    }
    f.render_widget(Clear, popup);

    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let vertical = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Goals ({}: remove, Esc: close)", remove_key))
        .title_alignment(Alignment::Center)
        .style(base);

    if goals.is_empty() {
        f.render_widget(Paragraph::new("No targets set.").block(block).style(base), vertical[0]);
    } else {
        let max_width = vertical[0].width.saturating_sub(6) as usize;
        let items: Vec<ListItem> = goals
            .iter()
            .map(|g| ListItem::new(format!("● {}", truncate(&g.title, max_width))))
            .collect();
        let list = List::new(items)
            .block(block)
            .style(base)
            .highlight_style(Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, vertical[0], list_state);
    }

    let input_area = vertical[1];
    let input_width = input_area.width.saturating_sub(2) as usize;
    let shown = input_tail(draft, input_width);
    let input = Paragraph::new(shown.clone()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("New goal (Enter: add)")
            .border_style(base.fg(palette.accent))
            .style(base),
    );
    f.render_widget(input, input_area);

    if input_width > 0 {
        let x = input_area.x + 1 + shown.chars().count() as u16;
        f.set_cursor_position((x, input_area.y + 1));
    }
}

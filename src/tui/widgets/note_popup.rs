use crate::models::Entry;
use crate::timestamp::DisplayZone;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::markdown::markdown_lines;
use crate::tui::widgets::popup_area;
use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui::Frame;
use std::cmp;

/// Full AI note of one entry, rendered as markdown with a scrollbar
pub fn render_note_popup(
    f: &mut Frame,
    area: Rect,
    entry: &Entry,
    zone: &DisplayZone,
    palette: &Palette,
    scroll_offset: usize,
) {
    let popup = popup_area(area, 70, 70);
    if popup.width < 4 || popup.height < 3 {
        return;
    }
    f.render_widget(Clear, popup);

    let horizontal = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(popup);
    let content_area = horizontal[0];
    let scrollbar_area = horizontal[1];

    let viewport_height = content_area.height.saturating_sub(2) as usize;
    let text_width = content_area.width.saturating_sub(2);

    let note = entry.analysis_note().unwrap_or("No AI note yet.");
    let lines = markdown_lines(note, text_width);
    let total_lines = lines.len();

    let max_scroll = total_lines.saturating_sub(viewport_height);
    let scroll_offset = cmp::min(scroll_offset, max_scroll);
    let end_line = cmp::min(scroll_offset + viewport_height, total_lines);
    let visible = Text::from(lines[scroll_offset..end_line].to_vec());

    let created_at = entry.created_at.as_deref();
    let title = format!(
        "AI note - {} {}",
        zone.format_date(created_at),
        zone.format_time(created_at)
    );
    let base_style = Style::default().fg(palette.fg).bg(palette.bg);
    let paragraph = Paragraph::new(visible)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_alignment(Alignment::Center)
                .style(base_style),
        )
        .style(base_style)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, content_area);

    if total_lines > viewport_height {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            content_area.y + 1,
            scrollbar_area.width,
            content_area.height.saturating_sub(2),
        );
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .viewport_content_length(viewport_height)
            .position(scroll_offset);
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

use crate::models::Entry;
use crate::tui::app::{CANCEL_OPTION, DELETE_OPTION};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::{popup_area, truncate};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

/// Ask before an entry is deleted. `entry` is None when the id is not in
/// the current feed (e.g. removed by a concurrent reload).
pub fn render_confirm_delete(
    f: &mut Frame,
    area: Rect,
    entry: Option<&Entry>,
    selection: usize,
    palette: &Palette,
) {
    let popup = popup_area(area, 50, 35);
    f.render_widget(Clear, popup);

    let normal = Style::default().fg(palette.fg).bg(palette.bg);
    let highlighted = Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg);

    let excerpt = entry
        .and_then(|e| e.content.lines().find(|l| !l.trim().is_empty()))
        .map(|l| truncate(l.trim(), popup.width.saturating_sub(4) as usize))
        .unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled("Delete this entry? This cannot be undone.", normal)),
        Line::from(""),
        Line::from(Span::styled(excerpt, normal)),
        Line::from(""),
    ];

    for (index, option) in [(DELETE_OPTION, "Delete"), (CANCEL_OPTION, "Cancel")] {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected { highlighted } else { normal };
        lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("y: Delete  n/Esc: Cancel  ↑↓ Enter: Choose", normal)));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Delete")
                .title_alignment(Alignment::Center)
                .style(normal),
        )
        .style(normal)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup);
}

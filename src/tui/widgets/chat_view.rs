use crate::models::{ChatMessage, ChatRole};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::markdown::markdown_lines;
use crate::tui::widgets::{input_tail, popup_area};
use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

pub struct ChatView<'a> {
    pub history: &'a [ChatMessage],
    pub draft: &'a str,
    pub pending: usize,
    /// Lines scrolled up from the newest message
    pub scroll: usize,
    pub reset_key: &'a str,
}

pub fn render_chat_view(f: &mut Frame, area: Rect, view: &ChatView, palette: &Palette) {
    let popup = popup_area(area, 80, 80);
    if popup.height < 6 {
        return;
    }
    f.render_widget(Clear, popup);

    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let vertical = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(popup);
    let transcript_area = vertical[0];
    let input_area = vertical[1];

    let width = transcript_area.width.saturating_sub(2);
    let viewport_height = transcript_area.height.saturating_sub(2) as usize;
    let lines = transcript_lines(view.history, view.pending, width, palette);

    // Pin to the newest line unless scrolled back
    let total = lines.len();
    let max_scroll = total.saturating_sub(viewport_height);
    let start = max_scroll.saturating_sub(view.scroll.min(max_scroll));
    let end = (start + viewport_height).min(total);

    let transcript = Paragraph::new(Text::from(lines[start..end].to_vec()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Chat with your journal")
                .title_alignment(Alignment::Center)
                .style(base),
        )
        .style(base);
    f.render_widget(transcript, transcript_area);

    let input_width = input_area.width.saturating_sub(2) as usize;
    let shown = input_tail(view.draft, input_width);
    let input = Paragraph::new(shown.clone()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Message (Enter: send, {}: new chat, Esc: close)", view.reset_key))
            .border_style(base.fg(palette.accent))
            .style(base),
    );
    f.render_widget(input, input_area);

    if input_width > 0 {
        let x = input_area.x + 1 + shown.chars().count() as u16;
        f.set_cursor_position((x, input_area.y + 1));
    }
}

pub fn transcript_lines(
    history: &[ChatMessage],
    pending: usize,
    width: u16,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let dim = Style::default().fg(palette.fg).add_modifier(Modifier::DIM);
    let mut lines = Vec::new();

    if history.is_empty() && pending == 0 {
        lines.push(Line::from(Span::styled(
            "Ask about your patterns, moods or goals.",
            dim,
        )));
        return lines;
    }

    for message in history {
        match message.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You",
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                )));
                lines.extend(wrap_plain(&message.text, width as usize));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "MindScribe",
                    Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                )));
                lines.extend(markdown_lines(&message.text, width));
            }
        }
        lines.push(Line::from(""));
    }

    if pending > 0 {
        lines.push(Line::from(Span::styled("MindScribe is thinking...", dim)));
    }
    lines
}

/// Hard-wrap user text at `width` characters, keeping its own line breaks
fn wrap_plain(text: &str, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(Line::from(chunk.iter().collect::<String>()));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn empty_chat_shows_prompt() {
        let palette = Palette::from_config(&Config::default());
        let lines = plain(&transcript_lines(&[], 0, 40, &palette));
        assert_eq!(lines, vec!["Ask about your patterns, moods or goals."]);
    }

    #[test]
    fn pending_reply_is_indicated() {
        let palette = Palette::from_config(&Config::default());
        let history = [ChatMessage::user("hi")];
        let lines = plain(&transcript_lines(&history, 1, 40, &palette));
        assert_eq!(lines, vec!["You", "hi", "", "MindScribe is thinking..."]);
    }

    #[test]
    fn user_text_wraps() {
        let lines = wrap_plain("abcdef\n\ngh", 4);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["abcd", "ef", "", "gh"]);
    }
}

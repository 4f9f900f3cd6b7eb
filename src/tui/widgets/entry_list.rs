use crate::models::{Entry, EntryId};
use crate::timestamp::DisplayZone;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

/// Content lines shown per card before it is cut off
const CARD_CONTENT_LINES: usize = 3;

pub fn render_entry_list(
    f: &mut Frame,
    area: Rect,
    entries: &[Entry],
    selection: &[EntryId],
    list_state: &mut ListState,
    zone: &DisplayZone,
    palette: &Palette,
) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let title = format!("Journal ({})", entries.len());
    let block = Block::default().borders(Borders::ALL).title(title).style(base);

    if entries.is_empty() {
        let empty = Paragraph::new("No entries yet. Start writing to see your insights.")
            .block(block)
            .style(base);
        f.render_widget(empty, area);
        return;
    }

    // 2 for borders, 2 for the highlight symbol
    let max_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let is_selected = selection.contains(&entry.id);
            ListItem::new(card_lines(entry, is_selected, zone, max_width, palette))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .style(base)
        .highlight_style(Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, list_state);
}

pub fn card_lines(
    entry: &Entry,
    is_selected: bool,
    zone: &DisplayZone,
    max_width: usize,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let base = Style::default().fg(palette.fg);
    let accent = Style::default().fg(palette.accent);
    let created_at = entry.created_at.as_deref();

    let marker = if is_selected { "[x] " } else { "[ ] " };
    let mut lines = vec![Line::from(vec![
        Span::styled(marker, if is_selected { accent } else { base }),
        Span::styled(
            format!("{} · {}", zone.format_date(created_at), zone.format_time(created_at)),
            base.add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("   {}", entry.mood_badge()), base.add_modifier(Modifier::DIM)),
    ])];

    let content_width = max_width.saturating_sub(4);
    let content: Vec<&str> = entry.content.trim().lines().collect();
    for line in content.iter().take(CARD_CONTENT_LINES) {
        lines.push(Line::from(Span::styled(
            format!("    {}", truncate(line, content_width)),
            base,
        )));
    }
    if content.len() > CARD_CONTENT_LINES {
        lines.push(Line::from(Span::styled("    ...", base.add_modifier(Modifier::DIM))));
    }

    if let Some(note) = entry.analysis_note() {
        let first = note.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("    AI note: {}", truncate(first.trim(), content_width.saturating_sub(9))),
            accent,
        )));
    }

    lines.push(Line::from(""));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use crate::Config;

    fn entry() -> Entry {
        Entry {
            id: RecordId::Int(1),
            user_id: "demo_user".to_string(),
            content: "Walked by the river".to_string(),
            created_at: Some("2026-01-14T16:00:00".to_string()),
            mood_score: None,
            mood_label: None,
            goal_analysis: None,
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn unanalyzed_card() {
        let palette = Palette::from_config(&Config::default());
        let lines = card_lines(&entry(), false, &DisplayZone::default(), 60, &palette);
        assert_eq!(
            text(&lines),
            vec!["[ ] 14 Jan · 9:30 PM   UNANALYZED", "    Walked by the river", ""]
        );
    }

    #[test]
    fn analyzed_selected_card_shows_note() {
        let mut analyzed = entry();
        analyzed.mood_score = Some(8);
        analyzed.mood_label = Some("hopeful".to_string());
        analyzed.goal_analysis = Some("\nGood momentum on **running**.".to_string());
        let palette = Palette::from_config(&Config::default());
        let lines = text(&card_lines(&analyzed, true, &DisplayZone::default(), 60, &palette));
        assert_eq!(lines[0], "[x] 14 Jan · 9:30 PM   HOPEFUL 8/10");
        assert_eq!(lines[2], "    AI note: Good momentum on **running**.");
    }
}

use crate::dashboard::MoodPoint;
use crate::tui::widgets::color::Palette;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders};
use ratatui::Frame;

/// Wide enough for a "14 Jan" label
const BAR_WIDTH: u16 = 6;
const BAR_GAP: u16 = 1;
const MAX_SCORE: u64 = 10;

/// Mood scores over time on a fixed 0-10 scale
pub fn render_mood_chart(f: &mut Frame, area: Rect, points: &[MoodPoint], palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let shown = visible_points(points, area.width.saturating_sub(2));

    let bars: Vec<Bar> = shown
        .iter()
        .map(|point| {
            Bar::default()
                .value(point.score)
                .label(Line::from(point.label.clone()))
                .style(Style::default().fg(palette.accent))
                .value_style(Style::default().fg(palette.bg).bg(palette.accent))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Emotional Velocity").style(base))
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .max(MAX_SCORE)
        .style(base);

    f.render_widget(chart, area);
}

/// The most recent points that fit in `width` columns
pub fn visible_points(points: &[MoodPoint], width: u16) -> &[MoodPoint] {
    let fits = ((width + BAR_GAP) / (BAR_WIDTH + BAR_GAP)) as usize;
    &points[points.len().saturating_sub(fits)..]
}

use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

/// Which optional panels get space this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Panels {
    pub chart: bool,
    pub composing: bool,
    pub dock: bool,
}

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub header_area: Rect,
    pub goals_area: Rect,
    pub chart_area: Option<Rect>,
    pub compose_area: Rect,
    pub feed_area: Rect,
    pub dock_area: Option<Rect>,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Height: header + goals + compose (3) + one card (5) + status
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 11;

    const CHART_HEIGHT: u16 = 9;
    /// The chart only shows up when the feed keeps at least this much room
    const CHART_MIN_HEIGHT: u16 = 28;
    const COMPOSE_HEIGHT: u16 = 3;
    const COMPOSE_EDIT_HEIGHT: u16 = 8;

    pub fn calculate(size: Rect, panels: Panels) -> Self {
        // Ensure minimum terminal size (accounting for outer border)
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let show_chart = panels.chart && inner_area.height >= Self::CHART_MIN_HEIGHT;
        let compose_height = if panels.composing {
            Self::COMPOSE_EDIT_HEIGHT
        } else {
            Self::COMPOSE_HEIGHT
        };

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Greeting
                Constraint::Length(1), // Goals strip
                Constraint::Length(if show_chart { Self::CHART_HEIGHT } else { 0 }),
                Constraint::Length(compose_height),
                Constraint::Min(1), // Feed
                Constraint::Length(if panels.dock { 1 } else { 0 }),
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            header_area: vertical[0],
            goals_area: vertical[1],
            chart_area: show_chart.then_some(vertical[2]),
            compose_area: vertical[3],
            feed_area: vertical[4],
            dock_area: panels.dock.then_some(vertical[5]),
            status_area: vertical[6],
        }
    }
}

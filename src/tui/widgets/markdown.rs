use ratatui::text::{Line, Span};
use ratskin::RatSkin;
use termimad::minimad::Text as MinimadText;

/// Render markdown (AI notes, assistant replies) into owned ratatui lines
/// wrapped to `width` columns.
pub fn markdown_lines(markdown: &str, width: u16) -> Vec<Line<'static>> {
    let input = MinimadText::from(markdown);
    let lines = RatSkin::default().parse(input, width.max(1));

    // ratskin borrows from the input, so copy span text out
    lines
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

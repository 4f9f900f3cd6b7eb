use crate::config::KeyBindings;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as display;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_help(f: &mut Frame, area: Rect, bindings: &KeyBindings, palette: &Palette) {
    let popup = popup_area(area, 60, 70);
    f.render_widget(Clear, popup);

    let style = Style::default().fg(palette.fg).bg(palette.bg);
    let paragraph = Paragraph::new(build_help_text(bindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(style),
        )
        .style(style)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup);
}

fn build_help_text(bindings: &KeyBindings) -> String {
    let mut text = String::new();

    text.push_str("Feed:\n");
    text.push_str(&format!(
        "  {} / {}: Move between entries\n",
        display(&bindings.list_up),
        display(&bindings.list_down)
    ));
    text.push_str(&format!("  {}: Write a new entry\n", display(&bindings.compose)));
    text.push_str(&format!("  {}: Delete entry (asks first)\n", display(&bindings.delete)));
    text.push_str(&format!("  {}: Open the AI note\n", display(&bindings.open_note)));
    text.push_str(&format!("  {}: Refresh\n", display(&bindings.reload)));
    text.push('\n');

    text.push_str("Analysis:\n");
    text.push_str(&format!("  {}: Select / unselect entry\n", display(&bindings.toggle_select)));
    text.push_str(&format!("  {}: Analyze selected entries\n", display(&bindings.analyze)));
    text.push_str(&format!("  {}: Clear selection\n", display(&bindings.clear_selection)));
    text.push('\n');

    text.push_str("Writing:\n");
    text.push_str(&format!("  {}: Publish\n", display(&bindings.publish)));
    text.push_str("  Enter: New line\n");
    text.push_str("  Esc: Close (draft is kept)\n");
    text.push('\n');

    text.push_str("Chat and goals:\n");
    text.push_str(&format!("  {}: Chat about your journal\n", display(&bindings.chat)));
    text.push_str(&format!("  {}: Start a new chat\n", display(&bindings.reset_chat)));
    text.push_str(&format!("  {}: Manage goals\n", display(&bindings.goals)));
    text.push_str(&format!("  {}: Remove the highlighted goal\n", display(&bindings.delete_goal)));
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", display(&bindings.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", display(&bindings.help)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_keys() {
        let mut bindings = KeyBindings::default();
        bindings.analyze = "z".to_string();
        let text = build_help_text(&bindings);
        assert!(text.contains("z: Analyze selected entries"));
        assert!(text.contains("F1: Show/hide help"));
        assert!(text.contains(&format!("{}: Remove the highlighted goal", display("Ctrl+d"))));
    }
}

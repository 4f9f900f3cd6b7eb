use crate::dashboard::mood_series;
use crate::tui::app::{App, Mode};
use crate::tui::layout::Layout;
use crate::tui::widgets::{
    chat_view::{render_chat_view, ChatView},
    color::Palette,
    compose::render_compose,
    confirm_delete::render_confirm_delete,
    entry_list::render_entry_list,
    goals_modal::render_goals_modal,
    header::{render_goals_strip, render_header},
    help::render_help,
    mood_chart::render_mood_chart,
    note_popup::render_note_popup,
    selection_dock::render_selection_dock,
    status_bar::render_status_bar,
};
use crate::utils::format_key_binding_for_display as display;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let palette = Palette::from_config(&app.config);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("MindScribe")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(palette.fg).bg(palette.bg));
    f.render_widget(outer_block, f.area());

    let greeting = app.greeting();
    render_header(
        f,
        layout.header_area,
        &greeting,
        app.dashboard.session().is_demo(),
        app.is_loading(),
        &palette,
    );
    render_goals_strip(f, layout.goals_area, app.dashboard.goals(), &palette);

    if let Some(chart_area) = layout.chart_area {
        let points = mood_series(app.dashboard.entries(), &app.zone);
        render_mood_chart(f, chart_area, &points, &palette);
    }

    render_compose(
        f,
        layout.compose_area,
        &app.dashboard.drafts.entry,
        app.ui.mode == Mode::Compose,
        app.dashboard.busy().publishing,
        &display(&app.config.key_bindings.compose),
        &palette,
    );

    render_entry_list(
        f,
        layout.feed_area,
        app.dashboard.entries(),
        app.dashboard.selection(),
        &mut app.ui.list_state,
        &app.zone,
        &palette,
    );

    if let Some(dock_area) = layout.dock_area {
        render_selection_dock(
            f,
            dock_area,
            app.dashboard.selection().len(),
            app.dashboard.busy().analyzing,
            &display(&app.config.key_bindings.analyze),
            &palette,
        );
    }

    // Overlays, drawn after the feed
    match app.ui.mode {
        Mode::Chat => {
            let reset_key = display(&app.config.key_bindings.reset_chat);
            let view = ChatView {
                history: app.dashboard.chat_history(),
                draft: &app.dashboard.drafts.chat,
                pending: app.dashboard.chat_pending(),
                scroll: app.ui.chat_scroll,
                reset_key: &reset_key,
            };
            render_chat_view(f, f.area(), &view, &palette);
        }
        Mode::Goals => {
            render_goals_modal(
                f,
                f.area(),
                app.dashboard.goals(),
                &app.dashboard.drafts.goal,
                &mut app.ui.goal_list_state,
                &display(&app.config.key_bindings.delete_goal),
                &palette,
            );
        }
        Mode::Help => render_help(f, f.area(), &app.config.key_bindings, &palette),
        Mode::Feed | Mode::Compose => {}
    }

    if let Some(entry) = app.expanded_note_entry() {
        render_note_popup(f, f.area(), entry, &app.zone, &palette, app.ui.note_scroll);
    }

    if let Some(id) = app.dashboard.pending_delete() {
        let entry = app.dashboard.find_entry(id);
        render_confirm_delete(f, f.area(), entry, app.modals.delete_selection, &palette);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &palette);
}

fn get_key_hints(app: &App) -> Vec<String> {
    let keys = &app.config.key_bindings;
    if app.is_confirming_delete() {
        return vec!["y: Delete".to_string(), "n/Esc: Cancel".to_string()];
    }
    if app.modals.expanded_note.is_some() {
        return vec!["↑/↓: Scroll".to_string(), "Esc: Close".to_string()];
    }
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", display(&keys.help))],
        Mode::Compose => vec![
            format!("{}: Publish", display(&keys.publish)),
            "Enter: New line".to_string(),
            "Esc: Close".to_string(),
        ],
        Mode::Chat => vec![
            "Enter: Send".to_string(),
            format!("{}: New chat", display(&keys.reset_chat)),
            "↑/↓: Scroll".to_string(),
            "Esc: Close".to_string(),
        ],
        Mode::Goals => vec![
            "Enter: Add".to_string(),
            format!("{}: Remove", display(&keys.delete_goal)),
            "↑/↓: Move".to_string(),
            "Esc: Close".to_string(),
        ],
        Mode::Feed => vec![
            format!("{}: Quit", display(&keys.quit)),
            format!("{}: New", display(&keys.compose)),
            format!("{}: Select", display(&keys.toggle_select)),
            format!("{}: Analyze", display(&keys.analyze)),
            format!("{}: Delete", display(&keys.delete)),
            format!("{}: AI note", display(&keys.open_note)),
            format!("{}: Chat", display(&keys.chat)),
            format!("{}: Goals", display(&keys.goals)),
            format!("{}: Help", display(&keys.help)),
        ],
    }
}

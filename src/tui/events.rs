use crate::tui::app::{App, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::{Layout, Panels};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::Duration;

/// How long to wait for input before checking on background requests
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Guard that ensures terminal state is restored even on panic
/// This is critical for TUI applications - if the terminal is left in raw mode
/// or alternate screen, the user's terminal will be unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit)
    /// After calling this, the guard will do nothing on drop
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error
    // shows up in the normal terminal
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        // Apply finished API calls before drawing
        app.tick();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        let panels = Panels {
            chart: app.dashboard.entries().iter().any(|e| e.is_analyzed()),
            composing: app.ui.mode == Mode::Compose,
            dock: !app.dashboard.selection().is_empty(),
        };
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect, panels);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                // Only Press events, Windows also reports Release
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    if handle_key_event(&mut app, key_event)? {
                        break;
                    }
                }
                // Resize is picked up by the next draw
                _ => {}
            }
        }
    }

    guard.restore()?;
    log::info!("Dashboard closed");
    Ok(())
}

/// Route a key press to whatever currently has focus. Returns true to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // Modals first, they sit on top of every mode
    if app.is_confirming_delete() {
        handle_delete_confirmation_modal(app, key_event);
        return Ok(false);
    }
    if app.modals.expanded_note.is_some() {
        handle_note_popup(app, key_event);
        return Ok(false);
    }

    match app.ui.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Compose => handle_compose_mode(app, key_event),
        Mode::Chat => handle_chat_mode(app, key_event),
        Mode::Goals => handle_goals_mode(app, key_event),
        Mode::Feed => return Ok(handle_feed_key_bindings(app, key_event)),
    }
    Ok(false)
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_delete_selection();
        }
        KeyCode::Enter => app.confirm_delete_selection(),
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_delete(false),
        _ => {}
    }
}

fn handle_note_popup(app: &mut App, key_event: KeyEvent) {
    let keys = app.keys.clone();
    if key_event.code == KeyCode::Esc || keys.open_note.matches(&key_event) {
        app.close_note();
    } else if key_event.code == KeyCode::Up || keys.list_up.matches(&key_event) {
        app.scroll_note_up();
    } else if key_event.code == KeyCode::Down || keys.list_down.matches(&key_event) {
        app.scroll_note_down();
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) {
    if key_event.code == KeyCode::Esc || app.keys.help.matches(&key_event) {
        app.exit_help_mode();
    }
    // Ignore all other keys in help mode
}

fn handle_compose_mode(app: &mut App, key_event: KeyEvent) {
    if app.keys.publish.matches(&key_event) {
        app.publish_entry();
        return;
    }
    match key_event.code {
        KeyCode::Esc => app.exit_compose_mode(),
        KeyCode::Enter => app.dashboard.drafts.entry.push('\n'),
        KeyCode::Backspace => {
            app.dashboard.drafts.entry.pop();
        }
        KeyCode::Char(c) if !crate::utils::has_primary_modifier(key_event.modifiers) => {
            app.dashboard.drafts.entry.push(c);
        }
        _ => {}
    }
}

fn handle_chat_mode(app: &mut App, key_event: KeyEvent) {
    if app.keys.reset_chat.matches(&key_event) {
        app.reset_chat();
        return;
    }
    match key_event.code {
        KeyCode::Esc => app.close_chat(),
        KeyCode::Enter => app.send_chat(),
        KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Backspace => {
            app.dashboard.drafts.chat.pop();
        }
        KeyCode::Char(c) if !crate::utils::has_primary_modifier(key_event.modifiers) => {
            app.dashboard.drafts.chat.push(c);
        }
        _ => {}
    }
}

fn handle_goals_mode(app: &mut App, key_event: KeyEvent) {
    if app.keys.delete_goal.matches(&key_event) {
        app.delete_selected_goal();
        return;
    }
    match key_event.code {
        KeyCode::Esc => app.close_goals(),
        KeyCode::Enter => app.add_goal(),
        KeyCode::Up => app.move_goal_up(),
        KeyCode::Down => app.move_goal_down(),
        KeyCode::Backspace => {
            app.dashboard.drafts.goal.pop();
        }
        KeyCode::Char(c) if !crate::utils::has_primary_modifier(key_event.modifiers) => {
            app.dashboard.drafts.goal.push(c);
        }
        _ => {}
    }
}

/// Feed bindings come from the config. Returns true to quit.
fn handle_feed_key_bindings(app: &mut App, key_event: KeyEvent) -> bool {
    let keys = app.keys.clone();

    if keys.quit.matches(&key_event) {
        return true;
    }

    if keys.help.matches(&key_event) {
        app.enter_help_mode();
    } else if keys.compose.matches(&key_event) {
        app.enter_compose_mode();
    } else if keys.delete.matches(&key_event) {
        app.request_delete();
    } else if keys.toggle_select.matches(&key_event) {
        app.toggle_selected_entry();
    } else if keys.analyze.matches(&key_event) {
        app.run_analysis();
    } else if keys.clear_selection.matches(&key_event) {
        app.clear_selection();
    } else if keys.chat.matches(&key_event) {
        app.open_chat();
    } else if keys.goals.matches(&key_event) {
        app.open_goals();
    } else if keys.open_note.matches(&key_event) {
        app.open_note();
    } else if keys.reload.matches(&key_event) {
        app.reload();
    } else if keys.list_up.matches(&key_event) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if keys.list_down.matches(&key_event) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{ChatContextSettings, Dashboard};
    use crate::session::{ConfiguredIdentity, Session, DEMO_USER_ID};
    use crate::models::RecordId;
    use crate::testing::{entry, goal, settle, Call, ScriptedApi};
    use crate::timestamp::DisplayZone;
    use crate::Config;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn app() -> App {
        app_with(Arc::new(ScriptedApi::with_entries(vec![entry(1, "a")])), Config::default())
    }

    fn app_with(api: Arc<ScriptedApi>, config: Config) -> App {
        let session = Session::resolve(true, &ConfiguredIdentity::default(), DEMO_USER_ID);
        let dashboard = Dashboard::new(session, ChatContextSettings::default());
        App::new(config, DisplayZone::default(), dashboard, api).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    #[test]
    fn quit_only_from_feed() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::Compose);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.dashboard.drafts.entry, "q");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.ui.mode, Mode::Feed);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn typing_goes_to_the_focused_draft() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));
        for c in "hey".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.dashboard.drafts.chat, "he");
        assert!(app.dashboard.drafts.entry.is_empty());

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.dashboard.drafts.goal, "x");
    }

    #[test]
    fn help_toggles_with_its_key() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.ui.mode, Mode::Help);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::Help);
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.ui.mode, Mode::Feed);
    }

    #[test]
    fn goal_delete_follows_its_binding() {
        let api = Arc::new(ScriptedApi::new(Vec::new(), vec![goal(7, "Sleep by 11")]));
        let mut app = app_with(api.clone(), Config::default());
        settle(&mut app);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.ui.mode, Mode::Goals);

        // Plain letters type into the draft, the binding needs Ctrl
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.dashboard.drafts.goal, "d");
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL)).unwrap();
        settle(&mut app);

        assert!(app.dashboard.goals().is_empty());
        assert_eq!(app.dashboard.drafts.goal, "d");
        assert_eq!(api.writes(), vec![Call::DeleteGoal(RecordId::Int(7))]);
    }

    #[test]
    fn goal_delete_binding_is_configurable() {
        let api = Arc::new(ScriptedApi::new(Vec::new(), vec![goal(7, "Sleep by 11")]));
        let mut config = Config::default();
        config.key_bindings.delete_goal = "Delete".to_string();
        let mut app = app_with(api.clone(), config);
        settle(&mut app);
        press(&mut app, KeyCode::Char('g'));

        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL)).unwrap();
        settle(&mut app);
        assert!(api.writes().is_empty());

        press(&mut app, KeyCode::Delete);
        settle(&mut app);
        assert_eq!(api.writes(), vec![Call::DeleteGoal(RecordId::Int(7))]);
    }
}

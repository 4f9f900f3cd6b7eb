use crate::api::JournalApi;
use crate::config::KeyBindings;
use crate::dashboard::{Action, BackgroundRunner, Dashboard};
use crate::models::{Entry, EntryId, Goal};
use crate::timestamp::DisplayZone;
use crate::tui::error::TuiError;
use crate::utils::{parse_key_binding, ParsedKeyBinding};
use crate::Config;
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Feed,
    Compose,
    Chat,
    Goals,
    Help,
}

/// Options of the delete confirmation modal, top to bottom
pub const DELETE_OPTION: usize = 0;
pub const CANCEL_OPTION: usize = 1;

/// Key bindings parsed once at startup
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
    pub compose: ParsedKeyBinding,
    pub publish: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub toggle_select: ParsedKeyBinding,
    pub analyze: ParsedKeyBinding,
    pub clear_selection: ParsedKeyBinding,
    pub chat: ParsedKeyBinding,
    pub reset_chat: ParsedKeyBinding,
    pub goals: ParsedKeyBinding,
    pub delete_goal: ParsedKeyBinding,
    pub open_note: ParsedKeyBinding,
    pub reload: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
}

impl KeyMap {
    pub fn from_bindings(bindings: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |name: &str, value: &str| {
            parse_key_binding(value)
                .map_err(|e| TuiError::KeyBindingError(format!("{}: {}", name, e)))
        };
        Ok(Self {
            quit: parse("quit", &bindings.quit)?,
            help: parse("help", &bindings.help)?,
            compose: parse("compose", &bindings.compose)?,
            publish: parse("publish", &bindings.publish)?,
            delete: parse("delete", &bindings.delete)?,
            toggle_select: parse("toggle_select", &bindings.toggle_select)?,
            analyze: parse("analyze", &bindings.analyze)?,
            clear_selection: parse("clear_selection", &bindings.clear_selection)?,
            chat: parse("chat", &bindings.chat)?,
            reset_chat: parse("reset_chat", &bindings.reset_chat)?,
            goals: parse("goals", &bindings.goals)?,
            delete_goal: parse("delete_goal", &bindings.delete_goal)?,
            open_note: parse("open_note", &bindings.open_note)?,
            reload: parse("reload", &bindings.reload)?,
            list_up: parse("list_up", &bindings.list_up)?,
            list_down: parse("list_down", &bindings.list_down)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    pub goal_index: usize,
    pub goal_list_state: ListState,
    /// Lines scrolled up from the bottom of the transcript
    pub chat_scroll: usize,
    pub note_scroll: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::Feed,
            selected_index: 0,
            list_state: ListState::default(),
            goal_index: 0,
            goal_list_state: ListState::default(),
            chat_scroll: 0,
            note_scroll: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModalState {
    pub delete_selection: usize,
    /// Entry whose AI note is open in the popup
    pub expanded_note: Option<EntryId>,
}

impl Default for ModalState {
    fn default() -> Self {
        Self {
            delete_selection: CANCEL_OPTION,
            expanded_note: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub zone: DisplayZone,
    pub keys: KeyMap,
    pub dashboard: Dashboard,
    runner: BackgroundRunner,

    pub ui: UiState,
    pub modals: ModalState,
    pub status: StatusState,
}

impl App {
    /// Build the app and start the initial load in the background
    pub fn new(
        config: Config,
        zone: DisplayZone,
        mut dashboard: Dashboard,
        api: Arc<dyn JournalApi>,
    ) -> Result<Self, TuiError> {
        let keys = KeyMap::from_bindings(&config.key_bindings)?;
        let mut runner = BackgroundRunner::new(api);
        runner.submit(dashboard.start());

        Ok(Self {
            config,
            zone,
            keys,
            dashboard,
            runner,
            ui: UiState::default(),
            modals: ModalState::default(),
            status: StatusState::default(),
        })
    }

    fn dispatch(&mut self, action: Action) {
        let requests = self.dashboard.dispatch(action);
        self.runner.submit(requests);
    }

    /// Apply whatever responses have come back. Returns true if the
    /// dashboard changed.
    pub fn tick(&mut self) -> bool {
        let changed = self.runner.drain(&mut self.dashboard);
        if changed {
            self.clamp_selection();
            if let Some(message) = self.dashboard.take_last_failure() {
                self.set_status_message(message);
            }
            // Close the note popup if its entry went away
            if let Some(id) = &self.modals.expanded_note
                && self.dashboard.find_entry(id).is_none()
            {
                self.modals.expanded_note = None;
            }
        }
        self.check_status_message_timeout();
        changed
    }

    /// Requests still waiting on the Journal API
    pub fn in_flight(&self) -> usize {
        self.runner.in_flight()
    }

    pub fn is_loading(&self) -> bool {
        self.runner.in_flight() > 0
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.dashboard.entries().get(self.ui.selected_index)
    }

    pub fn selected_goal(&self) -> Option<&Goal> {
        self.dashboard.goals().get(self.ui.goal_index)
    }

    pub fn expanded_note_entry(&self) -> Option<&Entry> {
        self.modals
            .expanded_note
            .as_ref()
            .and_then(|id| self.dashboard.find_entry(id))
    }

    /// Keep cursors inside the lists after a reload shrinks them
    pub fn clamp_selection(&mut self) {
        let entries = self.dashboard.entries().len();
        if entries == 0 {
            self.ui.selected_index = 0;
            self.ui.list_state.select(None);
        } else {
            self.ui.selected_index = self.ui.selected_index.min(entries - 1);
            self.ui.list_state.select(Some(self.ui.selected_index));
        }

        let goals = self.dashboard.goals().len();
        if goals == 0 {
            self.ui.goal_index = 0;
            self.ui.goal_list_state.select(None);
        } else {
            self.ui.goal_index = self.ui.goal_index.min(goals - 1);
            self.ui.goal_list_state.select(Some(self.ui.goal_index));
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
        }
        self.clamp_selection();
    }

    pub fn move_selection_down(&mut self) {
        self.ui.selected_index += 1;
        self.clamp_selection();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time
            && time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS
        {
            self.clear_status_message();
        }
    }

    pub fn reload(&mut self) {
        self.dispatch(Action::Load);
        self.set_status_message("Refreshing...".to_string());
    }

    // Selection and analysis

    pub fn toggle_selected_entry(&mut self) {
        if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
            self.dispatch(Action::ToggleSelect(id));
        }
    }

    pub fn clear_selection(&mut self) {
        self.dispatch(Action::ClearSelection);
    }

    pub fn run_analysis(&mut self) {
        if self.dashboard.selection().is_empty() {
            self.set_status_message("Select entries to analyze first".to_string());
            return;
        }
        if self.dashboard.busy().analyzing {
            self.set_status_message("Analysis already running".to_string());
            return;
        }
        let count = self.dashboard.selection().len();
        self.dispatch(Action::BatchAnalyze);
        self.set_status_message(format!("Analyzing {} entries...", count));
    }

    // Delete confirmation

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
            self.modals.delete_selection = CANCEL_OPTION;
            self.dispatch(Action::RequestDeleteEntry(id));
        }
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.dashboard.pending_delete().is_some()
    }

    pub fn toggle_delete_selection(&mut self) {
        self.modals.delete_selection = match self.modals.delete_selection {
            DELETE_OPTION => CANCEL_OPTION,
            _ => DELETE_OPTION,
        };
    }

    pub fn confirm_delete(&mut self, confirmed: bool) {
        self.dispatch(Action::ConfirmDelete(confirmed));
        self.modals.delete_selection = CANCEL_OPTION;
        if confirmed {
            self.set_status_message("Deleting entry...".to_string());
        }
    }

    /// Enter on the modal runs whichever option is highlighted
    pub fn confirm_delete_selection(&mut self) {
        let confirmed = self.modals.delete_selection == DELETE_OPTION;
        self.confirm_delete(confirmed);
    }

    // AI note popup

    pub fn open_note(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let with_note = entry.analysis_note().map(|_| entry.id.clone());
        match with_note {
            Some(id) => {
                self.modals.expanded_note = Some(id);
                self.ui.note_scroll = 0;
            }
            None => self.set_status_message("No AI note for this entry yet".to_string()),
        }
    }

    pub fn close_note(&mut self) {
        self.modals.expanded_note = None;
        self.ui.note_scroll = 0;
    }

    pub fn scroll_note_up(&mut self) {
        self.ui.note_scroll = self.ui.note_scroll.saturating_sub(1);
    }

    pub fn scroll_note_down(&mut self) {
        // Render clamps it
        self.ui.note_scroll += 1;
    }

    // Compose

    pub fn enter_compose_mode(&mut self) {
        self.ui.mode = Mode::Compose;
    }

    /// Leave compose mode; the draft is kept for next time
    pub fn exit_compose_mode(&mut self) {
        self.ui.mode = Mode::Feed;
    }

    pub fn publish_entry(&mut self) {
        if self.dashboard.drafts.entry.trim().is_empty() {
            self.set_status_message("Nothing to publish".to_string());
            return;
        }
        if self.dashboard.busy().publishing {
            self.set_status_message("Still publishing the last entry".to_string());
            return;
        }
        let content = self.dashboard.drafts.entry.clone();
        self.dispatch(Action::CreateEntry { content });
        self.ui.mode = Mode::Feed;
        self.set_status_message("Publishing...".to_string());
    }

    // Chat

    pub fn open_chat(&mut self) {
        self.ui.mode = Mode::Chat;
        self.ui.chat_scroll = 0;
    }

    /// Closing keeps the transcript
    pub fn close_chat(&mut self) {
        self.ui.mode = Mode::Feed;
    }

    pub fn send_chat(&mut self) {
        let message = self.dashboard.drafts.chat.clone();
        self.dispatch(Action::SendChat { message });
        self.ui.chat_scroll = 0;
    }

    pub fn reset_chat(&mut self) {
        self.dispatch(Action::ResetChat);
        self.ui.chat_scroll = 0;
        self.set_status_message("Chat cleared".to_string());
    }

    pub fn scroll_chat_up(&mut self) {
        self.ui.chat_scroll += 1;
    }

    pub fn scroll_chat_down(&mut self) {
        self.ui.chat_scroll = self.ui.chat_scroll.saturating_sub(1);
    }

    // Goals

    pub fn open_goals(&mut self) {
        self.ui.mode = Mode::Goals;
        self.clamp_selection();
    }

    pub fn close_goals(&mut self) {
        self.ui.mode = Mode::Feed;
    }

    pub fn add_goal(&mut self) {
        if self.dashboard.drafts.goal.trim().is_empty() {
            return;
        }
        let title = self.dashboard.drafts.goal.clone();
        self.dispatch(Action::CreateGoal { title });
    }

    pub fn delete_selected_goal(&mut self) {
        if let Some(id) = self.selected_goal().map(|g| g.id.clone()) {
            self.dispatch(Action::DeleteGoal(id));
        }
    }

    pub fn move_goal_up(&mut self) {
        self.ui.goal_index = self.ui.goal_index.saturating_sub(1);
        self.clamp_selection();
    }

    pub fn move_goal_down(&mut self) {
        self.ui.goal_index += 1;
        self.clamp_selection();
    }

    // Help

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::Feed;
    }

    /// Greeting shown in the header
    pub fn greeting(&self) -> String {
        format!("Hello, {}", self.dashboard.session().display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ChatContextSettings;
    use crate::models::{ChatRole, RecordId};
    use crate::session::{ConfiguredIdentity, Session, DEMO_USER_ID};
    use crate::testing::{entry, settle, Call, ScriptedApi};

    fn app_with(api: Arc<ScriptedApi>) -> App {
        let session = Session::resolve(true, &ConfiguredIdentity::default(), DEMO_USER_ID);
        let dashboard = Dashboard::new(session, ChatContextSettings::default());
        let mut app = App::new(Config::default(), DisplayZone::default(), dashboard, api).unwrap();
        settle(&mut app);
        app
    }

    #[test]
    fn startup_loads_the_feed() {
        let api = Arc::new(ScriptedApi::with_entries(vec![entry(2, "newer"), entry(1, "older")]));
        let app = app_with(api.clone());
        assert_eq!(app.dashboard.entries().len(), 2);
        assert_eq!(app.selected_entry().map(|e| e.content.as_str()), Some("newer"));
        assert_eq!(
            api.calls(),
            vec![Call::ListEntries(DEMO_USER_ID.to_string()), Call::ListGoals(DEMO_USER_ID.to_string())]
        );
        assert_eq!(app.greeting(), "Hello, Demo User");
    }

    #[test]
    fn bad_key_binding_is_reported() {
        let mut config = Config::default();
        config.key_bindings.reload = "Ctrl+".to_string();
        let session = Session::resolve(true, &ConfiguredIdentity::default(), DEMO_USER_ID);
        let dashboard = Dashboard::new(session, ChatContextSettings::default());
        let result = App::new(config, DisplayZone::default(), dashboard, Arc::new(ScriptedApi::default()));
        assert!(matches!(result, Err(TuiError::KeyBindingError(_))));
    }

    #[test]
    fn publish_adds_entry_and_leaves_compose() {
        let api = Arc::new(ScriptedApi::default());
        let mut app = app_with(api.clone());
        app.enter_compose_mode();
        app.dashboard.drafts.entry = "slept well".to_string();
        app.publish_entry();
        assert_eq!(app.ui.mode, Mode::Feed);
        settle(&mut app);

        assert_eq!(app.dashboard.entries()[0].content, "slept well");
        assert!(!app.dashboard.busy().publishing);
        assert!(app.dashboard.drafts.entry.is_empty());
    }

    #[test]
    fn blank_draft_is_not_published() {
        let api = Arc::new(ScriptedApi::default());
        let mut app = app_with(api.clone());
        app.enter_compose_mode();
        app.dashboard.drafts.entry = "  \n".to_string();
        app.publish_entry();
        settle(&mut app);

        assert_eq!(app.ui.mode, Mode::Compose);
        assert!(api.writes().is_empty());
        assert_eq!(app.status.message.as_deref(), Some("Nothing to publish"));
    }

    #[test]
    fn delete_modal_defaults_to_cancel() {
        let api = Arc::new(ScriptedApi::with_entries(vec![entry(1, "keep me")]));
        let mut app = app_with(api.clone());
        app.request_delete();
        assert!(app.is_confirming_delete());

        app.confirm_delete_selection();
        settle(&mut app);
        assert!(!app.is_confirming_delete());
        assert_eq!(app.dashboard.entries().len(), 1);
        assert!(api.writes().is_empty());
    }

    #[test]
    fn confirmed_delete_removes_entry() {
        let api = Arc::new(ScriptedApi::with_entries(vec![entry(1, "a"), entry(2, "b")]));
        let mut app = app_with(api);
        app.move_selection_down();
        app.request_delete();
        app.toggle_delete_selection();
        app.confirm_delete_selection();
        settle(&mut app);

        let ids: Vec<_> = app.dashboard.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec![RecordId::Int(1)]);
        assert_eq!(app.ui.selected_index, 0);
    }

    #[test]
    fn analysis_clears_selection_and_enables_note() {
        let api = Arc::new(ScriptedApi::with_entries(vec![entry(1, "a"), entry(2, "b")]));
        let mut app = app_with(api);

        app.open_note();
        assert!(app.modals.expanded_note.is_none());

        app.toggle_selected_entry();
        app.run_analysis();
        settle(&mut app);

        assert!(app.dashboard.selection().is_empty());
        assert!(!app.dashboard.busy().analyzing);
        assert!(app.dashboard.entries()[0].is_analyzed());
        assert!(!app.dashboard.entries()[1].is_analyzed());

        app.open_note();
        assert_eq!(app.modals.expanded_note, Some(RecordId::Int(1)));
    }

    #[test]
    fn failed_analysis_shows_status_and_drops_selection() {
        let api = Arc::new(ScriptedApi::with_entries(vec![entry(1, "a")]));
        api.fail("analyze_batch");
        let mut app = app_with(api);

        app.toggle_selected_entry();
        app.run_analysis();
        settle(&mut app);

        assert!(app.dashboard.selection().is_empty());
        assert_eq!(app.status.message.as_deref(), Some("Failed to analyze entries"));
    }

    #[test]
    fn chat_round_trip_keeps_history_when_closed() {
        let api = Arc::new(ScriptedApi::with_entries(vec![entry(1, "ran 5k")]));
        let mut app = app_with(api.clone());
        app.open_chat();
        app.dashboard.drafts.chat = "How was my week?".to_string();
        app.send_chat();
        settle(&mut app);

        let roles: Vec<_> = app.dashboard.chat_history().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
        assert_eq!(api.last_chat_context().as_deref(), Some("ran 5k"));

        app.close_chat();
        app.open_chat();
        assert_eq!(app.dashboard.chat_history().len(), 2);

        app.reset_chat();
        assert!(app.dashboard.chat_history().is_empty());
    }

    #[test]
    fn goals_add_and_delete() {
        let api = Arc::new(ScriptedApi::default());
        let mut app = app_with(api);
        app.open_goals();
        app.dashboard.drafts.goal = "Sleep by 11".to_string();
        app.add_goal();
        settle(&mut app);
        assert_eq!(app.dashboard.goals().len(), 1);
        assert!(app.dashboard.drafts.goal.is_empty());

        app.delete_selected_goal();
        settle(&mut app);
        assert!(app.dashboard.goals().is_empty());
        assert_eq!(app.ui.goal_list_state.selected(), None);
    }
}

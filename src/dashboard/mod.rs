//! Client-side state of the journal dashboard.
//!
//! [`Dashboard`] never talks to the network. Every action returns the
//! [`Request`]s that should be run against the Journal API, and the
//! [`Response`]s are handed back through [`Dashboard::handle`]. A runner
//! (see [`runner`]) decides whether requests run inline or on worker threads.

pub mod insights;
pub mod request;
pub mod runner;

pub use insights::{MoodPoint, mood_series};
pub use request::{Action, BusyKind, Request, Response, Snapshot};
pub use runner::{BackgroundRunner, SyncRunner, execute};

use crate::models::{ChatMessage, Entry, EntryId, Goal};
use crate::session::Session;

pub const DEFAULT_CHAT_CONTEXT_ENTRIES: usize = 5;
pub const DEFAULT_CHAT_CONTEXT_SEPARATOR: &str = " | ";

/// Text being typed into the three input boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drafts {
    pub entry: String,
    pub goal: String,
    pub chat: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyState {
    pub publishing: bool,
    pub analyzing: bool,
}

impl BusyState {
    fn set(&mut self, kind: BusyKind, value: bool) {
        match kind {
            BusyKind::Publishing => self.publishing = value,
            BusyKind::Analyzing => self.analyzing = value,
        }
    }
}

/// How much of the journal is handed to the assistant with each message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContextSettings {
    pub entries: usize,
    pub separator: String,
}

impl Default for ChatContextSettings {
    fn default() -> Self {
        Self {
            entries: DEFAULT_CHAT_CONTEXT_ENTRIES,
            separator: DEFAULT_CHAT_CONTEXT_SEPARATOR.to_string(),
        }
    }
}

pub struct Dashboard {
    session: Session,
    chat_context: ChatContextSettings,

    entries: Vec<Entry>,
    goals: Vec<Goal>,
    selection: Vec<EntryId>,
    chat: Vec<ChatMessage>,
    pub drafts: Drafts,

    busy: BusyState,
    pending_delete: Option<EntryId>,

    // Reload ordering: last issued and last applied sequence numbers
    load_seq: u64,
    applied_seq: u64,

    chat_session: u64,
    chat_pending: usize,

    last_failure: Option<String>,
}

impl Dashboard {
    pub fn new(session: Session, chat_context: ChatContextSettings) -> Self {
        Self {
            session,
            chat_context,
            entries: Vec::new(),
            goals: Vec::new(),
            selection: Vec::new(),
            chat: Vec::new(),
            drafts: Drafts::default(),
            busy: BusyState::default(),
            pending_delete: None,
            load_seq: 0,
            applied_seq: 0,
            chat_session: 0,
            chat_pending: 0,
            last_failure: None,
        }
    }

    /// Initial load for a freshly started session
    pub fn start(&mut self) -> Vec<Request> {
        log::info!("Starting session for user {}", self.session.user_id());
        self.dispatch(Action::Load)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn selection(&self) -> &[EntryId] {
        &self.selection
    }

    pub fn is_selected(&self, id: &EntryId) -> bool {
        self.selection.contains(id)
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn chat_pending(&self) -> usize {
        self.chat_pending
    }

    pub fn busy(&self) -> BusyState {
        self.busy
    }

    pub fn pending_delete(&self) -> Option<&EntryId> {
        self.pending_delete.as_ref()
    }

    pub fn find_entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Most recent API failure, cleared on read. Only used for a status line.
    pub fn take_last_failure(&mut self) -> Option<String> {
        self.last_failure.take()
    }

    /// Context string sent with chat messages: the newest entries' content,
    /// in the order the loader returned them.
    pub fn chat_context(&self) -> String {
        self.entries
            .iter()
            .take(self.chat_context.entries)
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join(&self.chat_context.separator)
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Request> {
        match action {
            Action::Load => vec![self.reload(None)],
            Action::CreateEntry { content } => self.create_entry(content),
            Action::RequestDeleteEntry(id) => {
                self.pending_delete = Some(id);
                Vec::new()
            }
            Action::ConfirmDelete(confirmed) => self.confirm_delete(confirmed),
            Action::ToggleSelect(id) => {
                self.toggle_select(id);
                Vec::new()
            }
            Action::ClearSelection => {
                self.selection.clear();
                Vec::new()
            }
            Action::BatchAnalyze => self.batch_analyze(),
            Action::CreateGoal { title } => self.create_goal(title),
            Action::DeleteGoal(id) => {
                log::info!("Deleting goal {}", id);
                vec![Request::DeleteGoal { id }]
            }
            Action::SendChat { message } => self.send_chat(message),
            Action::ResetChat => {
                self.chat.clear();
                self.chat_pending = 0;
                self.chat_session += 1;
                Vec::new()
            }
        }
    }

    pub fn handle(&mut self, response: Response) -> Vec<Request> {
        match response {
            Response::Loaded { seq, release, result } => {
                if let Some(kind) = release {
                    self.busy.set(kind, false);
                }
                self.apply_load(seq, result);
                Vec::new()
            }
            Response::EntryCreated(result) => {
                match result {
                    Ok(Some(id)) => log::info!("Created entry {}", id),
                    Ok(None) => log::info!("Created entry"),
                    Err(e) => self.record_failure("create entry", &e),
                }
                vec![self.reload(Some(BusyKind::Publishing))]
            }
            Response::EntryDeleted { id, result } => {
                match result {
                    Ok(()) => log::info!("Deleted entry {}", id),
                    Err(e) => self.record_failure("delete entry", &e),
                }
                vec![self.reload(None)]
            }
            Response::BatchAnalyzed { entry_ids, result } => {
                // Cleared whether or not the analysis went through
                self.selection.clear();
                match result {
                    Ok(()) => log::info!("Analyzed {} entries", entry_ids.len()),
                    Err(e) => {
                        log::warn!("Batch analysis failed, dropping selection of {:?}", entry_ids);
                        self.record_failure("analyze entries", &e);
                    }
                }
                vec![self.reload(Some(BusyKind::Analyzing))]
            }
            Response::GoalCreated(result) => {
                match result {
                    Ok(Some(id)) => log::info!("Created goal {}", id),
                    Ok(None) => log::info!("Created goal"),
                    Err(e) => self.record_failure("create goal", &e),
                }
                vec![self.reload(None)]
            }
            Response::GoalDeleted { id, result } => {
                match result {
                    Ok(()) => log::info!("Deleted goal {}", id),
                    Err(e) => self.record_failure("delete goal", &e),
                }
                vec![self.reload(None)]
            }
            Response::ChatReplied { chat_session, result } => {
                if chat_session != self.chat_session {
                    log::debug!("Discarding reply for chat session {}", chat_session);
                    return Vec::new();
                }
                self.chat_pending = self.chat_pending.saturating_sub(1);
                match result {
                    Ok(reply) => self.chat.push(ChatMessage::assistant(reply)),
                    Err(e) => self.record_failure("chat", &e),
                }
                Vec::new()
            }
        }
    }

    fn reload(&mut self, release: Option<BusyKind>) -> Request {
        self.load_seq += 1;
        Request::Load {
            user_id: self.session.user_id().to_string(),
            seq: self.load_seq,
            release,
        }
    }

    fn apply_load(&mut self, seq: u64, result: Result<Snapshot, crate::api::ApiError>) {
        if seq <= self.applied_seq {
            log::debug!("Discarding stale reload {} (applied {})", seq, self.applied_seq);
            return;
        }
        match result {
            Ok(snapshot) => {
                self.applied_seq = seq;
                self.entries = snapshot.entries;
                self.goals = snapshot.goals;
                // Forget selected entries that no longer exist
                let entries = &self.entries;
                self.selection.retain(|id| entries.iter().any(|e| &e.id == id));
            }
            Err(e) => self.record_failure("load journal", &e),
        }
    }

    fn create_entry(&mut self, content: String) -> Vec<Request> {
        if content.trim().is_empty() || self.busy.publishing {
            return Vec::new();
        }
        self.busy.publishing = true;
        self.drafts.entry.clear();
        log::info!("Publishing entry ({} chars)", content.chars().count());
        vec![Request::CreateEntry {
            user_id: self.session.user_id().to_string(),
            content,
        }]
    }

    fn confirm_delete(&mut self, confirmed: bool) -> Vec<Request> {
        match self.pending_delete.take() {
            Some(id) if confirmed => {
                log::info!("Deleting entry {}", id);
                vec![Request::DeleteEntry { id }]
            }
            _ => Vec::new(),
        }
    }

    fn toggle_select(&mut self, id: EntryId) {
        if let Some(pos) = self.selection.iter().position(|s| s == &id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
    }

    fn batch_analyze(&mut self) -> Vec<Request> {
        if self.selection.is_empty() || self.busy.analyzing {
            return Vec::new();
        }
        self.busy.analyzing = true;
        log::info!("Requesting analysis of {} entries", self.selection.len());
        vec![Request::AnalyzeBatch { entry_ids: self.selection.clone() }]
    }

    fn create_goal(&mut self, title: String) -> Vec<Request> {
        if title.trim().is_empty() {
            return Vec::new();
        }
        self.drafts.goal.clear();
        vec![Request::CreateGoal {
            user_id: self.session.user_id().to_string(),
            title,
        }]
    }

    fn send_chat(&mut self, message: String) -> Vec<Request> {
        if message.trim().is_empty() {
            return Vec::new();
        }
        let context = self.chat_context();
        self.chat.push(ChatMessage::user(message.clone()));
        self.drafts.chat.clear();
        self.chat_pending += 1;
        vec![Request::Chat {
            message,
            context,
            chat_session: self.chat_session,
        }]
    }

    fn record_failure(&mut self, what: &str, error: &crate::api::ApiError) {
        log::error!("Failed to {}: {}", what, error);
        self.last_failure = Some(format!("Failed to {}", what));
    }
}

use crate::api::ApiError;
use crate::models::{Entry, EntryId, Goal, GoalId};

/// Everything a user can ask the dashboard to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Load,
    CreateEntry { content: String },
    /// Opens the confirmation gate; nothing is sent yet.
    RequestDeleteEntry(EntryId),
    /// Answer to the confirmation gate.
    ConfirmDelete(bool),
    ToggleSelect(EntryId),
    ClearSelection,
    BatchAnalyze,
    CreateGoal { title: String },
    DeleteGoal(GoalId),
    SendChat { message: String },
    ResetChat,
}

/// Actions that hold a busy flag while their request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyKind {
    Publishing,
    Analyzing,
}

/// A call the dashboard wants made against the Journal API.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Load {
        user_id: String,
        seq: u64,
        /// Busy flag to release once this reload resolves
        release: Option<BusyKind>,
    },
    CreateEntry { user_id: String, content: String },
    DeleteEntry { id: EntryId },
    AnalyzeBatch { entry_ids: Vec<EntryId> },
    CreateGoal { user_id: String, title: String },
    DeleteGoal { id: GoalId },
    Chat {
        message: String,
        context: String,
        chat_session: u64,
    },
}

impl Request {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::Load { .. } => "load",
            Request::CreateEntry { .. } => "create-entry",
            Request::DeleteEntry { .. } => "delete-entry",
            Request::AnalyzeBatch { .. } => "analyze-batch",
            Request::CreateGoal { .. } => "create-goal",
            Request::DeleteGoal { .. } => "delete-goal",
            Request::Chat { .. } => "chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub goals: Vec<Goal>,
}

/// Result of a [`Request`], fed back into the dashboard.
#[derive(Debug)]
pub enum Response {
    Loaded {
        seq: u64,
        release: Option<BusyKind>,
        result: Result<Snapshot, ApiError>,
    },
    EntryCreated(Result<Option<EntryId>, ApiError>),
    EntryDeleted {
        id: EntryId,
        result: Result<(), ApiError>,
    },
    BatchAnalyzed {
        entry_ids: Vec<EntryId>,
        result: Result<(), ApiError>,
    },
    GoalCreated(Result<Option<GoalId>, ApiError>),
    GoalDeleted {
        id: GoalId,
        result: Result<(), ApiError>,
    },
    ChatReplied {
        chat_session: u64,
        result: Result<String, ApiError>,
    },
}

//! Scripted Journal API shared by the unit and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-util` feature, which the
//! integration tests pull in through the self dev-dependency.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::api::{ApiError, JournalApi};
use crate::dashboard::{ChatContextSettings, Dashboard};
use crate::models::{Entry, EntryId, Goal, GoalId, RecordId};
use crate::session::{ConfiguredIdentity, Session, DEMO_USER_ID};
use crate::tui::App;

/// One call as the API saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Health,
    ListEntries(String),
    CreateEntry { user_id: String, content: String },
    DeleteEntry(EntryId),
    AnalyzeBatch(Vec<EntryId>),
    ListGoals(String),
    CreateGoal { user_id: String, title: String },
    DeleteGoal(GoalId),
    Chat { message: String, context: String },
}

#[derive(Default)]
struct Store {
    entries: Vec<Entry>,
    goals: Vec<Goal>,
    next_id: i64,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
}

/// Serves a small in-memory journal, newest entries first, and records
/// every call
#[derive(Default)]
pub struct ScriptedApi {
    store: Mutex<Store>,
}

impl ScriptedApi {
    pub fn new(entries: Vec<Entry>, goals: Vec<Goal>) -> Self {
        let api = Self::default();
        {
            let mut store = api.lock();
            store.entries = entries;
            store.goals = goals;
            store.next_id = 1000;
        }
        api
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self::new(entries, Vec::new())
    }

    /// Later calls to `endpoint` ("create_entry", "analyze_batch", ...) fail
    pub fn fail(&self, endpoint: &'static str) {
        self.lock().failing.insert(endpoint);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Calls other than the reads
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ListEntries(_) | Call::ListGoals(_) | Call::Health))
            .collect()
    }

    pub fn last_chat_context(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::Chat { context, .. } => Some(context),
            _ => None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, endpoint: &'static str, call: Call) -> Result<MutexGuard<'_, Store>, ApiError> {
        let mut store = self.lock();
        store.calls.push(call);
        if store.failing.contains(endpoint) {
            return Err(ApiError::Status { status: 503, body: "unavailable".to_string() });
        }
        Ok(store)
    }
}

impl JournalApi for ScriptedApi {
    fn health(&self) -> Result<serde_json::Value, ApiError> {
        self.enter("health", Call::Health)?;
        Ok(serde_json::json!({ "message": "MindScribe API is running" }))
    }

    fn list_entries(&self, user_id: &str) -> Result<Vec<Entry>, ApiError> {
        let store = self.enter("list_entries", Call::ListEntries(user_id.to_string()))?;
        Ok(store.entries.iter().filter(|e| e.user_id == user_id).cloned().collect())
    }

    fn create_entry(&self, user_id: &str, content: &str) -> Result<Option<EntryId>, ApiError> {
        let call = Call::CreateEntry { user_id: user_id.to_string(), content: content.to_string() };
        let mut store = self.enter("create_entry", call)?;
        store.next_id += 1;
        let created = Entry {
            id: RecordId::Int(store.next_id),
            user_id: user_id.to_string(),
            content: content.to_string(),
            created_at: Some("2026-01-15T08:00:00".to_string()),
            mood_score: Some(0),
            mood_label: None,
            goal_analysis: None,
        };
        let id = created.id.clone();
        store.entries.insert(0, created);
        Ok(Some(id))
    }

    fn delete_entry(&self, id: &EntryId) -> Result<(), ApiError> {
        let mut store = self.enter("delete_entry", Call::DeleteEntry(id.clone()))?;
        store.entries.retain(|e| &e.id != id);
        Ok(())
    }

    fn analyze_batch(&self, entry_ids: &[EntryId]) -> Result<(), ApiError> {
        let mut store = self.enter("analyze_batch", Call::AnalyzeBatch(entry_ids.to_vec()))?;
        for e in store.entries.iter_mut().filter(|e| entry_ids.contains(&e.id)) {
            e.mood_score = Some(6);
            e.mood_label = Some("reflective".to_string());
            e.goal_analysis = Some("Links to your goal of **better sleep**.".to_string());
        }
        Ok(())
    }

    fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>, ApiError> {
        let store = self.enter("list_goals", Call::ListGoals(user_id.to_string()))?;
        Ok(store.goals.iter().filter(|g| g.user_id == user_id).cloned().collect())
    }

    fn create_goal(&self, user_id: &str, title: &str) -> Result<Option<GoalId>, ApiError> {
        let call = Call::CreateGoal { user_id: user_id.to_string(), title: title.to_string() };
        let mut store = self.enter("create_goal", call)?;
        store.next_id += 1;
        let goal = Goal { id: RecordId::Int(store.next_id), user_id: user_id.to_string(), title: title.to_string() };
        let id = goal.id.clone();
        store.goals.push(goal);
        Ok(Some(id))
    }

    fn delete_goal(&self, id: &GoalId) -> Result<(), ApiError> {
        let mut store = self.enter("delete_goal", Call::DeleteGoal(id.clone()))?;
        store.goals.retain(|g| &g.id != id);
        Ok(())
    }

    fn chat(&self, message: &str, context: &str) -> Result<String, ApiError> {
        let call = Call::Chat { message: message.to_string(), context: context.to_string() };
        self.enter("chat", call)?;
        Ok(format!("Reflecting on: {}", message))
    }
}

pub fn entry(id: i64, content: &str) -> Entry {
    Entry {
        id: RecordId::Int(id),
        user_id: DEMO_USER_ID.to_string(),
        content: content.to_string(),
        created_at: Some("2026-01-14T16:00:00".to_string()),
        mood_score: None,
        mood_label: None,
        goal_analysis: None,
    }
}

pub fn goal(id: i64, title: &str) -> Goal {
    Goal { id: RecordId::Int(id), user_id: DEMO_USER_ID.to_string(), title: title.to_string() }
}

/// Newest first, like the loader returns them
pub fn journal(count: i64) -> Vec<Entry> {
    (1..=count).rev().map(|i| entry(i, &format!("day {}", i))).collect()
}

pub fn demo_dashboard() -> Dashboard {
    let session = Session::resolve(true, &ConfiguredIdentity::default(), DEMO_USER_ID);
    Dashboard::new(session, ChatContextSettings::default())
}

/// Pump the background runner until every request and follow-up has finished
pub fn settle(app: &mut App) {
    for _ in 0..400 {
        app.tick();
        if app.in_flight() == 0 {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("requests never settled");
}

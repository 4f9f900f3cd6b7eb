use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier. The API hands out integers today, but the
/// client never does arithmetic on them, so strings are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        // Keep numeric ids numeric so they serialize the way the server sent them
        match id.trim().parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(id.to_string()),
        }
    }
}

pub type EntryId = RecordId;
pub type GoalId = RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>, // ISO 8601, often without a zone designator
    #[serde(default)]
    pub mood_score: Option<i64>,    // 0-10, 0 = not analyzed yet
    #[serde(default)]
    pub mood_label: Option<String>,
    #[serde(default)]
    pub goal_analysis: Option<String>,
}

impl Entry {
    /// An entry counts as analyzed once the server has written a positive score.
    pub fn is_analyzed(&self) -> bool {
        self.mood_score.is_some_and(|score| score > 0)
    }

    /// "CALM 7/10" once analyzed, otherwise "UNANALYZED"
    pub fn mood_badge(&self) -> String {
        if self.is_analyzed() {
            format!(
                "{} {}/10",
                self.mood_label.as_deref().unwrap_or("?").to_uppercase(),
                self.mood_score.unwrap_or_default()
            )
        } else {
            "UNANALYZED".to_string()
        }
    }

    pub fn analysis_note(&self) -> Option<&str> {
        self.goal_analysis
            .as_deref()
            .filter(|note| !note.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, text: text.into() }
    }
}

// Request and response bodies of the Journal API

#[derive(Debug, Clone, Serialize)]
pub struct NewEntry<'a> {
    pub user_id: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGoal<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchAnalyzeRequest<'a> {
    pub entry_ids: &'a [EntryId],
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub context: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Whatever the create endpoints echo back. Only the id is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub id: Option<RecordId>,
}

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::api::{ApiError, JournalApi};
use crate::dashboard::{Action, Dashboard, SyncRunner};
use crate::models::{ChatRole, Entry, RecordId};
use crate::timestamp::DisplayZone;

#[derive(Parser)]
#[command(name = "mindscribe")]
#[command(about = "MindScribe - the nonsense-free cognitive journal, in your terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate config and log file)
    #[arg(long)]
    pub dev: bool,

    /// Use the shared demo identity instead of a signed-in user
    #[arg(long)]
    pub demo: bool,

    /// Signed-in user id (overrides the config file)
    #[arg(long)]
    pub user: Option<String>,

    /// Journal API base URL (overrides the config file)
    #[arg(long)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive dashboard (default if no subcommand)
    Tui,
    /// Check that the Journal API is reachable
    Health,
    /// List journal entries, newest first
    Entries,
    /// Publish a new journal entry
    Log {
        /// Entry content
        content: String,
    },
    /// Delete a journal entry
    DeleteEntry {
        /// Entry id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Run mood and goal analysis on entries
    Analyze {
        /// Entry ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List goals
    Goals,
    /// Add a goal
    AddGoal {
        /// Goal title
        title: String,
    },
    /// Delete a goal
    DeleteGoal {
        /// Goal id
        id: String,
    },
    /// Ask the assistant about your journal
    Chat {
        /// Question or message
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Journal API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("{0}")]
    RequestFailed(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Fail the command if the dashboard swallowed an API error along the way
fn check_failure(dashboard: &mut Dashboard) -> Result<(), CliError> {
    match dashboard.take_last_failure() {
        Some(message) => Err(CliError::RequestFailed(message)),
        None => Ok(()),
    }
}

fn load(dashboard: &mut Dashboard, runner: &SyncRunner) -> Result<(), CliError> {
    let requests = dashboard.start();
    runner.run(dashboard, requests);
    check_failure(dashboard)
}

/// Format one entry the way the dashboard cards show it
pub fn format_entry(entry: &Entry, zone: &DisplayZone) -> String {
    let created_at = entry.created_at.as_deref();
    let mut text = format!(
        "[{}] {} {}  {}\n  {}\n",
        entry.id,
        zone.format_date(created_at),
        zone.format_time(created_at),
        entry.mood_badge(),
        entry.content.trim().replace('\n', "\n  ")
    );
    if let Some(note) = entry.analysis_note() {
        text.push_str(&format!("  AI note: {}\n", note.trim().replace('\n', "\n  ")));
    }
    text
}

/// Handle the health command
pub fn handle_health(api: &dyn JournalApi, out: &mut impl Write) -> Result<(), CliError> {
    let status = api.health()?;
    writeln!(out, "Journal API is up: {}", status)?;
    Ok(())
}

/// Handle the entries command
pub fn handle_list_entries(
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    zone: &DisplayZone,
    out: &mut impl Write,
) -> Result<(), CliError> {
    load(dashboard, runner)?;

    if dashboard.entries().is_empty() {
        writeln!(out, "No entries yet. Start writing to see your insights.")?;
        return Ok(());
    }
    for entry in dashboard.entries() {
        writeln!(out, "{}", format_entry(entry, zone))?;
    }
    Ok(())
}

/// Handle the log command
pub fn handle_log(
    content: String,
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if content.trim().is_empty() {
        writeln!(out, "Nothing to publish")?;
        return Ok(());
    }
    runner.dispatch(dashboard, Action::CreateEntry { content });
    check_failure(dashboard)?;
    writeln!(out, "Entry published ({} entries)", dashboard.entries().len())?;
    Ok(())
}

/// Handle the delete-entry command. Asks for confirmation on `input`
/// unless `yes` is set.
pub fn handle_delete_entry(
    id: String,
    yes: bool,
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let id = RecordId::from(id.as_str());
    runner.dispatch(dashboard, Action::RequestDeleteEntry(id.clone()));

    let confirmed = yes || {
        write!(out, "Delete entry {}? [y/N] ", id)?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    };

    runner.dispatch(dashboard, Action::ConfirmDelete(confirmed));
    check_failure(dashboard)?;
    if confirmed {
        writeln!(out, "Entry {} deleted", id)?;
    } else {
        writeln!(out, "Cancelled")?;
    }
    Ok(())
}

/// Handle the analyze command
pub fn handle_analyze(
    ids: Vec<String>,
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    zone: &DisplayZone,
    out: &mut impl Write,
) -> Result<(), CliError> {
    for id in ids {
        let id = RecordId::from(id.as_str());
        // Toggling twice would unselect, so repeated ids are skipped
        if !dashboard.is_selected(&id) {
            dashboard.dispatch(Action::ToggleSelect(id));
        }
    }
    let analyzed: Vec<RecordId> = dashboard.selection().to_vec();

    runner.dispatch(dashboard, Action::BatchAnalyze);
    check_failure(dashboard)?;

    writeln!(out, "Analysis requested for {} entries", analyzed.len())?;
    for entry in dashboard.entries().iter().filter(|e| analyzed.contains(&e.id)) {
        writeln!(out, "{}", format_entry(entry, zone))?;
    }
    Ok(())
}

/// Handle the goals command
pub fn handle_list_goals(
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    out: &mut impl Write,
) -> Result<(), CliError> {
    load(dashboard, runner)?;

    if dashboard.goals().is_empty() {
        writeln!(out, "No targets set.")?;
    }
    for goal in dashboard.goals() {
        writeln!(out, "[{}] {}", goal.id, goal.title)?;
    }
    Ok(())
}

/// Handle the add-goal command
pub fn handle_add_goal(
    title: String,
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if title.trim().is_empty() {
        writeln!(out, "Nothing to add")?;
        return Ok(());
    }
    runner.dispatch(dashboard, Action::CreateGoal { title });
    check_failure(dashboard)?;
    writeln!(out, "Goal added ({} goals)", dashboard.goals().len())?;
    Ok(())
}

/// Handle the delete-goal command
pub fn handle_delete_goal(
    id: String,
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let id = RecordId::from(id.as_str());
    runner.dispatch(dashboard, Action::DeleteGoal(id.clone()));
    check_failure(dashboard)?;
    writeln!(out, "Goal {} deleted", id)?;
    Ok(())
}

/// Handle the chat command
pub fn handle_chat(
    message: String,
    dashboard: &mut Dashboard,
    runner: &SyncRunner,
    out: &mut impl Write,
) -> Result<(), CliError> {
    // The assistant reads the latest entries, so load them first
    load(dashboard, runner)?;
    runner.dispatch(dashboard, Action::SendChat { message });
    check_failure(dashboard)?;

    match dashboard.chat_history().last() {
        Some(reply) if reply.role == ChatRole::Assistant => writeln!(out, "{}", reply.text)?,
        _ => writeln!(out, "Nothing to send")?,
    }
    Ok(())
}

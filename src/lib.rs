pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod models;
pub mod session;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod timestamp;
pub mod tui;
pub mod utils;

pub use api::{ApiError, HttpJournalApi, JournalApi};
pub use config::Config;
pub use dashboard::Dashboard;
pub use models::{ChatMessage, ChatRole, Entry, Goal, RecordId};
pub use session::Session;
pub use utils::Profile;

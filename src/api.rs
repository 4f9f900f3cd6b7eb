use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    BatchAnalyzeRequest, ChatReply, ChatRequest, Created, Entry, EntryId, Goal, GoalId, NewEntry,
    NewGoal, RecordId,
};

pub const DEFAULT_BASE_URL: &str = "https://mindscribe-api-8laf.onrender.com";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Journal API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// The remote service that owns entries, goals, analysis and chat.
///
/// Every call is a single blocking request; callers decide which thread
/// runs it.
pub trait JournalApi: Send + Sync {
    fn health(&self) -> Result<serde_json::Value, ApiError>;
    fn list_entries(&self, user_id: &str) -> Result<Vec<Entry>, ApiError>;
    /// Returns the new id when the server reports one.
    fn create_entry(&self, user_id: &str, content: &str) -> Result<Option<EntryId>, ApiError>;
    fn delete_entry(&self, id: &EntryId) -> Result<(), ApiError>;
    fn analyze_batch(&self, entry_ids: &[EntryId]) -> Result<(), ApiError>;
    fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>, ApiError>;
    fn create_goal(&self, user_id: &str, title: &str) -> Result<Option<GoalId>, ApiError>;
    fn delete_goal(&self, id: &GoalId) -> Result<(), ApiError>;
    fn chat(&self, message: &str, context: &str) -> Result<String, ApiError>;
}

/// `JournalApi` over HTTP with a fixed base URL and JSON content type.
pub struct HttpJournalApi {
    client: Client,
    base: Url,
    base_url: String,
}

impl HttpJournalApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        Self::with_client(base_url, client_builder(timeout).build()?)
    }

    /// Use a client built elsewhere, e.g. from [`client_builder`] with extra settings.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }
        let base = Url::parse(&base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        Ok(Self {
            client,
            base,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    /// A trailing `""` segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(ApiError::Status { status: status.as_u16(), body })
        }
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = Self::check(response)?.text()?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        log::debug!("GET {}", url.path());
        Self::decode(self.client.get(url).send()?)
    }

    fn post<B: serde::Serialize, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        log::debug!("POST {}", url.path());
        Self::decode(self.client.post(url).json(body).send()?)
    }

    fn post_ignoring_body<B: serde::Serialize>(&self, segments: &[&str], body: &B) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        log::debug!("POST {}", url.path());
        Self::check(self.client.post(url).json(body).send()?)?;
        Ok(())
    }

    /// The write counts once the status is 2xx; the body only contributes
    /// the new id, if it has one
    fn post_created<B: serde::Serialize>(&self, segments: &[&str], body: &B) -> Result<Option<RecordId>, ApiError> {
        let url = self.endpoint(segments)?;
        log::debug!("POST {}", url.path());
        let text = Self::check(self.client.post(url).json(body).send()?)?.text().unwrap_or_default();
        match serde_json::from_str::<Created>(&text) {
            Ok(created) => Ok(created.id),
            Err(e) => {
                log::debug!("Create response carried no id: {}", e);
                Ok(None)
            }
        }
    }

    fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        log::debug!("DELETE {}", url.path());
        Self::check(self.client.delete(url).send()?)?;
        Ok(())
    }
}

/// Client settings every Journal API call relies on
pub fn client_builder(timeout: Option<Duration>) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    // The blocking client defaults to a 30s timeout; `None` turns it off
    Client::builder().default_headers(headers).timeout(timeout)
}

impl JournalApi for HttpJournalApi {
    fn health(&self) -> Result<serde_json::Value, ApiError> {
        self.get(&[""])
    }

    fn list_entries(&self, user_id: &str) -> Result<Vec<Entry>, ApiError> {
        self.get(&["entries", user_id])
    }

    fn create_entry(&self, user_id: &str, content: &str) -> Result<Option<EntryId>, ApiError> {
        self.post_created(&["entries", ""], &NewEntry { user_id, content })
    }

    fn delete_entry(&self, id: &EntryId) -> Result<(), ApiError> {
        self.delete(&["entries", &id.to_string()])
    }

    fn analyze_batch(&self, entry_ids: &[EntryId]) -> Result<(), ApiError> {
        self.post_ignoring_body(&["analyze", "batch", ""], &BatchAnalyzeRequest { entry_ids })
    }

    fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>, ApiError> {
        self.get(&["goals", user_id])
    }

    fn create_goal(&self, user_id: &str, title: &str) -> Result<Option<GoalId>, ApiError> {
        self.post_created(&["goals", ""], &NewGoal { user_id, title })
    }

    fn delete_goal(&self, id: &GoalId) -> Result<(), ApiError> {
        self.delete(&["goals", &id.to_string()])
    }

    fn chat(&self, message: &str, context: &str) -> Result<String, ApiError> {
        let reply: ChatReply = self.post(&["chat", ""], &ChatRequest { message, context })?;
        Ok(reply.reply)
    }
}

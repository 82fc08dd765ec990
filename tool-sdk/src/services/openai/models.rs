//! OpenAI Assistants API data models
//!
//! This module contains type definitions for the thread, message and run
//! resources of the Assistants v2 API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A conversation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Thread identifier
    pub id: String,

    /// Object type, always `thread`
    #[serde(default)]
    pub object: String,

    /// Unix timestamp of creation
    #[serde(default)]
    pub created_at: i64,
}

/// Request body for creating a thread
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateThreadRequest {}

/// Request body for adding a message to a thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateMessageRequest {
    /// Author role, `user` for questions
    pub role: String,

    /// Plain text content
    pub content: String,
}

impl CreateMessageRequest {
    /// A user-authored text message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A message stored in a thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Message identifier
    pub id: String,

    /// Author role (`user` or `assistant`)
    pub role: String,

    /// Content blocks in order
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// Whether the message was written by the assistant
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }

    /// Text value of the first content block, if that block carries text
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .first()
            .and_then(|block| block.text.as_ref())
            .map(|text| text.value.as_str())
    }
}

/// One content block of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContent {
    /// Block type, e.g. `text` or `image_file`
    #[serde(rename = "type")]
    pub kind: String,

    /// Present for `text` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<MessageText>,
}

/// Text payload of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageText {
    /// The text itself, including any citation markers
    pub value: String,

    /// File citations and paths referenced by the text
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
}

/// Request body for starting a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateRunRequest {
    /// Assistant to execute
    pub assistant_id: String,
}

/// Lifecycle status of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Any status this client does not know about yet
    Other(String),
}

impl RunStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Other(status) => status,
        }
    }

    /// The run is still waiting for or doing work and must be polled again
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "failed" => RunStatus::Failed,
            "completed" => RunStatus::Completed,
            "incomplete" => RunStatus::Incomplete,
            "expired" => RunStatus::Expired,
            _ => RunStatus::Other(value),
        }
    }
}

impl From<&str> for RunStatus {
    fn from(value: &str) -> Self {
        RunStatus::from(value.to_string())
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of an assistant against a thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Run identifier
    pub id: String,

    /// Thread the run executes against
    #[serde(default)]
    pub thread_id: String,

    /// Assistant being executed
    #[serde(default)]
    pub assistant_id: String,

    /// Current lifecycle status
    pub status: RunStatus,

    /// Failure details for `failed` runs
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Error reported on a failed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

/// Paginated list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Object type, always `list`
    #[serde(default)]
    pub object: String,

    /// Items in the order the API returned them
    pub data: Vec<T>,

    #[serde(default)]
    pub first_id: Option<String>,

    #[serde(default)]
    pub last_id: Option<String>,

    #[serde(default)]
    pub has_more: bool,
}

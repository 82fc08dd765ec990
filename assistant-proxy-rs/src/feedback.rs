//! Feedback recording
//!
//! Every answered question and every rating is appended to a spreadsheet
//! through a webhook. Recording never fails the request: sink errors are
//! logged and dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tool_sdk::sheets::SheetsWebhookClient;
use tracing::{debug, warn};

use crate::validation::Rating;

/// Value written to the `isRated` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingState {
    Unrated,
    Rated(Rating),
}

impl RatingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingState::Unrated => "false",
            RatingState::Rated(rating) => rating.as_str(),
        }
    }
}

/// One spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub question: String,
    pub answer: String,
    pub assistant_name: String,
    pub assistant_id: String,
    pub is_rated: RatingState,
    /// Update the row of an earlier answer instead of appending
    pub update_existing: bool,
}

impl FeedbackRecord {
    /// Row for a freshly returned answer
    pub fn answered(
        question: impl Into<String>,
        answer: impl Into<String>,
        assistant_name: impl Into<String>,
        assistant_id: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            assistant_name: assistant_name.into(),
            assistant_id: assistant_id.into(),
            is_rated: RatingState::Unrated,
            update_existing: false,
        }
    }

    /// Row update carrying a caller's rating
    pub fn rated(
        question: impl Into<String>,
        answer: impl Into<String>,
        assistant_name: impl Into<String>,
        assistant_id: impl Into<String>,
        rating: Rating,
    ) -> Self {
        Self {
            is_rated: RatingState::Rated(rating),
            update_existing: true,
            ..Self::answered(question, answer, assistant_name, assistant_id)
        }
    }

    /// Query fields in webhook order
    pub fn fields(&self) -> [(&str, &str); 6] {
        [
            ("question", self.question.as_str()),
            ("answer", self.answer.as_str()),
            ("assistantName", self.assistant_name.as_str()),
            ("assistantId", self.assistant_id.as_str()),
            ("isRated", self.is_rated.as_str()),
            ("updateExisting", if self.update_existing { "true" } else { "false" }),
        ]
    }
}

/// Destination of feedback rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn submit(&self, record: &FeedbackRecord) -> tool_sdk::Result<()>;
}

#[async_trait]
impl FeedbackSink for SheetsWebhookClient {
    async fn submit(&self, record: &FeedbackRecord) -> tool_sdk::Result<()> {
        self.send_row(record.fields()).await
    }
}

/// Best-effort recorder in front of an optional sink
#[derive(Clone, Default)]
pub struct FeedbackRecorder {
    sink: Option<Arc<dyn FeedbackSink>>,
}

impl FeedbackRecorder {
    pub fn new(sink: Option<Arc<dyn FeedbackSink>>) -> Self {
        Self { sink }
    }

    /// Recorder that drops every record
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Submit a record, logging instead of failing
    pub async fn record(&self, record: &FeedbackRecord) {
        let Some(sink) = &self.sink else {
            debug!("Spreadsheet logging not configured, skipping record");
            return;
        };

        match sink.submit(record).await {
            Ok(()) => debug!(is_rated = record.is_rated.as_str(), "Recorded feedback row"),
            Err(err) => warn!(
                status = ?err.status_code(),
                detail = %err.remote_detail(),
                "Failed to record feedback row"
            ),
        }
    }
}

//! Run orchestration
//!
//! Drives one question through the remote run protocol: create a thread,
//! post the question, start a run, poll until the run leaves the pending
//! states and read the assistant's reply. Each step is awaited in order.
//!
//! Remote access goes through [`RunBackend`] and waiting goes through
//! [`Clock`], so the whole state machine can be scripted in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tool_sdk::openai::{AssistantsClient, CreateMessageRequest, CreateRunRequest, Run, RunStatus, ThreadMessage};
use tracing::{debug, info, warn};

use crate::profiles::AssistantProfile;

/// Text returned when the assistant replied without any text content
pub const EMPTY_ANSWER: &str = "Brak odpowiedzi.";

/// Remote operations the orchestrator needs
#[async_trait]
pub trait RunBackend: Send + Sync {
    /// Create an empty conversation and return its id
    async fn create_thread(&self) -> tool_sdk::Result<String>;

    async fn post_user_message(&self, thread_id: &str, content: &str) -> tool_sdk::Result<()>;

    /// Start a run and return it with its initial status
    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> tool_sdk::Result<Run>;

    async fn run_status(&self, thread_id: &str, run_id: &str) -> tool_sdk::Result<Run>;

    /// Messages of a thread, in the order the service returns them
    async fn list_messages(&self, thread_id: &str) -> tool_sdk::Result<Vec<ThreadMessage>>;
}

#[async_trait]
impl RunBackend for AssistantsClient {
    async fn create_thread(&self) -> tool_sdk::Result<String> {
        Ok(AssistantsClient::create_thread(self).await?.id)
    }

    async fn post_user_message(&self, thread_id: &str, content: &str) -> tool_sdk::Result<()> {
        self.create_message(thread_id, &CreateMessageRequest::user(content))
            .await
            .map(|_| ())
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> tool_sdk::Result<Run> {
        let request = CreateRunRequest {
            assistant_id: assistant_id.to_string(),
        };
        self.create_run(thread_id, &request).await
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> tool_sdk::Result<Run> {
        self.retrieve_run(thread_id, run_id).await
    }

    async fn list_messages(&self, thread_id: &str) -> tool_sdk::Result<Vec<ThreadMessage>> {
        Ok(AssistantsClient::list_messages(self, thread_id).await?.data)
    }
}

/// Source of suspension between status checks
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How often to poll and for how long at most
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` keeps polling for as long as the run stays pending
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(crate::settings::DEFAULT_POLL_INTERVAL_MS),
            max_wait: None,
        }
    }
}

/// Failures of the remote protocol, one per step
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("Nie można utworzyć wątku: {0}")]
    ThreadCreation(String),

    #[error("Nie można wysłać wiadomości: {0}")]
    MessagePost(String),

    #[error("Nie można uruchomić asystenta: {0}")]
    RunStart(String),

    #[error("Nie można sprawdzić statusu uruchomienia: {0}")]
    StatusFetch(String),

    #[error("Uruchomienie zakończyło się statusem: {0}")]
    TerminalStatus(RunStatus),

    #[error("Nie można pobrać wiadomości: {0}")]
    MessageFetch(String),

    #[error("Przekroczono limit oczekiwania na odpowiedź ({0} ms)")]
    PollTimeout(u128),
}

/// Transient state of one ask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSession {
    pub conversation_id: String,
    pub run_id: String,
    pub status: RunStatus,
}

/// Where a run stands after the latest status observation
#[derive(Debug)]
enum RunState {
    Pending(RunSession),
    Completed(RunSession),
    Stopped(RunSession),
}

impl RunState {
    fn observe(session: RunSession) -> Self {
        if session.status == RunStatus::Completed {
            RunState::Completed(session)
        } else if session.status.is_pending() {
            RunState::Pending(session)
        } else {
            RunState::Stopped(session)
        }
    }
}

/// Executes questions against remote assistants
#[derive(Clone)]
pub struct RunOrchestrator {
    backend: Arc<dyn RunBackend>,
    clock: Arc<dyn Clock>,
    poll: PollPolicy,
}

impl RunOrchestrator {
    pub fn new(backend: Arc<dyn RunBackend>, clock: Arc<dyn Clock>, poll: PollPolicy) -> Self {
        Self { backend, clock, poll }
    }

    /// Orchestrator using the real timer
    pub fn with_tokio_clock(backend: Arc<dyn RunBackend>, poll: PollPolicy) -> Self {
        Self::new(backend, Arc::new(TokioClock), poll)
    }

    /// Ask `question` of `profile` and return the raw answer text
    pub async fn execute(&self, profile: &AssistantProfile, question: &str) -> Result<String, UpstreamError> {
        let conversation_id = self
            .backend
            .create_thread()
            .await
            .map_err(|e| UpstreamError::ThreadCreation(e.remote_detail()))?;
        debug!(thread_id = %conversation_id, "Created thread");

        self.backend
            .post_user_message(&conversation_id, question)
            .await
            .map_err(|e| UpstreamError::MessagePost(e.remote_detail()))?;

        let run = self
            .backend
            .start_run(&conversation_id, &profile.external_id)
            .await
            .map_err(|e| UpstreamError::RunStart(e.remote_detail()))?;
        debug!(thread_id = %conversation_id, run_id = %run.id, status = %run.status, "Started run");

        let session = RunSession {
            conversation_id,
            run_id: run.id,
            status: run.status,
        };

        let mut waited = Duration::ZERO;
        let mut state = RunState::observe(session);

        loop {
            state = match state {
                RunState::Pending(mut session) => {
                    if let Some(max_wait) = self.poll.max_wait {
                        if waited + self.poll.interval > max_wait {
                            warn!(run_id = %session.run_id, waited_ms = waited.as_millis() as u64, "Run still pending, giving up");
                            return Err(UpstreamError::PollTimeout(waited.as_millis()));
                        }
                    }

                    self.clock.sleep(self.poll.interval).await;
                    waited += self.poll.interval;

                    let run = self
                        .backend
                        .run_status(&session.conversation_id, &session.run_id)
                        .await
                        .map_err(|e| UpstreamError::StatusFetch(e.remote_detail()))?;
                    debug!(run_id = %session.run_id, status = %run.status, "Polled run");

                    session.status = run.status;
                    RunState::observe(session)
                }
                RunState::Completed(session) => {
                    info!(run_id = %session.run_id, waited_ms = waited.as_millis() as u64, "Run completed");
                    return self.collect_answer(&session).await;
                }
                RunState::Stopped(session) => {
                    return Err(UpstreamError::TerminalStatus(session.status));
                }
            };
        }
    }

    async fn collect_answer(&self, session: &RunSession) -> Result<String, UpstreamError> {
        let messages = self
            .backend
            .list_messages(&session.conversation_id)
            .await
            .map_err(|e| UpstreamError::MessageFetch(e.remote_detail()))?;

        let answer = messages
            .iter()
            .find(|message| message.is_assistant())
            .and_then(ThreadMessage::first_text)
            .filter(|text| !text.is_empty())
            .unwrap_or(EMPTY_ANSWER);

        Ok(answer.to_string())
    }
}

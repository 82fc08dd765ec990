//! OpenAI Assistants API client implementation
//!
//! This module provides a strongly-typed client for the thread, message and
//! run endpoints of the Assistants v2 API. Every call carries the bearer
//! credential and the `OpenAI-Beta` protocol header.

mod models;
pub use models::*;

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{AssistantsConfig, ConfigProvider, ServiceConfig};
use crate::core::{AuthenticatedClient, ServiceClient};
use crate::error::{Result, ServiceError};
use crate::services::common::{build_http_client, parse_error_response, transport_error, UserAgent};

const SERVICE_NAME: &str = "openai";

/// OpenAI Assistants API client
#[derive(Debug, Clone)]
pub struct AssistantsClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: AssistantsConfig,
}

impl AssistantsClient {
    /// Create a client from validated configuration
    pub fn new_with_config(config: AssistantsConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("assistants-client".to_string()),
                ..UserAgent::default()
            }),
            Some(Duration::from_secs(config.timeout_seconds)),
        )?;

        Ok(Self { http_client, config })
    }

    /// Create a client from a configuration provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        Self::new_with_config(AssistantsConfig::from_provider(provider)?)
    }

    /// Create a new builder for the Assistants client
    pub fn builder() -> AssistantsClientBuilder {
        AssistantsClientBuilder::default()
    }

    /// Create an empty thread
    pub async fn create_thread(&self) -> Result<Thread> {
        self.post("threads", &CreateThreadRequest::default()).await
    }

    /// Append a message to a thread
    pub async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage> {
        self.post(&format!("threads/{}/messages", thread_id), request).await
    }

    /// Start a run of an assistant against a thread
    pub async fn create_run(&self, thread_id: &str, request: &CreateRunRequest) -> Result<Run> {
        self.post(&format!("threads/{}/runs", thread_id), request).await
    }

    /// Fetch the current state of a run
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(&format!("threads/{}/runs/{}", thread_id, run_id)).await
    }

    /// List the messages of a thread in the API's default order (newest first)
    pub async fn list_messages(&self, thread_id: &str) -> Result<ListResponse<ThreadMessage>> {
        self.get(&format!("threads/{}/messages", thread_id)).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url, endpoint)
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        self.apply_auth(&mut headers)?;

        headers.insert(
            HeaderName::from_static("openai-beta"),
            HeaderValue::from_str(&self.config.beta)
                .map_err(|e| ServiceError::configuration(format!("Invalid beta header: {}", e)))?,
        );

        if let Some(ref org) = self.config.org_id {
            headers.insert(
                HeaderName::from_static("openai-organization"),
                HeaderValue::from_str(org)
                    .map_err(|e| ServiceError::configuration(format!("Invalid organization id: {}", e)))?,
            );
        }

        Ok(headers)
    }

    async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("Sending request to OpenAI: POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .headers(self.request_headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE_NAME, endpoint, e))?;

        self.read_response(endpoint, response).await
    }

    async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("Sending request to OpenAI: GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(self.request_headers()?)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE_NAME, endpoint, e))?;

        self.read_response(endpoint, response).await
    }

    async fn read_response<R>(&self, endpoint: &str, response: reqwest::Response) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let error = parse_error_response(SERVICE_NAME, endpoint, response).await;
            debug!("OpenAI {} failed with {}: {}", endpoint, status, error);
            return Err(error);
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ServiceError::parsing(format!("Failed to parse {} response: {}", endpoint, e)))
    }
}

impl ServiceClient for AssistantsClient {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

impl AuthenticatedClient for AssistantsClient {
    fn auth_type(&self) -> &str {
        "Bearer"
    }

    fn is_authenticated(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn apply_auth(&self, headers: &mut HeaderMap) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ServiceError::authentication("No API key set for OpenAI client"));
        }

        let value = HeaderValue::from_str(&format!("{} {}", self.auth_type(), self.config.api_key))
            .map_err(|e| ServiceError::configuration(format!("Invalid API key: {}", e)))?;
        headers.insert(AUTHORIZATION, value);

        Ok(())
    }
}

/// Builder for the Assistants client
#[derive(Default)]
pub struct AssistantsClientBuilder {
    /// API key for authentication
    api_key: Option<String>,

    /// Organization ID
    org_id: Option<String>,

    /// Base URL for the API
    base_url: Option<String>,

    /// Request timeout
    timeout_seconds: Option<u64>,
}

impl AssistantsClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the organization ID
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Build the Assistants client
    pub fn build(self) -> Result<AssistantsClient> {
        let mut config = AssistantsConfig::default();

        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }

        config.org_id = self.org_id;

        if let Some(base_url) = self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }

        AssistantsClient::new_with_config(config)
    }
}

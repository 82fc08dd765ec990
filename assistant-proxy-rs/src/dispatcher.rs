//! Request dispatching
//!
//! [`ProxyService`] is the transport-neutral core: it takes a method and a
//! raw body and produces a status code with a JSON body. The HTTP and
//! platform-function adapters only translate to and from this shape.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tool_sdk::config::ConfigProvider;
use tool_sdk::openai::AssistantsClient;
use tool_sdk::sheets::SheetsWebhookClient;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::feedback::{FeedbackRecord, FeedbackRecorder, FeedbackSink};
use crate::orchestrator::{RunOrchestrator, UpstreamError};
use crate::profiles::{AssistantKey, AssistantProfile, AssistantRegistry};
use crate::sanitizer::sanitize;
use crate::settings::{ConfigurationError, ProxySettings};
use crate::validation::{normalize_body, validate, AskRequest, RateRequest, ValidatedRequest, ValidationError};

/// Message returned for any failure after validation
pub const SERVER_ERROR_MESSAGE: &str = "Wystąpił niespodziewany błąd serwera.";

/// Inbound request as seen by the dispatcher
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub body: Option<String>,
}

impl ProxyRequest {
    pub fn new(method: Method, body: Option<String>) -> Self {
        Self { method, body }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self::new(Method::POST, Some(body.into()))
    }
}

/// JSON body of every response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ResponseBody {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn answered(answer: String, profile: &AssistantProfile) -> Self {
        Self {
            success: true,
            answer: Some(answer),
            assistant_key: Some(profile.key.as_str().to_string()),
            assistant_name: Some(profile.display_name.clone()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            details,
            ..Self::default()
        }
    }
}

/// Transport-neutral response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, body: ResponseBody) -> Self {
        Self { status, body }
    }

    /// Serialized body
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.body)
            .unwrap_or_else(|_| format!(r#"{{"success":{}}}"#, self.body.success))
    }
}

/// Every way a request can fail
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", SERVER_ERROR_MESSAGE)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to status code and error body
    pub fn to_response(&self) -> ProxyResponse {
        let details = match self {
            Self::Upstream(err) => Some(err.to_string()),
            _ => None,
        };

        ProxyResponse::new(self.status(), ResponseBody::failure(self.to_string(), details))
    }
}

/// Everything a configured proxy needs to serve requests
pub struct ProxyRuntime {
    pub registry: AssistantRegistry,
    pub orchestrator: RunOrchestrator,
    pub feedback: FeedbackRecorder,
}

impl ProxyRuntime {
    pub fn new(registry: AssistantRegistry, orchestrator: RunOrchestrator, feedback: FeedbackRecorder) -> Self {
        Self {
            registry,
            orchestrator,
            feedback,
        }
    }

    /// Wire the remote clients from configuration
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self, ConfigurationError> {
        let settings = ProxySettings::load(provider)?;

        let client = AssistantsClient::from_provider(provider)
            .map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
        let orchestrator = RunOrchestrator::with_tokio_clock(Arc::new(client), settings.poll);

        let sink: Option<Arc<dyn FeedbackSink>> = match SheetsWebhookClient::from_provider(provider) {
            Ok(Some(client)) => {
                info!(sheet = client.sheet_name(), "Spreadsheet logging enabled");
                Some(Arc::new(client))
            }
            Ok(None) => {
                info!("Spreadsheet logging disabled");
                None
            }
            Err(err) => {
                warn!(error = %err, "Spreadsheet logging misconfigured, disabling");
                None
            }
        };

        Ok(Self::new(settings.registry, orchestrator, FeedbackRecorder::new(sink)))
    }
}

/// The proxy's request flow
#[derive(Clone)]
pub struct ProxyService {
    runtime: Result<Arc<ProxyRuntime>, ConfigurationError>,
}

impl ProxyService {
    /// Build the service from configuration.
    ///
    /// A configuration error does not prevent construction; it is reported on
    /// every POST instead.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Self {
        let runtime = ProxyRuntime::from_provider(provider).map(Arc::new);
        if let Err(ref err) = runtime {
            error!(error = %err, "Assistant proxy is not configured");
        }
        Self { runtime }
    }

    pub fn with_runtime(runtime: ProxyRuntime) -> Self {
        Self {
            runtime: Ok(Arc::new(runtime)),
        }
    }

    pub fn unconfigured(error: ConfigurationError) -> Self {
        Self { runtime: Err(error) }
    }

    pub fn is_configured(&self) -> bool {
        self.runtime.is_ok()
    }

    /// Handle one request
    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("proxy_request", %request_id, method = %request.method);

        async move {
            match self.dispatch(request).await {
                Ok(response) => response,
                Err(err) => {
                    match &err {
                        ProxyError::Upstream(cause) => error!(error = %cause, "Request failed upstream"),
                        ProxyError::Configuration(cause) => error!(error = %cause, "Request rejected, missing configuration"),
                        other => info!(status = other.status().as_u16(), error = %other, "Request rejected"),
                    }
                    err.to_response()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: ProxyRequest) -> Result<ProxyResponse, ProxyError> {
        if request.method != Method::POST {
            return Err(ProxyError::MethodNotAllowed);
        }

        let runtime = self.runtime.as_ref().map_err(|err| err.clone())?;

        let payload = normalize_body(request.body.as_deref());
        match validate(&payload, &runtime.registry)? {
            ValidatedRequest::Ask(ask) => Self::ask(runtime, ask).await,
            ValidatedRequest::Rate(rate) => Self::rate(runtime, rate).await,
        }
    }

    fn profile(runtime: &ProxyRuntime, key: AssistantKey) -> Result<&AssistantProfile, ProxyError> {
        runtime
            .registry
            .get(key)
            .ok_or_else(|| ValidationError::InvalidInput("Nieprawidłowy identyfikator asystenta.".to_string()).into())
    }

    async fn ask(runtime: &ProxyRuntime, ask: AskRequest) -> Result<ProxyResponse, ProxyError> {
        let profile = Self::profile(runtime, ask.assistant)?;

        let raw = runtime.orchestrator.execute(profile, &ask.question).await?;
        let answer = sanitize(&raw);

        runtime
            .feedback
            .record(&FeedbackRecord::answered(
                &ask.question,
                &answer,
                &profile.display_name,
                &profile.external_id,
            ))
            .await;

        info!(assistant = %profile.key, answer_len = answer.len(), "Answered question");
        Ok(ProxyResponse::new(StatusCode::OK, ResponseBody::answered(answer, profile)))
    }

    async fn rate(runtime: &ProxyRuntime, rate: RateRequest) -> Result<ProxyResponse, ProxyError> {
        let profile = Self::profile(runtime, rate.assistant)?;

        runtime
            .feedback
            .record(&FeedbackRecord::rated(
                rate.question,
                rate.answer,
                profile.display_name.as_str(),
                profile.external_id.as_str(),
                rate.rating,
            ))
            .await;

        info!(assistant = %profile.key, rating = rate.rating.as_str(), "Recorded rating");
        Ok(ProxyResponse::new(StatusCode::OK, ResponseBody::ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_body_omits_absent_fields() {
        let value = serde_json::to_value(ResponseBody::ok()).unwrap();
        assert_eq!(value, json!({"success": true}));

        let profile = AssistantProfile::new(AssistantKey::Product, "asst_p");
        let value = serde_json::to_value(ResponseBody::answered("A".to_string(), &profile)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "answer": "A",
                "assistantKey": "PRODUCT",
                "assistantName": "Produktowa wersja"
            })
        );
    }

    #[test]
    fn test_error_responses() {
        let response = ProxyError::MethodNotAllowed.to_response();
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.to_json(), r#"{"success":false,"error":"Method Not Allowed"}"#);

        let response = ProxyError::from(UpstreamError::RunStart("quota".to_string())).to_response();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.error.as_deref(), Some(SERVER_ERROR_MESSAGE));
        assert_eq!(response.body.details.as_deref(), Some("Nie można uruchomić asystenta: quota"));

        let response = ProxyError::from(ValidationError::UnknownAction).to_response();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body, ResponseBody::failure("Nieznana akcja", None));
    }

    #[tokio::test]
    async fn test_unconfigured_service() {
        let service = ProxyService::unconfigured(ConfigurationError::MissingVariables(vec![
            "OPENAI_API_KEY".to_string(),
        ]));
        assert!(!service.is_configured());

        let response = service.handle(ProxyRequest::post("{}")).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body.error.as_deref(),
            Some("Brak wymaganych zmiennych środowiskowych: OPENAI_API_KEY")
        );

        // Method is checked before configuration
        let response = service.handle(ProxyRequest::new(Method::GET, None)).await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

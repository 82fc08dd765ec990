//! Assistant Proxy Input Validation
//!
//! This module turns the raw request body into a typed request for one of the
//! two supported actions, rejecting malformed input before any remote call.

use serde_json::{Map, Value};

use crate::profiles::{AssistantKey, AssistantRegistry};

/// Default maximum request payload size (1MB)
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Validation error for proxy requests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Nieznana akcja")]
    UnknownAction,
}

impl ValidationError {
    fn invalid(message: &str) -> Self {
        Self::InvalidInput(message.to_string())
    }
}

/// Verdict of a rating request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Positive,
    Negative,
}

impl Rating {
    /// Exact, case-sensitive match
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// A question for one of the assistants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
    pub assistant: AssistantKey,
}

/// Feedback on a previously returned answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub question: String,
    pub answer: String,
    pub assistant: AssistantKey,
    pub rating: Rating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedRequest {
    Ask(AskRequest),
    Rate(RateRequest),
}

/// Parse a raw request body into a JSON object.
///
/// A missing or blank body, malformed JSON and JSON that is not an object all
/// yield an empty object, which then validates as an ask without a question.
pub fn normalize_body(body: Option<&str>) -> Value {
    let parsed = body
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok());

    match parsed {
        Some(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    }
}

/// String field, with non-string values treated as absent
fn text_field<'a>(payload: &'a Value, name: &str) -> &'a str {
    payload.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Validate a normalised payload against the known assistant profiles
pub fn validate(payload: &Value, registry: &AssistantRegistry) -> Result<ValidatedRequest, ValidationError> {
    match payload.get("action") {
        Some(Value::String(action)) => match action.as_str() {
            "" | "ask" => validate_ask(payload, registry),
            "rate" => validate_rate(payload, registry),
            _ => Err(ValidationError::UnknownAction),
        },
        Some(action) if !is_falsy(action) => Err(ValidationError::UnknownAction),
        _ => validate_ask(payload, registry),
    }
}

/// `null`, `false` and zero select the default action
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        _ => false,
    }
}

fn resolve_key(payload: &Value, registry: &AssistantRegistry) -> Result<AssistantKey, ValidationError> {
    registry
        .resolve(text_field(payload, "assistantKey"))
        .map(|profile| profile.key)
        .ok_or_else(|| ValidationError::invalid("Nieprawidłowy identyfikator asystenta."))
}

fn validate_ask(payload: &Value, registry: &AssistantRegistry) -> Result<ValidatedRequest, ValidationError> {
    let question = text_field(payload, "question").trim();
    if question.is_empty() {
        return Err(ValidationError::invalid("Brak pytania."));
    }

    let assistant = resolve_key(payload, registry)?;

    Ok(ValidatedRequest::Ask(AskRequest {
        question: question.to_string(),
        assistant,
    }))
}

fn validate_rate(payload: &Value, registry: &AssistantRegistry) -> Result<ValidatedRequest, ValidationError> {
    let rating = Rating::parse(text_field(payload, "rating"))
        .ok_or_else(|| ValidationError::invalid("Nieprawidłowy typ oceny."))?;

    let question = text_field(payload, "question").trim();
    if question.is_empty() {
        return Err(ValidationError::invalid("Brak pytania do oceny."));
    }

    let answer = text_field(payload, "answer").trim();
    if answer.is_empty() {
        return Err(ValidationError::invalid("Brak odpowiedzi do oceny."));
    }

    let assistant = resolve_key(payload, registry)?;

    Ok(ValidatedRequest::Rate(RateRequest {
        question: question.to_string(),
        answer: answer.to_string(),
        assistant,
        rating,
    }))
}

/// Generate middleware config for payload limits
pub fn payload_limit_config() -> tower_http::limit::RequestBodyLimitLayer {
    tower_http::limit::RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE)
}

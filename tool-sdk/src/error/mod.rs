//! Error handling for the Tool SDK
//!
//! Every client call fails with a [`ServiceError`]. Failures of a remote
//! call are wrapped in [`ServiceError::WithContext`], which records which
//! service and endpoint failed, the HTTP status and the raw response body.
//! Callers that need to report what the remote said use
//! [`ServiceError::remote_detail`].

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for Tool SDK operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Main error type for the Tool SDK
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Connection refused, reset, DNS failure
    #[error("Network error: {0}")]
    Network(String),

    /// 401 from the remote
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// 403 from the remote
    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Any other non-success status
    #[error("Service error: {0}")]
    Service(String),

    /// 400 from the remote
    #[error("Validation error: {0}")]
    Validation(String),

    /// The response arrived but could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Client could not be built from the given settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A failure annotated with where it happened
    #[error("{inner}")]
    WithContext {
        inner: Box<ServiceError>,
        context: ErrorContext,
    },
}

macro_rules! constructors {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            pub fn $name(message: impl Into<String>) -> Self {
                ServiceError::$variant(message.into())
            }
        )*
    };
}

impl ServiceError {
    constructors! {
        network => Network,
        authentication => Authentication,
        authorization => Authorization,
        rate_limit => RateLimit,
        service => Service,
        validation => Validation,
        parsing => Parsing,
        configuration => Configuration,
        timeout => Timeout,
        not_found => NotFound,
    }

    /// Wrap this error with context
    pub fn with_context(self, context: ErrorContext) -> Self {
        ServiceError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Wrap this error with a context holding a single key/value
    pub fn with_context_value(self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.with_context(ErrorContext::default().with(key, value))
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            ServiceError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn service_name(&self) -> Option<&str> {
        self.context().map(|context| context.service.as_str())
    }

    /// HTTP status of the failed call, if one was received
    pub fn status_code(&self) -> Option<u16> {
        self.context().and_then(|context| context.status_code)
    }

    /// Raw body of the failed HTTP response, exactly as the remote sent it
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ServiceError::WithContext { context, inner } => context
                .response_body
                .as_deref()
                .or_else(|| inner.response_body()),
            _ => None,
        }
    }

    /// The raw response body when one was received, otherwise this error's
    /// message
    pub fn remote_detail(&self) -> String {
        match self.response_body() {
            Some(body) if !body.is_empty() => body.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Where and how a remote call failed
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub service: String,

    /// HTTP status code if a response was received
    pub status_code: Option<u16>,

    /// Machine-readable code from the error body, e.g. `invalid_api_key`
    pub error_code: Option<String>,

    /// Endpoint relative to the service base URL
    pub endpoint: Option<String>,

    pub response_body: Option<String>,

    /// Free-form extras such as the remote's error type
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::for_service("unknown")
    }
}

impl ErrorContext {
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            status_code: None,
            error_code: None,
            endpoint: None,
            response_body: None,
            data: HashMap::new(),
        }
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Record an extra value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }

    /// Builder form of [`ErrorContext::add`]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.add(key, value);
        self
    }
}

//! Error mapping for service-specific APIs
//!
//! This module provides mapping functions to convert service-specific
//! error responses to our normalized ServiceError type.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ServiceError};

/// Map an OpenAI API error to a ServiceError
///
/// OpenAI wraps failures as `{"error": {"message", "type", "code"}}`.
pub fn map_openai_error(
    status: StatusCode,
    json: &Value,
    context: &mut ErrorContext,
) -> ServiceError {
    context.service = "openai".to_string();

    let error = json.get("error").unwrap_or(json);

    if let Some(error_type) = error.get("type").and_then(|t| t.as_str()) {
        context.add("error_type", error_type);
    }

    if let Some(code) = error.get("code").and_then(|c| c.as_str()) {
        context.error_code = Some(code.to_string());
    }

    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown OpenAI error");

    map_status(status, message)
}

/// Map a generic HTTP error to a ServiceError
pub fn map_http_error(status: StatusCode, body: &str, context: &mut ErrorContext) -> ServiceError {
    // Try to parse as JSON first
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if context.service == "openai" {
            return map_openai_error(status, &json, context);
        }

        if let Some(message) = json
            .get("message")
            .or_else(|| json.get("error"))
            .and_then(|m| m.as_str())
        {
            return map_status(status, message);
        }
    }

    // Fallback to status-based mapping
    let message = if body.is_empty() {
        status.to_string()
    } else if body.len() > 100 {
        format!("{}: {:.100}...", status, body)
    } else {
        format!("{}: {}", status, body)
    };

    map_status(status, &message)
}

fn map_status(status: StatusCode, message: &str) -> ServiceError {
    match status {
        StatusCode::UNAUTHORIZED => ServiceError::authentication(message),
        StatusCode::FORBIDDEN => ServiceError::authorization(message),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::rate_limit(message),
        StatusCode::BAD_REQUEST => ServiceError::validation(message),
        StatusCode::NOT_FOUND => ServiceError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ServiceError::timeout(message),
        _ => ServiceError::service(message),
    }
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 => "timeout",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}

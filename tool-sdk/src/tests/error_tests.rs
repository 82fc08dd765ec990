//! Tests for error handling functionality
//!
//! These tests verify that the error system in the SDK works correctly.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::error::{mapping, ErrorContext, Result, ServiceError};

    #[test]
    fn test_service_error_creation() {
        let network_err = ServiceError::network("Connection failed");
        let auth_err = ServiceError::authentication("Invalid credentials");
        let rate_limit_err = ServiceError::rate_limit("Too many requests");

        assert_eq!(network_err.to_string(), "Network error: Connection failed");
        assert_eq!(auth_err.to_string(), "Authentication error: Invalid credentials");
        assert_eq!(rate_limit_err.to_string(), "Rate limit exceeded: Too many requests");
    }

    #[test]
    fn test_error_context() {
        let base_err = ServiceError::network("Connection timeout");

        let context = ErrorContext::for_service("test_service")
            .status_code(408)
            .endpoint("threads")
            .response_body("raw body")
            .with("attempt", 3);

        let err_with_context = base_err.with_context(context);

        assert_eq!(err_with_context.service_name(), Some("test_service"));
        assert_eq!(err_with_context.status_code(), Some(408));
        assert_eq!(err_with_context.response_body(), Some("raw body"));
        assert_eq!(err_with_context.remote_detail(), "raw body");

        // Display shows the base error only
        assert_eq!(err_with_context.to_string(), "Network error: Connection timeout");

        // Without a body the message itself is the detail
        let quick_err = ServiceError::timeout("Request timed out").with_context_value("attempt", 2);
        assert_eq!(quick_err.response_body(), None);
        assert_eq!(quick_err.remote_detail(), "Timeout error: Request timed out");
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(mapping::classify_http_error(StatusCode::UNAUTHORIZED), "authentication");
        assert_eq!(mapping::classify_http_error(StatusCode::FORBIDDEN), "authorization");
        assert_eq!(mapping::classify_http_error(StatusCode::TOO_MANY_REQUESTS), "rate_limit");
        assert_eq!(mapping::classify_http_error(StatusCode::INTERNAL_SERVER_ERROR), "server");

        let json = serde_json::json!({
            "error": {
                "type": "rate_limit_error",
                "code": "rate_limit_exceeded",
                "message": "You have exceeded your rate limit"
            }
        });

        let mut context = ErrorContext::for_service("openai");
        let mapped_error = mapping::map_openai_error(StatusCode::TOO_MANY_REQUESTS, &json, &mut context);

        assert!(matches!(mapped_error, ServiceError::RateLimit(_)));
        assert_eq!(context.error_code.as_deref(), Some("rate_limit_exceeded"));
        assert_eq!(context.data.get("error_type").map(String::as_str), Some("rate_limit_error"));
    }

    #[test]
    fn test_generic_http_error_mapping() {
        let mut context = ErrorContext::for_service("sheets");

        let mapped = mapping::map_http_error(StatusCode::NOT_FOUND, "", &mut context);
        assert!(matches!(mapped, ServiceError::NotFound(_)));

        let mapped = mapping::map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"message": "missing sheetId"}"#,
            &mut context,
        );
        assert!(matches!(mapped, ServiceError::Validation(ref msg) if msg == "missing sheetId"));

        let long_body = "x".repeat(300);
        let mapped = mapping::map_http_error(StatusCode::BAD_GATEWAY, &long_body, &mut context);
        assert!(matches!(mapped, ServiceError::Service(ref msg) if msg.ends_with("...")));
    }

    #[test]
    fn test_result_type() {
        let failure: Result<i32> = Err(ServiceError::parsing("Invalid number"));

        fn might_fail(input: Result<i32>) -> Result<i32> {
            let x = input?;
            Ok(x * 2)
        }

        assert_eq!(might_fail(Ok(21)).unwrap(), 42);
        assert!(might_fail(failure).is_err());
    }
}

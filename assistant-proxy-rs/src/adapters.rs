//! Transport adapters
//!
//! Two thin entry points over [`ProxyService`]: an axum router for a
//! long-running HTTP server, and a platform-function shape where a single
//! event comes in and a `{statusCode, headers, body}` object goes out.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::dispatcher::{ProxyRequest, ProxyResponse, ProxyService};
use crate::validation::payload_limit_config;

/// Path of the proxy endpoint
pub const PROXY_PATH: &str = "/api/assistant-proxy";

pub const SERVICE_NAME: &str = "assistant-proxy";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: ProxyService,
    started: Instant,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub status: String,
}

/// Build the HTTP router
pub fn router(service: ProxyService) -> Router {
    let state = Arc::new(AppState {
        service,
        started: Instant::now(),
    });

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route(PROXY_PATH, any(proxy_handler))
        .layer(payload_limit_config())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "proxy": format!("POST {}", PROXY_PATH),
            "health": "GET /health"
        }
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let healthy = state.service.is_configured();

    Json(HealthResponse {
        healthy,
        service_name: SERVICE_NAME.to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        status: if healthy { "SERVING" } else { "NOT_CONFIGURED" }.to_string(),
    })
}

async fn proxy_handler(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Response {
    // Undecodable bodies are treated like malformed JSON
    let body = if body.is_empty() {
        None
    } else {
        String::from_utf8(body.to_vec()).ok()
    };

    let response = state.service.handle(ProxyRequest::new(method, body)).await;
    into_http_response(response)
}

fn into_http_response(response: ProxyResponse) -> Response {
    let status = response.status;
    let mut http = (status, Json(response.body)).into_response();

    if status == StatusCode::METHOD_NOT_ALLOWED {
        http.headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("POST"));
    }

    http
}

/// Platform-function invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    #[serde(default)]
    pub http_method: String,

    #[serde(default)]
    pub body: Option<String>,
}

/// Platform-function result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<ProxyResponse> for FunctionResponse {
    fn from(response: ProxyResponse) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);

        Self {
            status_code: response.status.as_u16(),
            headers,
            body: response.to_json(),
        }
    }
}

/// Handle one platform-function event
pub async fn handle_function_event(service: &ProxyService, event: FunctionEvent) -> FunctionResponse {
    // An unparseable method can never be POST
    let method = Method::from_bytes(event.http_method.as_bytes()).unwrap_or(Method::GET);

    service.handle(ProxyRequest::new(method, event.body)).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::dispatcher::ProxyRuntime;
    use crate::feedback::FeedbackRecorder;
    use crate::orchestrator::testing::{message, RecordingClock, ScriptedBackend};
    use crate::orchestrator::{PollPolicy, RunOrchestrator};
    use crate::profiles::AssistantRegistry;
    use crate::settings::ConfigurationError;

    fn configured(answer: &str) -> ProxyService {
        let backend = Arc::new(ScriptedBackend::new(
            &["in_progress", "completed"],
            vec![message("assistant", Some(answer))],
        ));
        let orchestrator = RunOrchestrator::new(backend, Arc::new(RecordingClock::default()), PollPolicy::default());
        ProxyService::with_runtime(ProxyRuntime::new(
            AssistantRegistry::new("asst_s", "asst_p", "asst_d"),
            orchestrator,
            FeedbackRecorder::disabled(),
        ))
    }

    fn unconfigured() -> ProxyService {
        ProxyService::unconfigured(ConfigurationError::MissingVariables(vec![
            "ASSISTANT_ID_SHORT".to_string(),
        ]))
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_non_post_sets_allow_header() {
        let app = router(unconfigured());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(PROXY_PATH)
                    .body(Body::from(r#"{"question":"q"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"success": false, "error": "Method Not Allowed"})
        );
    }

    #[tokio::test]
    async fn test_configured_post_answers_with_cors() {
        let app = router(configured("Tak【1:0†source】"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(PROXY_PATH)
                    .header("content-type", "application/json")
                    .header("origin", "https://shop.example.com")
                    .body(Body::from(r#"{"question": "Czy jest dostawa?", "assistantKey": "product"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert_eq!(
            json_body(response).await,
            serde_json::json!({
                "success": true,
                "answer": "Tak",
                "assistantKey": "PRODUCT",
                "assistantName": "Produktowa wersja"
            })
        );
    }

    #[tokio::test]
    async fn test_post_reports_missing_configuration() {
        let app = router(unconfigured());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(PROXY_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"],
            "Brak wymaganych zmiennych środowiskowych: ASSISTANT_ID_SHORT"
        );
    }

    #[tokio::test]
    async fn test_health_reports_configuration() {
        let app = router(unconfigured());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let health = json_body(response).await;
        assert_eq!(health["healthy"], false);
        assert_eq!(health["status"], "NOT_CONFIGURED");
        assert_eq!(health["service_name"], SERVICE_NAME);
    }

    #[tokio::test]
    async fn test_function_event_shape() {
        let response = handle_function_event(
            &unconfigured(),
            FunctionEvent {
                http_method: "GET".to_string(),
                body: None,
            },
        )
        .await;

        assert_eq!(response.status_code, 405);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.body, r#"{"success":false,"error":"Method Not Allowed"}"#);

        let serialized = serde_json::to_value(&response).unwrap();
        assert_eq!(serialized["statusCode"], 405);
    }

    #[tokio::test]
    async fn test_function_event_configured_post() {
        let response = handle_function_event(
            &configured("Tak"),
            FunctionEvent {
                http_method: "POST".to_string(),
                body: Some(r#"{"question": "q", "assistantKey": "SHORT"}"#.to_string()),
            },
        )
        .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&response.body).unwrap(),
            serde_json::json!({
                "success": true,
                "answer": "Tak",
                "assistantKey": "SHORT",
                "assistantName": "Skrócona wersja"
            })
        );
    }

    #[tokio::test]
    async fn test_function_event_deserializes_platform_fields() {
        let event: FunctionEvent = serde_json::from_str(
            r#"{"httpMethod": "POST", "body": "{\"question\":\"q\"}", "path": "/.netlify/functions/assistant-proxy"}"#,
        )
        .unwrap();

        assert_eq!(event.http_method, "POST");
        assert_eq!(event.body.as_deref(), Some(r#"{"question":"q"}"#));

        let response = handle_function_event(&unconfigured(), FunctionEvent::default()).await;
        assert_eq!(response.status_code, 405);
    }
}

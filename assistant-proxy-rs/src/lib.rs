//! # Assistant Proxy
//!
//! Forwards questions to one of three remote assistant profiles, waits for
//! the asynchronous run to finish and returns the cleaned answer. Answers and
//! user ratings are appended to a spreadsheet on a best-effort basis.
//!
//! The request flow lives in [`ProxyService`]; [`adapters`] exposes it as an
//! axum router and as a platform-function handler.

pub mod adapters;
pub mod dispatcher;
pub mod feedback;
pub mod orchestrator;
pub mod profiles;
pub mod sanitizer;
pub mod settings;
pub mod validation;

pub use adapters::{handle_function_event, router, FunctionEvent, FunctionResponse};
pub use dispatcher::{ProxyError, ProxyRequest, ProxyResponse, ProxyRuntime, ProxyService, ResponseBody};
pub use profiles::{AssistantKey, AssistantProfile, AssistantRegistry};

/// Install the tracing subscriber used by both binaries.
///
/// `RUST_LOG` overrides the default `info` filter. Records emitted through
/// the `log` facade are captured as well.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

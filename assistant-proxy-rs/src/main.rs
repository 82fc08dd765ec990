// assistant-proxy-rs/src/main.rs
// Assistant Proxy - HTTP entry point
// Port 8282 - POST /api/assistant-proxy
//
// Implements:
// - Question forwarding to the configured assistant profiles
// - Rating capture to the feedback spreadsheet

use assistant_proxy::{router, ProxyService};
use tool_sdk::config::DEFAULT_PROVIDER;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    assistant_proxy::init_tracing();

    // Load .env file
    config_rs::load_environment();

    let service = ProxyService::from_provider(&**DEFAULT_PROVIDER);
    if !service.is_configured() {
        tracing::warn!("Starting without complete configuration; POST requests will fail until it is fixed");
    }

    // Use standardized bind address function
    let port = config_rs::get_default_port(config_rs::ASSISTANT_PROXY);
    let addr = config_rs::get_bind_address(config_rs::ASSISTANT_PROXY, port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Assistant proxy starting on {}", addr);

    axum::serve(listener, router(service)).await?;

    Ok(())
}

// assistant-proxy-rs/src/bin/assistant-proxy-fn.rs
// Assistant Proxy - platform function entry point
//
// Reads one function event as JSON from stdin and writes the function
// response as JSON to stdout.

use std::io::Read;

use assistant_proxy::{handle_function_event, FunctionEvent, ProxyService};
use tool_sdk::config::DEFAULT_PROVIDER;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout carries only the response
    assistant_proxy::init_tracing();

    config_rs::load_environment();

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let event: FunctionEvent = serde_json::from_str(&input)?;

    let service = ProxyService::from_provider(&**DEFAULT_PROVIDER);
    let response = handle_function_event(&service, event).await;

    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}

//! config-rs/lib.rs
//! Shared configuration utilities for the assistant proxy binaries
//! Provides standardized functions for `.env` loading and port/address management

use std::env;
use std::net::SocketAddr;

/// Name under which the proxy looks up its port and address overrides
pub const ASSISTANT_PROXY: &str = "ASSISTANT_PROXY";

/// Load variables from a `.env` file in the working directory, if one exists.
///
/// Variables already present in the process environment win over the file.
pub fn load_environment() {
    match dotenv::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => log::debug!("No .env file found, using process environment"),
        Err(err) => log::warn!("Failed to parse .env file: {}", err),
    }
}

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "ASSISTANT_PROXY")
/// * `default_port` - The default port to use if not specified in environment
///
/// # Returns
/// The port number to use for the service
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    env::var(&var_name)
        .unwrap_or_else(|_| default_port.to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        })
}

/// Create a SocketAddr for binding a service
///
/// `<SERVICE>_SERVICE_ADDR` may hold either `host:port` or `http://host:port`;
/// otherwise the service binds all interfaces on the resolved port.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let trimmed = addr_str
            .strip_prefix("http://")
            .or_else(|| addr_str.strip_prefix("https://"))
            .unwrap_or(&addr_str);

        match trimmed.parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Get default port for a specific service
pub fn get_default_port(service_name: &str) -> u16 {
    match service_name.to_uppercase().as_str() {
        ASSISTANT_PROXY => 8282,
        _ => 8080,
    }
}

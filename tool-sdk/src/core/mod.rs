//! Core abstractions for the Tool SDK
//!
//! This module provides the fundamental trait interfaces that the service
//! clients implement:
//!
//! - `ServiceClient`: The base trait for all service clients
//! - `AuthenticatedClient`: Adds authentication header handling

use reqwest::header::HeaderMap;

use crate::error::Result;

/// Base trait for all service clients
pub trait ServiceClient: Send + Sync {
    /// The client name/identifier
    fn name(&self) -> &str;

    /// The base URL for the service
    fn base_url(&self) -> &str;
}

/// Trait for clients that require authentication
pub trait AuthenticatedClient: Send + Sync {
    /// Authentication type (e.g., "Bearer", "ApiKey")
    fn auth_type(&self) -> &str;

    /// Check if client is authenticated
    fn is_authenticated(&self) -> bool;

    /// Add authentication headers to a request
    fn apply_auth(&self, headers: &mut HeaderMap) -> Result<()>;
}

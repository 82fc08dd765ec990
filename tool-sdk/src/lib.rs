//! # Tool SDK
//!
//! Typed clients for the external services the assistant proxy talks to.
//!
//! This crate provides:
//!
//! - A base `ServiceClient` trait shared by every client
//! - `AssistantsClient` for the OpenAI Assistants v2 API (threads, messages, runs)
//! - `SheetsWebhookClient` for the spreadsheet logging webhook
//! - A comprehensive error handling system with HTTP error mapping
//! - Configuration providers backed by the environment or memory
//!
//! ## Architecture
//!
//! - `ServiceClient`: The base trait for all external service clients
//! - `ConfigProvider`: Key/value configuration source used to build clients
//! - `ServiceError`: Comprehensive error handling system

// Re-export core modules
pub mod core;
pub use core::ServiceClient;

// Re-export service-specific modules
pub mod services;
pub use services::{openai, sheets};

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, Result, ServiceError};

// Re-export configuration management
pub mod config;
pub use config::{ConfigProvider, ConfigProviderExt, ServiceConfig};

#[cfg(test)]
mod tests;

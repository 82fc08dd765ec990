//! Configuration management for service clients
//!
//! This module provides utilities for loading and validating configuration
//! for external service clients, with support for environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a string value, treating an empty or whitespace-only value as missing
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    /// Get an unsigned integer configuration value
    fn get_u64(&self, key: &str) -> Result<u64> {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_non_empty(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an unsigned integer configuration value with a default
    fn get_u64_or(&self, key: &str, default: u64) -> u64 {
        match self.get_non_empty(key) {
            Some(_) => self.get_u64(key).unwrap_or_else(|err| {
                log::warn!("{}; using default {}", err, default);
                default
            }),
            None => default,
        }
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        // Uppercase and replace non-alphanumeric with underscores
        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                ServiceError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => ServiceError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    /// Configuration values
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Global default configuration provider
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new()));

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

/// Default endpoint of the Assistants API
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Protocol version pinned through the `OpenAI-Beta` header
pub const ASSISTANTS_BETA: &str = "assistants=v2";

/// Configuration for the OpenAI Assistants API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantsConfig {
    /// API key
    pub api_key: String,

    /// Organization ID (optional)
    pub org_id: Option<String>,

    /// Base URL (can be changed for proxies)
    pub base_url: String,

    /// Value sent in the `OpenAI-Beta` header
    pub beta: String,

    /// Timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for AssistantsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            org_id: None,
            base_url: OPENAI_DEFAULT_BASE_URL.to_string(),
            beta: ASSISTANTS_BETA.to_string(),
            timeout_seconds: 60,
        }
    }
}

impl AssistantsConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let api_key = provider
            .get_non_empty("openai_api_key")
            .ok_or_else(|| ServiceError::configuration("OpenAI API key is required"))?;
        let org_id = provider.get_non_empty("openai_org_id");
        let base_url = provider.get_string_or("openai_base_url", OPENAI_DEFAULT_BASE_URL);
        let timeout_seconds = provider.get_u64_or("openai_timeout_seconds", 60);

        let config = Self {
            api_key,
            org_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            beta: ASSISTANTS_BETA.to_string(),
            timeout_seconds,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for AssistantsConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ServiceError::configuration("OpenAI API key is required"));
        }

        if self.base_url.is_empty() {
            return Err(ServiceError::configuration("OpenAI base URL is required"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "openai"
    }
}

/// Sheet name used when `GOOGLE_SHEET_NAME` is not set
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Configuration for the spreadsheet logging webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Webhook endpoint
    pub webhook_url: String,

    /// Target spreadsheet identifier
    pub sheet_id: String,

    /// Target sheet (tab) name
    pub sheet_name: String,

    /// Timeout in seconds
    pub timeout_seconds: u64,
}

impl SheetsConfig {
    /// Load configuration from a config provider.
    ///
    /// Returns `Ok(None)` when the webhook URL or sheet id is absent, which
    /// disables spreadsheet logging altogether.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Option<Self>> {
        let (webhook_url, sheet_id) = match (
            provider.get_non_empty("google_webhook_url"),
            provider.get_non_empty("google_sheet_id"),
        ) {
            (Some(url), Some(id)) => (url, id),
            _ => return Ok(None),
        };

        let config = Self {
            webhook_url,
            sheet_id,
            sheet_name: provider.get_string_or("google_sheet_name", DEFAULT_SHEET_NAME),
            timeout_seconds: provider.get_u64_or("google_webhook_timeout_seconds", 30),
        };

        config.validate()?;
        Ok(Some(config))
    }
}

impl ServiceConfig for SheetsConfig {
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.webhook_url).map_err(|e| {
            ServiceError::configuration(format!("Invalid webhook URL {}: {}", self.webhook_url, e))
        })?;

        if self.sheet_id.is_empty() {
            return Err(ServiceError::configuration("Sheet id is required"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "sheets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("key1", "value1");
        provider.set("key2", "123");
        provider.set("blank", "   ");

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get_u64("key2").unwrap(), 123);
        assert!(provider.get_string("key3").is_err());
        assert_eq!(provider.get_non_empty("blank"), None);
        assert_eq!(provider.get_u64_or("key1", 7), 7);
    }

    #[test]
    fn test_env_config_provider() {
        let provider = EnvConfigProvider::new().with_prefix("TEST");

        assert_eq!(provider.format_key("api_key"), "TEST_API_KEY");
        assert_eq!(provider.format_key("base-url"), "TEST_BASE_URL");
        assert_eq!(EnvConfigProvider::new().format_key("openai_api_key"), "OPENAI_API_KEY");
    }

    #[test]
    fn test_assistants_config() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("openai_api_key", "test_api_key");
        provider.set("openai_base_url", "https://test.openai.com/v1/");

        let config = AssistantsConfig::from_provider(&provider).unwrap();
        assert_eq!(config.api_key, "test_api_key");
        assert_eq!(config.base_url, "https://test.openai.com/v1");
        assert_eq!(config.beta, "assistants=v2");
        assert_eq!(config.timeout_seconds, 60);

        let empty = MemoryConfigProvider::new();
        assert!(AssistantsConfig::from_provider(&empty).is_err());
    }

    #[test]
    fn test_sheets_config() {
        let mut provider = MemoryConfigProvider::new();
        assert!(SheetsConfig::from_provider(&provider).unwrap().is_none());

        provider.set("google_webhook_url", "https://script.example.com/exec");
        assert!(SheetsConfig::from_provider(&provider).unwrap().is_none());

        provider.set("google_sheet_id", "sheet-123");
        let config = SheetsConfig::from_provider(&provider).unwrap().unwrap();
        assert_eq!(config.sheet_name, "Sheet1");

        provider.set("google_sheet_name", "Feedback");
        let config = SheetsConfig::from_provider(&provider).unwrap().unwrap();
        assert_eq!(config.sheet_name, "Feedback");

        provider.set("google_webhook_url", "not a url");
        assert!(SheetsConfig::from_provider(&provider).is_err());
    }
}

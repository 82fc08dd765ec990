//! Proxy settings
//!
//! Required settings are checked together so that a misconfigured deployment
//! reports every missing variable at once.

use std::time::Duration;

use tool_sdk::config::{ConfigProvider, ConfigProviderExt};
use tracing::warn;

use crate::orchestrator::PollPolicy;
use crate::profiles::{AssistantKey, AssistantRegistry};

/// Credential for the completion service
pub const OPENAI_API_KEY: &str = "openai_api_key";

/// Interval between run status checks
pub const RUN_POLL_INTERVAL_MS: &str = "run_poll_interval_ms";

/// Optional upper bound on the total polling wait
pub const RUN_POLL_TIMEOUT_MS: &str = "run_poll_timeout_ms";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Configuration problems detected before any request is served
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Brak wymaganych zmiennych środowiskowych: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("Nieprawidłowa konfiguracja: {0}")]
    Invalid(String),
}

/// Settings the request flow depends on
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub registry: AssistantRegistry,
    pub poll: PollPolicy,
}

impl ProxySettings {
    /// Load settings from a provider. Keys are lower-case; missing names are
    /// reported the way they appear in the environment.
    pub fn load<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self, ConfigurationError> {
        let required = std::iter::once(OPENAI_API_KEY)
            .chain(AssistantKey::ALL.iter().map(|key| key.setting_key()));

        let missing: Vec<String> = required
            .filter(|key| provider.get_non_empty(key).is_none())
            .map(|key| key.to_uppercase())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigurationError::MissingVariables(missing));
        }

        let id = |key: AssistantKey| provider.get_non_empty(key.setting_key()).unwrap_or_default();
        let registry = AssistantRegistry::new(
            id(AssistantKey::Short),
            id(AssistantKey::Product),
            id(AssistantKey::Detailed),
        );

        let interval = provider.get_u64_or(RUN_POLL_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS);
        let max_wait = match provider.get_non_empty(RUN_POLL_TIMEOUT_MS) {
            Some(_) => match provider.get_u64(RUN_POLL_TIMEOUT_MS) {
                Ok(millis) => Some(Duration::from_millis(millis)),
                Err(err) => {
                    warn!(error = %err, "Ignoring poll timeout, polling is unbounded");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            registry,
            poll: PollPolicy {
                interval: Duration::from_millis(interval),
                max_wait,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tool_sdk::config::MemoryConfigProvider;

    fn complete_provider() -> MemoryConfigProvider {
        let mut provider = MemoryConfigProvider::new();
        provider.set("openai_api_key", "sk-test");
        provider.set("assistant_id_short", "asst_s");
        provider.set("assistant_id_product", "asst_p");
        provider.set("assistant_id_detailed", "asst_d");
        provider
    }

    #[test]
    fn test_missing_variables_in_declaration_order() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("assistant_id_product", "asst_p");
        provider.set("assistant_id_detailed", "  ");

        let err = ProxySettings::load(&provider).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Brak wymaganych zmiennych środowiskowych: OPENAI_API_KEY, ASSISTANT_ID_SHORT, ASSISTANT_ID_DETAILED"
        );
    }

    #[test]
    fn test_defaults() {
        let settings = ProxySettings::load(&complete_provider()).unwrap();

        assert_eq!(settings.poll.interval, Duration::from_millis(2000));
        assert_eq!(settings.poll.max_wait, None);
        assert_eq!(settings.registry.get(AssistantKey::Product).unwrap().external_id, "asst_p");
    }

    #[test]
    fn test_poll_overrides() {
        let mut provider = complete_provider();
        provider.set("run_poll_interval_ms", "250");
        provider.set("run_poll_timeout_ms", "90000");

        let settings = ProxySettings::load(&provider).unwrap();
        assert_eq!(settings.poll.interval, Duration::from_millis(250));
        assert_eq!(settings.poll.max_wait, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_unparseable_poll_values_fall_back() {
        let mut provider = complete_provider();
        provider.set("run_poll_interval_ms", "fast");
        provider.set("run_poll_timeout_ms", "90s");

        let settings = ProxySettings::load(&provider).unwrap();
        assert_eq!(settings.poll.interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        assert_eq!(settings.poll.max_wait, None);
    }
}

//! Assistant profiles
//!
//! The proxy fronts exactly three remote assistants. Each one is addressed by
//! a symbolic key in requests and by an opaque external id upstream.

use std::collections::HashMap;
use std::fmt;

/// Symbolic key of an assistant profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssistantKey {
    Short,
    Product,
    Detailed,
}

impl AssistantKey {
    /// All keys in declaration order
    pub const ALL: [AssistantKey; 3] = [
        AssistantKey::Short,
        AssistantKey::Product,
        AssistantKey::Detailed,
    ];

    /// Resolve a caller-supplied key. Matching ignores surrounding
    /// whitespace and case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "SHORT" => Some(Self::Short),
            "PRODUCT" => Some(Self::Product),
            "DETAILED" => Some(Self::Detailed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "SHORT",
            Self::Product => "PRODUCT",
            Self::Detailed => "DETAILED",
        }
    }

    /// Human-readable name returned to callers and written to the sheet
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Short => "Skrócona wersja",
            Self::Product => "Produktowa wersja",
            Self::Detailed => "Szczegółowa wersja",
        }
    }

    /// Configuration key holding the external assistant id
    pub fn setting_key(&self) -> &'static str {
        match self {
            Self::Short => "assistant_id_short",
            Self::Product => "assistant_id_product",
            Self::Detailed => "assistant_id_detailed",
        }
    }
}

impl fmt::Display for AssistantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured remote assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantProfile {
    pub key: AssistantKey,
    pub external_id: String,
    pub display_name: String,
}

impl AssistantProfile {
    pub fn new(key: AssistantKey, external_id: impl Into<String>) -> Self {
        Self {
            key,
            external_id: external_id.into(),
            display_name: key.display_name().to_string(),
        }
    }
}

/// Fixed table of the three profiles, read-only after start
#[derive(Debug, Clone)]
pub struct AssistantRegistry {
    profiles: HashMap<AssistantKey, AssistantProfile>,
}

impl AssistantRegistry {
    /// Build the registry from the external ids of all three profiles
    pub fn new(short: impl Into<String>, product: impl Into<String>, detailed: impl Into<String>) -> Self {
        let profiles = [
            AssistantProfile::new(AssistantKey::Short, short),
            AssistantProfile::new(AssistantKey::Product, product),
            AssistantProfile::new(AssistantKey::Detailed, detailed),
        ]
        .into_iter()
        .map(|profile| (profile.key, profile))
        .collect();

        Self { profiles }
    }

    pub fn get(&self, key: AssistantKey) -> Option<&AssistantProfile> {
        self.profiles.get(&key)
    }

    /// Look up a profile by a caller-supplied key
    pub fn resolve(&self, raw: &str) -> Option<&AssistantProfile> {
        AssistantKey::parse(raw).and_then(|key| self.get(key))
    }
}

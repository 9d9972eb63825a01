use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// AI provider tags. The set is closed: anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    OpenAI,
    Anthropic,
    Google,
}

impl AIProvider {
    /// All supported provider tags, in the order they are offered to the user
    pub const ALL: [AIProvider; 3] = [
        AIProvider::OpenAI,
        AIProvider::Anthropic,
        AIProvider::Google,
    ];

    /// Lowercase tag used in persisted state and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            AIProvider::OpenAI => "openai",
            AIProvider::Anthropic => "anthropic",
            AIProvider::Google => "google",
        }
    }

    /// Human readable name for menus
    pub fn display_name(&self) -> &'static str {
        match self {
            AIProvider::OpenAI => "OpenAI",
            AIProvider::Anthropic => "Anthropic Claude",
            AIProvider::Google => "Google AI (Coming Soon)",
        }
    }

    /// Accepted API key prefixes for this provider
    pub fn key_prefixes(&self) -> &'static [&'static str] {
        match self {
            AIProvider::OpenAI => &["sk-"],
            AIProvider::Anthropic => &["sk-ant-", "ant-"],
            AIProvider::Google => &["ai-", "AIza"],
        }
    }

    /// Placeholder shown when asking for a key
    pub fn key_hint(&self) -> &'static str {
        match self {
            AIProvider::OpenAI => "sk-...",
            AIProvider::Anthropic => "ant-...",
            AIProvider::Google => "ai-...",
        }
    }

    /// Key under which this provider's API key is persisted
    pub fn storage_key(&self) -> String {
        format!("{}-api-key", self.as_str())
    }
}

impl std::fmt::Display for AIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised for any provider tag outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported AI provider: {tag}")]
pub struct UnsupportedProviderError {
    pub tag: String,
}

impl FromStr for AIProvider {
    type Err = UnsupportedProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(AIProvider::OpenAI),
            "anthropic" => Ok(AIProvider::Anthropic),
            "google" => Ok(AIProvider::Google),
            other => Err(UnsupportedProviderError {
                tag: other.to_string(),
            }),
        }
    }
}

/// A provider selection paired with its API key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub provider: AIProvider,
    pub api_key: String,
}

impl Credential {
    pub fn new(provider: AIProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
        }
    }

    /// API key with everything but the first and last four characters hidden
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
    }
}

// Keys never end up in logs through Debug.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("api_key", &self.masked_key())
            .finish()
    }
}

//! Application configuration: a JSON file in the application directory plus
//! environment overrides for the object store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::utils::paths::get_config_path;

/// Where API keys are persisted
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackendKind {
    /// Plaintext JSON next to the config file
    #[default]
    File,
    /// OS keychain
    Keychain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OpenAIConfig {
    pub model: String,

    /// Optional custom base URL (e.g. a proxy or a compatible server)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            model: "gpt-5-mini-2025-08-07".to_string(),
            api_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 1024,
            api_base_url: None,
        }
    }
}

/// Per-vendor settings handed to the provider factory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub openai: OpenAIConfig,
    pub anthropic: AnthropicConfig,
}

/// S3-compatible object store (AWS S3, Cloudflare R2, MinIO)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

fn default_region() -> String {
    "auto".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub credential_backend: CredentialBackendKind,
    pub openai: OpenAIConfig,
    pub anthropic: AnthropicConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
}

impl AppConfig {
    /// Load from `path` (or ~/.pdfchat/config.json) and apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => get_config_path()?,
        };

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.apply_env_with(|name| std::env::var(name).ok());

        Ok(config)
    }

    /// Overlay R2 storage settings from the environment. The three R2
    /// credentials must all be present to take effect.
    pub fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        let (Some(bucket), Some(access_key_id), Some(secret_access_key)) = (
            get("R2_BUCKET_NAME"),
            get("R2_ACCESS_KEY_ID"),
            get("R2_SECRET_ACCESS_KEY"),
        ) else {
            return;
        };

        let endpoint = get("CLOUDFLARE_ACCOUNT_ID")
            .map(|account| format!("https://{}.r2.cloudflarestorage.com", account));

        tracing::debug!("Using object storage bucket from environment: {}", bucket);

        self.storage = Some(StorageConfig {
            bucket,
            region: default_region(),
            endpoint,
            access_key_id: Some(access_key_id),
            secret_access_key: Some(secret_access_key),
        });
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            openai: self.openai.clone(),
            anthropic: self.anthropic.clone(),
        }
    }
}

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use super::models::{AIProvider, Credential};

/// Key holding the most recently selected provider tag
pub const PROVIDER_KEY: &str = "ai-provider";

/// Persisted string key-value state the credential store writes through
pub trait CredentialBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Saves and restores the provider selection and per-provider API keys.
///
/// Keys of several providers coexist; `load` only returns the pairing for the
/// provider saved last. Nothing is encrypted by this layer.
pub struct CredentialStore {
    backend: Box<dyn CredentialBackend>,
}

impl CredentialStore {
    pub fn new(backend: Box<dyn CredentialBackend>) -> Self {
        Self { backend }
    }

    /// Store an in-memory backend, useful for ephemeral sessions
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::default()))
    }

    /// Persist a key and make its provider the active selection
    pub fn save(&self, provider: AIProvider, api_key: &str) -> Result<()> {
        self.backend.set(&provider.storage_key(), api_key)?;
        self.backend.set(PROVIDER_KEY, provider.as_str())?;

        tracing::info!("Saved API key for provider: {}", provider);

        Ok(())
    }

    /// Restore the most recently saved provider with its key
    pub fn load(&self) -> Result<Option<Credential>> {
        let Some(tag) = self.backend.get(PROVIDER_KEY)? else {
            return Ok(None);
        };

        let provider: AIProvider = match tag.parse() {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("Ignoring saved provider selection: {}", e);
                return Ok(None);
            }
        };

        Ok(self
            .load_key(provider)?
            .map(|api_key| Credential::new(provider, api_key)))
    }

    /// Look up the saved key of one provider
    pub fn load_key(&self, provider: AIProvider) -> Result<Option<String>> {
        self.backend.get(&provider.storage_key())
    }

    /// Forget a provider's key, and the selection if it points at that provider
    pub fn delete(&self, provider: AIProvider) -> Result<()> {
        self.backend.remove(&provider.storage_key())?;

        if self.backend.get(PROVIDER_KEY)?.as_deref() == Some(provider.as_str()) {
            self.backend.remove(PROVIDER_KEY)?;
        }

        tracing::info!("Deleted API key for provider: {}", provider);

        Ok(())
    }
}

/// Process-local backend
#[derive(Default)]
pub struct MemoryBackend {
    values: RwLock<BTreeMap<String, String>>,
}

impl CredentialBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}

/// Plaintext JSON file backend (`~/.pdfchat/credentials.json` by default)
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents =
            fs::read_to_string(&self.path).context("Failed to read credentials file")?;

        serde_json::from_str(&contents).context("Failed to parse credentials file")
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create credentials directory")?;
        }

        let contents =
            serde_json::to_string_pretty(values).context("Failed to serialize credentials")?;

        fs::write(&self.path, contents).context("Failed to write credentials file")?;

        tracing::debug!("Wrote {} credential entries", values.len());

        Ok(())
    }
}

impl CredentialBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_after_save_returns_same_pair() {
        let store = CredentialStore::in_memory();
        store.save(AIProvider::OpenAI, "sk-abc").unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, Credential::new(AIProvider::OpenAI, "sk-abc"));
    }

    #[test]
    fn test_load_empty_store() {
        let store = CredentialStore::in_memory();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_keys_coexist_and_last_provider_wins() {
        let store = CredentialStore::in_memory();
        store.save(AIProvider::OpenAI, "sk-openai").unwrap();
        store.save(AIProvider::Anthropic, "sk-ant-claude").unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.provider, AIProvider::Anthropic);
        assert_eq!(loaded.api_key, "sk-ant-claude");

        assert_eq!(
            store.load_key(AIProvider::OpenAI).unwrap(),
            Some("sk-openai".to_string())
        );
    }

    #[test]
    fn test_delete_active_provider_clears_selection() {
        let store = CredentialStore::in_memory();
        store.save(AIProvider::OpenAI, "sk-openai").unwrap();
        store.save(AIProvider::Anthropic, "sk-ant-claude").unwrap();

        store.delete(AIProvider::OpenAI).unwrap();
        assert!(store.load().unwrap().is_some());

        store.delete(AIProvider::Anthropic).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_unknown_saved_tag_is_ignored() {
        let backend = MemoryBackend::default();
        backend.set(PROVIDER_KEY, "mistral").unwrap();
        let store = CredentialStore::new(Box::new(backend));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        CredentialStore::new(Box::new(FileBackend::new(path.clone())))
            .save(AIProvider::Anthropic, "ant-key")
            .unwrap();

        let reopened = CredentialStore::new(Box::new(FileBackend::new(path.clone())));
        let loaded = reopened.load().unwrap().unwrap();
        assert_eq!(loaded.provider, AIProvider::Anthropic);
        assert_eq!(loaded.api_key, "ant-key");

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"anthropic-api-key\""));
        assert!(raw.contains("\"ai-provider\""));
    }
}

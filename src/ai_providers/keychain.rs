use anyhow::{Context, Result};
use keyring::Entry;

use super::credentials::CredentialBackend;

const SERVICE_NAME: &str = "pdfchat";

/// Credential backend on the OS keychain. Each persisted key becomes one
/// keychain entry under the `pdfchat` service.
pub struct KeychainBackend {
    service: String,
}

impl KeychainBackend {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keychain entry")
    }
}

impl Default for KeychainBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialBackend for KeychainBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => {
                tracing::debug!("Loaded {} from keychain", key);
                Ok(Some(value))
            }
            Err(keyring::Error::NoEntry) => {
                tracing::debug!("No {} found in keychain", key);
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to read from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to save to keychain")?;

        tracing::debug!("Saved {} to keychain", key);

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(_) => {
                tracing::debug!("Deleted {} from keychain", key);
                Ok(())
            }
            // Already gone
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_providers::credentials::CredentialStore;
    use crate::ai_providers::models::AIProvider;

    // Needs a running secret service / keychain.
    #[test]
    #[ignore]
    fn test_keychain_roundtrip() {
        let store = CredentialStore::new(Box::new(KeychainBackend::new()));

        store.save(AIProvider::Anthropic, "sk-ant-test-secret").unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.provider, AIProvider::Anthropic);
        assert_eq!(loaded.api_key, "sk-ant-test-secret");

        store.delete(AIProvider::Anthropic).unwrap();
        assert!(store.load().unwrap().is_none());
    }
}

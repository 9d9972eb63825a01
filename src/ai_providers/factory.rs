use std::sync::Arc;

use super::anthropic::AnthropicClient;
use super::client::AIClient;
use super::models::AIProvider;
use super::openai::OpenAIClient;
use super::unavailable::UnavailableClient;
use crate::config::ProviderSettings;
use crate::error::Error;

/// Builds the client for a provider tag. This is the only place that maps a
/// tag to an adapter.
#[derive(Debug, Clone, Default)]
pub struct ProviderFactory {
    settings: ProviderSettings,
}

impl ProviderFactory {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }

    /// Construct a client without touching the network. A bad key only shows up
    /// on the first message.
    pub fn create_client(
        &self,
        provider: AIProvider,
        api_key: &str,
    ) -> Result<Arc<dyn AIClient>, Error> {
        let auth_init = |reason: String| Error::AuthInit { provider, reason };

        let client: Arc<dyn AIClient> = match provider {
            AIProvider::OpenAI => Arc::new(
                OpenAIClient::new(
                    api_key.to_string(),
                    self.settings.openai.model.clone(),
                    self.settings.openai.api_base_url.as_deref(),
                )
                .map_err(auth_init)?,
            ),
            AIProvider::Anthropic => Arc::new(
                AnthropicClient::new(
                    api_key.to_string(),
                    self.settings.anthropic.model.clone(),
                    self.settings.anthropic.max_tokens,
                    self.settings.anthropic.api_base_url.as_deref(),
                )
                .map_err(auth_init)?,
            ),
            AIProvider::Google => Arc::new(UnavailableClient::new(provider)),
        };

        tracing::info!("Created AI client for provider: {}", provider);

        Ok(client)
    }

    /// Same as [`create_client`](Self::create_client) for a raw tag
    pub fn create_client_for_tag(
        &self,
        tag: &str,
        api_key: &str,
    ) -> Result<Arc<dyn AIClient>, Error> {
        let provider: AIProvider = tag.parse()?;
        self.create_client(provider, api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_tag_yields_a_client() {
        let factory = ProviderFactory::default();
        for provider in AIProvider::ALL {
            let client = factory
                .create_client_for_tag(provider.as_str(), "sk-ant-test-key")
                .unwrap();
            assert_eq!(client.provider(), provider);
        }
    }

    #[test]
    fn test_unsupported_tag_is_rejected() {
        let factory = ProviderFactory::default();
        let err = factory
            .create_client_for_tag("mistral", "sk-test")
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnsupportedProvider(ref e) if e.tag == "mistral"));
    }

    #[tokio::test]
    async fn test_google_client_is_placeholder() {
        let factory = ProviderFactory::default();
        let client = factory.create_client(AIProvider::Google, "ai-test").unwrap();
        let reply = client.process_message("hi", None).await.unwrap();
        assert_eq!(reply, "Google AI integration coming soon!");
    }
}

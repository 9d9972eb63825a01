use futures::future::BoxFuture;
use futures::FutureExt;

use super::client::{AIClient, ProviderError};
use super::models::AIProvider;

/// Stand-in for providers that have no adapter yet. Never errors.
pub struct UnavailableClient {
    provider: AIProvider,
}

impl UnavailableClient {
    pub fn new(provider: AIProvider) -> Self {
        Self { provider }
    }

    fn notice(&self) -> String {
        match self.provider {
            AIProvider::Google => "Google AI integration coming soon!".to_string(),
            other => format!("{} integration is not yet available.", other.display_name()),
        }
    }
}

impl AIClient for UnavailableClient {
    fn provider(&self) -> AIProvider {
        self.provider
    }

    fn process_message<'a>(
        &'a self,
        _content: &'a str,
        _pdf_content: Option<&'a str>,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        let notice = self.notice();
        async move { Ok(notice) }.boxed()
    }
}

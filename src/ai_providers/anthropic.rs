use futures::future::BoxFuture;
use futures::FutureExt;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::anthropic;

use super::client::{settle, AIClient, ProviderError, DECLINE_INSTRUCTION};
use super::models::AIProvider;

/// Anthropic adapter over the messages API.
///
/// The messages API takes no separate context slot here, so the document is
/// prefixed to the user's question.
pub struct AnthropicClient {
    client: anthropic::Client,
    model: String,
    max_tokens: u64,
}

impl AnthropicClient {
    /// Build the vendor client. No request is sent until the first message.
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: u64,
        api_base_url: Option<&str>,
    ) -> Result<Self, String> {
        let client = match api_base_url {
            Some(url) => anthropic::Client::builder()
                .api_key(&api_key)
                .base_url(url)
                .build(),
            None => anthropic::Client::builder().api_key(&api_key).build(),
        }
        .map_err(|e| e.to_string())?;

        tracing::debug!("Created Anthropic client for model: {}", model);

        Ok(Self {
            client,
            model,
            max_tokens,
        })
    }
}

/// User prompt with optional grounding document
pub(crate) fn build_prompt(content: &str, pdf_content: Option<&str>) -> String {
    match pdf_content {
        Some(text) => format!(
            "Use the following PDF content to answer questions: {}\n\n{}\n\nQuestion: {}",
            text, DECLINE_INSTRUCTION, content
        ),
        None => content.to_string(),
    }
}

impl AIClient for AnthropicClient {
    fn provider(&self) -> AIProvider {
        AIProvider::Anthropic
    }

    fn process_message<'a>(
        &'a self,
        content: &'a str,
        pdf_content: Option<&'a str>,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        async move {
            let prompt = build_prompt(content, pdf_content);

            let agent = self
                .client
                .agent(&self.model)
                .max_tokens(self.max_tokens)
                .build();

            settle(agent.prompt(prompt).await)
        }
        .boxed()
    }
}

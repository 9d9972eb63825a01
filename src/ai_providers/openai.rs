use futures::future::BoxFuture;
use futures::FutureExt;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

use super::client::{settle, AIClient, ProviderError, BASE_SYSTEM_PROMPT, DECLINE_INSTRUCTION};
use super::models::AIProvider;

/// OpenAI adapter over the chat completions API.
///
/// Document context travels in the system message.
pub struct OpenAIClient {
    client: openai::Client,
    model: String,
}

impl OpenAIClient {
    /// Build the vendor client. No request is sent until the first message.
    pub fn new(api_key: String, model: String, api_base_url: Option<&str>) -> Result<Self, String> {
        let client = match api_base_url {
            Some(url) => openai::Client::builder()
                .api_key(&api_key)
                .base_url(url)
                .build(),
            None => openai::Client::builder().api_key(&api_key).build(),
        }
        .map_err(|e| e.to_string())?;

        tracing::debug!("Created OpenAI client for model: {}", model);

        Ok(Self { client, model })
    }
}

/// System prompt with optional grounding document
pub(crate) fn system_prompt(pdf_content: Option<&str>) -> String {
    match pdf_content {
        Some(text) => format!(
            "{} Use the following PDF content to answer questions: {}. {}",
            BASE_SYSTEM_PROMPT, text, DECLINE_INSTRUCTION
        ),
        None => BASE_SYSTEM_PROMPT.to_string(),
    }
}

impl AIClient for OpenAIClient {
    fn provider(&self) -> AIProvider {
        AIProvider::OpenAI
    }

    fn process_message<'a>(
        &'a self,
        content: &'a str,
        pdf_content: Option<&'a str>,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        async move {
            let system_prompt = system_prompt(pdf_content);

            let agent = self
                .client
                .clone()
                .completions_api()
                .agent(&self.model)
                .preamble(&system_prompt)
                .build();

            settle(agent.prompt(content.to_string()).await)
        }
        .boxed()
    }
}

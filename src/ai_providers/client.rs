use futures::future::BoxFuture;
use rig::completion::{CompletionError, PromptError};

use super::models::AIProvider;

/// Returned when a vendor answers with no text
pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't generate a response.";

/// Base system prompt for chat-style APIs
pub const BASE_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Instruction appended to injected document context
pub const DECLINE_INSTRUCTION: &str =
    "If the question cannot be answered using the PDF content, say so.";

/// Uniform chat capability over one vendor session.
///
/// Implementations issue exactly one completion request per call. When
/// `pdf_content` is present it is injected as grounding context in whatever
/// shape the vendor API expects.
pub trait AIClient: Send + Sync {
    /// Provider this client talks to
    fn provider(&self) -> AIProvider;

    /// Send one user message and return the assistant's reply
    fn process_message<'a>(
        &'a self,
        content: &'a str,
        pdf_content: Option<&'a str>,
    ) -> BoxFuture<'a, Result<String, ProviderError>>;
}

/// Failure categories for a vendor call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    AuthFailure,
    NetworkFailure,
    QuotaExceeded,
    Unsupported,
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProviderErrorKind::AuthFailure => "authentication failed",
            ProviderErrorKind::NetworkFailure => "request failed",
            ProviderErrorKind::QuotaExceeded => "quota exceeded",
            ProviderErrorKind::Unsupported => "unsupported request",
        };
        write!(f, "{}", label)
    }
}

/// Error from a vendor call, normalised across providers
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a vendor SDK error by its rendered text
    pub fn from_vendor(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        let kind = classify(&message);
        Self { kind, message }
    }
}

fn classify(message: &str) -> ProviderErrorKind {
    let text = message.to_lowercase();
    let has_any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    if has_any(&[
        "401",
        "403",
        "unauthorized",
        "invalid api key",
        "invalid x-api-key",
        "incorrect api key",
        "authentication",
        "permission",
    ]) {
        ProviderErrorKind::AuthFailure
    } else if has_any(&["429", "rate limit", "rate_limit", "quota", "overloaded"]) {
        ProviderErrorKind::QuotaExceeded
    } else if has_any(&[
        "404",
        "model not found",
        "model_not_found",
        "not supported",
        "unsupported",
    ]) {
        ProviderErrorKind::Unsupported
    } else {
        ProviderErrorKind::NetworkFailure
    }
}

/// Replace an empty completion with the fixed fallback text
pub(crate) fn or_fallback(response: String) -> String {
    if response.trim().is_empty() {
        FALLBACK_RESPONSE.to_string()
    } else {
        response
    }
}

/// Map the outcome of a rig prompt to the adapter result.
///
/// rig rejects a reply with no choices or no text as a `ResponseError`. That
/// is an empty answer, not a failed call, so it becomes the fallback text.
/// Other `ResponseError`s carry vendor error bodies and stay errors.
pub(crate) fn settle(result: Result<String, PromptError>) -> Result<String, ProviderError> {
    match result {
        Ok(response) => Ok(or_fallback(response)),
        Err(PromptError::CompletionError(CompletionError::ResponseError(message)))
            if is_empty_reply(&message) =>
        {
            tracing::debug!("Vendor returned no content: {}", message);
            Ok(FALLBACK_RESPONSE.to_string())
        }
        Err(e) => Err(ProviderError::from_vendor(e)),
    }
}

fn is_empty_reply(message: &str) -> bool {
    [
        "contained no choices",
        "no message or tool call",
        "did not contain a valid message",
    ]
    .iter()
    .any(|needle| message.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_failure() {
        let err = ProviderError::from_vendor("ProviderError: 401 Unauthorized: invalid x-api-key");
        assert_eq!(err.kind, ProviderErrorKind::AuthFailure);
    }

    #[test]
    fn test_classify_quota() {
        let err = ProviderError::from_vendor("HTTP 429: You exceeded your current quota");
        assert_eq!(err.kind, ProviderErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_classify_unsupported_model() {
        let err = ProviderError::from_vendor("The model `gpt-9` does not exist (model_not_found)");
        assert_eq!(err.kind, ProviderErrorKind::Unsupported);
    }

    #[test]
    fn test_classify_defaults_to_network() {
        let err = ProviderError::from_vendor("error sending request: connection reset by peer");
        assert_eq!(err.kind, ProviderErrorKind::NetworkFailure);
        assert!(err.to_string().starts_with("request failed: "));
    }

    #[test]
    fn test_fallback_on_empty_response() {
        assert_eq!(or_fallback(String::new()), FALLBACK_RESPONSE);
        assert_eq!(or_fallback("  \n".to_string()), FALLBACK_RESPONSE);
        assert_eq!(or_fallback("hello".to_string()), "hello");
    }

    fn response_error(message: &str) -> PromptError {
        PromptError::CompletionError(CompletionError::ResponseError(message.to_string()))
    }

    #[test]
    fn test_settle_turns_missing_choices_into_fallback() {
        let reply = settle(Err(response_error("Response contained no choices")));
        assert_eq!(reply.unwrap(), FALLBACK_RESPONSE);

        let reply = settle(Err(response_error(
            "Response contained no message or tool call (empty)",
        )));
        assert_eq!(reply.unwrap(), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_settle_keeps_vendor_error_bodies() {
        let err = settle(Err(response_error("Overloaded"))).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_settle_passes_text_through() {
        assert_eq!(settle(Ok("Paris".to_string())).unwrap(), "Paris");
        assert_eq!(settle(Ok(String::new())).unwrap(), FALLBACK_RESPONSE);
    }
}

use crate::ai_providers::{AIProvider, ProviderError, UnsupportedProviderError};
use crate::documents::ExtractionError;
use crate::validation::ValidationError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures reported to the user of a conversation session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnsupportedProvider(#[from] UnsupportedProviderError),

    #[error("failed to initialize {provider} client: {reason}")]
    AuthInit { provider: AIProvider, reason: String },

    #[error("no AI provider configured")]
    NoProvider,

    #[error("another request is still in progress")]
    Busy,

    #[error("{provider} request failed: {source}")]
    Provider {
        provider: AIProvider,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("credential storage failed: {reason}")]
    Persistence { reason: String },
}

impl Error {
    /// Wrap a credential backend failure, keeping its context chain
    pub fn persistence(err: anyhow::Error) -> Self {
        Error::Persistence {
            reason: format!("{:#}", err),
        }
    }

    /// Banner text for the user
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::UnsupportedProvider(e) => e.to_string(),
            Error::AuthInit { provider, .. } => {
                format!("Failed to initialize {} API", provider.as_str().to_uppercase())
            }
            Error::NoProvider => "Please set up your AI provider API key first".to_string(),
            Error::Busy => "Please wait for the current request to finish".to_string(),
            Error::Provider { provider, .. } => {
                format!("Failed to get response from {}", provider.as_str().to_uppercase())
            }
            Error::Extraction(_) => "Failed to process PDF file".to_string(),
            Error::Persistence { .. } => "Failed to save API key settings".to_string(),
        }
    }

    /// Whether the caller should ask for a credential again
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Error::NoProvider | Error::AuthInit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_providers::ProviderErrorKind;

    #[test]
    fn test_user_messages() {
        let err = Error::Provider {
            provider: AIProvider::OpenAI,
            source: ProviderError::new(ProviderErrorKind::NetworkFailure, "timeout"),
        };
        assert_eq!(err.user_message(), "Failed to get response from OPENAI");

        let err = Error::AuthInit {
            provider: AIProvider::Anthropic,
            reason: "bad key".to_string(),
        };
        assert_eq!(err.user_message(), "Failed to initialize ANTHROPIC API");
        assert!(err.needs_credentials());

        let err = Error::from(ValidationError::NotPdf);
        assert_eq!(err.user_message(), "Only PDF files are allowed");
        assert!(!err.needs_credentials());
    }

    #[test]
    fn test_persistence_keeps_context() {
        let source = anyhow::anyhow!("permission denied").context("Failed to write credentials");
        let err = Error::persistence(source);

        assert_eq!(err.user_message(), "Failed to save API key settings");
        assert_eq!(
            err.to_string(),
            "credential storage failed: Failed to write credentials: permission denied"
        );
        assert!(!err.needs_credentials());
    }

    #[test]
    fn test_no_provider_requests_credentials() {
        assert!(Error::NoProvider.needs_credentials());
        assert!(!Error::Busy.needs_credentials());
    }
}

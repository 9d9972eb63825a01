//! Input rules applied before any state changes: chat messages, uploaded
//! files and API keys.

use crate::ai_providers::AIProvider;

/// Longest accepted chat message, in characters
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Largest accepted upload, in bytes
pub const MAX_FILE_BYTES: u64 = 50_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message is too long")]
    MessageTooLong,

    #[error("Only PDF files are allowed")]
    NotPdf,

    #[error("File size must be less than 50MB")]
    FileTooLarge,

    #[error("API key is required")]
    MissingApiKey,

    #[error("Invalid API key format")]
    InvalidApiKeyFormat,
}

pub fn validate_message(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong);
    }
    Ok(())
}

/// Type is checked before size
pub fn validate_file(content_type: &str, size: u64) -> Result<(), ValidationError> {
    if content_type != mime::APPLICATION_PDF.essence_str() {
        return Err(ValidationError::NotPdf);
    }
    if size > MAX_FILE_BYTES {
        return Err(ValidationError::FileTooLarge);
    }
    Ok(())
}

pub fn validate_api_key(provider: AIProvider, api_key: &str) -> Result<(), ValidationError> {
    if api_key.is_empty() {
        return Err(ValidationError::MissingApiKey);
    }
    if !provider
        .key_prefixes()
        .iter()
        .any(|prefix| api_key.starts_with(prefix))
    {
        return Err(ValidationError::InvalidApiKeyFormat);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_bounds() {
        assert_eq!(validate_message(""), Err(ValidationError::EmptyMessage));
        assert!(validate_message("What is this about?").is_ok());
        assert!(validate_message(&"a".repeat(1000)).is_ok());
        assert_eq!(
            validate_message(&"a".repeat(1001)),
            Err(ValidationError::MessageTooLong)
        );
    }

    #[test]
    fn test_message_length_counts_characters() {
        // 1000 multi-byte characters is still within bounds
        assert!(validate_message(&"é".repeat(1000)).is_ok());
    }

    #[test]
    fn test_file_type_rejected() {
        assert_eq!(validate_file("text/plain", 10), Err(ValidationError::NotPdf));
    }

    #[test]
    fn test_file_size_rejected() {
        let err = validate_file("application/pdf", 60_000_000).unwrap_err();
        assert_eq!(err, ValidationError::FileTooLarge);
        assert_eq!(err.to_string(), "File size must be less than 50MB");
    }

    #[test]
    fn test_file_size_limit_is_inclusive() {
        assert!(validate_file("application/pdf", MAX_FILE_BYTES).is_ok());
    }

    #[test]
    fn test_api_key_prefixes() {
        assert!(validate_api_key(AIProvider::OpenAI, "sk-proj-123").is_ok());
        assert!(validate_api_key(AIProvider::Anthropic, "sk-ant-api03-xyz").is_ok());
        assert!(validate_api_key(AIProvider::Anthropic, "ant-xyz").is_ok());
        assert!(validate_api_key(AIProvider::Google, "ai-xyz").is_ok());
        assert_eq!(
            validate_api_key(AIProvider::OpenAI, "ant-xyz"),
            Err(ValidationError::InvalidApiKeyFormat)
        );
        assert_eq!(
            validate_api_key(AIProvider::OpenAI, ""),
            Err(ValidationError::MissingApiKey)
        );
    }
}

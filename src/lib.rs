// Modules
pub mod ai_providers;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod documents;
pub mod error;
pub mod utils;
pub mod validation;

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ai_providers::{CredentialStore, FileBackend, KeychainBackend, ProviderFactory};
use config::{AppConfig, CredentialBackendKind};
use conversation::ConversationController;
use documents::{DocumentIngestor, PdfExtractor, S3ObjectStore};

pub use error::Error;

/// Log to stderr, filtered by `RUST_LOG` (default: warn)
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Credential store for the configured backend
pub fn open_credential_store(config: &AppConfig) -> Result<CredentialStore> {
    let store = match config.credential_backend {
        CredentialBackendKind::File => CredentialStore::new(Box::new(FileBackend::new(
            utils::paths::get_credentials_path()?,
        ))),
        CredentialBackendKind::Keychain => CredentialStore::new(Box::new(KeychainBackend::new())),
    };

    Ok(store)
}

/// Wire a conversation session from configuration
pub fn build_controller(config: &AppConfig) -> Result<ConversationController> {
    let mut ingestor = DocumentIngestor::new(Arc::new(PdfExtractor));

    if let Some(storage) = &config.storage {
        match S3ObjectStore::new(storage) {
            Ok(store) => ingestor = ingestor.with_store(Arc::new(store)),
            // Uploads are optional; carry on without them
            Err(e) => tracing::warn!("Object storage disabled: {}", e),
        }
    }

    Ok(ConversationController::new(
        ProviderFactory::new(config.provider_settings()),
        open_credential_store(config)?,
        ingestor,
    ))
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::transcript::{Message, Role, Transcript};
use crate::ai_providers::{AIClient, AIProvider, CredentialStore, ProviderFactory};
use crate::documents::{DocumentIngestor, IngestState, IngestedDocument, UploadedFile};
use crate::error::{Error, Result};
use crate::validation::{validate_api_key, validate_message};

/// Owns one chat session: the active client, the transcript and the active
/// document.
///
/// Only one `submit` or `upload` runs at a time. A call made while another is
/// in flight fails with [`Error::Busy`] and changes nothing.
pub struct ConversationController {
    factory: ProviderFactory,
    credentials: CredentialStore,
    client: RwLock<Option<Arc<dyn AIClient>>>,
    transcript: Mutex<Transcript>,
    ingestor: Mutex<DocumentIngestor>,
    busy: AtomicBool,
}

/// Releases the busy flag on drop
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConversationController {
    pub fn new(
        factory: ProviderFactory,
        credentials: CredentialStore,
        ingestor: DocumentIngestor,
    ) -> Self {
        Self {
            factory,
            credentials,
            client: RwLock::new(None),
            transcript: Mutex::new(Transcript::new()),
            ingestor: Mutex::new(ingestor),
            busy: AtomicBool::new(false),
        }
    }

    /// Reinstall the client for the last saved credential, if there is one
    pub async fn restore_credential(&self) -> Result<Option<AIProvider>> {
        let credential = match self.credentials.load() {
            Ok(Some(credential)) => credential,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!("Failed to load saved credentials: {:#}", e);
                return Ok(None);
            }
        };

        let client = self
            .factory
            .create_client(credential.provider, &credential.api_key)?;
        self.install_client(client).await;

        tracing::info!("Restored saved credential for provider: {}", credential.provider);

        Ok(Some(credential.provider))
    }

    /// Validate a key, replace the active client and remember the choice
    pub async fn set_credential(&self, provider: AIProvider, api_key: &str) -> Result<()> {
        validate_api_key(provider, api_key)?;

        let client = self.factory.create_client(provider, api_key)?;
        self.install_client(client).await;

        if let Err(e) = self.credentials.save(provider, api_key) {
            tracing::warn!("Failed to persist API key for {}: {:#}", provider, e);
        }

        Ok(())
    }

    /// Replace the active client. The previous one is dropped once no
    /// in-flight call holds it.
    pub async fn install_client(&self, client: Arc<dyn AIClient>) {
        let provider = client.provider();
        *self.client.write().await = Some(client);
        tracing::info!("Switched to AI provider: {}", provider);
    }

    /// Provider of the active client
    pub async fn provider(&self) -> Option<AIProvider> {
        self.client.read().await.as_ref().map(|c| c.provider())
    }

    /// Send a user message, grounded on the active document if there is one.
    ///
    /// The user message is appended before the vendor call. On failure no
    /// assistant message is added and the user message stays.
    pub async fn submit(&self, content: &str) -> Result<Message> {
        validate_message(content)?;
        let _guard = self.try_begin()?;

        let Some(client) = self.client.read().await.clone() else {
            tracing::warn!("Message refused: no AI provider configured");
            return Err(Error::NoProvider);
        };

        self.transcript.lock().await.push(Role::User, content);

        let context = self
            .ingestor
            .lock()
            .await
            .document()
            .map(|d| d.extracted_text.clone());

        match client.process_message(content, context.as_deref()).await {
            Ok(reply) => {
                let mut transcript = self.transcript.lock().await;
                let message = transcript.push(Role::Assistant, reply).clone();

                tracing::info!(
                    "Message processed by {} (length: {})",
                    client.provider(),
                    message.content.len()
                );

                Ok(message)
            }
            Err(source) => {
                tracing::warn!("{} request failed: {}", client.provider(), source);
                Err(Error::Provider {
                    provider: client.provider(),
                    source,
                })
            }
        }
    }

    /// Ingest a file and announce it in the transcript once it is ready
    pub async fn upload(&self, file: UploadedFile) -> Result<IngestedDocument> {
        let _guard = self.try_begin()?;

        let document = self.ingestor.lock().await.ingest(file).await?.clone();

        self.transcript.lock().await.push(
            Role::Assistant,
            format!(
                "I've processed \"{}\". You can now ask questions about its content.",
                document.name
            ),
        );

        Ok(document)
    }

    /// Snapshot of the transcript
    pub async fn transcript(&self) -> Vec<Message> {
        self.transcript.lock().await.messages().to_vec()
    }

    /// Snapshot of the active document
    pub async fn document(&self) -> Option<IngestedDocument> {
        self.ingestor.lock().await.document().cloned()
    }

    pub async fn ingest_state(&self) -> IngestState {
        self.ingestor.lock().await.state().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(BusyGuard(&self.busy))
    }
}

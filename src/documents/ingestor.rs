use chrono::Utc;
use std::sync::Arc;

use super::extractor::TextExtractor;
use super::storage::{object_key, ObjectStore, StorageError, SIGNED_URL_TTL};
use super::{ExtractionError, IngestState, IngestedDocument, UploadedFile};
use crate::error::{Error, Result};
use crate::validation::validate_file;

/// Runs the upload pipeline and owns the active document.
///
/// `Idle → Validating → (Uploading) → Extracting → Ready`, or `Failed` from
/// validation or extraction. The upload stage runs only when an object store
/// is attached and its failure never stops the pipeline. A failed run leaves
/// the previously active document in place.
pub struct DocumentIngestor {
    store: Option<Arc<dyn ObjectStore>>,
    extractor: Arc<dyn TextExtractor>,
    state: IngestState,
    document: Option<IngestedDocument>,
}

impl DocumentIngestor {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            store: None,
            extractor,
            state: IngestState::Idle,
            document: None,
        }
    }

    /// Keep a copy of every upload in `store`
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> &IngestState {
        &self.state
    }

    /// The active document, if any upload has succeeded
    pub fn document(&self) -> Option<&IngestedDocument> {
        self.document.as_ref()
    }

    /// Run one file through the pipeline and install it as the active document
    pub async fn ingest(&mut self, file: UploadedFile) -> Result<&IngestedDocument> {
        // 1. Validate type and size before touching storage or the parser
        self.transition(IngestState::Validating);
        if let Err(e) = validate_file(&file.content_type, file.size()) {
            self.transition(IngestState::Failed {
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        // 2. Best-effort copy to object storage
        let remote_url = match self.store.clone() {
            Some(store) => {
                self.transition(IngestState::Uploading);
                match upload(store.as_ref(), &file).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!("Failed to upload {} to object storage: {}", file.name, e);
                        None
                    }
                }
            }
            None => None,
        };

        // 3. Extract page text off the async runtime
        self.transition(IngestState::Extracting);
        let UploadedFile { name, bytes, .. } = file;
        let extractor = Arc::clone(&self.extractor);
        let extracted = tokio::task::spawn_blocking(move || extractor.extract_pages(&bytes))
            .await
            .map_err(|e| ExtractionError::Worker(e.to_string()))
            .and_then(|pages| pages);

        let pages = match extracted {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("PDF processing error for {}: {}", name, e);
                self.transition(IngestState::Failed {
                    reason: e.to_string(),
                });
                return Err(Error::Extraction(e));
            }
        };

        // 4. Install
        let document = IngestedDocument {
            name,
            extracted_text: join_pages(&pages),
            page_count: pages.len(),
            remote_url,
            ingested_at: Utc::now(),
        };

        tracing::info!(
            "Document ready: {} ({} pages, {} chars)",
            document.name,
            document.page_count,
            document.extracted_text.len()
        );

        self.transition(IngestState::Ready);
        Ok(&*self.document.insert(document))
    }

    fn transition(&mut self, next: IngestState) {
        tracing::debug!("Ingestion state: {} -> {}", self.state, next);
        self.state = next;
    }
}

async fn upload(store: &dyn ObjectStore, file: &UploadedFile) -> Result<String, StorageError> {
    let key = object_key(&file.name, Utc::now());

    store.put(&key, file.bytes.clone(), &file.content_type).await?;
    tracing::info!("File uploaded to object storage: {}", key);

    store.signed_get_url(&key, SIGNED_URL_TTL).await
}

/// Items of a page are joined by single spaces and every page is followed by
/// one space. The result is used verbatim as prompt context.
pub fn join_pages(pages: &[Vec<String>]) -> String {
    let mut full_text = String::new();
    for items in pages {
        full_text.push_str(&items.join(" "));
        full_text.push(' ');
    }
    full_text
}

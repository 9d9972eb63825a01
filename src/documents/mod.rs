//! Document ingestion: validate an uploaded PDF, persist it on a best-effort
//! basis, extract its text and keep it as conversation context.

pub mod extractor;
pub mod ingestor;
pub mod storage;

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use extractor::{PdfExtractor, TextExtractor};
pub use ingestor::DocumentIngestor;
pub use storage::{ObjectStore, S3ObjectStore, StorageError};

/// A file handed over by the user
#[derive(Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file, deriving the content type from its extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        Ok(Self::new(name, content_type_for(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Content type for a local path, by extension
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// The document currently used as conversation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedDocument {
    pub name: String,
    pub extracted_text: String,
    pub page_count: usize,

    /// Time-limited link to the stored copy, if the upload succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    pub ingested_at: DateTime<Utc>,
}

/// Ingestion pipeline state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IngestState {
    #[default]
    Idle,
    Validating,
    Uploading,
    Extracting,
    Ready,
    Failed { reason: String },
}

impl std::fmt::Display for IngestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestState::Idle => write!(f, "idle"),
            IngestState::Validating => write!(f, "validating"),
            IngestState::Uploading => write!(f, "uploading"),
            IngestState::Extracting => write!(f, "extracting"),
            IngestState::Ready => write!(f, "ready"),
            IngestState::Failed { reason } => write!(f, "failed ({})", reason),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF parser crashed")]
    Panicked,

    #[error("extraction task failed: {0}")]
    Worker(String),
}

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use opendal::{services, Operator};
use std::time::Duration;

use crate::config::StorageConfig;

/// Lifetime of signed download links
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(86_400);

/// Object key for an upload: `pdfs/<unix millis>-<original name>`
pub fn object_key(file_name: &str, at: DateTime<Utc>) -> String {
    format!("pdfs/{}-{}", at.timestamp_millis(), file_name)
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage initialization failed: {0}")]
    Init(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("presign failed: {0}")]
    Presign(String),
}

/// Remote object storage used to keep a copy of uploads
pub trait ObjectStore: Send + Sync {
    fn put<'a>(
        &'a self,
        key: &'a str,
        bytes: Bytes,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    fn signed_get_url<'a>(
        &'a self,
        key: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<String, StorageError>>;
}

/// S3-compatible store (S3, R2, MinIO) through OpenDAL
#[derive(Clone)]
pub struct S3ObjectStore {
    operator: Operator,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut builder = services::S3::default()
            .bucket(&config.bucket)
            .region(&config.region);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        if let Some(ref access_key_id) = config.access_key_id {
            builder = builder.access_key_id(access_key_id);
        }

        if let Some(ref secret_access_key) = config.secret_access_key {
            builder = builder.secret_access_key(secret_access_key);
        }

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| StorageError::Init(e.to_string()))?;

        tracing::info!("Object storage initialized for bucket: {}", config.bucket);

        Ok(Self { operator })
    }
}

impl ObjectStore for S3ObjectStore {
    fn put<'a>(
        &'a self,
        key: &'a str,
        bytes: Bytes,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            tracing::debug!("Writing {} bytes to {}", bytes.len(), key);

            self.operator
                .write_with(key, bytes)
                .content_type(content_type)
                .await
                .map_err(|e| StorageError::Write(e.to_string()))?;

            Ok(())
        }
        .boxed()
    }

    fn signed_get_url<'a>(
        &'a self,
        key: &'a str,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        async move {
            let request = self
                .operator
                .presign_read(key, ttl)
                .await
                .map_err(|e| StorageError::Presign(e.to_string()))?;

            Ok(request.uri().to_string())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_object_key_format() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(object_key("report.pdf", at), "pdfs/1700000000123-report.pdf");
    }

    #[test]
    fn test_signed_url_ttl_is_one_day() {
        assert_eq!(SIGNED_URL_TTL.as_secs(), 86_400);
    }

    #[test]
    fn test_s3_store_builds_without_network() {
        let config = StorageConfig {
            bucket: "pdfs".to_string(),
            region: "auto".to_string(),
            endpoint: Some("https://acct.r2.cloudflarestorage.com".to_string()),
            access_key_id: Some("id".to_string()),
            secret_access_key: Some("secret".to_string()),
        };
        assert!(S3ObjectStore::new(&config).is_ok());
    }
}

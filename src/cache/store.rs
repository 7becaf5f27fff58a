//! Artifact store abstraction used by the render cache gateway.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use super::keys::CacheKey;

/// Content type recorded on every uploaded page.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Store operation, used to label errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Get,
    Put,
}

impl StoreOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreOperation::Get => "get",
            StoreOperation::Put => "put",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{key}` not found")]
    NotFound { key: String },
    #[error("invalid object key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },
    #[error("store {operation} for `{key}` timed out after {elapsed_ms}ms")]
    Timeout {
        operation: StoreOperation,
        key: String,
        elapsed_ms: u128,
    },
    #[error("store {operation} for `{key}` failed: {message}")]
    Backend {
        operation: StoreOperation,
        key: String,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: StoreOperation, key: &CacheKey, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A rendered page as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    pub key: CacheKey,
    pub bytes: Bytes,
    pub content_type: String,
}

/// Remote key/object store holding rendered pages.
///
/// Implementations keep no local state between calls and must be safe for
/// unsynchronized concurrent use.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload `bytes` under `key`, replacing any previous object.
    async fn put(&self, key: &CacheKey, bytes: Bytes, content_type: &str)
    -> Result<(), StoreError>;

    /// Fetch the object stored under `key`.
    async fn get(&self, key: &CacheKey) -> Result<CachedArtifact, StoreError>;

    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

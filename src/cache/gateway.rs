//! Render cache gateway: cache-aside over the artifact store.
//!
//! `serve` reads the page from the store; on a miss (or any read failure) it
//! renders once, uploads, and serves what a readback of the key returns.
//! When reads were already failing before the upload, a failed readback
//! serves the rendered bytes the store just accepted instead.
//! Concurrent first requests for one key may both render and upload, the
//! store keeps whichever write lands last.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::render::{PageRenderer, RenderError};
use crate::domain::pages::PageRequest;

use super::keys::CacheKey;
use super::store::{ArtifactStore, CachedArtifact, HTML_CONTENT_TYPE, StoreError, StoreOperation};

const SOURCE: &str = "cache::gateway";

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

pub const METRIC_STORE_HIT: &str = "pagestash_store_hit_total";
pub const METRIC_STORE_MISS: &str = "pagestash_store_miss_total";
pub const METRIC_STORE_READ_ERROR: &str = "pagestash_store_read_error_total";
pub const METRIC_RENDER: &str = "pagestash_render_total";
pub const METRIC_RENDER_MS: &str = "pagestash_render_ms";
pub const METRIC_UPLOAD_ERROR: &str = "pagestash_upload_error_total";
pub const METRIC_READBACK_ERROR: &str = "pagestash_readback_error_total";

/// Where the served bytes came from on this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
    /// Cache hit, nothing was rendered.
    Store,
    /// Rendered and uploaded on this call.
    Rendered,
}

#[derive(Debug, Clone)]
pub struct ServedPage {
    pub key: CacheKey,
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub source: ServeSource,
}

impl ServedPage {
    fn from_artifact(artifact: CachedArtifact, source: ServeSource) -> Self {
        Self {
            key: artifact.key,
            bytes: artifact.bytes,
            content_type: HTML_CONTENT_TYPE,
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("rendering `{key}` failed")]
    Render {
        key: CacheKey,
        #[source]
        source: RenderError,
    },
    #[error("uploading `{key}` to the store failed")]
    UploadFailed {
        key: CacheKey,
        #[source]
        source: StoreError,
    },
    #[error("reading `{key}` back from the store failed")]
    ReadbackFailed {
        key: CacheKey,
        #[source]
        source: StoreError,
    },
}

impl GatewayError {
    pub fn key(&self) -> &CacheKey {
        match self {
            GatewayError::Render { key, .. }
            | GatewayError::UploadFailed { key, .. }
            | GatewayError::ReadbackFailed { key, .. } => key,
        }
    }
}

#[derive(Clone)]
pub struct RenderCacheGateway {
    store: Arc<dyn ArtifactStore>,
    renderer: Arc<dyn PageRenderer>,
    store_timeout: Duration,
}

impl RenderCacheGateway {
    pub fn new(store: Arc<dyn ArtifactStore>, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            store,
            renderer,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Bound every individual store call by `timeout`.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn serve(&self, request: &PageRequest) -> Result<ServedPage, GatewayError> {
        let key = CacheKey::for_request(request);

        let reads_degraded = match self.read(&key).await {
            Ok(artifact) => {
                counter!(METRIC_STORE_HIT).increment(1);
                debug!(
                    target = SOURCE,
                    key = %key,
                    bytes = artifact.bytes.len(),
                    "served page from store"
                );
                return Ok(ServedPage::from_artifact(artifact, ServeSource::Store));
            }
            Err(StoreError::NotFound { .. }) => {
                counter!(METRIC_STORE_MISS).increment(1);
                debug!(target = SOURCE, key = %key, "page not in store");
                false
            }
            Err(err) => {
                counter!(METRIC_STORE_READ_ERROR).increment(1);
                warn!(
                    target = SOURCE,
                    key = %key,
                    operation = %StoreOperation::Get,
                    backend = self.store.name(),
                    error = %err,
                    "store read failed, treating as miss"
                );
                true
            }
        };

        let bytes = self.render(&key, request)?;

        if let Err(source) = self.upload(&key, bytes.clone()).await {
            counter!(METRIC_UPLOAD_ERROR).increment(1);
            error!(
                target = SOURCE,
                key = %key,
                operation = %StoreOperation::Put,
                backend = self.store.name(),
                error = %source,
                "upload of rendered page failed"
            );
            return Err(GatewayError::UploadFailed { key, source });
        }

        match self.read(&key).await {
            Ok(artifact) => {
                info!(
                    target = SOURCE,
                    key = %key,
                    bytes = artifact.bytes.len(),
                    "rendered and stored page"
                );
                Ok(ServedPage::from_artifact(artifact, ServeSource::Rendered))
            }
            Err(source) if reads_degraded && !source.is_not_found() => {
                counter!(METRIC_READBACK_ERROR).increment(1);
                warn!(
                    target = SOURCE,
                    key = %key,
                    operation = %StoreOperation::Get,
                    backend = self.store.name(),
                    error = %source,
                    "store reads unavailable, serving the uploaded render"
                );
                Ok(ServedPage {
                    key,
                    bytes,
                    content_type: HTML_CONTENT_TYPE,
                    source: ServeSource::Rendered,
                })
            }
            Err(source) => {
                counter!(METRIC_READBACK_ERROR).increment(1);
                error!(
                    target = SOURCE,
                    key = %key,
                    operation = %StoreOperation::Get,
                    backend = self.store.name(),
                    error = %source,
                    "readback after upload failed"
                );
                Err(GatewayError::ReadbackFailed { key, source })
            }
        }
    }

    fn render(&self, key: &CacheKey, request: &PageRequest) -> Result<Bytes, GatewayError> {
        let started = Instant::now();
        let result = self.renderer.render(request);
        histogram!(METRIC_RENDER_MS).record(started.elapsed().as_secs_f64() * 1000.0);
        counter!(METRIC_RENDER).increment(1);

        result.map_err(|source| {
            error!(
                target = SOURCE,
                key = %key,
                template = source.template,
                error = %source,
                "render failed"
            );
            GatewayError::Render {
                key: key.clone(),
                source,
            }
        })
    }

    async fn read(&self, key: &CacheKey) -> Result<CachedArtifact, StoreError> {
        let started = Instant::now();
        match tokio::time::timeout(self.store_timeout, self.store.get(key)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation: StoreOperation::Get,
                key: key.to_string(),
                elapsed_ms: started.elapsed().as_millis(),
            }),
        }
    }

    // The put runs on its own task: dropping the inbound request (or hitting
    // the timeout) stops the wait, not a write the store may already hold.
    async fn upload(&self, key: &CacheKey, bytes: Bytes) -> Result<(), StoreError> {
        let started = Instant::now();
        let store = Arc::clone(&self.store);
        let task_key = key.clone();
        let handle =
            tokio::spawn(async move { store.put(&task_key, bytes, HTML_CONTENT_TYPE).await });

        match tokio::time::timeout(self.store_timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(StoreError::backend(
                StoreOperation::Put,
                key,
                format!("upload task aborted: {join_error}"),
            )),
            Err(_) => Err(StoreError::Timeout {
                operation: StoreOperation::Put,
                key: key.to_string(),
                elapsed_ms: started.elapsed().as_millis(),
            }),
        }
    }
}

//! S3-compatible artifact store built on the `object_store` crate.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    Attribute, Attributes, GetOptions, ObjectStore, PutOptions, PutPayload,
    aws::AmazonS3Builder, memory::InMemory, path::Path as ObjectPath,
};
use tracing::debug;

use crate::cache::{
    ArtifactStore, CacheKey, CachedArtifact, HTML_CONTENT_TYPE, StoreError, StoreOperation,
};
use crate::config::StoreSettings;

use super::error::InfraError;

const SOURCE: &str = "infra::object_store";

/// Artifact store over any `object_store` backend.
///
/// Production uses S3 (or MinIO, R2, ...) with path-style addressing; tests
/// use the in-memory backend.
#[derive(Clone)]
pub struct ObjectStoreClient {
    inner: Arc<dyn ObjectStore>,
    name: &'static str,
}

impl ObjectStoreClient {
    pub fn new(inner: Arc<dyn ObjectStore>, name: &'static str) -> Self {
        Self { inner, name }
    }

    /// Build an S3 client from validated settings. No network I/O happens here.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, InfraError> {
        let builder = AmazonS3Builder::new()
            .with_bucket_name(settings.bucket.as_str())
            .with_endpoint(settings.endpoint.as_str())
            .with_region(settings.region.as_str())
            .with_allow_http(settings.allow_http)
            .with_virtual_hosted_style_request(false);

        let builder = match settings.credentials.as_ref() {
            Some(credentials) => builder
                .with_access_key_id(credentials.access_key_id.as_str())
                .with_secret_access_key(credentials.secret_access_key.as_str()),
            None => builder.with_skip_signature(true),
        };

        let store = builder.build().map_err(|source| InfraError::ObjectStore {
            bucket: settings.bucket.clone(),
            source,
        })?;

        Ok(Self::new(Arc::new(store), "s3"))
    }

    /// In-memory store.
    pub fn memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "memory")
    }
}

fn object_path(key: &CacheKey) -> Result<ObjectPath, StoreError> {
    ObjectPath::parse(key.as_str()).map_err(|err| StoreError::InvalidKey {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait]
impl ArtifactStore for ObjectStoreClient {
    async fn put(
        &self,
        key: &CacheKey,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let path = object_path(key)?;
        let size = bytes.len();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&path, PutPayload::from_bytes(bytes), options)
            .await
            .map_err(|err| StoreError::backend(StoreOperation::Put, key, err.to_string()))?;

        debug!(target = SOURCE, key = %key, bytes = size, "object uploaded");
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> Result<CachedArtifact, StoreError> {
        let path = object_path(key)?;

        let result = self
            .inner
            .get_opts(&path, GetOptions::default())
            .await
            .map_err(|err| match err {
                object_store::Error::NotFound { .. } => StoreError::NotFound {
                    key: key.to_string(),
                },
                other => StoreError::backend(StoreOperation::Get, key, other.to_string()),
            })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.as_ref().to_owned())
            .unwrap_or_else(|| HTML_CONTENT_TYPE.to_string());

        let bytes = result.bytes().await.map_err(|err| {
            StoreError::backend(
                StoreOperation::Get,
                key,
                format!("failed to read object body: {err}"),
            )
        })?;

        Ok(CachedArtifact {
            key: key.clone(),
            bytes,
            content_type,
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreCredentials;
    use crate::domain::pages::PageRoute;

    fn article_key(slug: &str) -> CacheKey {
        CacheKey::for_route(&PageRoute::Article {
            slug: slug.to_string(),
        })
    }

    fn settings(credentials: Option<StoreCredentials>) -> StoreSettings {
        StoreSettings {
            bucket: "pages".to_string(),
            endpoint: "http://127.0.0.1:9000".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
            credentials,
            timeout: std::time::Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn memory_roundtrip_keeps_bytes_and_content_type() {
        let store = ObjectStoreClient::memory();
        let key = CacheKey::for_route(&PageRoute::Index);

        store
            .put(&key, Bytes::from("<html></html>"), HTML_CONTENT_TYPE)
            .await
            .expect("put");
        let artifact = store.get(&key).await.expect("get");

        assert_eq!(artifact.key, key);
        assert_eq!(artifact.bytes, Bytes::from("<html></html>"));
        assert_eq!(artifact.content_type, "text/html");
    }

    #[tokio::test]
    async fn put_overwrites_previous_object() {
        let store = ObjectStoreClient::memory();
        let key = article_key("abc");

        store.put(&key, Bytes::from("v1"), HTML_CONTENT_TYPE).await.unwrap();
        store.put(&key, Bytes::from("v2"), HTML_CONTENT_TYPE).await.unwrap();

        assert_eq!(store.get(&key).await.unwrap().bytes, Bytes::from("v2"));
    }

    #[tokio::test]
    async fn missing_object_maps_to_not_found() {
        let store = ObjectStoreClient::memory();
        let err = store.get(&article_key("nope")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn malformed_key_is_rejected_before_io() {
        let store = ObjectStoreClient::memory();
        let key = article_key("a//b");

        let err = store
            .put(&key, Bytes::from("x"), HTML_CONTENT_TYPE)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }

    #[test]
    fn builds_signed_and_anonymous_s3_clients() {
        let signed = ObjectStoreClient::from_settings(&settings(Some(StoreCredentials {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "secret".to_string(),
        })))
        .expect("signed client");
        assert_eq!(signed.name(), "s3");

        let anonymous = ObjectStoreClient::from_settings(&settings(None)).expect("anonymous");
        assert_eq!(anonymous.name(), "s3");
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use pagestash::cache::{
    ArtifactStore, CacheKey, CachedArtifact, METRIC_READBACK_ERROR, METRIC_RENDER,
    METRIC_RENDER_MS, METRIC_STORE_HIT, METRIC_STORE_MISS, METRIC_STORE_READ_ERROR,
    METRIC_UPLOAD_ERROR, RenderCacheGateway, ServeSource, StoreError, StoreOperation,
};
use pagestash::domain::entities::ArticleRecord;
use pagestash::domain::pages::PageRequest;
use pagestash::infra::object_store::ObjectStoreClient;
use pagestash::presentation::views::TemplateRenderer;

/// Reads always fail and writes are accepted but never persisted.
struct BlackHoleStore;

#[async_trait]
impl ArtifactStore for BlackHoleStore {
    async fn put(&self, _: &CacheKey, _: Bytes, _: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> Result<CachedArtifact, StoreError> {
        Err(StoreError::backend(StoreOperation::Get, key, "unreachable"))
    }

    fn name(&self) -> &'static str {
        "black-hole"
    }
}

struct RejectingStore;

#[async_trait]
impl ArtifactStore for RejectingStore {
    async fn put(&self, key: &CacheKey, _: Bytes, _: &str) -> Result<(), StoreError> {
        Err(StoreError::backend(StoreOperation::Put, key, "quota exceeded"))
    }

    async fn get(&self, key: &CacheKey) -> Result<CachedArtifact, StoreError> {
        Err(StoreError::NotFound {
            key: key.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "rejecting"
    }
}

fn article(slug: &str) -> PageRequest {
    PageRequest::article(ArticleRecord {
        id: 1,
        slug: slug.to_string(),
        title: "Metrics".to_string(),
        content: "<p>body</p>".to_string(),
        description: "metrics article".to_string(),
    })
}

#[tokio::test]
async fn serve_paths_emit_expected_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let renderer = Arc::new(TemplateRenderer::new());

    // miss, then hit
    let memory = RenderCacheGateway::new(Arc::new(ObjectStoreClient::memory()), renderer.clone());
    let first = memory.serve(&article("one")).await.expect("first serve");
    assert_eq!(first.source, ServeSource::Rendered);
    let second = memory.serve(&article("one")).await.expect("second serve");
    assert_eq!(second.source, ServeSource::Store);

    // read error, then readback error; the accepted upload is still served
    let black_hole = RenderCacheGateway::new(Arc::new(BlackHoleStore), renderer.clone());
    let degraded = black_hole
        .serve(&article("two"))
        .await
        .expect("degraded reads still serve the upload");
    assert_eq!(degraded.source, ServeSource::Rendered);

    // upload error
    let rejecting = RenderCacheGateway::new(Arc::new(RejectingStore), renderer);
    rejecting
        .serve(&article("three"))
        .await
        .expect_err("upload should fail");

    let mut counters = HashMap::new();
    let mut histograms = HashMap::new();
    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let name = composite_key.key().name().to_string();
        match value {
            DebugValue::Counter(count) => {
                *counters.entry(name).or_insert(0) += count;
            }
            DebugValue::Histogram(samples) => {
                histograms.insert(name, samples.len());
            }
            DebugValue::Gauge(_) => {}
        }
    }

    assert_eq!(counters.get(METRIC_STORE_HIT), Some(&1));
    assert_eq!(counters.get(METRIC_STORE_MISS), Some(&2));
    assert_eq!(counters.get(METRIC_STORE_READ_ERROR), Some(&1));
    assert_eq!(counters.get(METRIC_RENDER), Some(&3));
    assert_eq!(counters.get(METRIC_UPLOAD_ERROR), Some(&1));
    assert_eq!(counters.get(METRIC_READBACK_ERROR), Some(&1));
    assert_eq!(histograms.get(METRIC_RENDER_MS), Some(&3));
}

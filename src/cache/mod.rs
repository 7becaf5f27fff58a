//! Render cache backed by an object store.
//!
//! - [`CacheKey`]: object key derived from a page's route identity
//! - [`ArtifactStore`]: remote put/get of rendered pages
//! - [`RenderCacheGateway`]: cache-aside serve path (read, render on miss,
//!   upload, read back)

mod gateway;
mod keys;
mod store;

pub use gateway::{
    DEFAULT_STORE_TIMEOUT, GatewayError, METRIC_READBACK_ERROR, METRIC_RENDER, METRIC_RENDER_MS,
    METRIC_STORE_HIT, METRIC_STORE_MISS, METRIC_STORE_READ_ERROR, METRIC_UPLOAD_ERROR,
    RenderCacheGateway, ServeSource, ServedPage,
};
pub use keys::CacheKey;
pub use store::{ArtifactStore, CachedArtifact, HTML_CONTENT_TYPE, StoreError, StoreOperation};

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::{
    METRIC_READBACK_ERROR, METRIC_RENDER, METRIC_RENDER_MS, METRIC_STORE_HIT, METRIC_STORE_MISS,
    METRIC_STORE_READ_ERROR, METRIC_UPLOAD_ERROR,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_STORE_HIT,
            Unit::Count,
            "Pages served straight from the object store."
        );
        describe_counter!(
            METRIC_STORE_MISS,
            Unit::Count,
            "Store reads that found no object for the page key."
        );
        describe_counter!(
            METRIC_STORE_READ_ERROR,
            Unit::Count,
            "Store reads that failed and were treated as a miss."
        );
        describe_counter!(
            METRIC_RENDER,
            Unit::Count,
            "Template renders performed on a store miss."
        );
        describe_histogram!(
            METRIC_RENDER_MS,
            Unit::Milliseconds,
            "Template render latency in milliseconds."
        );
        describe_counter!(
            METRIC_UPLOAD_ERROR,
            Unit::Count,
            "Uploads of rendered pages that failed or timed out."
        );
        describe_counter!(
            METRIC_READBACK_ERROR,
            Unit::Count,
            "Reads after a successful upload that failed."
        );
    });
}

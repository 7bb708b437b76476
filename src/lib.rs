//! Workspace umbrella crate for Commons category statistics (catstats).
//!
//! This crate stitches record normalization and statistics aggregation
//! together so callers can turn one dashboard payload into one
//! [`CategoryReport`] with a single call.

pub mod config;

pub use ingest::{
    decode_blob, normalize, normalize_all, normalize_payload, normalize_with_config, FileRecord,
    IngestConfig, IngestError, KeyedRecord, PayloadMeta, PayloadShape, RawPayload, RawRecord,
    UpstreamStatistics, BYTES_PER_MB,
};
pub use stats::{
    aggregate, aggregate_with_config, reconcile, AggregateConfig, CategorySummary, Mismatch,
    SizeBucket, UpstreamCheck,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};
use tracing::warn;

/// Errors that can occur while processing a payload through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The payload document could not be read.
    Ingest(IngestError),
    /// The fetch layer reported `success: false`.
    Upstream(String),
    /// A stage configuration failed validation.
    InvalidConfig(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Ingest(err) => write!(f, "ingest failure: {err}"),
            PipelineError::Upstream(msg) => write!(f, "upstream fetch failed: {msg}"),
            PipelineError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Ingest(err) => Some(err),
            PipelineError::Upstream(_) | PipelineError::InvalidConfig(_) => None,
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        PipelineError::Ingest(value)
    }
}

/// Metrics observer for pipeline stages.
///
/// Observers see latency and outcome only; they are never handed records,
/// so no statistics outlive a call.
pub trait PipelineMetrics: Send + Sync {
    fn record_ingest(&self, latency: Duration, result: Result<usize, PipelineError>);
    fn record_aggregate(&self, latency: Duration, files: u64);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().expect("pipeline metrics lock poisoned");
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_ingest(self, result: Result<usize, PipelineError>) {
        self.recorder.record_ingest(self.start.elapsed(), result);
    }

    fn record_aggregate(self, files: u64) {
        self.recorder.record_aggregate(self.start.elapsed(), files);
    }
}

/// Everything the presentation layer needs for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub category: String,
    /// Fetch timestamp passed through from the payload.
    pub timestamp: Option<String>,
    /// Whether the payload came from the fetch layer's cache.
    pub cached: bool,
    pub cache_age: Option<u64>,
    pub summary: CategorySummary,
    /// The cleaned per-file dataset, in payload order.
    pub records: Vec<FileRecord>,
    /// Cross-check of upstream-supplied statistics, when the payload had any.
    pub upstream: Option<UpstreamCheck>,
}

/// Process a payload end-to-end with explicit configuration.
///
/// The summary is always recomputed from the records; upstream statistics
/// are only reconciled against it.
pub fn process_payload_with_configs(
    payload: &Value,
    category: &str,
    ingest_cfg: &IngestConfig,
    aggregate_cfg: &AggregateConfig,
) -> Result<CategoryReport, PipelineError> {
    ingest_cfg
        .validate()
        .map_err(|err| PipelineError::InvalidConfig(err.to_string()))?;
    aggregate_cfg
        .validate()
        .map_err(|err| PipelineError::InvalidConfig(err.to_string()))?;

    let mut ingest_metrics = MetricsSpan::start();
    let raw = match read_payload(payload, ingest_cfg) {
        Ok(raw) => raw,
        Err(err) => {
            if let Some(span) = ingest_metrics.take() {
                span.record_ingest(Err(err.clone()));
            }
            return Err(err);
        }
    };
    let records = normalize_payload(&raw, ingest_cfg);
    if let Some(span) = ingest_metrics.take() {
        span.record_ingest(Ok(records.len()));
    }

    let mut aggregate_metrics = MetricsSpan::start();
    let summary = aggregate_with_config(&records, aggregate_cfg);
    if let Some(span) = aggregate_metrics.take() {
        span.record_aggregate(summary.totals.files);
    }

    let upstream = raw
        .statistics
        .as_ref()
        .filter(|statistics| !statistics.is_empty())
        .map(|statistics| reconcile(&summary, statistics));

    let category = if category.trim().is_empty() {
        raw.meta.category.clone().unwrap_or_default()
    } else {
        category.to_string()
    };

    Ok(CategoryReport {
        category,
        timestamp: raw.meta.timestamp.clone(),
        cached: raw.meta.cached.unwrap_or(false),
        cache_age: raw.meta.cache_age,
        summary,
        records,
        upstream,
    })
}

fn read_payload(payload: &Value, cfg: &IngestConfig) -> Result<RawPayload, PipelineError> {
    let raw = RawPayload::from_value(payload.clone(), cfg)?;
    if let Some(message) = raw.upstream_error() {
        warn!(error = %message, "upstream_failure");
        return Err(PipelineError::Upstream(message));
    }
    Ok(raw)
}

/// Process a payload end-to-end using default configuration.
pub fn process_payload(payload: &Value, category: &str) -> Result<CategoryReport, PipelineError> {
    process_payload_with_configs(
        payload,
        category,
        &IngestConfig::default(),
        &AggregateConfig::default(),
    )
}

/// Bundled sample payload in the dashboard API layout, labelled with
/// `category`. Useful for demos and integration smoke tests.
pub fn sample_payload(category: &str) -> Value {
    const SAMPLE_DASHBOARD: &str = include_str!("../data/sample_dashboard.json");

    let Ok(mut payload) = serde_json::from_str::<Value>(SAMPLE_DASHBOARD) else {
        panic!("bundled sample payload is not valid JSON");
    };
    if let Some(records) = payload.get_mut("data").and_then(Value::as_array_mut) {
        for record in records {
            record["category"] = Value::from(category);
        }
    }
    if let Some(meta) = payload.get_mut("meta") {
        meta["category"] = Value::from(category);
    }
    payload
}

/// Runs the bundled sample payload through the full pipeline.
pub fn sample_report(category: &str) -> Result<CategoryReport, PipelineError> {
    process_payload(&sample_payload(category), category)
}

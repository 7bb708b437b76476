//! # Category statistics (`stats`)
//!
//! ## Purpose
//!
//! `stats` turns the normalized [`FileRecord`]s of one Commons category into
//! a [`CategorySummary`]: totals, per-uploader, per-day, per-month and
//! per-hour counts, size buckets, camera and file-type rankings, and the
//! geotagged subset as map markers.
//!
//! Aggregation is pure. Each call builds its own accumulator, reads the
//! input once, and never mutates it, so the same records always produce the
//! same summary and concurrent calls for different categories need no
//! coordination.
//!
//! ## Core Types
//!
//! - [`CategorySummary`]: the complete result, serialized in camelCase.
//! - [`AggregateConfig`]: top-N length, thumbnail width, Commons base URL.
//! - [`SizeBucket`]: the five fixed size ranges.
//! - [`UpstreamCheck`]: outcome of [`reconcile`], which compares
//!   upstream-supplied statistics against a recomputed summary.
//!
//! ## Example Usage
//!
//! ```
//! use ingest::{normalize, RawRecord};
//! use serde_json::json;
//!
//! let records: Vec<_> = [
//!     json!([1, "Cat", "a.jpg", "20240101", "20240101103000", 1048576, "{}", "Alice"]),
//!     json!([2, "Cat", "b.jpg", "20240102", "20240102220000", 524288, "{}", "Alice"]),
//! ]
//! .into_iter()
//! .enumerate()
//! .map(|(i, row)| normalize(RawRecord::from(row), i))
//! .collect();
//!
//! let summary = stats::aggregate(&records);
//! assert_eq!(summary.totals.files, 2);
//! assert_eq!(summary.by_uploader[0].files, 2);
//! assert_eq!(summary.by_hour[10].count, 1);
//! assert_eq!(summary.by_hour[22].count, 1);
//! ```
use std::time::Instant;

use tracing::debug;

mod accumulate;
mod buckets;
mod config;
mod geo;
mod reconcile;
mod types;

use crate::accumulate::Accumulator;

pub use crate::buckets::SizeBucket;
pub use crate::config::{AggregateConfig, ConfigError};
pub use crate::geo::{page_url, thumbnail_url};
pub use crate::reconcile::{reconcile, Mismatch, UpstreamCheck};
pub use crate::types::{
    CameraEntry, CategorySummary, DayEntry, FileTypeEntry, GeoPoint, HourEntry, MonthEntry,
    SizeBucketEntry, Totals, UploaderEntry, UNKNOWN_CAMERA, UNKNOWN_FILE_TYPE,
};
pub use ingest::FileRecord;

/// Aggregates records with the default configuration.
pub fn aggregate(records: &[FileRecord]) -> CategorySummary {
    aggregate_with_config(records, &AggregateConfig::default())
}

/// Aggregates records into a fresh summary.
///
/// Total on every input, including an empty slice.
pub fn aggregate_with_config(records: &[FileRecord], cfg: &AggregateConfig) -> CategorySummary {
    let start = Instant::now();

    let mut acc = Accumulator::new(cfg);
    for record in records {
        acc.add(record);
    }
    let summary = acc.finish();

    let elapsed_micros = start.elapsed().as_micros();
    debug!(
        files = summary.totals.files,
        geotagged = summary.totals.geotagged_files,
        elapsed_micros,
        "aggregate_success"
    );
    summary
}

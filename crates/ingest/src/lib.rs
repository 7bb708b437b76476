//! Record normalization for Commons category statistics.
//!
//! This is where per-file records enter the pipeline. Rows come from the
//! MediaWiki replica, from a cached query result, or from the dashboard API,
//! and no two sources agree on types or field names. We turn each of them
//! into one canonical [`FileRecord`] that the aggregator can trust without
//! further checks.
//!
//! ## What we do here
//!
//! - **Detect the raw shape** - Positional replica rows or keyed API objects,
//!   decided per record.
//! - **Apply named defaults** - A missing id becomes the record's index, a
//!   missing uploader becomes `"Unknown"`, a broken size becomes `0`.
//! - **Decode metadata** - JSON, JSON-in-a-string, or legacy PHP
//!   `serialize()` blobs.
//! - **Extract GPS and camera** - EXIF triples, hemisphere refs, MediaWiki
//!   JSON layouts, and filename conventions as the last resort.
//! - **Never fail** - Malformed input degrades field by field; the only
//!   errors are for payload documents that are not JSON at all.
//!
//! ## Main entry point
//!
//! Call [`normalize`] with a [`RawRecord`] and its index, or parse a whole
//! document with [`RawPayload`] and hand it to [`normalize_payload`].
//!
//! ## Example
//!
//! ```
//! use ingest::{normalize, RawRecord};
//! use serde_json::json;
//!
//! let raw = RawRecord::from(json!([
//!     42, "Birds", "PXL_20240115_103000123.jpg", "20240115", "20240115103000",
//!     "2500000", "", "Alice"
//! ]));
//! let record = normalize(raw, 0);
//!
//! assert_eq!(record.id, 42);
//! assert_eq!(record.upload_date.as_deref(), Some("2024-01-15"));
//! assert_eq!(record.camera_model.as_deref(), Some("Google Pixel"));
//! assert!(!record.has_gps);
//! ```
use std::time::Instant;

use tracing::{info, Level};

mod camera;
mod config;
mod dates;
mod error;
mod fields;
mod gps;
mod legacy;
mod metadata;
mod mime;
mod normalize;
mod payload;
mod types;

use crate::normalize::Fields;

pub use crate::config::{ConfigError, IngestConfig};
pub use crate::error::{IngestError, MetadataError};
pub use crate::metadata::{decode_blob, Metadata};
pub use crate::payload::{PayloadMeta, PayloadShape, RawPayload, UpstreamStatistics};
pub use crate::types::{
    FileRecord, KeyedRecord, RawRecord, UNKNOWN_FILENAME, UNKNOWN_UPLOADER,
};

/// Bytes per megabyte as used by every size figure in the dashboard.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Normalizes one raw record with the default configuration.
///
/// `index` is the record's position in its payload and stands in for a
/// missing id.
pub fn normalize(raw: RawRecord, index: usize) -> FileRecord {
    normalize_with_config(&raw, index, &IngestConfig::default())
}

/// Normalizes one raw record.
pub fn normalize_with_config(raw: &RawRecord, index: usize, cfg: &IngestConfig) -> FileRecord {
    match raw {
        RawRecord::Positional(row) => Fields::positional(row).build(index, cfg),
        RawRecord::Keyed(record) => Fields::keyed(record).build(index, cfg),
    }
}

/// Normalizes records in order; output index `i` corresponds to input `i`.
pub fn normalize_all(records: &[RawRecord], cfg: &IngestConfig) -> Vec<FileRecord> {
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_with_config(raw, index, cfg))
        .collect()
}

/// Normalizes every record of a parsed payload.
pub fn normalize_payload(payload: &RawPayload, cfg: &IngestConfig) -> Vec<FileRecord> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "ingest.normalize_payload",
        shape = payload.shape.as_str(),
        category = ?payload.meta.category
    );
    let _guard = span.enter();

    let records = normalize_all(&payload.records, cfg);

    let elapsed_micros = start.elapsed().as_micros();
    info!(
        records = records.len(),
        geotagged = records.iter().filter(|r| r.has_gps).count(),
        elapsed_micros,
        "normalize_success"
    );
    records
}

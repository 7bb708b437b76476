//! Dashboard payload parsing.
//!
//! The fetch layer hands over one JSON document per category. Two layouts
//! exist in the wild:
//!
//! ```text
//! { "success": true,                      { "rows": [[...], [...]],
//!   "data": [{...}, {...}],                 "statistics": {...},
//!   "statistics": {...},                    "cached": true,
//!   "meta": { "category", "timestamp",      "cache_age": 120 }
//!             "cached" } }
//! ```
//!
//! `data` is preferred over `rows` when both are present. Each element is
//! shape-detected on its own, so a `data` array that mixes objects and
//! arrays is still read in full. Pass-through fields are looked up at the
//! top level first and then under `meta`.
//!
//! # Examples
//!
//! ```rust
//! use ingest::{IngestConfig, PayloadShape, RawPayload};
//! use serde_json::json;
//!
//! let payload = RawPayload::from_value(
//!     json!({"rows": [[1, "Birds", "a.jpg"]], "cached": true}),
//!     &IngestConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(payload.shape, PayloadShape::Rows);
//! assert_eq!(payload.records.len(), 1);
//! assert_eq!(payload.meta.cached, Some(true));
//! ```
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::fields;
use crate::types::RawRecord;

/// Where a payload's records were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// `data` array of keyed objects.
    Data,
    /// `rows` array of positional rows.
    Rows,
    /// The document itself is the record array.
    Bare,
    /// No record array was found.
    Unrecognized,
}

impl PayloadShape {
    /// Short label used in structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadShape::Data => "data",
            PayloadShape::Rows => "rows",
            PayloadShape::Bare => "bare",
            PayloadShape::Unrecognized => "unrecognized",
        }
    }
}

/// Pass-through fields describing the fetch that produced the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMeta {
    pub success: Option<bool>,
    pub error: Option<String>,
    pub category: Option<String>,
    /// Fetch timestamp as the upstream wrote it.
    pub timestamp: Option<String>,
    pub cached: Option<bool>,
    /// Seconds since the cached result was produced.
    pub cache_age: Option<u64>,
}

impl PayloadMeta {
    fn read(root: &Map<String, Value>) -> Self {
        let nested = root.get("meta").and_then(Value::as_object);
        let lookup = |key: &str| {
            root.get(key)
                .filter(|v| !v.is_null())
                .or_else(|| nested?.get(key).filter(|v| !v.is_null()))
        };
        Self {
            success: fields::flag(lookup("success")),
            error: fields::text(lookup("error")),
            category: fields::text(lookup("category")),
            timestamp: fields::text(lookup("timestamp")),
            cached: fields::flag(lookup("cached")),
            cache_age: fields::integer(lookup("cache_age")).and_then(|n| u64::try_from(n).ok()),
        }
    }
}

/// Statistics block the upstream computed on its own.
///
/// Kept only for cross-checking; the recomputed summary is authoritative.
/// Count maps are keyed by uploader name, `YYYY-MM` month, camera model or
/// MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamStatistics {
    pub total_files: Option<u64>,
    pub unique_uploaders: Option<u64>,
    pub total_size_bytes: Option<u64>,
    pub gps_enabled_count: Option<u64>,
    pub top_uploaders: Option<BTreeMap<String, u64>>,
    pub upload_timeline: Option<BTreeMap<String, u64>>,
    pub camera_models: Option<BTreeMap<String, u64>>,
    pub file_types: Option<BTreeMap<String, u64>>,
}

impl UpstreamStatistics {
    /// Reads a statistics block leniently. Returns `None` unless `value` is
    /// an object; individual unreadable fields are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let count = |key: &str| fields::integer(obj.get(key)).and_then(|n| u64::try_from(n).ok());
        Some(Self {
            total_files: count("total_files"),
            unique_uploaders: count("unique_uploaders"),
            total_size_bytes: count("total_size_bytes"),
            gps_enabled_count: count("gps_enabled_count"),
            top_uploaders: obj.get("top_uploaders").and_then(count_map),
            upload_timeline: obj.get("upload_timeline").and_then(count_map),
            camera_models: obj
                .get("top_camera_models")
                .or_else(|| obj.get("camera_models"))
                .and_then(count_map),
            file_types: obj.get("file_types").and_then(count_map),
        })
    }

    /// Whether no field could be read.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// `{"name": count}` or `[{"name": .., "count": ..}]`.
fn count_map(value: &Value) -> Option<BTreeMap<String, u64>> {
    let count_of = |v: Option<&Value>| fields::integer(v).and_then(|n| u64::try_from(n).ok());
    match value {
        Value::Object(obj) => Some(
            obj.iter()
                .filter_map(|(name, v)| Some((name.clone(), count_of(Some(v))?)))
                .collect(),
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| {
                    let item = item.as_object()?;
                    let name = ["name", "model", "month", "mime_type", "type"]
                        .iter()
                        .find_map(|key| fields::text(item.get(*key)))?;
                    let count = ["count", "files", "uploads"]
                        .iter()
                        .find_map(|key| count_of(item.get(*key)))?;
                    Some((name, count))
                })
                .collect(),
        ),
        _ => None,
    }
}

/// A parsed dashboard payload, ready for normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload {
    pub shape: PayloadShape,
    pub records: Vec<RawRecord>,
    pub statistics: Option<UpstreamStatistics>,
    pub meta: PayloadMeta,
}

impl RawPayload {
    /// Parses payload text.
    pub fn from_json_str(text: &str, cfg: &IngestConfig) -> Result<Self, IngestError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| IngestError::InvalidJson(err.to_string()))?;
        Self::from_value(value, cfg)
    }

    /// Splits a payload document into records, statistics and pass-through
    /// fields.
    ///
    /// A document without a record array is an empty payload unless
    /// [`IngestConfig::strict_payload_shape`] is set. Payloads that report
    /// `success: false` are never rejected here so the caller can surface
    /// the upstream error instead.
    pub fn from_value(value: Value, cfg: &IngestConfig) -> Result<Self, IngestError> {
        let mut root = match value {
            Value::Object(map) => map,
            Value::Array(items) => {
                return Ok(Self {
                    shape: PayloadShape::Bare,
                    records: items.into_iter().map(RawRecord::from).collect(),
                    statistics: None,
                    meta: PayloadMeta::default(),
                })
            }
            other => {
                let kind = json_kind(&other);
                if cfg.strict_payload_shape {
                    return Err(IngestError::UnrecognizedPayload(format!(
                        "payload is {kind}, expected an object"
                    )));
                }
                warn!(kind, "payload_unrecognized");
                return Ok(Self {
                    shape: PayloadShape::Unrecognized,
                    records: Vec::new(),
                    statistics: None,
                    meta: PayloadMeta::default(),
                });
            }
        };

        let meta = PayloadMeta::read(&root);

        let (shape, items) = match (root.remove("data"), root.remove("rows")) {
            (Some(Value::Array(items)), _) => (PayloadShape::Data, items),
            (_, Some(Value::Array(items))) => (PayloadShape::Rows, items),
            _ => (PayloadShape::Unrecognized, Vec::new()),
        };

        if shape == PayloadShape::Unrecognized && meta.success != Some(false) {
            if cfg.strict_payload_shape {
                return Err(IngestError::UnrecognizedPayload(
                    "no `data` or `rows` array".into(),
                ));
            }
            warn!("payload_without_records");
        }

        let statistics = match root.get("statistics") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let parsed = UpstreamStatistics::from_value(raw);
                if parsed.is_none() {
                    warn!(kind = json_kind(raw), "statistics_unparseable");
                }
                parsed
            }
        };

        Ok(Self {
            shape,
            records: items.into_iter().map(RawRecord::from).collect(),
            statistics,
            meta,
        })
    }

    /// Error message when the upstream reported `success: false`.
    pub fn upstream_error(&self) -> Option<String> {
        if self.meta.success != Some(false) {
            return None;
        }
        Some(
            self.meta
                .error
                .clone()
                .unwrap_or_else(|| "upstream reported failure without a message".to_string()),
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> RawPayload {
        RawPayload::from_value(value, &IngestConfig::default()).expect("payload")
    }

    #[test]
    fn data_preferred_over_rows() {
        let payload = parse(json!({
            "data": [{"id": 1}],
            "rows": [[1], [2]]
        }));
        assert_eq!(payload.shape, PayloadShape::Data);
        assert_eq!(payload.records.len(), 1);
    }

    #[test]
    fn non_array_data_falls_back_to_rows() {
        let payload = parse(json!({"data": "oops", "rows": [[1], [2]]}));
        assert_eq!(payload.shape, PayloadShape::Rows);
        assert_eq!(payload.records.len(), 2);
    }

    #[test]
    fn mixed_elements_detected_individually() {
        let payload = parse(json!({"data": [{"id": 1}, [2, "c"], 3]}));
        assert!(matches!(payload.records[0], RawRecord::Keyed(_)));
        assert!(matches!(payload.records[1], RawRecord::Positional(_)));
        assert_eq!(payload.records[2], RawRecord::Positional(Vec::new()));
    }

    #[test]
    fn meta_read_from_top_level_then_meta() {
        let payload = parse(json!({
            "rows": [],
            "cached": true,
            "cache_age": "120",
            "meta": {"category": "Birds", "timestamp": "2024-10-01 12:00:00", "cached": false}
        }));
        assert_eq!(payload.meta.cached, Some(true));
        assert_eq!(payload.meta.cache_age, Some(120));
        assert_eq!(payload.meta.category.as_deref(), Some("Birds"));
        assert_eq!(payload.meta.timestamp.as_deref(), Some("2024-10-01 12:00:00"));
    }

    #[test]
    fn statistics_parsed_leniently() {
        let payload = parse(json!({
            "data": [],
            "statistics": {
                "total_files": "3",
                "unique_uploaders": 2,
                "gps_enabled_count": -1,
                "top_uploaders": {"A": 2, "B": "1", "C": "lots"},
                "camera_models": [{"model": "Canon EOS 80D", "count": 4}],
                "file_types": 7
            }
        }));
        let stats = payload.statistics.expect("statistics");
        assert_eq!(stats.total_files, Some(3));
        assert_eq!(stats.gps_enabled_count, None);
        let uploaders = stats.top_uploaders.expect("uploaders");
        assert_eq!(uploaders.len(), 2);
        assert_eq!(uploaders["B"], 1);
        assert_eq!(stats.camera_models.expect("cameras")["Canon EOS 80D"], 4);
        assert_eq!(stats.file_types, None);
    }

    #[test]
    fn unparseable_statistics_is_absent() {
        let payload = parse(json!({"data": [], "statistics": "n/a"}));
        assert!(payload.statistics.is_none());
    }

    #[test]
    fn missing_records_lenient_and_strict() {
        let payload = parse(json!({"hello": "world"}));
        assert_eq!(payload.shape, PayloadShape::Unrecognized);
        assert!(payload.records.is_empty());

        let strict = IngestConfig {
            strict_payload_shape: true,
            ..Default::default()
        };
        let err = RawPayload::from_value(json!({"hello": "world"}), &strict).unwrap_err();
        assert!(matches!(err, IngestError::UnrecognizedPayload(_)));
        let err = RawPayload::from_value(json!(42), &strict).unwrap_err();
        assert!(matches!(err, IngestError::UnrecognizedPayload(_)));
    }

    #[test]
    fn upstream_failure_reported_even_when_strict() {
        let strict = IngestConfig {
            strict_payload_shape: true,
            ..Default::default()
        };
        let payload =
            RawPayload::from_value(json!({"success": false, "error": "replica lag"}), &strict)
                .expect("failure payload parses");
        assert_eq!(payload.upstream_error().as_deref(), Some("replica lag"));

        let ok = parse(json!({"success": true, "data": []}));
        assert_eq!(ok.upstream_error(), None);
    }

    #[test]
    fn bare_array_payload() {
        let payload = parse(json!([[1, "c", "a.jpg"]]));
        assert_eq!(payload.shape, PayloadShape::Bare);
        assert_eq!(payload.records.len(), 1);
    }

    #[test]
    fn invalid_json_text() {
        let err = RawPayload::from_json_str("{", &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidJson(_)));
    }
}

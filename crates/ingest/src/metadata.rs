//! Metadata blob decoding.
//!
//! A record's metadata may arrive as structured JSON, as a JSON document
//! inside a string, or as a legacy PHP-serialized string. Decoding order for
//! strings is fixed:
//!
//! ```text
//! blob (string, trimmed)
//!   │
//!   ├─ legacy unserialize ── ok ──▶ mapping
//!   │
//!   ├─ JSON parse ────────── ok ──▶ mapping
//!   │      └─ JSON string ──▶ legacy / JSON once more
//!   │
//!   └─ neither ─────────────────▶ no metadata
//! ```
//!
//! Only key/value mappings are useful to the GPS and camera extractors, so
//! any other decoded shape counts as no metadata. An empty list (PHP's
//! `a:0:{}`) is the one exception and decodes to an empty mapping.
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::MetadataError;
use crate::legacy;

/// Decoded metadata: a string-keyed JSON mapping.
pub type Metadata = Map<String, Value>;

/// Decodes a metadata blob.
///
/// Returns `Ok(None)` for blobs that explicitly carry nothing (`null`, empty
/// string), `Ok(Some(..))` for a decoded mapping, and an error describing
/// why anything else was rejected. `limit` caps the byte length of string
/// blobs.
///
/// ```rust
/// use ingest::decode_blob;
/// use serde_json::json;
///
/// let legacy = json!(r#"a:1:{s:5:"Model";s:4:"X100";}"#);
/// let map = decode_blob(&legacy, None).unwrap().unwrap();
/// assert_eq!(map["Model"], "X100");
///
/// assert!(decode_blob(&json!("not metadata"), None).is_err());
/// ```
pub fn decode_blob(blob: &Value, limit: Option<usize>) -> Result<Option<Metadata>, MetadataError> {
    match blob {
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if let Some(limit) = limit {
                if trimmed.len() > limit {
                    return Err(MetadataError::TooLarge {
                        size: trimmed.len(),
                        limit,
                    });
                }
            }
            decode_text(trimmed, true)
        }
        other => into_mapping(other.clone()),
    }
}

/// Lenient form of [`decode_blob`] used by the normalizer: every failure
/// becomes "no metadata".
pub(crate) fn decode_metadata(blob: Option<&Value>, limit: Option<usize>) -> Option<Metadata> {
    let blob = blob?;
    match decode_blob(blob, limit) {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!(error = %err, "metadata_undecodable");
            None
        }
    }
}

fn decode_text(text: &str, unwrap_string: bool) -> Result<Option<Metadata>, MetadataError> {
    let legacy_err = match legacy::unserialize(text) {
        Ok(value) => return into_mapping(value),
        Err(err) => err,
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(inner)) if unwrap_string => {
            let inner = inner.trim();
            if inner.is_empty() {
                Ok(None)
            } else {
                decode_text(inner, false)
            }
        }
        Ok(value) => into_mapping(value),
        Err(json_err) => Err(MetadataError::Undecodable {
            legacy: legacy_err.to_string(),
            json: json_err.to_string(),
        }),
    }
}

fn into_mapping(value: Value) -> Result<Option<Metadata>, MetadataError> {
    match value {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        Value::Array(items) if items.is_empty() => Ok(Some(Map::new())),
        Value::Array(_) => Err(MetadataError::NotAMapping("a list")),
        Value::Bool(_) => Err(MetadataError::NotAMapping("a boolean")),
        Value::Number(_) => Err(MetadataError::NotAMapping("a number")),
        Value::String(_) => Err(MetadataError::NotAMapping("a string")),
    }
}

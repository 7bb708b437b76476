//! Core data model types for the ingest crate.
//!
//! Raw records arrive in one of two historical shapes and leave as a single
//! canonical [`FileRecord`]:
//!
//! ```text
//! RawRecord
//! ├── Positional([id, category, filename, YYYYMMDD, YYYYMMDDHHMMSS, size, metadata, uploader])
//! └── Keyed(KeyedRecord { id, filename, upload_date, timestamp, size_bytes, has_gps, ... })
//!
//!         ↓ normalize()
//!
//! FileRecord
//! ├── id: i64                       (positional index when absent)
//! ├── filename: String              ("unknown" when absent)
//! ├── upload_date: Option<String>   (YYYY-MM-DD)
//! ├── upload_timestamp: Option<String> (YYYYMMDDHHMMSS)
//! ├── size_bytes: u64               (0 when absent or negative)
//! ├── uploader: String              ("Unknown" when absent)
//! ├── mime_type: Option<String>
//! ├── has_gps / gps_lat / gps_lon   (validated together)
//! ├── camera_model: Option<String>
//! └── width / height: Option<u32>
//! ```
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Filename used when a record carries none.
pub const UNKNOWN_FILENAME: &str = "unknown";

/// Uploader name used when a record carries none.
pub const UNKNOWN_UPLOADER: &str = "Unknown";

/// An untrusted per-file record as delivered by the fetch layer.
///
/// The variant is decided purely by JSON structure: arrays are positional
/// rows, objects are keyed records. Anything else carries no usable fields
/// and becomes an empty positional row.
///
/// ```rust
/// use ingest::RawRecord;
/// use serde_json::json;
///
/// let row = RawRecord::from(json!([1, "Cat", "a.jpg"]));
/// assert!(matches!(row, RawRecord::Positional(_)));
///
/// let keyed = RawRecord::from(json!({"id": 1, "filename": "a.jpg"}));
/// assert!(matches!(keyed, RawRecord::Keyed(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// Replica query row:
    /// `[cl_from, cl_to, img_name, imgdate, img_timestamp, img_size, img_metadata, actor_name]`.
    Positional(Vec<Value>),
    /// Object produced by the newer dashboard API.
    Keyed(KeyedRecord),
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => RawRecord::Positional(items),
            Value::Object(map) => RawRecord::Keyed(KeyedRecord::from(map)),
            _ => RawRecord::Positional(Vec::new()),
        }
    }
}

/// Keyed record shape of the newer dashboard API.
///
/// Every field is kept as an untyped JSON value: upstream sends numbers as
/// strings, booleans as `0`/`1`, and empty strings for missing values. The
/// normalizer decides how to read each one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyedRecord {
    pub id: Option<Value>,
    pub category: Option<Value>,
    pub filename: Option<Value>,
    pub page_title: Option<Value>,
    /// `YYYY-MM-DD`.
    pub upload_date: Option<Value>,
    /// `YYYYMMDD`.
    pub imgdate: Option<Value>,
    /// `YYYYMMDDHHMMSS`.
    pub timestamp: Option<Value>,
    pub size_bytes: Option<Value>,
    pub size_mb: Option<Value>,
    /// `{ "width": .., "height": .. }`.
    pub dimensions: Option<Value>,
    pub media_type: Option<Value>,
    pub mime_type: Option<Value>,
    pub uploader: Option<Value>,
    pub has_gps: Option<Value>,
    pub gps_latitude: Option<Value>,
    pub gps_longitude: Option<Value>,
    pub camera_make: Option<Value>,
    pub camera_model: Option<Value>,
    pub metadata_available: Option<Value>,
    /// Raw metadata blob, when the API forwards `img_metadata`.
    pub metadata: Option<Value>,
}

impl From<Map<String, Value>> for KeyedRecord {
    fn from(mut map: Map<String, Value>) -> Self {
        let mut take = |key: &str| map.remove(key).filter(|value| !value.is_null());
        let metadata = take("metadata").or_else(|| take("img_metadata"));
        KeyedRecord {
            id: take("id"),
            category: take("category"),
            filename: take("filename"),
            page_title: take("page_title"),
            upload_date: take("upload_date"),
            imgdate: take("imgdate"),
            timestamp: take("timestamp"),
            size_bytes: take("size_bytes"),
            size_mb: take("size_mb"),
            dimensions: take("dimensions"),
            media_type: take("media_type"),
            mime_type: take("mime_type"),
            uploader: take("uploader"),
            has_gps: take("has_gps"),
            gps_latitude: take("gps_latitude"),
            gps_longitude: take("gps_longitude"),
            camera_make: take("camera_make"),
            camera_model: take("camera_model"),
            metadata_available: take("metadata_available"),
            metadata,
        }
    }
}

/// Canonical, invariant-holding file record.
///
/// Every field is present with a type-correct value. `gps_lat` and `gps_lon`
/// are `Some` exactly when `has_gps` is `true`, and then lie within
/// `[-90, 90]` and `[-180, 180]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    pub upload_date: Option<String>,
    pub upload_timestamp: Option<String>,
    pub size_bytes: u64,
    pub uploader: String,
    pub mime_type: Option<String>,
    pub has_gps: bool,
    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    pub camera_model: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl FileRecord {
    /// Size in mebibytes, unrounded.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / crate::BYTES_PER_MB
    }

    /// `(lat, lon)` when the record is geotagged.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.has_gps, self.gps_lat, self.gps_lon) {
            (true, Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Re-expresses this record as a keyed raw record.
    ///
    /// Normalizing the result yields an identical `FileRecord`, which lets the
    /// cleaned dataset be cached in the same shape the API delivers.
    ///
    /// ```rust
    /// use ingest::{normalize, RawRecord};
    /// use serde_json::json;
    ///
    /// let record = normalize(RawRecord::from(json!([7, "Cat", "DSC_0001.jpg"])), 0);
    /// let again = normalize(RawRecord::Keyed(record.to_keyed()), 0);
    /// assert_eq!(record, again);
    /// ```
    pub fn to_keyed(&self) -> KeyedRecord {
        let dimensions = if self.width.is_some() || self.height.is_some() {
            let mut dims = Map::new();
            dims.insert("width".into(), self.width.map_or(Value::Null, Value::from));
            dims.insert("height".into(), self.height.map_or(Value::Null, Value::from));
            Some(Value::Object(dims))
        } else {
            None
        };

        KeyedRecord {
            id: Some(Value::from(self.id)),
            filename: Some(Value::from(self.filename.clone())),
            upload_date: self.upload_date.clone().map(Value::from),
            timestamp: self.upload_timestamp.clone().map(Value::from),
            size_bytes: Some(Value::from(self.size_bytes)),
            dimensions,
            mime_type: self.mime_type.clone().map(Value::from),
            uploader: Some(Value::from(self.uploader.clone())),
            has_gps: Some(Value::Bool(self.has_gps)),
            gps_latitude: self.gps_lat.and_then(Number::from_f64).map(Value::Number),
            gps_longitude: self.gps_lon.and_then(Number::from_f64).map(Value::Number),
            camera_model: self.camera_model.clone().map(Value::from),
            ..KeyedRecord::default()
        }
    }
}

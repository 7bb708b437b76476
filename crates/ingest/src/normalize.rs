//! Record normalization: one raw record in, one [`FileRecord`] out.
//!
//! Both raw shapes are first projected onto a common [`Fields`] view of
//! borrowed JSON values; every rule below then runs once, regardless of
//! where the value came from.
use serde_json::Value;
use tracing::trace;

use crate::camera::{self, CameraHint};
use crate::config::IngestConfig;
use crate::dates::UploadTime;
use crate::fields::{self, sanitize_optional_string};
use crate::gps::{self, Coordinates};
use crate::metadata::{decode_metadata, Metadata};
use crate::mime;
use crate::types::{FileRecord, KeyedRecord, UNKNOWN_FILENAME, UNKNOWN_UPLOADER};
use crate::BYTES_PER_MB;

// Positional slots. Slot 1 holds the category name, which the record does
// not keep.
const SLOT_ID: usize = 0;
const SLOT_FILENAME: usize = 2;
const SLOT_DATE: usize = 3;
const SLOT_TIMESTAMP: usize = 4;
const SLOT_SIZE: usize = 5;
const SLOT_METADATA: usize = 6;
const SLOT_UPLOADER: usize = 7;

/// Raw values of one record, whichever shape it arrived in.
#[derive(Debug, Default)]
pub(crate) struct Fields<'a> {
    id: Option<&'a Value>,
    filename: Option<&'a Value>,
    page_title: Option<&'a Value>,
    compact_date: Option<&'a Value>,
    iso_date: Option<&'a Value>,
    timestamp: Option<&'a Value>,
    size_bytes: Option<&'a Value>,
    size_mb: Option<&'a Value>,
    uploader: Option<&'a Value>,
    mime_type: Option<&'a Value>,
    has_gps: Option<&'a Value>,
    gps_lat: Option<&'a Value>,
    gps_lon: Option<&'a Value>,
    camera: CameraHint<'a>,
    dimensions: Option<&'a Value>,
    metadata: Option<&'a Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn positional(row: &'a [Value]) -> Self {
        let slot = |index: usize| row.get(index).filter(|v| !v.is_null());
        Self {
            id: slot(SLOT_ID),
            filename: slot(SLOT_FILENAME),
            compact_date: slot(SLOT_DATE),
            timestamp: slot(SLOT_TIMESTAMP),
            size_bytes: slot(SLOT_SIZE),
            metadata: slot(SLOT_METADATA),
            uploader: slot(SLOT_UPLOADER),
            ..Self::default()
        }
    }

    pub(crate) fn keyed(record: &'a KeyedRecord) -> Self {
        Self {
            id: record.id.as_ref(),
            filename: record.filename.as_ref(),
            page_title: record.page_title.as_ref(),
            compact_date: record.imgdate.as_ref(),
            iso_date: record.upload_date.as_ref(),
            timestamp: record.timestamp.as_ref(),
            size_bytes: record.size_bytes.as_ref(),
            size_mb: record.size_mb.as_ref(),
            uploader: record.uploader.as_ref(),
            mime_type: record.mime_type.as_ref(),
            has_gps: record.has_gps.as_ref(),
            gps_lat: record.gps_latitude.as_ref(),
            gps_lon: record.gps_longitude.as_ref(),
            camera: CameraHint {
                make: record.camera_make.as_ref(),
                model: record.camera_model.as_ref(),
            },
            dimensions: record.dimensions.as_ref(),
            metadata: record.metadata.as_ref(),
        }
    }

    /// Applies every field rule and builds the canonical record.
    pub(crate) fn build(&self, index: usize, cfg: &IngestConfig) -> FileRecord {
        let strip = cfg.strip_control_chars;

        let id = fields::integer(self.id).unwrap_or_else(|| i64::try_from(index).unwrap_or(i64::MAX));

        let filename = sanitize_optional_string(fields::text(self.filename), strip)
            .or_else(|| sanitize_optional_string(fields::text(self.page_title), strip))
            .unwrap_or_else(|| UNKNOWN_FILENAME.to_string());

        let uploader = sanitize_optional_string(fields::text(self.uploader), strip)
            .unwrap_or_else(|| UNKNOWN_UPLOADER.to_string());

        let time = UploadTime::resolve(self.compact_date, self.iso_date, self.timestamp);
        let metadata = decode_metadata(self.metadata, cfg.max_metadata_bytes);

        let coordinates = self.coordinates(metadata.as_ref());
        let (width, height) = self.dimensions();

        FileRecord {
            id,
            upload_date: time.date_string(),
            upload_timestamp: time.timestamp_string(),
            size_bytes: self.size_bytes(),
            uploader,
            mime_type: mime::resolve(self.mime_type, &filename),
            has_gps: coordinates.is_some(),
            gps_lat: coordinates.map(|c| c.lat),
            gps_lon: coordinates.map(|c| c.lon),
            camera_model: camera::resolve(self.camera, metadata.as_ref(), &filename),
            width,
            height,
            filename,
        }
    }

    fn size_bytes(&self) -> u64 {
        if let Some(bytes) = fields::integer(self.size_bytes).and_then(|n| u64::try_from(n).ok()) {
            return bytes;
        }
        match fields::decimal(self.size_mb) {
            Some(mb) if mb >= 0.0 => {
                let bytes = (mb * BYTES_PER_MB).round();
                if bytes < u64::MAX as f64 {
                    bytes as u64
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    fn coordinates(&self, metadata: Option<&Metadata>) -> Option<Coordinates> {
        if fields::flag(self.has_gps) == Some(false) {
            return None;
        }
        let coordinates = match (fields::decimal(self.gps_lat), fields::decimal(self.gps_lon)) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => metadata.and_then(gps::from_metadata),
        };
        if coordinates.is_none() && fields::flag(self.has_gps) == Some(true) {
            trace!("has_gps_without_coordinates");
        }
        coordinates
    }

    fn dimensions(&self) -> (Option<u32>, Option<u32>) {
        let Some(dims) = self.dimensions.and_then(Value::as_object) else {
            return (None, None);
        };
        let side = |key: &str| {
            fields::integer(dims.get(key))
                .and_then(|n| u32::try_from(n).ok())
                .filter(|&n| n > 0)
        };
        (side("width"), side("height"))
    }
}

//! Output types of the aggregator.
//!
//! Everything serializes in camelCase, which is what the chart layer reads.
use serde::{Deserialize, Serialize};

use ingest::BYTES_PER_MB;

/// Label used in `byCamera` for records without a resolved camera.
pub const UNKNOWN_CAMERA: &str = "Unknown Camera";

/// Label used in `byFileType` for records without a MIME type.
pub const UNKNOWN_FILE_TYPE: &str = "unknown";

/// Full statistical summary of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub totals: Totals,
    /// Every uploader, most files first, ties by name.
    pub by_uploader: Vec<UploaderEntry>,
    pub by_day: Vec<DayEntry>,
    pub by_month: Vec<MonthEntry>,
    /// Always 24 entries; index is the UTC hour.
    pub by_hour: Vec<HourEntry>,
    /// Always every bucket, in display order.
    pub by_size_bucket: Vec<SizeBucketEntry>,
    pub by_camera: Vec<CameraEntry>,
    pub by_file_type: Vec<FileTypeEntry>,
    /// One point per geotagged record, in input order.
    pub geo_points: Vec<GeoPoint>,
}

impl CategorySummary {
    /// The `n` most active uploaders.
    pub fn top_uploaders(&self, n: usize) -> &[UploaderEntry] {
        &self.by_uploader[..n.min(self.by_uploader.len())]
    }

    /// Size buckets with at least one file, for presentation.
    pub fn nonempty_size_buckets(&self) -> impl Iterator<Item = &SizeBucketEntry> {
        self.by_size_bucket.iter().filter(|entry| entry.count > 0)
    }

    /// Files uploaded by `name`, or zero.
    pub fn files_by(&self, name: &str) -> u64 {
        self.by_uploader
            .iter()
            .find(|entry| entry.name == name)
            .map_or(0, |entry| entry.files)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub files: u64,
    pub unique_uploaders: u64,
    pub unique_dates: u64,
    /// Exact sum of `size_bytes`, saturating at `u64::MAX` (about 16 EiB).
    pub total_size_bytes: u64,
    /// `total_size_bytes / files`, or `0.0` for an empty category.
    pub avg_size_bytes: f64,
    pub geotagged_files: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploaderEntry {
    pub name: String,
    pub files: u64,
    /// Sum of the uploader's file sizes, saturating like
    /// [`Totals::total_size_bytes`].
    pub size_bytes: u64,
}

impl UploaderEntry {
    /// Uploaded volume in megabytes, unrounded.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub uploads: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthEntry {
    /// `YYYY-MM`.
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourEntry {
    pub hour: u8,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBucketEntry {
    pub bucket: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraEntry {
    pub model: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeEntry {
    pub mime_type: String,
    pub count: u64,
}

/// A map marker for one geotagged file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub filename: String,
    pub uploader: String,
    pub date: Option<String>,
    pub thumbnail_url: String,
    pub page_url: String,
}

//! Per-call accumulator state.
//!
//! One [`Accumulator`] is built for each aggregation and dropped with it;
//! nothing survives between calls.
use std::collections::{BTreeMap, BTreeSet};

use ingest::FileRecord;

use crate::buckets::SizeBucket;
use crate::config::AggregateConfig;
use crate::geo::geo_point;
use crate::types::{
    CameraEntry, CategorySummary, DayEntry, FileTypeEntry, GeoPoint, HourEntry, MonthEntry,
    SizeBucketEntry, Totals, UploaderEntry, UNKNOWN_CAMERA, UNKNOWN_FILE_TYPE,
};

#[derive(Debug, Default, Clone, Copy)]
struct UploaderTally {
    files: u64,
    size_bytes: u64,
}

pub(crate) struct Accumulator<'a> {
    cfg: &'a AggregateConfig,
    files: u64,
    total_size_bytes: u64,
    uploaders: BTreeMap<&'a str, UploaderTally>,
    dates: BTreeSet<&'a str>,
    days: BTreeMap<&'a str, u64>,
    months: BTreeMap<&'a str, u64>,
    hours: [u64; 24],
    size_buckets: [u64; 5],
    cameras: BTreeMap<&'a str, u64>,
    file_types: BTreeMap<&'a str, u64>,
    geo_points: Vec<GeoPoint>,
}

impl<'a> Accumulator<'a> {
    pub(crate) fn new(cfg: &'a AggregateConfig) -> Self {
        Self {
            cfg,
            files: 0,
            total_size_bytes: 0,
            uploaders: BTreeMap::new(),
            dates: BTreeSet::new(),
            days: BTreeMap::new(),
            months: BTreeMap::new(),
            hours: [0; 24],
            size_buckets: [0; SizeBucket::ALL.len()],
            cameras: BTreeMap::new(),
            file_types: BTreeMap::new(),
            geo_points: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, record: &'a FileRecord) {
        self.files += 1;
        self.total_size_bytes = self.total_size_bytes.saturating_add(record.size_bytes);

        let tally = self.uploaders.entry(record.uploader.as_str()).or_default();
        tally.files += 1;
        tally.size_bytes = tally.size_bytes.saturating_add(record.size_bytes);

        if let Some(date) = record.upload_date.as_deref() {
            self.dates.insert(date);
            *self.days.entry(date).or_default() += 1;
            if let Some(month) = date.get(..7) {
                *self.months.entry(month).or_default() += 1;
            }
        }

        if let Some(hour) = record.upload_timestamp.as_deref().and_then(hour_of) {
            self.hours[hour] += 1;
        }

        self.size_buckets[SizeBucket::for_bytes(record.size_bytes).index()] += 1;

        let camera = record.camera_model.as_deref().unwrap_or(UNKNOWN_CAMERA);
        *self.cameras.entry(camera).or_default() += 1;

        let file_type = record.mime_type.as_deref().unwrap_or(UNKNOWN_FILE_TYPE);
        *self.file_types.entry(file_type).or_default() += 1;

        if let Some(point) = geo_point(record, self.cfg) {
            self.geo_points.push(point);
        }
    }

    pub(crate) fn finish(self) -> CategorySummary {
        let avg_size_bytes = if self.files > 0 {
            self.total_size_bytes as f64 / self.files as f64
        } else {
            0.0
        };

        let mut by_uploader: Vec<UploaderEntry> = self
            .uploaders
            .iter()
            .map(|(name, tally)| UploaderEntry {
                name: (*name).to_string(),
                files: tally.files,
                size_bytes: tally.size_bytes,
            })
            .collect();
        by_uploader.sort_by(|a, b| b.files.cmp(&a.files).then_with(|| a.name.cmp(&b.name)));

        let mut by_camera: Vec<CameraEntry> = ranked(&self.cameras)
            .map(|(model, count)| CameraEntry { model, count })
            .collect();
        by_camera.truncate(self.cfg.top_n);

        let by_file_type = ranked(&self.file_types)
            .map(|(mime_type, count)| FileTypeEntry { mime_type, count })
            .collect();

        CategorySummary {
            totals: Totals {
                files: self.files,
                unique_uploaders: self.uploaders.len() as u64,
                unique_dates: self.dates.len() as u64,
                total_size_bytes: self.total_size_bytes,
                avg_size_bytes,
                geotagged_files: self.geo_points.len() as u64,
            },
            by_uploader,
            by_day: self
                .days
                .iter()
                .map(|(date, &uploads)| DayEntry {
                    date: (*date).to_string(),
                    uploads,
                })
                .collect(),
            by_month: self
                .months
                .iter()
                .map(|(month, &count)| MonthEntry {
                    month: (*month).to_string(),
                    count,
                })
                .collect(),
            by_hour: self
                .hours
                .iter()
                .enumerate()
                .map(|(hour, &count)| HourEntry {
                    hour: hour as u8,
                    count,
                })
                .collect(),
            by_size_bucket: SizeBucket::ALL
                .iter()
                .map(|bucket| SizeBucketEntry {
                    bucket: bucket.label().to_string(),
                    count: self.size_buckets[bucket.index()],
                })
                .collect(),
            by_camera,
            by_file_type,
            geo_points: self.geo_points,
        }
    }
}

/// Count descending, key ascending.
fn ranked(counts: &BTreeMap<&str, u64>) -> impl Iterator<Item = (String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .iter()
        .map(|(key, &count)| ((*key).to_string(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.into_iter()
}

/// Hour from characters 9-10 of a compact timestamp.
fn hour_of(timestamp: &str) -> Option<usize> {
    let hour: usize = timestamp.get(8..10)?.parse().ok()?;
    (hour < 24).then_some(hour)
}

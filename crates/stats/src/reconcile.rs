//! Cross-checking upstream statistics against the recomputed summary.
//!
//! Upstream statistics have historically been computed with different
//! rules (different size units, top-N truncation, stale caches), so they are
//! never used as a substitute for recomputation. This module only reports
//! where they disagree.
//!
//! ```rust
//! use ingest::{normalize, RawRecord, UpstreamStatistics};
//! use serde_json::json;
//! use stats::{aggregate, reconcile};
//!
//! let records = vec![normalize(RawRecord::from(json!({"uploader": "A"})), 0)];
//! let summary = aggregate(&records);
//! let upstream = UpstreamStatistics {
//!     total_files: Some(2),
//!     ..Default::default()
//! };
//!
//! let check = reconcile(&summary, &upstream);
//! assert!(!check.consistent);
//! assert_eq!(check.mismatches[0].field, "total_files");
//! ```
use std::collections::BTreeMap;

use ingest::UpstreamStatistics;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::CategorySummary;

/// One upstream figure that disagrees with the recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Statistic name, with the group key for per-group counts
    /// (`top_uploaders.Alice`, `upload_timeline.2024-10`).
    pub field: String,
    pub upstream: u64,
    pub recomputed: u64,
}

/// Result of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamCheck {
    /// `true` when every figure upstream supplied matches.
    pub consistent: bool,
    /// Figures compared; zero means upstream supplied nothing checkable.
    pub compared: usize,
    pub mismatches: Vec<Mismatch>,
}

/// Compares every figure upstream supplied with the recomputed summary.
///
/// Camera counts are compared only for models that appear in `byCamera`,
/// since upstream labels cameras differently for records without EXIF.
pub fn reconcile(summary: &CategorySummary, upstream: &UpstreamStatistics) -> UpstreamCheck {
    let mut check = Checker::default();
    let totals = &summary.totals;

    check.scalar("total_files", upstream.total_files, totals.files);
    check.scalar("unique_uploaders", upstream.unique_uploaders, totals.unique_uploaders);
    check.scalar("total_size_bytes", upstream.total_size_bytes, totals.total_size_bytes);
    check.scalar("gps_enabled_count", upstream.gps_enabled_count, totals.geotagged_files);

    if let Some(uploaders) = &upstream.top_uploaders {
        check.groups("top_uploaders", uploaders, |name| Some(summary.files_by(name)));
    }

    if let Some(timeline) = &upstream.upload_timeline {
        check.groups("upload_timeline", timeline, |month| {
            Some(
                summary
                    .by_month
                    .iter()
                    .find(|entry| entry.month == month)
                    .map_or(0, |entry| entry.count),
            )
        });
    }

    if let Some(types) = &upstream.file_types {
        check.groups("file_types", types, |mime| {
            Some(
                summary
                    .by_file_type
                    .iter()
                    .find(|entry| entry.mime_type.eq_ignore_ascii_case(mime))
                    .map_or(0, |entry| entry.count),
            )
        });
    }

    if let Some(cameras) = &upstream.camera_models {
        check.groups("camera_models", cameras, |model| {
            summary
                .by_camera
                .iter()
                .find(|entry| entry.model == model)
                .map(|entry| entry.count)
        });
    }

    check.finish()
}

#[derive(Default)]
struct Checker {
    compared: usize,
    mismatches: Vec<Mismatch>,
}

impl Checker {
    fn scalar(&mut self, field: &str, upstream: Option<u64>, recomputed: u64) {
        let Some(upstream) = upstream else {
            return;
        };
        self.compare(field.to_string(), upstream, recomputed);
    }

    /// Compares each upstream group; `lookup` returning `None` skips it.
    fn groups(
        &mut self,
        field: &str,
        upstream: &BTreeMap<String, u64>,
        lookup: impl Fn(&str) -> Option<u64>,
    ) {
        for (key, &count) in upstream {
            if let Some(recomputed) = lookup(key) {
                self.compare(format!("{field}.{key}"), count, recomputed);
            }
        }
    }

    fn compare(&mut self, field: String, upstream: u64, recomputed: u64) {
        self.compared += 1;
        if upstream != recomputed {
            warn!(field = %field, upstream, recomputed, "upstream_statistics_mismatch");
            self.mismatches.push(Mismatch {
                field,
                upstream,
                recomputed,
            });
        }
    }

    fn finish(self) -> UpstreamCheck {
        UpstreamCheck {
            consistent: self.mismatches.is_empty(),
            compared: self.compared,
            mismatches: self.mismatches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use ingest::FileRecord;

    fn record(uploader: &str, date: &str, mime: &str, camera: Option<&str>) -> FileRecord {
        FileRecord {
            id: 0,
            filename: "f.jpg".into(),
            upload_date: Some(date.into()),
            upload_timestamp: None,
            size_bytes: 100,
            uploader: uploader.into(),
            mime_type: Some(mime.into()),
            has_gps: false,
            gps_lat: None,
            gps_lon: None,
            camera_model: camera.map(str::to_string),
            width: None,
            height: None,
        }
    }

    fn summary() -> CategorySummary {
        aggregate(&[
            record("A", "2024-10-01", "image/jpeg", Some("Canon EOS 80D")),
            record("A", "2024-10-02", "image/jpeg", None),
            record("B", "2024-11-01", "image/png", None),
        ])
    }

    #[test]
    fn matching_statistics_are_consistent() {
        let upstream = UpstreamStatistics {
            total_files: Some(3),
            unique_uploaders: Some(2),
            total_size_bytes: Some(300),
            gps_enabled_count: Some(0),
            top_uploaders: Some(BTreeMap::from([("A".into(), 2), ("B".into(), 1)])),
            upload_timeline: Some(BTreeMap::from([("2024-10".into(), 2), ("2024-11".into(), 1)])),
            camera_models: None,
            file_types: Some(BTreeMap::from([("IMAGE/JPEG".into(), 2)])),
        };
        let check = reconcile(&summary(), &upstream);
        assert!(check.consistent, "{:?}", check.mismatches);
        assert_eq!(check.compared, 9);
    }

    #[test]
    fn disagreements_are_listed() {
        let upstream = UpstreamStatistics {
            total_size_bytes: Some(6_656_000),
            top_uploaders: Some(BTreeMap::from([("C".into(), 4)])),
            ..Default::default()
        };
        let check = reconcile(&summary(), &upstream);
        assert!(!check.consistent);
        assert_eq!(
            check.mismatches,
            vec![
                Mismatch {
                    field: "total_size_bytes".into(),
                    upstream: 6_656_000,
                    recomputed: 300,
                },
                Mismatch {
                    field: "top_uploaders.C".into(),
                    upstream: 4,
                    recomputed: 0,
                },
            ]
        );
    }

    #[test]
    fn cameras_only_checked_when_present() {
        let upstream = UpstreamStatistics {
            camera_models: Some(BTreeMap::from([
                ("Canon EOS 80D".into(), 1),
                ("Phone".into(), 99),
            ])),
            ..Default::default()
        };
        let check = reconcile(&summary(), &upstream);
        assert!(check.consistent);
        assert_eq!(check.compared, 1);
    }

    #[test]
    fn empty_upstream_compares_nothing() {
        let check = reconcile(&summary(), &UpstreamStatistics::default());
        assert!(check.consistent);
        assert_eq!(check.compared, 0);
    }
}

//! Property-based tests for the normalize + aggregate pipeline
//!
//! - every input record is counted exactly once
//! - size totals and averages agree with the records
//! - geo points only carry in-range coordinates
//! - hour histogram always has 24 slots and never over-counts
//! - uploader ranking is sorted by files, then name
//! - normalizing a cleaned record again changes nothing
//! - canonical dates and timestamps keep their fixed-width forms

use catstats::{aggregate, normalize, FileRecord, RawRecord};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Test Generators
// ============================================================================

fn arb_date() -> impl Strategy<Value = String> {
    (2004u32..2030, 1u32..13, 1u32..29).prop_map(|(y, m, d)| format!("{y:04}{m:02}{d:02}"))
}

fn arb_timestamp() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("")),
        (arb_date(), 0u32..24, 0u32..60, 0u32..60)
            .prop_map(|(date, h, m, s)| json!(format!("{date}{h:02}{m:02}{s:02}"))),
    ]
}

fn arb_size() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<u32>().prop_map(|n| json!(n)),
        (0u64..10_000_000_000).prop_map(|n| json!(n.to_string())),
        (-1000i64..0).prop_map(|n| json!(n)),
        Just(Value::Null),
    ]
}

fn arb_metadata() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("")),
        Just(json!("{}")),
        (-200.0f64..200.0, -400.0f64..400.0).prop_map(|(lat, lon)| {
            json!(json!({"GPSLatitude": lat, "GPSLongitude": lon}).to_string())
        }),
        (-120.0f64..120.0, -200.0f64..200.0, "[A-Za-z0-9 ]{0,10}").prop_map(|(lat, lon, model)| {
            json!(json!({"data": {"GPSLatitude": lat, "GPSLongitude": lon, "Model": model}}).to_string())
        }),
        Just(json!("a:1:{")),
    ]
}

fn arb_row() -> impl Strategy<Value = Value> {
    (
        0i64..100_000,
        "[A-Za-z0-9_]{1,12}\\.(jpg|png|tif|svg|ogg)",
        arb_date(),
        arb_timestamp(),
        arb_size(),
        arb_metadata(),
        prop_oneof![Just(Value::Null), "[A-Za-z][a-z]{0,6}".prop_map(Value::from)],
    )
        .prop_map(|(id, filename, date, timestamp, size, metadata, uploader)| {
            json!([id, "Cat", filename, date, timestamp, size, metadata, uploader])
        })
}

/// ISO datetimes across the whole four-digit year range, with and without
/// an RFC 3339 offset.
fn arb_iso_timestamp() -> impl Strategy<Value = String> {
    (
        0u32..=9999,
        1u32..13,
        1u32..29,
        0u32..24,
        0u32..60,
        0u32..60,
        prop::option::of(-720i32..=840),
    )
        .prop_map(|(y, mo, d, h, mi, s, offset)| {
            let base = format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}");
            match offset {
                None => base.replacen('T', " ", 1),
                Some(0) => format!("{base}Z"),
                Some(minutes) => {
                    let sign = if minutes < 0 { '-' } else { '+' };
                    let abs = minutes.unsigned_abs();
                    format!("{base}{sign}{:02}:{:02}", abs / 60, abs % 60)
                }
            }
        })
}

fn arb_keyed() -> impl Strategy<Value = Value> {
    (
        0i64..100_000,
        "[A-Za-z0-9_]{1,12}\\.(jpg|png|webm)",
        prop_oneof![Just(Value::Null), arb_iso_timestamp().prop_map(Value::from)],
        prop_oneof![Just(Value::Null), arb_iso_timestamp().prop_map(Value::from)],
        arb_size(),
    )
        .prop_map(|(id, filename, upload_date, timestamp, size)| {
            json!({
                "id": id,
                "filename": filename,
                "upload_date": upload_date,
                "timestamp": timestamp,
                "size_bytes": size,
                "uploader": "Keyed"
            })
        })
}

fn arb_records() -> impl Strategy<Value = Vec<FileRecord>> {
    prop::collection::vec(prop_oneof![3 => arb_row(), 1 => arb_keyed()], 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| normalize(RawRecord::from(row), index))
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn every_record_counted_once(records in arb_records()) {
        let summary = aggregate(&records);
        let n = records.len() as u64;

        prop_assert_eq!(summary.totals.files, n);
        prop_assert_eq!(summary.by_uploader.iter().map(|u| u.files).sum::<u64>(), n);
        prop_assert_eq!(summary.by_size_bucket.iter().map(|b| b.count).sum::<u64>(), n);
        prop_assert_eq!(summary.by_file_type.iter().map(|t| t.count).sum::<u64>(), n);
        prop_assert_eq!(summary.totals.unique_uploaders, summary.by_uploader.len() as u64);
    }

    #[test]
    fn size_totals_match_records(records in arb_records()) {
        let summary = aggregate(&records);
        let total: u64 = records.iter().map(|r| r.size_bytes).sum();

        prop_assert_eq!(summary.totals.total_size_bytes, total);
        prop_assert_eq!(summary.by_uploader.iter().map(|u| u.size_bytes).sum::<u64>(), total);
        if records.is_empty() {
            prop_assert_eq!(summary.totals.avg_size_bytes, 0.0);
        } else {
            let expected = total as f64 / records.len() as f64;
            prop_assert!((summary.totals.avg_size_bytes - expected).abs() <= expected * 1e-12);
        }
    }

    #[test]
    fn geo_points_are_in_range(records in arb_records()) {
        let summary = aggregate(&records);
        let geotagged = records.iter().filter(|r| r.has_gps).count() as u64;

        prop_assert_eq!(summary.totals.geotagged_files, geotagged);
        prop_assert_eq!(summary.geo_points.len() as u64, geotagged);
        for point in &summary.geo_points {
            prop_assert!((-90.0..=90.0).contains(&point.lat));
            prop_assert!((-180.0..=180.0).contains(&point.lon));
        }
        for record in &records {
            prop_assert_eq!(record.has_gps, record.gps_lat.is_some());
            prop_assert_eq!(record.has_gps, record.gps_lon.is_some());
        }
    }

    #[test]
    fn hour_histogram_is_complete(records in arb_records()) {
        let summary = aggregate(&records);
        let timed = records.iter().filter(|r| r.upload_timestamp.is_some()).count() as u64;
        let counted: u64 = summary.by_hour.iter().map(|h| h.count).sum();

        prop_assert_eq!(summary.by_hour.len(), 24);
        for (hour, entry) in summary.by_hour.iter().enumerate() {
            prop_assert_eq!(entry.hour as usize, hour);
        }
        prop_assert_eq!(counted, timed);
        prop_assert!(counted <= summary.totals.files);
    }

    #[test]
    fn uploaders_ranked(records in arb_records()) {
        let summary = aggregate(&records);
        for pair in summary.by_uploader.windows(2) {
            let ordered = pair[0].files > pair[1].files
                || (pair[0].files == pair[1].files && pair[0].name < pair[1].name);
            prop_assert!(ordered, "{:?} before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn normalization_is_idempotent(records in arb_records()) {
        for (index, record) in records.iter().enumerate() {
            let again = normalize(RawRecord::Keyed(record.to_keyed()), index);
            prop_assert_eq!(&again, record);
        }
    }

    #[test]
    fn canonical_dates_keep_fixed_width(records in arb_records()) {
        for record in &records {
            if let Some(date) = &record.upload_date {
                prop_assert_eq!(date.len(), 10, "{}", date);
                prop_assert!(date.bytes().enumerate().all(|(i, b)| {
                    if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() }
                }), "{}", date);
            }
            if let Some(ts) = &record.upload_timestamp {
                prop_assert_eq!(ts.len(), 14, "{}", ts);
                prop_assert!(ts.bytes().all(|b| b.is_ascii_digit()), "{}", ts);
            }
        }
    }
}

//! Upload date and timestamp resolution.
//!
//! Replica rows carry MediaWiki's compact forms (`YYYYMMDD`,
//! `YYYYMMDDHHMMSS`); the dashboard API adds ISO spellings. Everything is
//! validated as a real calendar value before it reaches a [`FileRecord`](crate::FileRecord),
//! so `20240230` or `20240101256000` never leak into the timeline.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::fields;

/// Canonical date and timestamp of a single upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct UploadTime {
    pub(crate) date: Option<NaiveDate>,
    pub(crate) timestamp: Option<NaiveDateTime>,
}

impl UploadTime {
    /// Resolves both values from the raw fields of a record.
    ///
    /// The date comes from the first valid of `compact_date`, `iso_date`, then
    /// the timestamp's own date. The timestamp comes from `timestamp`, or from
    /// `iso_date` when that field holds a full datetime.
    pub(crate) fn resolve(
        compact_date: Option<&Value>,
        iso_date: Option<&Value>,
        timestamp: Option<&Value>,
    ) -> Self {
        let compact_date = fields::text(compact_date);
        let iso_date = fields::text(iso_date);
        let timestamp = fields::text(timestamp)
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| iso_date.as_deref().and_then(parse_timestamp));
        let date = compact_date
            .as_deref()
            .and_then(parse_date)
            .or_else(|| iso_date.as_deref().and_then(parse_date))
            .or_else(|| timestamp.map(|ts| ts.date()));

        Self { date, timestamp }
    }

    /// `YYYY-MM-DD`.
    pub(crate) fn date_string(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// `YYYYMMDDHHMMSS`.
    pub(crate) fn timestamp_string(&self) -> Option<String> {
        self.timestamp.map(|ts| ts.format("%Y%m%d%H%M%S").to_string())
    }
}

/// Parses `YYYYMMDD`, `YYYY-MM-DD`, or the date part of an ISO datetime.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() == 8 && all_digits(raw) {
        return ymd(raw, 0, 4, 6);
    }
    if raw.len() >= 10 && raw.is_char_boundary(10) {
        let (head, rest) = raw.split_at(10);
        if !rest.is_empty() && parse_timestamp(raw).is_none() {
            return None;
        }
        return parse_iso_date(head);
    }
    None
}

/// Parses a compact `YYYYMMDDHHMMSS` timestamp or an ISO datetime.
///
/// A date without a time is not a timestamp. Results must still fit the
/// four-digit compact form after conversion to UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_any_timestamp(raw.trim()).filter(|ts| (0..=9999).contains(&ts.year()))
}

fn parse_any_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if raw.len() == 14 && all_digits(raw) {
        let date = ymd(raw, 0, 4, 6)?;
        let time = NaiveTime::from_hms_opt(
            number(&raw[8..10])?,
            number(&raw[10..12])?,
            number(&raw[12..14])?,
        )?;
        return Some(date.and_time(time));
    }
    if raw.len() <= 10 {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    if !all_digits(&raw[0..4]) || !all_digits(&raw[5..7]) || !all_digits(&raw[8..10]) {
        return None;
    }
    ymd(raw, 0, 5, 8)
}

fn ymd(raw: &str, year: usize, month: usize, day: usize) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        raw[year..year + 4].parse().ok()?,
        number(&raw[month..month + 2])?,
        number(&raw[day..day + 2])?,
    )
}

fn number(raw: &str) -> Option<u32> {
    raw.parse().ok()
}

fn all_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

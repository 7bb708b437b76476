//! GPS coordinate extraction.
//!
//! Metadata carries coordinates in three historical layouts, tried in order:
//!
//! 1. EXIF style: top-level `GPSLatitude`/`GPSLongitude`, each a
//!    `[degrees, minutes, seconds]` triple or a plain decimal, with optional
//!    `GPSLatitudeRef`/`GPSLongitudeRef` hemispheres.
//! 2. MediaWiki JSON: `data.GPSLatitude`/`data.GPSLongitude` decimals.
//! 3. A `gps`, `location` or `GPS` sub-object with `latitude`/`longitude`.
//!
//! The first layout that yields two numbers wins. Range validation happens
//! afterwards, so an out-of-range pair discards GPS for the record instead
//! of falling through to a later layout.
use serde_json::Value;

use crate::fields;
use crate::metadata::Metadata;

/// Sub-object keys holding `latitude`/`longitude` pairs.
const NESTED_KEYS: [&str; 3] = ["gps", "location", "GPS"];

/// A validated coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Coordinates {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
}

impl Coordinates {
    /// Returns `None` unless both values are finite and within
    /// `[-90, 90]` × `[-180, 180]`.
    pub(crate) fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

/// Degrees, minutes and seconds to decimal degrees.
pub(crate) fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Finds and validates coordinates in decoded metadata.
pub(crate) fn from_metadata(metadata: &Metadata) -> Option<Coordinates> {
    let (lat, lon) = exif_pair(metadata)
        .or_else(|| data_pair(metadata))
        .or_else(|| nested_pair(metadata))?;
    Coordinates::new(lat, lon)
}

fn exif_pair(metadata: &Metadata) -> Option<(f64, f64)> {
    let lat = component(metadata.get("GPSLatitude")?)?;
    let lon = component(metadata.get("GPSLongitude")?)?;
    Some((
        hemisphere(lat, metadata.get("GPSLatitudeRef"), 'S'),
        hemisphere(lon, metadata.get("GPSLongitudeRef"), 'W'),
    ))
}

fn data_pair(metadata: &Metadata) -> Option<(f64, f64)> {
    let data = metadata.get("data")?.as_object()?;
    Some((
        fields::decimal(data.get("GPSLatitude"))?,
        fields::decimal(data.get("GPSLongitude"))?,
    ))
}

fn nested_pair(metadata: &Metadata) -> Option<(f64, f64)> {
    NESTED_KEYS.iter().find_map(|key| {
        let obj = metadata.get(*key)?.as_object()?;
        Some((
            fields::decimal(obj.get("latitude"))?,
            fields::decimal(obj.get("longitude"))?,
        ))
    })
}

/// One EXIF coordinate: a DMS list, a `"d, m, s"` string, or a decimal.
fn component(value: &Value) -> Option<f64> {
    match value {
        Value::Array(parts) => dms(parts.iter().map(Some)),
        Value::String(s) if s.contains(',') => {
            let parts: Vec<Value> = s.split(',').map(|p| Value::String(p.to_string())).collect();
            dms(parts.iter().map(Some))
        }
        other => fields::decimal(Some(other)),
    }
}

fn dms<'a>(parts: impl Iterator<Item = Option<&'a Value>>) -> Option<f64> {
    let parts: Vec<f64> = parts.map(fields::decimal).collect::<Option<_>>()?;
    match parts.as_slice() {
        [d] => Some(*d),
        [d, m] => Some(dms_to_decimal(*d, *m, 0.0)),
        [d, m, s] => Some(dms_to_decimal(*d, *m, *s)),
        _ => None,
    }
}

/// Applies a hemisphere reference. An already-negative value stays negative.
fn hemisphere(value: f64, reference: Option<&Value>, negative: char) -> f64 {
    let southern_or_western = fields::text(reference)
        .and_then(|r| r.chars().next())
        .is_some_and(|c| c.eq_ignore_ascii_case(&negative));
    if southern_or_western {
        -value.abs()
    } else {
        value
    }
}

//! Geo point construction and Commons links.
use ingest::FileRecord;

use crate::config::AggregateConfig;
use crate::types::GeoPoint;

/// Map marker for a geotagged record, or `None` when it has no coordinates.
pub(crate) fn geo_point(record: &FileRecord, cfg: &AggregateConfig) -> Option<GeoPoint> {
    let (lat, lon) = record.coordinates()?;
    Some(GeoPoint {
        lat,
        lon,
        filename: record.filename.clone(),
        uploader: record.uploader.clone(),
        date: record.upload_date.clone(),
        thumbnail_url: thumbnail_url(cfg.base_url(), &record.filename, cfg.thumbnail_width),
        page_url: page_url(cfg.base_url(), &record.filename),
    })
}

/// `Special:FilePath` link that redirects to a scaled rendering.
pub fn thumbnail_url(base: &str, filename: &str, width: u32) -> String {
    format!(
        "{base}/wiki/Special:FilePath/{}?width={width}",
        urlencoding::encode(filename)
    )
}

/// File description page.
pub fn page_url(base: &str, filename: &str) -> String {
    format!("{base}/wiki/File:{}", urlencoding::encode(filename))
}

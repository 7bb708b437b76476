//! MIME type resolution.
use serde_json::Value;

use crate::fields;

/// File extensions seen on Commons and their MIME types.
const EXTENSIONS: [(&str, &str); 27] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    ("xcf", "image/x-xcf"),
    ("pdf", "application/pdf"),
    ("djvu", "image/vnd.djvu"),
    ("djv", "image/vnd.djvu"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("ogv", "video/ogg"),
    ("webm", "video/webm"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("mid", "audio/midi"),
    ("midi", "audio/midi"),
    ("stl", "application/sla"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("opus", "audio/opus"),
];

/// Explicit MIME type when it looks like one, else the extension's.
pub(crate) fn resolve(explicit: Option<&Value>, filename: &str) -> Option<String> {
    fields::text(explicit)
        .map(|m| m.to_ascii_lowercase())
        .filter(|m| m.contains('/'))
        .or_else(|| from_extension(filename).map(str::to_string))
}

/// Looks up a filename's extension, case-insensitively.
pub(crate) fn from_extension(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.trim().rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_type_is_lowercased() {
        assert_eq!(
            resolve(Some(&json!(" Image/JPEG ")), "a.png"),
            Some("image/jpeg".into())
        );
    }

    #[test]
    fn bogus_explicit_type_falls_back() {
        assert_eq!(resolve(Some(&json!("BITMAP")), "a.PNG"), Some("image/png".into()));
        assert_eq!(resolve(Some(&json!("")), "scan.djvu"), Some("image/vnd.djvu".into()));
    }

    #[test]
    fn unknown_extensions() {
        assert_eq!(from_extension("README"), None);
        assert_eq!(from_extension("archive.tar.xz"), None);
        assert_eq!(from_extension("clip.WebM"), Some("video/webm"));
    }
}
